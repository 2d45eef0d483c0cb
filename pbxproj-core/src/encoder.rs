//! Canonical writer for the project text.
//!
//! The writer renders the generic value tree of a graph back into the
//! historical layout: tab indentation, `/* Begin ... section */`
//! banners grouping records by type, synthesized comments next to
//! references, and by-need quoting with C-style escapes.

use tracing::debug;

use crate::graph::GraphStore;
use crate::layout::{
    comment_for, is_forced_string_position, is_multiline, is_reference_position, ordered_keys,
    PathSeg,
};
use crate::reference::Reference;
use crate::tag::TagRegistry;
use crate::value::{Dict, Value};

/// First line of every emitted file.
pub const ENCODING_HEADER: &str = "// !$*UTF8*$!";

/// Canonical encoder. The defaults reproduce Xcode's own output; the
/// write-order registry can be swapped for projects that need another
/// section order.
pub struct Encoder {
    registry: TagRegistry,
    indent: String,
}

impl Default for Encoder {
    fn default() -> Self {
        Encoder {
            registry: TagRegistry::builtin(),
            indent: "\t".to_string(),
        }
    }
}

impl Encoder {
    pub fn new() -> Self {
        Encoder::default()
    }

    pub fn with_registry(registry: TagRegistry) -> Self {
        Encoder {
            registry,
            ..Encoder::default()
        }
    }

    /// Render the complete project text, trailing newline included.
    pub fn encode(&self, graph: &GraphStore) -> String {
        let root = graph.to_root_value();
        let mut out = String::with_capacity(4096);
        out.push_str(ENCODING_HEADER);
        out.push_str("\n{\n");
        self.write_dict_entries(&mut out, &root, &mut Vec::new(), 1, &root);
        out.push_str("}\n");
        debug!(bytes = out.len(), "encoded project text");
        out
    }

    fn push_indent(&self, out: &mut String, level: usize) {
        for _ in 0..level {
            out.push_str(&self.indent);
        }
    }

    fn write_dict_entries(
        &self,
        out: &mut String,
        dict: &Dict,
        path: &mut Vec<PathSeg>,
        level: usize,
        root: &Dict,
    ) {
        let at_objects = path.len() == 1 && path[0].key() == Some("objects");
        let keys = ordered_keys(dict, path, root);
        for key in keys {
            let value = &dict[&key];
            self.write_entry(out, &key, value, path, level, root, at_objects);
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn write_entry(
        &self,
        out: &mut String,
        key: &str,
        value: &Value,
        path: &mut Vec<PathSeg>,
        level: usize,
        root: &Dict,
        key_is_record_id: bool,
    ) {
        self.push_indent(out, level);
        if key_is_record_id {
            out.push_str(&escape_reference(key));
            path.push(PathSeg::Key(key.to_string()));
            if let Some(comment) = comment_for(key, path, root) {
                push_comment(out, &comment);
            }
            path.pop();
        } else {
            out.push_str(&escape_string(key));
        }
        out.push_str(" = ");
        path.push(PathSeg::Key(key.to_string()));
        if key == "objects" && path.len() == 1 {
            self.write_objects(out, value, path, level, root);
        } else {
            self.write_value(out, value, path, level, root);
        }
        path.pop();
        out.push_str(";\n");
    }

    /// The `objects` container, grouped into per-type sections.
    fn write_objects(
        &self,
        out: &mut String,
        value: &Value,
        path: &mut Vec<PathSeg>,
        level: usize,
        root: &Dict,
    ) {
        let objects = match value.as_dict() {
            Some(objects) => objects,
            None => {
                self.write_value(out, value, path, level, root);
                return;
            }
        };
        out.push('{');
        out.push('\n');

        let mut tags: Vec<&str> = objects
            .values()
            .filter_map(|body| body.as_dict())
            .filter_map(|body| body.get("isa"))
            .filter_map(Value::as_str)
            .collect();
        tags.sort_by_key(|tag| (self.registry.rank(tag), *tag));
        tags.dedup();

        for tag in tags {
            let mut ids: Vec<&String> = objects
                .iter()
                .filter(|(_, body)| {
                    body.as_dict()
                        .and_then(|b| b.get("isa"))
                        .and_then(Value::as_str)
                        == Some(tag)
                })
                .map(|(id, _)| id)
                .collect();
            ids.sort_by_key(|id| Reference::new(id.as_str()));

            out.push('\n');
            out.push_str("/* Begin ");
            out.push_str(tag);
            out.push_str(" section */\n");
            for id in ids {
                self.write_entry(out, id, &objects[id], path, level + 1, root, true);
            }
            out.push_str("/* End ");
            out.push_str(tag);
            out.push_str(" section */\n");
        }

        out.push('\n');
        self.push_indent(out, level);
        out.push('}');
    }

    fn write_value(
        &self,
        out: &mut String,
        value: &Value,
        path: &mut Vec<PathSeg>,
        level: usize,
        root: &Dict,
    ) {
        match value {
            Value::Integer(n) => out.push_str(&n.to_string()),
            Value::String(s) => {
                out.push_str(&self.scalar_string(s, path, root));
                if let Some(comment) = comment_for(s, path, root) {
                    push_comment(out, &comment);
                }
            }
            Value::Dict(dict) => {
                if is_multiline(dict, path) {
                    out.push_str("{\n");
                    self.write_dict_entries(out, dict, path, level + 1, root);
                    self.push_indent(out, level);
                    out.push('}');
                } else {
                    self.write_inline_dict(out, dict, path, root);
                }
            }
            Value::Array(items) => {
                out.push_str("(\n");
                for (i, item) in items.iter().enumerate() {
                    self.push_indent(out, level + 1);
                    path.push(PathSeg::Index(i));
                    self.write_value(out, item, path, level + 1, root);
                    path.pop();
                    if i + 1 < items.len() {
                        out.push(',');
                    }
                    out.push('\n');
                }
                self.push_indent(out, level);
                out.push(')');
            }
        }
    }

    /// Single-line record form: `{isa = X; fileRef = Y /* f */; }`.
    fn write_inline_dict(&self, out: &mut String, dict: &Dict, path: &mut Vec<PathSeg>, root: &Dict) {
        out.push('{');
        for key in ordered_keys(dict, path, root) {
            out.push_str(&escape_string(&key));
            out.push_str(" = ");
            path.push(PathSeg::Key(key.clone()));
            match &dict[&key] {
                Value::Array(items) => {
                    out.push('(');
                    for (i, item) in items.iter().enumerate() {
                        path.push(PathSeg::Index(i));
                        self.write_value(out, item, path, 0, root);
                        path.pop();
                        if i + 1 < items.len() {
                            out.push_str(", ");
                        }
                    }
                    out.push(')');
                }
                Value::Dict(inner) => self.write_inline_dict(out, inner, path, root),
                scalar => self.write_value(out, scalar, path, 0, root),
            }
            path.pop();
            out.push_str("; ");
        }
        out.push('}');
    }

    fn scalar_string(&self, s: &str, path: &[PathSeg], root: &Dict) -> String {
        if is_reference_position(path, root) {
            return escape_reference(s);
        }
        if needs_quoting(s) {
            return quote(s);
        }
        // A bare numeric token would decode back as an integer; quote
        // it to keep its string identity, except where decoding forces
        // strings anyway.
        if s.parse::<i64>().is_ok() && !is_forced_string_position(path) {
            return quote(s);
        }
        s.to_string()
    }
}

/// Characters that force quoting at ordinary string positions.
fn needs_quoting(s: &str) -> bool {
    s.is_empty()
        || s.contains("::")
        || s.contains("/*")
        || s.chars().any(|c| {
            matches!(
                c,
                '@' | '$'
                    | '('
                    | ')'
                    | '<'
                    | '>'
                    | '='
                    | '-'
                    | '+'
                    | ' '
                    | '\t'
                    | '\n'
                    | '\r'
                    | ';'
                    | ','
                    | '{'
                    | '}'
                    | '"'
                    | '\''
                    | '\\'
            )
        })
}

/// Reference positions only quote when the bare form would not survive
/// a re-parse.
fn needs_minimal_quoting(s: &str) -> bool {
    s.is_empty()
        || s.contains("/*")
        || s.chars().any(|c| {
            c.is_whitespace()
                || matches!(c, ';' | ',' | '(' | ')' | '{' | '}' | '=' | '"' | '\\')
        })
}

/// Comment text must not carry its own terminator; skip it rather
/// than corrupt the surrounding entry.
fn push_comment(out: &mut String, comment: &str) {
    if comment.contains("*/") {
        return;
    }
    out.push_str(" /* ");
    out.push_str(comment);
    out.push_str(" */");
}

fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    out.push('"');
    for c in s.chars() {
        match c {
            '\\' => out.push_str("\\\\"),
            '"' => out.push_str("\\\""),
            '\n' => out.push_str("\\n"),
            '\t' => out.push_str("\\t"),
            '\r' => out.push_str("\\r"),
            other => out.push(other),
        }
    }
    out.push('"');
    out
}

/// By-need quoting for ordinary strings.
pub fn escape_string(s: &str) -> String {
    if needs_quoting(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

/// By-need quoting for reference positions, which stay raw wherever
/// the parser can read them back.
pub fn escape_reference(s: &str) -> String {
    if needs_minimal_quoting(s) {
        quote(s)
    } else {
        s.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escaping_scenario() {
        assert_eq!(escape_string("$(inherited)"), "\"$(inherited)\"");
        assert_eq!(escape_string("YES"), "YES");
        assert_eq!(escape_string("main.swift"), "main.swift");
        assert_eq!(escape_string(""), "\"\"");
        assert_eq!(escape_string("Lib::Tool"), "\"Lib::Tool\"");
        assert_eq!(
            escape_string("com.apple.product-type.tool"),
            "\"com.apple.product-type.tool\""
        );
    }

    #[test]
    fn test_comment_openers_force_quoting() {
        // A bare `/*` would swallow the rest of the line on re-parse.
        assert_eq!(escape_string("src/*.c"), "\"src/*.c\"");
        assert_eq!(escape_reference("src/*.c"), "\"src/*.c\"");
        // Plain path separators stay bare.
        assert_eq!(escape_string("Sources/main.swift"), "Sources/main.swift");
    }

    #[test]
    fn test_comment_terminator_suppresses_comment() {
        let mut out = String::new();
        push_comment(&mut out, "odd */ thing");
        assert!(out.is_empty());
        push_comment(&mut out, "main.swift");
        assert_eq!(out, " /* main.swift */");
    }

    #[test]
    fn test_escape_sequences() {
        assert_eq!(escape_string("say \"hi\""), "\"say \\\"hi\\\"\"");
        assert_eq!(escape_string("a\nb\tc"), "\"a\\nb\\tc\"");
        assert_eq!(escape_string("back\\slash"), "\"back\\\\slash\"");
    }

    #[test]
    fn test_reference_positions_stay_raw() {
        assert_eq!(escape_reference("OBJ_5"), "OBJ_5");
        // Structural characters that would break re-parsing still quote.
        assert_eq!(escape_reference("has space"), "\"has space\"");
        // Characters from the ordinary trigger list do not.
        assert_eq!(escape_reference("ABC-DEF"), "ABC-DEF");
        assert_eq!(escape_reference("Lib::Tool"), "Lib::Tool");
    }
}
