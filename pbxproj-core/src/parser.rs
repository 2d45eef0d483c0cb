//! Tokenizer/parser for the legacy property-list project text.
//!
//! Produces a generic [`Value`] tree. `/* ... */` comments are ignored,
//! the optional `// !$*<charset>*$!` header line is validated, quoted
//! strings are unescaped, and bare integer tokens are coerced to
//! [`Value::Integer`] except under the forced-string paths (build
//! settings, project attributes, `defaultConfigurationIsVisible`),
//! which must survive as strings to round-trip the way Xcode wrote
//! them.

use once_cell::sync::Lazy;
use regex::RegexSet;
use tracing::debug;

use crate::error::ParseError;
use crate::value::{Dict, Value};

/// Paths whose scalar values are never coerced to integers.
static FORCED_STRING_PATHS: Lazy<RegexSet> = Lazy::new(|| {
    RegexSet::new([
        r"/buildSettings/",
        r"/attributes/",
        r"/defaultConfigurationIsVisible$",
    ])
    .expect("forced-string path patterns are valid regexes")
});

fn is_forced_string_path(path: &[String]) -> bool {
    let mut joined = String::with_capacity(32);
    for seg in path {
        joined.push('/');
        joined.push_str(seg);
    }
    FORCED_STRING_PATHS.is_match(&joined)
}

/// Parse complete project text into its top-level keyed container.
pub fn parse(text: &str) -> Result<Value, ParseError> {
    let mut parser = Parser::new(text);
    parser.skip_encoding_header()?;
    parser.skip_trivia()?;
    parser.expect_char('{', "`{` opening the top-level container")?;
    let mut path = Vec::new();
    let root = parser.parse_dict_body(&mut path)?;
    parser.skip_trivia()?;
    if !parser.at_end() {
        return Err(ParseError::TrailingContent {
            line: parser.line,
            column: parser.column,
        });
    }
    debug!(top_level_keys = root.len(), "parsed project text");
    Ok(Value::Dict(root))
}

struct Parser<'a> {
    src: &'a str,
    pos: usize,
    line: usize,
    column: usize,
}

impl<'a> Parser<'a> {
    fn new(src: &'a str) -> Self {
        // Tolerate a UTF-8 byte order mark.
        let src = src.strip_prefix('\u{feff}').unwrap_or(src);
        Parser {
            src,
            pos: 0,
            line: 1,
            column: 1,
        }
    }

    fn at_end(&self) -> bool {
        self.pos >= self.src.len()
    }

    fn peek(&self) -> Option<char> {
        self.src[self.pos..].chars().next()
    }

    fn peek2(&self) -> Option<char> {
        let mut chars = self.src[self.pos..].chars();
        chars.next();
        chars.next()
    }

    fn bump(&mut self) -> Option<char> {
        let c = self.peek()?;
        self.pos += c.len_utf8();
        if c == '\n' {
            self.line += 1;
            self.column = 1;
        } else {
            self.column += 1;
        }
        Some(c)
    }

    fn expect_char(&mut self, wanted: char, expected: &'static str) -> Result<(), ParseError> {
        match self.peek() {
            Some(c) if c == wanted => {
                self.bump();
                Ok(())
            }
            Some(c) => Err(ParseError::UnexpectedCharacter {
                expected,
                found: c,
                line: self.line,
                column: self.column,
            }),
            None => Err(ParseError::UnexpectedEof {
                expected,
                line: self.line,
                column: self.column,
            }),
        }
    }

    /// Validate and consume the `// !$*<charset>*$!` first line, if present.
    fn skip_encoding_header(&mut self) -> Result<(), ParseError> {
        let first_line = self.src.lines().next().unwrap_or("");
        let trimmed = first_line.trim_end_matches('\r');
        if let Some(inner) = trimmed
            .strip_prefix("// !$*")
            .and_then(|rest| rest.strip_suffix("*$!"))
        {
            let charset = inner.to_ascii_uppercase();
            if charset != "UTF8" && charset != "UTF-8" {
                return Err(ParseError::UnsupportedEncoding(inner.to_string()));
            }
            while let Some(c) = self.bump() {
                if c == '\n' {
                    break;
                }
            }
        }
        Ok(())
    }

    /// Skip whitespace and `/* ... */` comments.
    fn skip_trivia(&mut self) -> Result<(), ParseError> {
        loop {
            match self.peek() {
                Some(c) if c.is_whitespace() => {
                    self.bump();
                }
                Some('/') if self.peek2() == Some('*') => {
                    let (line, column) = (self.line, self.column);
                    self.bump();
                    self.bump();
                    loop {
                        match self.peek() {
                            Some('*') if self.peek2() == Some('/') => {
                                self.bump();
                                self.bump();
                                break;
                            }
                            Some(_) => {
                                self.bump();
                            }
                            None => {
                                return Err(ParseError::UnterminatedComment { line, column })
                            }
                        }
                    }
                }
                _ => return Ok(()),
            }
        }
    }

    fn parse_dict_body(&mut self, path: &mut Vec<String>) -> Result<Dict, ParseError> {
        let mut dict = Dict::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some('}') => {
                    self.bump();
                    return Ok(dict);
                }
                Some(_) => {}
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: "`}` or a key",
                        line: self.line,
                        column: self.column,
                    })
                }
            }
            let key = self.parse_string_token("a key")?;
            self.skip_trivia()?;
            self.expect_char('=', "`=` after key")?;
            self.skip_trivia()?;
            path.push(key.clone());
            let value = self.parse_value(path)?;
            path.pop();
            self.skip_trivia()?;
            self.expect_char(';', "`;` after value")?;
            dict.insert(key, value);
        }
    }

    fn parse_array_body(&mut self, path: &mut Vec<String>) -> Result<Vec<Value>, ParseError> {
        let mut items = Vec::new();
        loop {
            self.skip_trivia()?;
            match self.peek() {
                Some(')') => {
                    self.bump();
                    return Ok(items);
                }
                Some(_) => {}
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: "`)` or an element",
                        line: self.line,
                        column: self.column,
                    })
                }
            }
            path.push(items.len().to_string());
            let value = self.parse_value(path)?;
            path.pop();
            self.skip_trivia()?;
            match self.peek() {
                Some(',') => {
                    self.bump();
                }
                Some(')') => {}
                Some(c) => {
                    return Err(ParseError::UnexpectedCharacter {
                        expected: "`,` or `)` after element",
                        found: c,
                        line: self.line,
                        column: self.column,
                    })
                }
                None => {
                    return Err(ParseError::UnexpectedEof {
                        expected: "`,` or `)` after element",
                        line: self.line,
                        column: self.column,
                    })
                }
            }
            items.push(value);
        }
    }

    fn parse_value(&mut self, path: &mut Vec<String>) -> Result<Value, ParseError> {
        match self.peek() {
            Some('{') => {
                self.bump();
                Ok(Value::Dict(self.parse_dict_body(path)?))
            }
            Some('(') => {
                self.bump();
                Ok(Value::Array(self.parse_array_body(path)?))
            }
            Some('"') => Ok(Value::String(self.parse_quoted_string()?)),
            Some(_) => {
                let token = self.parse_bare_token("a value")?;
                if !is_forced_string_path(path) {
                    if let Ok(n) = parse_integer_token(&token) {
                        return Ok(Value::Integer(n));
                    }
                }
                Ok(Value::String(token))
            }
            None => Err(ParseError::UnexpectedEof {
                expected: "a value",
                line: self.line,
                column: self.column,
            }),
        }
    }

    /// A key or scalar string: quoted or bare, never integer-coerced.
    fn parse_string_token(&mut self, expected: &'static str) -> Result<String, ParseError> {
        match self.peek() {
            Some('"') => self.parse_quoted_string(),
            _ => self.parse_bare_token(expected),
        }
    }

    fn parse_quoted_string(&mut self) -> Result<String, ParseError> {
        let (line, column) = (self.line, self.column);
        self.bump();
        let mut out = String::new();
        loop {
            match self.bump() {
                Some('"') => return Ok(out),
                Some('\\') => match self.bump() {
                    Some('n') => out.push('\n'),
                    Some('t') => out.push('\t'),
                    Some('r') => out.push('\r'),
                    Some('"') => out.push('"'),
                    Some('\\') => out.push('\\'),
                    // Unrecognized escapes survive verbatim.
                    Some(other) => {
                        out.push('\\');
                        out.push(other);
                    }
                    None => return Err(ParseError::UnterminatedString { line, column }),
                },
                Some(c) => out.push(c),
                None => return Err(ParseError::UnterminatedString { line, column }),
            }
        }
    }

    fn parse_bare_token(&mut self, expected: &'static str) -> Result<String, ParseError> {
        let start = self.pos;
        loop {
            match self.peek() {
                Some(c) if is_bare_terminator(c) => break,
                Some('/') if self.peek2() == Some('*') => break,
                Some(_) => {
                    self.bump();
                }
                None => break,
            }
        }
        if self.pos == start {
            return match self.peek() {
                Some(c) => Err(ParseError::UnexpectedCharacter {
                    expected,
                    found: c,
                    line: self.line,
                    column: self.column,
                }),
                None => Err(ParseError::UnexpectedEof {
                    expected,
                    line: self.line,
                    column: self.column,
                }),
            };
        }
        Ok(self.src[start..self.pos].to_string())
    }
}

fn is_bare_terminator(c: char) -> bool {
    c.is_whitespace() || matches!(c, ';' | ',' | '(' | ')' | '{' | '}' | '=' | '"')
}

fn parse_integer_token(token: &str) -> Result<i64, std::num::ParseIntError> {
    // `i64::from_str` also accepts a leading `+`, matching the coercion
    // rule for bare numeric tokens.
    token.parse()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_container() {
        let root = parse("// !$*UTF8*$!\n{\n}").unwrap();
        assert_eq!(root, Value::Dict(Dict::new()));
    }

    #[test]
    fn test_header_charset_rejected() {
        let err = parse("// !$*ISO-8859-1*$!\n{\n}").unwrap_err();
        assert!(matches!(err, ParseError::UnsupportedEncoding(cs) if cs == "ISO-8859-1"));
    }

    #[test]
    fn test_scalars_and_coercion() {
        let root = parse("{ archiveVersion = 1; name = Hello; quoted = \"46\"; }").unwrap();
        let dict = root.as_dict().unwrap();
        assert_eq!(dict["archiveVersion"], Value::Integer(1));
        assert_eq!(dict["name"], Value::from("Hello"));
        // Quoted tokens are never coerced.
        assert_eq!(dict["quoted"], Value::from("46"));
    }

    #[test]
    fn test_forced_string_paths() {
        let text = r#"{
            objects = {
                OBJ_1 = {
                    isa = XCBuildConfiguration;
                    buildSettings = { SWIFT_VERSION = 5.0; ENABLE_TESTABILITY = 1; };
                };
                OBJ_2 = {
                    isa = XCConfigurationList;
                    defaultConfigurationIsVisible = 0;
                };
            };
            objectVersion = 46;
        }"#;
        let root = parse(text).unwrap();
        let objects = root.as_dict().unwrap()["objects"].as_dict().unwrap();
        let settings = objects["OBJ_1"].as_dict().unwrap()["buildSettings"]
            .as_dict()
            .unwrap();
        assert_eq!(settings["ENABLE_TESTABILITY"], Value::from("1"));
        assert_eq!(settings["SWIFT_VERSION"], Value::from("5.0"));
        let list = objects["OBJ_2"].as_dict().unwrap();
        assert_eq!(list["defaultConfigurationIsVisible"], Value::from("0"));
        assert_eq!(root.as_dict().unwrap()["objectVersion"], Value::Integer(46));
    }

    #[test]
    fn test_comments_ignored() {
        let text = "{ fileRef = OBJ_5 /* main.swift */; files = (OBJ_3 /* a */, OBJ_4, ); }";
        let dict = parse(text).unwrap().into_dict().unwrap();
        assert_eq!(dict["fileRef"], Value::from("OBJ_5"));
        assert_eq!(
            dict["files"],
            Value::Array(vec![Value::from("OBJ_3"), Value::from("OBJ_4")])
        );
    }

    #[test]
    fn test_quoted_string_escapes() {
        let dict = parse(r#"{ script = "echo \"hi\"\n\tdone\\"; }"#)
            .unwrap()
            .into_dict()
            .unwrap();
        assert_eq!(dict["script"], Value::from("echo \"hi\"\n\tdone\\"));
    }

    #[test]
    fn test_nested_containers() {
        let text = "{ a = { b = ( { c = 1; }, (2, 3), x ); }; }";
        let dict = parse(text).unwrap().into_dict().unwrap();
        let b = dict["a"].as_dict().unwrap()["b"].as_array().unwrap();
        assert_eq!(b.len(), 3);
        assert_eq!(b[1], Value::Array(vec![Value::from(2), Value::from(3)]));
        assert_eq!(b[2], Value::from("x"));
    }

    #[test]
    fn test_error_positions() {
        let err = parse("{\n  key =\n}").unwrap_err();
        match err {
            ParseError::UnexpectedCharacter { found, line, .. } => {
                assert_eq!(found, '}');
                assert_eq!(line, 3);
            }
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn test_missing_semicolon() {
        let err = parse("{ a = 1 }").unwrap_err();
        assert!(matches!(
            err,
            ParseError::UnexpectedCharacter {
                expected: "`;` after value",
                ..
            }
        ));
    }

    #[test]
    fn test_trailing_content() {
        assert!(matches!(
            parse("{ } extra").unwrap_err(),
            ParseError::TrailingContent { .. }
        ));
    }
}
