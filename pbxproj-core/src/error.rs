//! Error types for decoding and graph manipulation.

use thiserror::Error;

/// Errors raised while tokenizing and parsing the raw project text.
///
/// All variants carry the 1-based line and column where scanning stopped.
#[derive(Debug, Error)]
pub enum ParseError {
    #[error("project data is not valid UTF-8")]
    InvalidUtf8,

    #[error("unsupported file encoding `{0}` declared in header")]
    UnsupportedEncoding(String),

    #[error("unexpected character `{found}` at line {line}, column {column} (expected {expected})")]
    UnexpectedCharacter {
        expected: &'static str,
        found: char,
        line: usize,
        column: usize,
    },

    #[error("unexpected end of input at line {line}, column {column} (expected {expected})")]
    UnexpectedEof {
        expected: &'static str,
        line: usize,
        column: usize,
    },

    #[error("unterminated string literal starting at line {line}, column {column}")]
    UnterminatedString { line: usize, column: usize },

    #[error("unterminated comment starting at line {line}, column {column}")]
    UnterminatedComment { line: usize, column: usize },

    #[error("trailing content after closing brace at line {line}, column {column}")]
    TrailingContent { line: usize, column: usize },
}

/// Errors raised while mapping the parsed value tree onto typed records.
#[derive(Debug, Error)]
pub enum SchemaError {
    #[error("top-level structure is not a keyed container")]
    MalformedRoot,

    #[error("missing required top-level field `{0}`")]
    MissingTopLevelField(&'static str),

    #[error("top-level field `{field}` has the wrong type (expected {expected})")]
    MalformedTopLevelField {
        field: &'static str,
        expected: &'static str,
    },

    #[error("object `{id}` is not a keyed container")]
    MalformedObject { id: String },

    #[error("object `{id}` has no `isa` type tag")]
    MissingTypeTag { id: String },

    #[error("object `{id}` ({tag}) is missing required field `{field}`")]
    MissingField {
        id: String,
        tag: String,
        field: &'static str,
    },

    #[error("object `{id}` ({tag}) field `{field}` has the wrong type (expected {expected})")]
    WrongFieldType {
        id: String,
        tag: String,
        field: String,
        expected: &'static str,
    },
}

/// Any failure while turning project text into a graph.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Schema(#[from] SchemaError),
}
