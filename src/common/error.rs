use std::time::Duration;

use miette::{Diagnostic, SourceSpan};
use thiserror::Error;

use crate::{DataType, Row, sql::Operator};

/// Raised while scanning a statement into tokens.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum LexError {
    #[error("unexpected character '{character}'")]
    #[diagnostic(code(skiff::lex::unexpected_character))]
    UnexpectedCharacter {
        character: char,
        #[label("not valid here")]
        span: SourceSpan,
    },

    #[error("invalid number '{text}'")]
    #[diagnostic(code(skiff::lex::invalid_number))]
    InvalidNumber {
        text: String,
        #[label("not a number")]
        span: SourceSpan,
    },

    #[error("unterminated string literal")]
    #[diagnostic(
        code(skiff::lex::unterminated_string),
        help("close the string with the same quote it was opened with")
    )]
    UnterminatedString {
        #[label("string starts here")]
        span: SourceSpan,
    },
}

/// Raised when a token sequence does not form a valid statement.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum SyntaxError {
    #[error("expected {expected}, found {found}")]
    #[diagnostic(code(skiff::syntax::unexpected_token))]
    UnexpectedToken { expected: String, found: String },

    #[error("expected {expected}, found unexpected end of statement")]
    #[diagnostic(code(skiff::syntax::unexpected_end))]
    UnexpectedEnd { expected: String },

    #[error("unexpected {found} after end of statement")]
    #[diagnostic(code(skiff::syntax::trailing_tokens))]
    TrailingTokens { found: String },

    #[error("empty statement")]
    #[diagnostic(code(skiff::syntax::empty_statement))]
    EmptyStatement,

    #[error("{fields} columns listed but {values} values given")]
    #[diagnostic(code(skiff::syntax::arity_mismatch))]
    ArityMismatch { fields: usize, values: usize },

    #[error("no value bound for parameter ${index}")]
    #[diagnostic(code(skiff::syntax::missing_parameter))]
    MissingParameter { index: usize },

    #[error("parameter ${index} cannot be bound: {reason}")]
    #[diagnostic(code(skiff::syntax::unbindable_parameter))]
    UnbindableParameter { index: usize, reason: &'static str },
}

/// Raised when a statement is well formed but does not fit the table schema.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum ValidationError {
    #[error("column \"{column}\" does not exist in table \"{table}\"")]
    #[diagnostic(code(skiff::validate::column_not_found))]
    ColumnNotFound { table: String, column: String },

    #[error("{column} expects {expected}, got {found}")]
    #[diagnostic(code(skiff::validate::type_mismatch))]
    TypeMismatch {
        column: String,
        expected: DataType,
        found: &'static str,
    },

    #[error("operator {operator} requires a NUMERIC column, but {column} is {data_type}")]
    #[diagnostic(code(skiff::validate::non_numeric_comparison))]
    NonNumericComparison {
        column: String,
        operator: Operator,
        data_type: DataType,
    },

    #[error("expected {expected} values, got {found}")]
    #[diagnostic(code(skiff::validate::value_count))]
    ValueCountMismatch { expected: usize, found: usize },

    #[error("column \"{column}\" specified more than once")]
    #[diagnostic(code(skiff::validate::duplicate_column))]
    DuplicateColumn { column: String },
}

/// Raised by the execution engine for catalog-level failures.
#[derive(Debug, Error, Diagnostic, Clone, PartialEq)]
pub enum EngineError {
    #[error("table \"{table}\" already exists")]
    #[diagnostic(code(skiff::engine::table_exists), help("use CREATE TABLE IF NOT EXISTS"))]
    TableExists { table: String },

    #[error("table \"{table}\" does not exist")]
    #[diagnostic(code(skiff::engine::table_not_found))]
    TableNotFound { table: String },

    #[error("timed out after {timeout:?} waiting for table \"{table}\"")]
    #[diagnostic(code(skiff::engine::lock_timeout))]
    LockTimeout { table: String, timeout: Duration },
}

/// Raised by a storage backend.
#[derive(Debug, Error, Diagnostic)]
pub enum StorageError {
    #[error("storage I/O failed: {0}")]
    #[diagnostic(code(skiff::storage::io))]
    Io(#[from] std::io::Error),

    #[error("stored document is not valid: {0}")]
    #[diagnostic(code(skiff::storage::json))]
    Json(#[from] serde_json::Error),
}

/// Any error produced while running a statement.
#[derive(Debug, Error, Diagnostic)]
pub enum DatabaseError {
    #[error(transparent)]
    #[diagnostic(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Syntax(#[from] SyntaxError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Engine(#[from] EngineError),

    #[error(transparent)]
    #[diagnostic(transparent)]
    Storage(#[from] StorageError),
}

/// A multi-statement run that stopped at its first failing statement.
///
/// `results` holds the result sets of the statements that completed.
#[derive(Debug, Error, Diagnostic)]
#[error("statement {} failed: {source}", .results.len() + 1)]
pub struct BatchError {
    pub results: Vec<Vec<Row>>,

    #[source]
    #[diagnostic_source]
    pub source: DatabaseError,
}
