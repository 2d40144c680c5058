use crate::{DatabaseError, sql::parser::SqlParser};

pub(crate) mod evaluator;
pub(crate) mod lexer;
pub(crate) mod params;
pub(crate) mod parser;
pub(crate) mod preprocessor;
pub(crate) mod validator;

pub use parser::{
    Assignment, Condition, Conditions, CreateStatement, DeleteStatement, DropStatement, Fields,
    InsertStatement, Operator, SelectStatement, Statement, UpdateStatement,
};
pub use preprocessor::split_statements;

/// Parses a single statement.
pub fn parse_statement(statement: &str) -> Result<Statement, DatabaseError> {
    let mut parser = SqlParser::new(statement)?;
    Ok(parser.parse()?)
}

/// Splits `input` into statements and parses each of them, in order.
///
/// Fails on the first statement that does not lex or parse.
pub fn parse_statements(input: &str) -> Result<Vec<Statement>, DatabaseError> {
    preprocessor::split_statements(input)
        .iter()
        .map(|statement| parse_statement(statement))
        .collect()
}
