use std::fmt;

use crate::Value;

/// A literal value as it appears in a statement.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal<'src> {
    Number(f64),
    String(&'src str),
    Boolean(bool),
    Null,
}

impl From<Literal<'_>> for Value {
    fn from(literal: Literal<'_>) -> Self {
        match literal {
            Literal::Number(n) => Value::Number(n),
            Literal::String(s) => Value::Text(s.to_owned()),
            Literal::Boolean(b) => Value::Boolean(b),
            Literal::Null => Value::Null,
        }
    }
}

impl fmt::Display for Literal<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Number(n) => write!(f, "{n}"),
            Literal::String(s) => write!(f, "'{s}'"),
            Literal::Boolean(b) => write!(f, "{}", b.to_string().to_uppercase()),
            Literal::Null => write!(f, "NULL"),
        }
    }
}
