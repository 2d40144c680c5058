use crate::{Value, sql::parser::Operator};

/// One comparison: `field operator value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Condition {
    pub field: String,
    pub operator: Operator,
    pub value: Value,
}

/// A WHERE clause in disjunctive normal form.
///
/// The outer list is OR-ed, each inner list is AND-ed, so
/// `a = 1 AND b = 2 OR c = 3` becomes `[[a = 1, b = 2], [c = 3]]`.
/// An empty list matches every row.
pub type Conditions = Vec<Vec<Condition>>;

/// One column write in an UPDATE: `field = value`.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub field: String,
    pub value: Value,
}

impl Condition {
    pub fn new(field: impl Into<String>, operator: Operator, value: impl Into<Value>) -> Self {
        Self {
            field: field.into(),
            operator,
            value: value.into(),
        }
    }
}
