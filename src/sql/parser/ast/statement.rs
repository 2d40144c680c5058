use crate::{ColumnDef, Value};

use super::{Assignment, Conditions, Fields};

/// A parsed statement (top-level AST node).
///
/// Statements are self-contained: they name their table but carry no
/// reference to a schema or to storage.
#[derive(Debug, Clone, PartialEq)]
pub enum Statement {
    Select(SelectStatement),
    Insert(InsertStatement),
    Update(UpdateStatement),
    Delete(DeleteStatement),
    Create(CreateStatement),
    Drop(DropStatement),
}

impl Statement {
    /// The table this statement operates on.
    pub fn table_name(&self) -> &str {
        match self {
            Statement::Select(s) => &s.table,
            Statement::Insert(s) => &s.table,
            Statement::Update(s) => &s.table,
            Statement::Delete(s) => &s.table,
            Statement::Create(s) => &s.table,
            Statement::Drop(s) => &s.table,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Statement::Select(_) => "SELECT",
            Statement::Insert(_) => "INSERT",
            Statement::Update(_) => "UPDATE",
            Statement::Delete(_) => "DELETE",
            Statement::Create(_) => "CREATE",
            Statement::Drop(_) => "DROP",
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct SelectStatement {
    pub table: String,
    pub fields: Fields,
    pub conditions: Conditions,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InsertStatement {
    pub table: String,
    /// Wildcard when no column list was given: values follow schema order.
    pub fields: Fields,
    pub values: Vec<Vec<Value>>,
    pub returning: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct UpdateStatement {
    pub table: String,
    pub assignments: Vec<Assignment>,
    pub conditions: Conditions,
    pub returning: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DeleteStatement {
    pub table: String,
    pub conditions: Conditions,
    pub returning: Fields,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CreateStatement {
    pub table: String,
    pub if_not_exists: bool,
    pub definitions: Vec<ColumnDef>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DropStatement {
    pub table: String,
    pub if_exists: bool,
}
