use serde::{Deserialize, Serialize};

pub mod column_def;
pub mod row;
pub mod schema;

use column_def::ColumnDef;
use row::Row;
use schema::Schema;

/// A table: its schema and its rows in insertion order.
///
/// Every row holds exactly the schema's columns.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Table {
    pub schema: Schema,
    pub rows: Vec<Row>,
}

impl Table {
    /// Creates an empty table with the given column definitions.
    pub fn new(definitions: Vec<ColumnDef>) -> Self {
        Self {
            schema: Schema::new(definitions),
            rows: Vec::new(),
        }
    }
}
