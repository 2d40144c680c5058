use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{EngineError, db::table::Table};

/// The unit exchanged with a storage backend: every table by name.
///
/// Persisted as a JSON object keyed by table name:
///
/// ```json
/// { "users": { "schema": [{ "field": "id", "type": "NUMERIC" }], "rows": [{ "id": 1 }] } }
/// ```
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Document {
    pub tables: BTreeMap<String, Table>,
}

impl Document {
    pub fn contains(&self, table: &str) -> bool {
        self.tables.contains_key(table)
    }

    pub fn get_table(&self, name: &str) -> Result<&Table, EngineError> {
        self.tables
            .get(name)
            .ok_or_else(|| EngineError::TableNotFound {
                table: name.to_owned(),
            })
    }

    pub fn get_table_mut(&mut self, name: &str) -> Result<&mut Table, EngineError> {
        self.tables
            .get_mut(name)
            .ok_or_else(|| EngineError::TableNotFound {
                table: name.to_owned(),
            })
    }
}
