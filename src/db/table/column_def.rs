use serde::{Deserialize, Serialize};

use crate::core::types::DataType;

/// Definition of a single column in a table schema.
///
/// Persisted as `{"field": <name>, "type": <TYPE>}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnDef {
    /// The column name.
    #[serde(rename = "field")]
    pub name: String,

    /// The type every non-null value in this column has.
    #[serde(rename = "type")]
    pub data_type: DataType,
}

impl ColumnDef {
    /// Creates a new column definition.
    pub fn new(name: &str, data_type: DataType) -> Self {
        Self {
            name: name.to_owned(),
            data_type,
        }
    }
}
