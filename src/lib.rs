//! A small embedded SQL engine.
//!
//! Statements go through a fixed pipeline: the input is split into
//! statements, each one is lexed and parsed into a [`Statement`], validated
//! against the target table's schema, and executed against a whole-document
//! [`StorageBackend`]. Statements on the same table are ordered by a fair
//! readers–writers guard.
//!
//! ```
//! use skiff_db::{Database, Value};
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), skiff_db::DatabaseError> {
//! let db = Database::in_memory();
//! db.run("CREATE TABLE users (id NUMERIC, name TEXT)", &[]).await?;
//! db.run("INSERT INTO users VALUES (1, 'John'), (2, 'Jane')", &[]).await?;
//!
//! let rows = db.run("SELECT name FROM users WHERE id = $1", &[Value::from(2)]).await?;
//! assert_eq!(rows[0].get("name"), Some(&Value::from("Jane")));
//! # Ok(())
//! # }
//! ```

pub(crate) mod common;
pub(crate) mod config;
pub(crate) mod core;
pub(crate) mod db;
pub(crate) mod sql;
pub(crate) mod storage;

pub use crate::core::types::{DataType, Value};
pub use common::error::{
    BatchError, DatabaseError, EngineError, LexError, StorageError, SyntaxError, ValidationError,
};
pub use config::DatabaseConfig;
pub use db::{
    database::Database,
    document::Document,
    table::{Table, column_def::ColumnDef, row::Row, schema::Schema},
};
pub use sql::{
    Assignment, Condition, Conditions, CreateStatement, DeleteStatement, DropStatement, Fields,
    InsertStatement, Operator, SelectStatement, Statement, UpdateStatement, parse_statement,
    parse_statements, split_statements,
};
pub use storage::{JsonFileBackend, MemoryBackend, StorageBackend};
