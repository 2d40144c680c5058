pub mod database;
pub mod document;
pub(crate) mod executor;
pub(crate) mod guard;
pub mod table;
