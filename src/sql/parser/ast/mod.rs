pub(crate) mod condition;
pub(crate) mod statement;
pub(crate) mod target;

pub use condition::{Assignment, Condition, Conditions};
pub use statement::{
    CreateStatement, DeleteStatement, DropStatement, InsertStatement, SelectStatement, Statement,
    UpdateStatement,
};
pub use target::Fields;
