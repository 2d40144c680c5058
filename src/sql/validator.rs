use std::collections::HashSet;

use crate::{
    ColumnDef, DataType, Schema, Value,
    common::error::ValidationError,
    sql::parser::{
        Conditions, Fields, InsertStatement, SelectStatement, Statement, UpdateStatement,
    },
};

/// Checks a statement against a table schema before it is executed.
///
/// Validation is pure: it never touches storage or the table guards, so a
/// statement that fails here has made no changes.
pub struct Validator<'a> {
    table: &'a str,
    schema: &'a Schema,
}

impl<'a> Validator<'a> {
    pub fn new(table: &'a str, schema: &'a Schema) -> Self {
        Self { table, schema }
    }

    pub fn validate(&self, statement: &Statement) -> Result<(), ValidationError> {
        match statement {
            Statement::Select(select) => self.validate_select(select),
            Statement::Insert(insert) => self.validate_insert(insert),
            Statement::Update(update) => self.validate_update(update),
            Statement::Delete(delete) => {
                self.validate_conditions(&delete.conditions)?;
                self.validate_fields(&delete.returning)
            }
            Statement::Create(create) => validate_definitions(&create.definitions),
            Statement::Drop(_) => Ok(()),
        }
    }

    pub fn validate_select(&self, select: &SelectStatement) -> Result<(), ValidationError> {
        self.validate_fields(&select.fields)?;
        self.validate_conditions(&select.conditions)
    }

    fn validate_insert(&self, insert: &InsertStatement) -> Result<(), ValidationError> {
        let columns = match &insert.fields {
            Fields::Wildcard => self.schema.columns.iter().collect::<Vec<_>>(),
            Fields::Named(names) => {
                ensure_unique(names.iter().map(String::as_str))?;
                names
                    .iter()
                    .map(|name| self.column(name))
                    .collect::<Result<Vec<_>, _>>()?
            }
        };

        for tuple in &insert.values {
            if tuple.len() != columns.len() {
                return Err(ValidationError::ValueCountMismatch {
                    expected: columns.len(),
                    found: tuple.len(),
                });
            }

            for (column, value) in columns.iter().zip(tuple) {
                check_value(column, value)?;
            }
        }

        self.validate_fields(&insert.returning)
    }

    fn validate_update(&self, update: &UpdateStatement) -> Result<(), ValidationError> {
        ensure_unique(update.assignments.iter().map(|a| a.field.as_str()))?;

        for assignment in &update.assignments {
            let column = self.column(&assignment.field)?;
            check_value(column, &assignment.value)?;
        }

        self.validate_conditions(&update.conditions)?;
        self.validate_fields(&update.returning)
    }

    fn validate_fields(&self, fields: &Fields) -> Result<(), ValidationError> {
        for name in fields.names() {
            self.column(name)?;
        }

        Ok(())
    }

    fn validate_conditions(&self, conditions: &Conditions) -> Result<(), ValidationError> {
        for condition in conditions.iter().flatten() {
            let column = self.column(&condition.field)?;

            if condition.operator.is_ordering() && column.data_type != DataType::Numeric {
                return Err(ValidationError::NonNumericComparison {
                    column: column.name.clone(),
                    operator: condition.operator,
                    data_type: column.data_type,
                });
            }

            check_value(column, &condition.value)?;
        }

        Ok(())
    }

    fn column(&self, name: &str) -> Result<&'a ColumnDef, ValidationError> {
        self.schema
            .get_column(name)
            .ok_or_else(|| ValidationError::ColumnNotFound {
                table: self.table.to_owned(),
                column: name.to_owned(),
            })
    }
}

/// Rejects a CREATE whose column definitions repeat a name.
pub fn validate_definitions(definitions: &[ColumnDef]) -> Result<(), ValidationError> {
    ensure_unique(definitions.iter().map(|def| def.name.as_str()))
}

fn ensure_unique<'n>(names: impl Iterator<Item = &'n str>) -> Result<(), ValidationError> {
    let mut seen = HashSet::new();
    for name in names {
        if !seen.insert(name) {
            return Err(ValidationError::DuplicateColumn {
                column: name.to_owned(),
            });
        }
    }

    Ok(())
}

fn check_value(column: &ColumnDef, value: &Value) -> Result<(), ValidationError> {
    if value.is_compatible_with(column.data_type) {
        Ok(())
    } else {
        Err(ValidationError::TypeMismatch {
            column: column.name.clone(),
            expected: column.data_type,
            found: value.type_name(),
        })
    }
}
