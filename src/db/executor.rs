//! Applies validated statements to an in-memory table.
//!
//! Every function here assumes the statement already passed the
//! [`Validator`](crate::sql::validator::Validator) for this table.

use crate::{
    Row, Value,
    db::table::Table,
    sql::{
        DeleteStatement, Fields, InsertStatement, SelectStatement, UpdateStatement,
        evaluator::{build_filter, build_selector, project},
    },
};

/// Outcome of a mutating statement.
#[derive(Debug, Default)]
pub struct Mutation {
    /// The RETURNING projection of the affected rows.
    pub returned: Vec<Row>,

    /// How many rows were inserted, updated or deleted.
    pub affected: usize,
}

pub fn select(table: &Table, select: &SelectStatement) -> Vec<Row> {
    let filter = build_filter(&select.conditions);
    let selector = build_selector(&select.fields);

    table
        .rows
        .iter()
        .filter(|row| filter(row))
        .map(selector)
        .collect()
}

/// Appends one row per value tuple. Columns missing from an explicit column
/// list are stored as NULL.
pub fn insert(table: &mut Table, insert: &InsertStatement) -> Mutation {
    let columns: Vec<&str> = match &insert.fields {
        Fields::Wildcard => table.schema.column_names().collect(),
        Fields::Named(names) => names.iter().map(String::as_str).collect(),
    };

    let inserted: Vec<Row> = insert
        .values
        .iter()
        .map(|tuple| {
            let mut row: Row = table
                .schema
                .column_names()
                .map(|name| (name, Value::Null))
                .collect();

            for (column, value) in columns.iter().zip(tuple) {
                row.set(column, value.clone());
            }

            row
        })
        .collect();

    let returned = project(&inserted, &insert.returning);
    let affected = inserted.len();

    table.rows.extend(inserted);

    Mutation { returned, affected }
}

/// Applies every assignment to each matching row, in place.
pub fn update(table: &mut Table, update: &UpdateStatement) -> Mutation {
    let filter = build_filter(&update.conditions);
    let selector = build_selector(&update.returning);

    let mut mutation = Mutation::default();
    for row in table.rows.iter_mut() {
        if !filter(row) {
            continue;
        }

        for assignment in &update.assignments {
            row.set(&assignment.field, assignment.value.clone());
        }

        mutation.affected += 1;
        if !update.returning.is_empty() {
            mutation.returned.push(selector(row));
        }
    }

    mutation
}

/// Removes every matching row, returning them as they were before removal.
pub fn delete(table: &mut Table, delete: &DeleteStatement) -> Mutation {
    let filter = build_filter(&delete.conditions);

    let (removed, kept): (Vec<Row>, Vec<Row>) = std::mem::take(&mut table.rows)
        .into_iter()
        .partition(|row| filter(row));
    table.rows = kept;

    Mutation {
        returned: project(&removed, &delete.returning),
        affected: removed.len(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        ColumnDef, DataType,
        sql::{Condition, Operator, Statement, parse_statement},
    };

    fn users() -> Table {
        let mut table = Table::new(vec![
            ColumnDef::new("id", DataType::Numeric),
            ColumnDef::new("name", DataType::Text),
        ]);

        for (id, name) in [(1, "John"), (2, "Jane"), (3, "Joan")] {
            table.rows.push(
                [("id", Value::from(id)), ("name", Value::from(name))]
                    .into_iter()
                    .collect(),
            );
        }

        table
    }

    fn row(id: i64, name: &str) -> Row {
        [("id", Value::from(id)), ("name", Value::from(name))]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_select() {
        let table = users();
        let Statement::Select(statement) =
            parse_statement("SELECT name FROM users WHERE id != 1").unwrap()
        else {
            panic!("Expected SELECT statement");
        };

        let rows = select(&table, &statement);
        let expected: Vec<Row> = vec![
            [("name", Value::from("Jane"))].into_iter().collect(),
            [("name", Value::from("Joan"))].into_iter().collect(),
        ];
        assert_eq!(rows, expected);
    }

    #[test]
    fn test_insert_partial_columns() {
        let mut table = users();
        let Statement::Insert(statement) =
            parse_statement("INSERT INTO users (name) VALUES ('Ann'), ('Bo') RETURNING *").unwrap()
        else {
            panic!("Expected INSERT statement");
        };

        let mutation = insert(&mut table, &statement);

        assert_eq!(mutation.affected, 2);
        assert_eq!(table.rows.len(), 5);

        let expected: Row = [("id", Value::Null), ("name", Value::from("Ann"))]
            .into_iter()
            .collect();
        assert_eq!(mutation.returned[0], expected);
        assert_eq!(table.rows[3], expected);
    }

    #[test]
    fn test_insert_without_returning() {
        let mut table = users();
        let statement = InsertStatement {
            table: "users".into(),
            fields: Fields::Wildcard,
            values: vec![vec![Value::from(4), Value::from("Jo")]],
            returning: Fields::default(),
        };

        let mutation = insert(&mut table, &statement);

        assert!(mutation.returned.is_empty());
        assert_eq!(table.rows[3], row(4, "Jo"));
    }

    #[test]
    fn test_update_returns_rows_after_mutation() {
        let mut table = users();
        let statement = UpdateStatement {
            table: "users".into(),
            assignments: vec![crate::sql::Assignment {
                field: "name".into(),
                value: Value::from("Jan"),
            }],
            conditions: vec![vec![Condition::new("id", Operator::Equal, 2.0)]],
            returning: Fields::Wildcard,
        };

        let mutation = update(&mut table, &statement);

        assert_eq!(mutation.affected, 1);
        assert_eq!(mutation.returned, vec![row(2, "Jan")]);
        assert_eq!(table.rows[1], row(2, "Jan"));
    }

    #[test]
    fn test_delete_returns_rows_before_removal() {
        let mut table = users();
        let statement = DeleteStatement {
            table: "users".into(),
            conditions: vec![vec![Condition::new("id", Operator::GreaterThan, 1.0)]],
            returning: Fields::Named(vec!["name".into()]),
        };

        let mutation = delete(&mut table, &statement);

        assert_eq!(mutation.affected, 2);
        assert_eq!(mutation.returned.len(), 2);
        assert_eq!(table.rows, vec![row(1, "John")]);
    }

    #[test]
    fn test_delete_no_match() {
        let mut table = users();
        let statement = DeleteStatement {
            table: "users".into(),
            conditions: vec![vec![Condition::new("id", Operator::Equal, 99.0)]],
            returning: Fields::default(),
        };

        let mutation = delete(&mut table, &statement);

        assert_eq!(mutation.affected, 0);
        assert_eq!(table.rows.len(), 3);
    }
}
