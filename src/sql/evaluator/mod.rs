use crate::{Row, sql::parser::Fields};

pub mod predicate;

pub use predicate::build_filter;

/// Builds the projection for a field list.
///
/// The wildcard returns the whole row; a named list returns a new row with
/// only those columns, in the listed order.
pub fn build_selector(fields: &Fields) -> impl Fn(&Row) -> Row + '_ {
    move |row| match fields {
        Fields::Wildcard => row.clone(),
        Fields::Named(names) => names
            .iter()
            .filter_map(|name| row.get(name).map(|value| (name.as_str(), value.clone())))
            .collect(),
    }
}

/// Projects `rows` through `fields`. An empty field list yields no rows.
pub fn project<'r>(rows: impl IntoIterator<Item = &'r Row>, fields: &Fields) -> Vec<Row> {
    if fields.is_empty() {
        return Vec::new();
    }

    let selector = build_selector(fields);
    rows.into_iter().map(selector).collect()
}
