use crate::{
    Row, Value,
    sql::parser::{Condition, Conditions, Operator},
};

/// Builds the row filter for a WHERE clause.
///
/// A row matches when every condition of at least one group holds. With no
/// conditions, every row matches.
pub fn build_filter(conditions: &Conditions) -> impl Fn(&Row) -> bool + '_ {
    move |row| {
        conditions.is_empty()
            || conditions
                .iter()
                .any(|group| group.iter().all(|condition| evaluate_condition(condition, row)))
    }
}

/// Evaluates one condition against a row.
///
/// `=` and `!=` compare raw values strictly. Ordering operators compare
/// numerically and are false whenever either side is not a number.
pub fn evaluate_condition(condition: &Condition, row: &Row) -> bool {
    let stored = row.get(&condition.field).unwrap_or(&Value::Null);

    match condition.operator {
        Operator::Equal => *stored == condition.value,
        Operator::NotEqual => *stored != condition.value,
        op => match (stored.as_number(), condition.value.as_number()) {
            (Some(left), Some(right)) => match op {
                Operator::LessThan => left < right,
                Operator::LessThanEqual => left <= right,
                Operator::GreaterThan => left > right,
                Operator::GreaterThanEqual => left >= right,
                _ => false,
            },
            _ => false,
        },
    }
}
