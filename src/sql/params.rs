use crate::{Value, common::error::SyntaxError};

/// Replaces `$1`, `$2`, ... with `params` written as literals.
///
/// Placeholders are 1-based. Quoted text is left untouched, and a `$` not
/// followed by digits is copied as-is for the lexer to reject.
pub fn bind_parameters(sql: &str, params: &[Value]) -> Result<String, SyntaxError> {
    let mut bound = String::with_capacity(sql.len());
    let mut quote: Option<char> = None;

    let mut chars = sql.char_indices().peekable();
    while let Some((start, ch)) = chars.next() {
        if let Some(open) = quote {
            if ch == open {
                quote = None;
            }
            bound.push(ch);
            continue;
        }

        match ch {
            '\'' | '"' => {
                quote = Some(ch);
                bound.push(ch);
            }
            '$' if chars.peek().is_some_and(|(_, c)| c.is_ascii_digit()) => {
                let mut end = start + 1;
                while let Some((idx, c)) = chars.peek().copied() {
                    if !c.is_ascii_digit() {
                        break;
                    }
                    end = idx + c.len_utf8();
                    chars.next();
                }

                let digits = &sql[start + 1..end];
                let index = digits.parse::<usize>().unwrap_or(0);
                let value = index
                    .checked_sub(1)
                    .and_then(|i| params.get(i))
                    .ok_or(SyntaxError::MissingParameter { index })?;

                bound.push_str(&to_literal(index, value)?);
            }
            _ => bound.push(ch),
        }
    }

    Ok(bound)
}

/// Writes `value` so that the lexer reads back exactly the same value.
///
/// Numbers use `f64`'s `Display`, which never switches to exponent
/// notation. Text is quoted with whichever quote character it does not
/// contain, since string literals have no escapes.
fn to_literal(index: usize, value: &Value) -> Result<String, SyntaxError> {
    match value {
        Value::Number(n) if !n.is_finite() => Err(SyntaxError::UnbindableParameter {
            index,
            reason: "the number is not finite",
        }),
        Value::Number(n) => Ok(n.to_string()),
        Value::Text(text) => match ['"', '\''].into_iter().find(|q| !text.contains(*q)) {
            Some(quote) => Ok(format!("{quote}{text}{quote}")),
            None => Err(SyntaxError::UnbindableParameter {
                index,
                reason: "the text contains both quote characters",
            }),
        },
        Value::Boolean(b) => Ok(b.to_string()),
        Value::Null => Ok("null".to_owned()),
    }
}
