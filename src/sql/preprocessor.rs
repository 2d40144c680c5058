//! Splits raw input into individual statements.
//!
//! `--` line comments are dropped, runs of whitespace (including line
//! breaks) collapse to a single space and empty statements are discarded.
//! String literals are copied verbatim, so a `;` or `--` inside quotes does
//! not split or truncate a statement.

/// Splits `input` on `;` into trimmed, non-empty statements.
pub fn split_statements(input: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut pending_space = false;
    let mut quote: Option<char> = None;

    let mut chars = input.chars().peekable();
    while let Some(ch) = chars.next() {
        if let Some(open) = quote {
            current.push(ch);
            if ch == open {
                quote = None;
            }
            continue;
        }

        match ch {
            '-' if chars.peek() == Some(&'-') => {
                // Comment runs to the end of the line; the line break itself
                // still separates tokens.
                for skipped in chars.by_ref() {
                    if skipped == '\n' {
                        break;
                    }
                }
                pending_space = true;
            }
            ';' => {
                finish_statement(&mut statements, &mut current);
                pending_space = false;
            }
            _ if ch.is_whitespace() => pending_space = true,
            _ => {
                if pending_space && !current.is_empty() {
                    current.push(' ');
                }
                pending_space = false;

                if ch == '\'' || ch == '"' {
                    quote = Some(ch);
                }
                current.push(ch);
            }
        }
    }

    finish_statement(&mut statements, &mut current);

    statements
}

fn finish_statement(statements: &mut Vec<String>, current: &mut String) {
    let statement = current.trim();
    if !statement.is_empty() {
        statements.push(statement.to_owned());
    }
    current.clear();
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_split_multiple_statements() {
        let statements = split_statements(
            "CREATE TABLE users (id NUMERIC, name TEXT); INSERT INTO users VALUES (1,'John');",
        );

        assert_eq!(
            statements,
            vec![
                "CREATE TABLE users (id NUMERIC, name TEXT)",
                "INSERT INTO users VALUES (1,'John')",
            ]
        );
    }

    #[test]
    fn test_collapse_line_breaks_and_comments() {
        let statements = split_statements(
            "-- create the table\nSELECT id,\n       name\n  FROM users -- everyone\n  WHERE id = 1;\n",
        );

        assert_eq!(statements, vec!["SELECT id, name FROM users WHERE id = 1"]);
    }

    #[test]
    fn test_discard_empty_statements() {
        assert_eq!(split_statements(";;  ; \n"), Vec::<String>::new());
        assert_eq!(split_statements(""), Vec::<String>::new());
        assert_eq!(split_statements("DROP TABLE t"), vec!["DROP TABLE t"]);
    }

    #[test]
    fn test_strings_are_verbatim() {
        let statements = split_statements("INSERT INTO t VALUES ('a;  b -- c'); SELECT * FROM t");

        assert_eq!(
            statements,
            vec!["INSERT INTO t VALUES ('a;  b -- c')", "SELECT * FROM t"]
        );
    }
}
