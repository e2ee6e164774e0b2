//! `:name` placeholder expansion.
//!
//! Drivers only understand positional parameters, so named queries are
//! rewritten before execution. A list value expands to one positional
//! placeholder per element, which is how `col IN (:ids)` queries are bound.

use crate::error::DataError;
use crate::value::SqlValue;

/// Positional placeholder syntax of the target driver.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaceholderStyle {
    /// `?` (SQLite, MySQL, MariaDB).
    Question,
    /// `$1, $2, ...` (PostgreSQL).
    Dollar,
}

impl PlaceholderStyle {
    pub fn placeholder(self, index: usize) -> String {
        match self {
            PlaceholderStyle::Dollar => format!("${index}"),
            PlaceholderStyle::Question => "?".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NamedValue {
    Single(SqlValue),
    List(Vec<SqlValue>),
}

/// Named query parameters, in insertion order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedParams {
    entries: Vec<(String, NamedValue)>,
}

impl NamedParams {
    pub fn new() -> Self {
        Self::default()
    }

    /// Bind a single value. Rebinding a name replaces its value.
    pub fn bind(self, name: impl Into<String>, value: impl Into<SqlValue>) -> Self {
        self.insert(name.into(), NamedValue::Single(value.into()))
    }

    /// Bind a list of values, for `IN (:name)`.
    pub fn bind_list<V: Into<SqlValue>>(
        self,
        name: impl Into<String>,
        values: impl IntoIterator<Item = V>,
    ) -> Self {
        let values = values.into_iter().map(Into::into).collect();
        self.insert(name.into(), NamedValue::List(values))
    }

    fn insert(mut self, name: String, value: NamedValue) -> Self {
        match self.entries.iter_mut().find(|(n, _)| *n == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name, value)),
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<&NamedValue> {
        self.entries.iter().find(|(n, _)| n == name).map(|(_, v)| v)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &NamedValue)> {
        self.entries.iter().map(|(n, v)| (n.as_str(), v))
    }
}

enum Token<'a> {
    Text(&'a str),
    Param(&'a str),
}

fn is_ident_start(b: u8) -> bool {
    b.is_ascii_alphabetic() || b == b'_'
}

fn is_ident_char(b: u8) -> bool {
    b.is_ascii_alphanumeric() || b == b'_'
}

/// Split SQL into literal text and `:name` placeholders, skipping quoted
/// strings, quoted identifiers, comments and `::` casts.
///
/// An unterminated quote or block comment is a contract error.
fn tokenize(sql: &str) -> Result<Vec<Token<'_>>, DataError> {
    let bytes = sql.as_bytes();
    let mut tokens = Vec::new();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        match bytes[i] {
            quote @ (b'\'' | b'"' | b'`') => {
                let open = i;
                i += 1;
                while i < bytes.len() && bytes[i] != quote {
                    i += 1;
                }
                if i == bytes.len() {
                    return Err(DataError::contract(format!(
                        "unterminated {} quote at byte {open}",
                        quote as char
                    )));
                }
                i += 1;
            }
            b'-' if bytes.get(i + 1) == Some(&b'-') => {
                while i < bytes.len() && bytes[i] != b'\n' {
                    i += 1;
                }
            }
            b'/' if bytes.get(i + 1) == Some(&b'*') => {
                let open = i;
                match sql[i + 2..].find("*/") {
                    Some(close) => i += 2 + close + 2,
                    None => {
                        return Err(DataError::contract(format!(
                            "unterminated block comment at byte {open}"
                        )))
                    }
                }
            }
            b':' if bytes.get(i + 1) == Some(&b':') => {
                i += 2;
            }
            b':' if bytes.get(i + 1).is_some_and(|b| is_ident_start(*b)) => {
                if start < i {
                    tokens.push(Token::Text(&sql[start..i]));
                }
                let name_start = i + 1;
                let mut end = name_start;
                while end < bytes.len() && is_ident_char(bytes[end]) {
                    end += 1;
                }
                tokens.push(Token::Param(&sql[name_start..end]));
                i = end;
                start = end;
            }
            _ => i += 1,
        }
    }
    if start < sql.len() {
        tokens.push(Token::Text(&sql[start..]));
    }
    Ok(tokens)
}

/// Number of times `:name` appears in `sql`.
pub fn count_placeholder(sql: &str, name: &str) -> Result<usize, DataError> {
    Ok(tokenize(sql)?
        .iter()
        .filter(|t| matches!(t, Token::Param(p) if *p == name))
        .count())
}

/// Rewrite `:name` placeholders into positional ones and collect the values
/// in bind order.
pub fn expand_named(
    sql: &str,
    params: &NamedParams,
    style: PlaceholderStyle,
) -> Result<(String, Vec<SqlValue>), DataError> {
    let mut out = String::with_capacity(sql.len());
    let mut values = Vec::new();
    for token in tokenize(sql)? {
        match token {
            Token::Text(text) => out.push_str(text),
            Token::Param(name) => match params.get(name) {
                Some(NamedValue::Single(value)) => {
                    values.push(value.clone());
                    out.push_str(&style.placeholder(values.len()));
                }
                Some(NamedValue::List(list)) if list.is_empty() => {
                    return Err(DataError::contract(format!(
                        "parameter `{name}` is bound to an empty list"
                    )));
                }
                Some(NamedValue::List(list)) => {
                    let placeholders: Vec<_> = list
                        .iter()
                        .map(|value| {
                            values.push(value.clone());
                            style.placeholder(values.len())
                        })
                        .collect();
                    out.push_str(&placeholders.join(", "));
                }
                None => {
                    return Err(DataError::contract(format!(
                        "no value bound for parameter `{name}`"
                    )));
                }
            },
        }
    }
    Ok((out, values))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn expands_single_and_list() {
        let params = NamedParams::new()
            .bind("status", "active")
            .bind_list("ids", [1i64, 2, 3]);
        let (sql, values) = expand_named(
            "SELECT * FROM users WHERE status = :status AND id IN (:ids)",
            &params,
            PlaceholderStyle::Dollar,
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT * FROM users WHERE status = $1 AND id IN ($2, $3, $4)"
        );
        assert_eq!(
            values,
            vec![
                SqlValue::Text("active".into()),
                SqlValue::Int(1),
                SqlValue::Int(2),
                SqlValue::Int(3)
            ]
        );
    }

    #[test]
    fn question_marks() {
        let params = NamedParams::new().bind_list("names", ["a", "b"]);
        let (sql, values) = expand_named(
            "SELECT * FROM t WHERE name IN (:names)",
            &params,
            PlaceholderStyle::Question,
        )
        .unwrap();
        assert_eq!(sql, "SELECT * FROM t WHERE name IN (?, ?)");
        assert_eq!(values.len(), 2);
    }

    #[test]
    fn skips_literals_and_casts() {
        let params = NamedParams::new().bind("id", 5i64);
        let (sql, values) = expand_named(
            "SELECT ':nope', \"a:b\", created::date FROM t WHERE id = :id",
            &params,
            PlaceholderStyle::Question,
        )
        .unwrap();
        assert_eq!(
            sql,
            "SELECT ':nope', \"a:b\", created::date FROM t WHERE id = ?"
        );
        assert_eq!(values, vec![SqlValue::Int(5)]);
    }

    #[test]
    fn repeated_name_binds_twice() {
        let params = NamedParams::new().bind("x", 1i64);
        let (sql, values) =
            expand_named("SELECT :x + :x", &params, PlaceholderStyle::Dollar).unwrap();
        assert_eq!(sql, "SELECT $1 + $2");
        assert_eq!(values.len(), 2);
        assert_eq!(count_placeholder("SELECT :x + :x, :xy", "x").unwrap(), 2);
    }

    #[test]
    fn missing_and_empty_values_are_contract_errors() {
        let err = expand_named("SELECT :a", &NamedParams::new(), PlaceholderStyle::Question)
            .unwrap_err();
        assert!(matches!(err, DataError::Contract(_)));

        let params = NamedParams::new().bind_list("ids", Vec::<i64>::new());
        let err = expand_named("SELECT * FROM t WHERE id IN (:ids)", &params, PlaceholderStyle::Question)
            .unwrap_err();
        assert!(matches!(err, DataError::Contract(_)));
    }

    #[test]
    fn rebinding_replaces() {
        let params = NamedParams::new().bind("a", 1i64).bind("a", 2i64);
        assert_eq!(params.get("a"), Some(&NamedValue::Single(SqlValue::Int(2))));
        assert_eq!(params.iter().count(), 1);
    }

    #[test]
    fn skips_comments() {
        let sql = "SELECT * FROM users -- user's ids, not :ignored\n\
                   WHERE /* it's :skipped too */ id IN (:ids)";
        assert_eq!(count_placeholder(sql, "ids").unwrap(), 1);
        assert_eq!(count_placeholder(sql, "ignored").unwrap(), 0);
        assert_eq!(count_placeholder(sql, "skipped").unwrap(), 0);

        let params = NamedParams::new().bind_list("ids", [1i64, 2]);
        let (expanded, values) = expand_named(sql, &params, PlaceholderStyle::Dollar).unwrap();
        assert!(expanded.ends_with("WHERE /* it's :skipped too */ id IN ($1, $2)"));
        assert!(expanded.contains("-- user's ids, not :ignored\n"));
        assert_eq!(values, vec![SqlValue::Int(1), SqlValue::Int(2)]);
    }

    #[test]
    fn minus_and_division_are_not_comments() {
        let params = NamedParams::new().bind("a", 4i64).bind("b", 2i64);
        let (sql, _) =
            expand_named("SELECT :a - :b, :a / :b", &params, PlaceholderStyle::Dollar).unwrap();
        assert_eq!(sql, "SELECT $1 - $2, $3 / $4");
    }

    #[test]
    fn unterminated_quote_or_comment_is_rejected() {
        let params = NamedParams::new().bind("id", 1i64);
        for sql in [
            "SELECT * FROM t WHERE name = 'abc AND id = :id",
            "SELECT \"name FROM t WHERE id = :id",
            "SELECT * FROM t /* WHERE id = :id",
        ] {
            let err = expand_named(sql, &params, PlaceholderStyle::Question).unwrap_err();
            assert!(matches!(err, DataError::Contract(_)), "{sql}");
            assert!(count_placeholder(sql, "id").is_err(), "{sql}");
        }
    }

    #[test]
    fn doubled_quotes_stay_inside_literal() {
        let params = NamedParams::new().bind("id", 1i64);
        let (sql, values) = expand_named(
            "SELECT 'it''s :not' FROM t WHERE id = :id",
            &params,
            PlaceholderStyle::Question,
        )
        .unwrap();
        assert_eq!(sql, "SELECT 'it''s :not' FROM t WHERE id = ?");
        assert_eq!(values.len(), 1);
    }
}
