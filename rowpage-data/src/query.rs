//! Helpers for composing SQL text and log lines.

use crate::error::DataError;
use crate::named::{NamedParams, NamedValue};
use crate::value::SqlValue;

fn join_parts<S: AsRef<str>>(queries: &[S], select: &str) -> Result<String, DataError> {
    let (first, rest) = queries
        .split_first()
        .ok_or_else(|| DataError::contract("at least one query is required to build a join"))?;
    let mut sql = format!("SELECT {select} FROM (({}) t_0", first.as_ref());
    for (i, query) in rest.iter().enumerate() {
        let idx = i + 1;
        sql.push_str(&format!(
            " INNER JOIN ({}) t_{idx} ON t_{}.id = t_{idx}.id",
            query.as_ref(),
            idx - 1
        ));
    }
    sql.push(')');
    Ok(sql)
}

/// Intersect several queries on their `id` column.
///
/// A single query is returned unchanged. Each query must select an `id`.
pub fn inner_join_query<S: AsRef<str>>(queries: &[S]) -> Result<String, DataError> {
    match queries {
        [] => Err(DataError::contract("at least one query is required to build a join")),
        [single] => Ok(single.as_ref().to_string()),
        _ => join_parts(queries, "t_0.*"),
    }
}

/// Count the rows of [`inner_join_query`].
pub fn inner_join_count_query<S: AsRef<str>>(queries: &[S]) -> Result<String, DataError> {
    match queries {
        [] => Err(DataError::contract("at least one query is required to build a join")),
        [single] => Ok(format!("SELECT COUNT(*) FROM ({}) t_0", single.as_ref())),
        _ => join_parts(queries, "COUNT(t_0.*)"),
    }
}

/// `PARAMETER: a b c`, for debug logs.
pub fn params_log_string(params: &[SqlValue]) -> String {
    let mut out = String::from("PARAMETER:");
    for param in params {
        out.push(' ');
        out.push_str(&param.to_string());
    }
    out
}

/// `PARAMETER: name=a ids=[1, 2]`, for debug logs of named queries.
pub fn named_params_log_string(params: &NamedParams) -> String {
    let mut out = String::from("PARAMETER:");
    for (name, value) in params.iter() {
        out.push(' ');
        match value {
            NamedValue::Single(v) => out.push_str(&format!("{name}={v}")),
            NamedValue::List(list) => {
                let items: Vec<_> = list.iter().map(ToString::to_string).collect();
                out.push_str(&format!("{name}=[{}]", items.join(", ")));
            }
        }
    }
    out
}
