mod catalog;
mod chat;
mod check_ins;
mod journal;
mod purge;
mod users;

use std::str::FromStr;

use rusqlite::Row;
use rusqlite::types::Type;

/// Read a TEXT column holding one of the string enumerations from intus-types.
fn enum_column<T>(row: &Row<'_>, idx: usize) -> rusqlite::Result<T>
where
    T: FromStr,
    T::Err: std::error::Error + Send + Sync + 'static,
{
    let raw: String = row.get(idx)?;
    raw.parse()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Read a TEXT column holding a JSON array of strings (tags, steps, flags).
fn string_list_column(row: &Row<'_>, idx: usize) -> rusqlite::Result<Vec<String>> {
    let raw: String = row.get(idx)?;
    serde_json::from_str(&raw)
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

/// Escape `%`, `_` and the escape character itself for a `LIKE ... ESCAPE '\'`
/// pattern, then wrap it for substring matching.
fn like_pattern(needle: &str) -> String {
    let mut escaped = String::with_capacity(needle.len() + 2);
    escaped.push('%');
    for ch in needle.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped.push('%');
    escaped
}

/// SQLite treats a negative LIMIT as "no limit".
fn sql_limit(limit: Option<u32>) -> i64 {
    limit.map(i64::from).unwrap_or(-1)
}
