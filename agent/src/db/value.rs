//! Row decoding
//!
//! Generated queries can return any column shape, so rows are decoded into
//! JSON maps keyed by column name instead of fixed structs.

use serde_json::{Map, Value};
use sqlx::postgres::{PgRow, PgValueFormat};
use sqlx::{Column, Row as _, TypeInfo, ValueRef};

/// One result row: column name to dynamically-typed value
pub type Row = Map<String, Value>;

/// Decode a PostgreSQL row into a JSON map
pub fn row_to_json(row: &PgRow) -> Result<Row, sqlx::Error> {
    let mut map = Row::new();
    for column in row.columns() {
        let value = column_value(row, column.ordinal(), column.type_info().name())?;
        map.insert(column.name().to_string(), value);
    }
    Ok(map)
}

fn column_value(row: &PgRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let value = match type_name {
        "BOOL" => row.try_get::<Option<bool>, _>(idx)?.map(Value::Bool),
        "INT2" => row.try_get::<Option<i16>, _>(idx)?.map(Value::from),
        "INT4" => row.try_get::<Option<i32>, _>(idx)?.map(Value::from),
        "INT8" => row.try_get::<Option<i64>, _>(idx)?.map(Value::from),
        "FLOAT4" => row.try_get::<Option<f32>, _>(idx)?.map(Value::from),
        "FLOAT8" => row.try_get::<Option<f64>, _>(idx)?.map(Value::from),
        "TEXT" | "VARCHAR" | "BPCHAR" | "NAME" => {
            row.try_get::<Option<String>, _>(idx)?.map(Value::String)
        }
        _ => return text_value(row, idx, type_name),
    };
    Ok(value.unwrap_or(Value::Null))
}

/// Fallback for types without a dedicated mapping (numeric, dates, uuid, ...).
///
/// Statements without bind parameters use the simple query protocol, so
/// values arrive in PostgreSQL's text form and are passed through verbatim.
fn text_value(row: &PgRow, idx: usize, type_name: &str) -> Result<Value, sqlx::Error> {
    let raw = row.try_get_raw(idx)?;
    if raw.is_null() {
        return Ok(Value::Null);
    }
    match raw.format() {
        PgValueFormat::Text => Ok(Value::String(
            raw.as_str().map_err(sqlx::Error::Decode)?.to_string(),
        )),
        PgValueFormat::Binary => Ok(Value::String(format!(
            "<{} value>",
            type_name.to_lowercase()
        ))),
    }
}
