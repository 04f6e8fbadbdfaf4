use chrono::{NaiveDate, NaiveDateTime};
use serde_json::Value;
use sqlx::MySqlPool;

use crate::error::ApiError;

/// ===============================
/// SQL bindable value enum
/// ===============================
#[derive(Debug)]
pub enum SqlValue {
    String(String),
    I64(i64),
    F64(f64),
    Bool(bool),
    Date(NaiveDate),
    DateTime(NaiveDateTime),
    Null,
}

/// ===============================
/// SQL update container
/// ===============================
#[derive(Debug)]
pub struct SqlUpdate {
    pub sql: String,
    pub values: Vec<SqlValue>,
}

fn is_safe_identifier(name: &str) -> bool {
    !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_')
}

/// ===============================
/// Build dynamic UPDATE SQL
/// ===============================
/// Patch keys become SET columns; keys must be plain snake_case
/// identifiers. `tenant` appends the company scope to the WHERE clause.
pub fn build_update_sql(
    table: &str,
    payload: &Value,
    id_value: u64,
    tenant: Option<u64>,
) -> Result<SqlUpdate, ApiError> {
    let obj = payload
        .as_object()
        .ok_or_else(|| ApiError::invalid("Payload must be a JSON object"))?;

    if obj.is_empty() {
        return Err(ApiError::invalid("No fields provided for update"));
    }

    for key in obj.keys() {
        if !is_safe_identifier(key) {
            return Err(ApiError::invalid(format!("Invalid column name: {:?}", key)));
        }
    }

    // Build SET clause
    let set_clause = obj
        .keys()
        .map(|k| format!("{} = ?", k))
        .collect::<Vec<_>>()
        .join(", ");

    let mut sql = format!("UPDATE {} SET {} WHERE id = ?", table, set_clause);
    if tenant.is_some() {
        sql.push_str(" AND company_id = ?");
    }

    let mut values = Vec::with_capacity(obj.len() + 2);

    // Convert JSON values → SqlValue
    for value in obj.values() {
        match value {
            Value::String(s) => {
                if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
                    values.push(SqlValue::Date(d));
                } else if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S") {
                    values.push(SqlValue::DateTime(dt));
                } else {
                    values.push(SqlValue::String(s.clone()));
                }
            }
            Value::Number(n) => {
                if let Some(i) = n.as_i64() {
                    values.push(SqlValue::I64(i));
                } else if let Some(f) = n.as_f64() {
                    values.push(SqlValue::F64(f));
                }
            }
            Value::Bool(b) => values.push(SqlValue::Bool(*b)),
            Value::Null => values.push(SqlValue::Null),
            _ => return Err(ApiError::invalid("Unsupported JSON value type")),
        }
    }

    values.push(SqlValue::I64(id_value as i64));
    if let Some(company_id) = tenant {
        values.push(SqlValue::I64(company_id as i64));
    }

    Ok(SqlUpdate { sql, values })
}

/// ===============================
/// Execute the update
/// ===============================
pub async fn execute_update(pool: &MySqlPool, update: SqlUpdate) -> Result<u64, sqlx::Error> {
    let mut query = sqlx::query(&update.sql);

    for value in update.values {
        query = match value {
            SqlValue::String(v) => query.bind(v),
            SqlValue::I64(v) => query.bind(v),
            SqlValue::F64(v) => query.bind(v),
            SqlValue::Bool(v) => query.bind(v),
            SqlValue::Date(v) => query.bind(v),
            SqlValue::DateTime(v) => query.bind(v),
            SqlValue::Null => query.bind(None::<String>),
        };
    }

    let result = query.execute(pool).await?;
    Ok(result.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn builds_tenant_scoped_update() {
        let update = build_update_sql(
            "employees",
            &json!({"first_name": "Jane", "base_salary": 60000.0}),
            7,
            Some(1),
        )
        .unwrap();
        assert_eq!(
            update.sql,
            "UPDATE employees SET base_salary = ?, first_name = ? WHERE id = ? AND company_id = ?"
        );
        assert_eq!(update.values.len(), 4);
    }

    #[test]
    fn rejects_bad_column_names() {
        let err = build_update_sql("employees", &json!({"first_name; DROP": "x"}), 7, Some(1));
        assert!(err.is_err());
        let err = build_update_sql("employees", &json!({}), 7, Some(1));
        assert!(err.is_err());
    }

    #[test]
    fn date_strings_become_dates() {
        let update =
            build_update_sql("employees", &json!({"hire_date": "2025-01-01"}), 7, None).unwrap();
        assert_eq!(
            update.sql,
            "UPDATE employees SET hire_date = ? WHERE id = ?"
        );
        assert!(matches!(update.values[0], SqlValue::Date(_)));
    }
}
