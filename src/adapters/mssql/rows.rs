//! Row conversion
//!
//! Every row becomes a column-name to JSON mapping. Binary values are
//! base64-encoded; decimals and GUIDs keep their textual form so no
//! precision is lost.

use base64::{engine::general_purpose::STANDARD as BASE64, Engine as _};
use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, NaiveTime};
use serde_json::{Map, Value};
use tiberius::{ColumnData, FromSql, Row};

/// Convert one row into a JSON object keyed by column name
pub fn row_to_map(row: Row) -> Map<String, Value> {
    let names: Vec<String> = row
        .columns()
        .iter()
        .map(|column| column.name().to_string())
        .collect();
    names
        .into_iter()
        .zip(row.into_iter().map(|data| column_value(&data)))
        .collect()
}

/// JSON value of a single column; SQL NULL becomes `null`
pub fn column_value(data: &ColumnData<'static>) -> Value {
    match data {
        ColumnData::U8(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I16(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I32(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::I64(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::F32(v) => v.map(|f| Value::from(f64::from(f))).unwrap_or(Value::Null),
        ColumnData::F64(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::Bit(v) => v.map(Value::from).unwrap_or(Value::Null),
        ColumnData::String(v) => v
            .as_ref()
            .map(|s| Value::from(s.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Guid(v) => v
            .as_ref()
            .map(|g| Value::from(g.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Binary(v) => v
            .as_ref()
            .map(|bytes| Value::from(BASE64.encode(bytes)))
            .unwrap_or(Value::Null),
        ColumnData::Numeric(v) => v
            .as_ref()
            .map(|n| Value::from(n.to_string()))
            .unwrap_or(Value::Null),
        ColumnData::Xml(v) => v
            .as_ref()
            .map(|xml| Value::from(xml.clone().into_owned().into_string()))
            .unwrap_or(Value::Null),
        ColumnData::Date(_) => temporal::<NaiveDate>(data, |d| d.format("%Y-%m-%d").to_string()),
        ColumnData::Time(_) => temporal::<NaiveTime>(data, |t| t.format("%H:%M:%S%.f").to_string()),
        ColumnData::DateTimeOffset(_) => {
            temporal::<DateTime<FixedOffset>>(data, |dt| dt.to_rfc3339())
        }
        ColumnData::DateTime(_) | ColumnData::SmallDateTime(_) | ColumnData::DateTime2(_) => {
            temporal::<NaiveDateTime>(data, |dt| dt.format("%Y-%m-%dT%H:%M:%S%.f").to_string())
        }
    }
}

fn temporal<'a, T>(data: &'a ColumnData<'static>, render: impl Fn(T) -> String) -> Value
where
    T: FromSql<'a>,
{
    match T::from_sql(data) {
        Ok(Some(value)) => Value::from(render(value)),
        Ok(None) => Value::Null,
        Err(e) => {
            tracing::debug!(error = %e, "Unconvertible temporal column");
            Value::Null
        }
    }
}

/// The student contact projection
///
/// `first_name` comes from `Name_First`; absent or NULL gives `""`.
pub fn student_projection(row: &Map<String, Value>) -> Value {
    let first_name = match row.get("Name_First") {
        Some(Value::String(s)) => s.clone(),
        Some(Value::Null) | None => String::new(),
        Some(other) => other.to_string(),
    };
    serde_json::json!({ "first_name": first_name })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::borrow::Cow;
    use tiberius::numeric::Numeric;
    use tiberius::IntoSql;

    #[test]
    fn test_scalar_columns() {
        assert_eq!(column_value(&ColumnData::U8(Some(7))), json!(7));
        assert_eq!(column_value(&ColumnData::I32(Some(-3))), json!(-3));
        assert_eq!(column_value(&ColumnData::I64(Some(1 << 40))), json!(1_i64 << 40));
        assert_eq!(column_value(&ColumnData::F64(Some(1.5))), json!(1.5));
        assert_eq!(column_value(&ColumnData::Bit(Some(true))), json!(true));
        assert_eq!(
            column_value(&ColumnData::String(Some(Cow::Owned("Ng".to_string())))),
            json!("Ng")
        );
    }

    #[test]
    fn test_nulls() {
        assert_eq!(column_value(&ColumnData::I32(None)), Value::Null);
        assert_eq!(column_value(&ColumnData::String(None)), Value::Null);
        assert_eq!(column_value(&ColumnData::DateTime2(None)), Value::Null);
    }

    #[test]
    fn test_binary_and_numeric() {
        assert_eq!(
            column_value(&ColumnData::Binary(Some(Cow::Owned(vec![1, 2, 3])))),
            json!("AQID")
        );
        assert_eq!(
            column_value(&ColumnData::Numeric(Some(Numeric::new_with_scale(12345, 2)))),
            json!("123.45")
        );
    }

    #[test]
    fn test_datetime2() {
        let dt = NaiveDate::from_ymd_opt(2024, 2, 29)
            .unwrap()
            .and_hms_opt(8, 30, 0)
            .unwrap();
        let data: ColumnData<'static> = dt.into_sql();
        assert_eq!(column_value(&data), json!("2024-02-29T08:30:00"));
    }

    #[test]
    fn test_student_projection() {
        let mut row = Map::new();
        row.insert("Name_First".to_string(), json!("Ari"));
        row.insert("Name_Last".to_string(), json!("Ng"));
        assert_eq!(student_projection(&row), json!({"first_name": "Ari"}));

        assert_eq!(student_projection(&Map::new()), json!({"first_name": ""}));

        let mut null_row = Map::new();
        null_row.insert("Name_First".to_string(), Value::Null);
        assert_eq!(student_projection(&null_row), json!({"first_name": ""}));
    }
}
