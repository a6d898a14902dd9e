use crate::extract::CellValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use strum::{Display, EnumString};

const OFFSET_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S%.f%:z", "%Y-%m-%dT%H:%M:%S%.f%z", "%Y-%m-%d %H:%M:%S%.f%z"];
const NAIVE_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"];

/// The declared type of a table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize, Serialize, Display, EnumString)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum ColumnType {
    Float,
    Int,
    Str,
    Bool,
    DateTime,
}

impl ColumnType {
    /// Convert `value` to this type, returning `None` when it cannot be represented.
    #[must_use]
    pub fn coerce(self, value: &CellValue) -> Option<CellValue> {
        match self {
            Self::Float => to_float(value).map(CellValue::Float),
            Self::Int => to_int(value).map(CellValue::Int),
            Self::Str => Some(match value {
                CellValue::String(_) => value.clone(),
                _ => CellValue::String(value.to_string().into()),
            }),
            Self::Bool => to_bool(value).map(CellValue::Boolean),
            Self::DateTime => to_datetime(value).map(CellValue::DateTime),
        }
    }
}

fn to_float(value: &CellValue) -> Option<f64> {
    match value {
        CellValue::Int(_) | CellValue::Float(_) => value.as_f64(),
        CellValue::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
        CellValue::String(s) => s.trim().parse().ok(),
        CellValue::DateTime(_) | CellValue::Json(_) => None,
    }
}

#[expect(clippy::cast_possible_truncation, reason = "range is checked before the cast")]
#[expect(clippy::cast_precision_loss, reason = "only used for bounds checking")]
fn float_to_int(f: f64) -> Option<i64> {
    let t = f.trunc();
    (t.is_finite() && t >= i64::MIN as f64 && t < i64::MAX as f64).then_some(t as i64)
}

fn to_int(value: &CellValue) -> Option<i64> {
    match value {
        CellValue::Int(i) => Some(*i),
        CellValue::Float(f) => float_to_int(*f),
        CellValue::Boolean(b) => Some(i64::from(*b)),
        CellValue::String(s) => {
            let s = s.trim();
            s.parse().ok().or_else(|| s.parse().ok().and_then(float_to_int))
        }
        CellValue::DateTime(_) | CellValue::Json(_) => None,
    }
}

fn to_bool(value: &CellValue) -> Option<bool> {
    match value {
        CellValue::Boolean(b) => Some(*b),
        CellValue::Int(_) | CellValue::Float(_) => Some(value.truthy()),
        CellValue::String(s) => {
            let s = s.trim();
            if ["true", "yes", "1"].iter().any(|t| s.eq_ignore_ascii_case(t)) {
                Some(true)
            } else if ["false", "no", "0"].iter().any(|t| s.eq_ignore_ascii_case(t)) {
                Some(false)
            } else {
                None
            }
        }
        CellValue::DateTime(_) | CellValue::Json(_) => None,
    }
}

fn to_datetime(value: &CellValue) -> Option<DateTime<Utc>> {
    match value {
        CellValue::DateTime(dt) => Some(*dt),
        CellValue::String(s) => parse_datetime(s),

        // extended JSON export of a date
        CellValue::Json(Value::Object(o)) => match o.get("$date")? {
            Value::String(s) => parse_datetime(s),
            Value::Number(n) => n.as_i64().and_then(|ms| Utc.timestamp_millis_opt(ms).single()),
            _ => None,
        },

        _ => None,
    }
}

/// Parse a timestamp, treating values without an offset as UTC.
///
/// Accepts RFC 3339, `YYYY-MM-DD HH:MM:SS[.f]` with either separator and an optional offset,
/// and a bare `YYYY-MM-DD` which is taken as midnight.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in OFFSET_FORMATS {
        if let Ok(dt) = DateTime::parse_from_str(s, format) {
            return Some(dt.with_timezone(&Utc));
        }
    }

    for format in NAIVE_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.and_utc());
        }
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn utc(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_parse_datetime_formats() {
        let expected = utc(2024, 3, 1, 12, 30, 5);
        assert_eq!(parse_datetime("2024-03-01T12:30:05Z"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T14:30:05+02:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01 14:30:05+02:00"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01T12:30:05"), Some(expected));
        assert_eq!(parse_datetime("2024-03-01 12:30:05"), Some(expected));
        assert_eq!(parse_datetime(" 2024-03-01 12:30:05 "), Some(expected));
        assert_eq!(parse_datetime("2024-03-01"), Some(utc(2024, 3, 1, 0, 0, 0)));
    }

    #[test]
    fn test_parse_datetime_fractional_seconds() {
        let parsed = parse_datetime("2024-03-01T12:30:05.250").unwrap();
        assert_eq!(parsed.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn test_parse_datetime_rejects_garbage() {
        assert_eq!(parse_datetime("not a date"), None);
        assert_eq!(parse_datetime("2024-13-01"), None);
        assert_eq!(parse_datetime(""), None);
    }

    #[test]
    fn test_coerce_datetime() {
        let expected = CellValue::DateTime(utc(2024, 3, 1, 0, 0, 0));
        assert_eq!(ColumnType::DateTime.coerce(&CellValue::from("2024-03-01")), Some(expected.clone()));
        assert_eq!(ColumnType::DateTime.coerce(&expected), Some(expected));
        assert_eq!(ColumnType::DateTime.coerce(&CellValue::Int(5)), None);

        let extended = CellValue::Json(json!({"$date": "2024-03-01T00:00:00Z"}));
        assert_eq!(
            ColumnType::DateTime.coerce(&extended),
            Some(CellValue::DateTime(utc(2024, 3, 1, 0, 0, 0)))
        );
    }

    #[test]
    fn test_coerce_numbers() {
        assert_eq!(ColumnType::Float.coerce(&CellValue::Int(3)), Some(CellValue::Float(3.0)));
        assert_eq!(ColumnType::Float.coerce(&CellValue::from(" 2.5 ")), Some(CellValue::Float(2.5)));
        assert_eq!(ColumnType::Float.coerce(&CellValue::from("abc")), None);

        assert_eq!(ColumnType::Int.coerce(&CellValue::Float(3.9)), Some(CellValue::Int(3)));
        assert_eq!(ColumnType::Int.coerce(&CellValue::from("42")), Some(CellValue::Int(42)));
        assert_eq!(ColumnType::Int.coerce(&CellValue::from("42.0")), Some(CellValue::Int(42)));
        assert_eq!(ColumnType::Int.coerce(&CellValue::Float(f64::NAN)), None);
        assert_eq!(ColumnType::Int.coerce(&CellValue::Boolean(true)), Some(CellValue::Int(1)));
    }

    #[test]
    fn test_coerce_str_and_bool() {
        assert_eq!(ColumnType::Str.coerce(&CellValue::Int(7)), Some(CellValue::from("7")));
        assert_eq!(ColumnType::Bool.coerce(&CellValue::from("Yes")), Some(CellValue::Boolean(true)));
        assert_eq!(ColumnType::Bool.coerce(&CellValue::from("0")), Some(CellValue::Boolean(false)));
        assert_eq!(ColumnType::Bool.coerce(&CellValue::Int(2)), Some(CellValue::Boolean(true)));
        assert_eq!(ColumnType::Bool.coerce(&CellValue::from("maybe")), None);
    }

    #[test]
    fn test_names() {
        assert_eq!(ColumnType::DateTime.to_string(), "datetime");
        assert_eq!("float".parse::<ColumnType>().unwrap(), ColumnType::Float);
        let parsed: ColumnType = serde_json::from_value(json!("datetime")).unwrap();
        assert_eq!(parsed, ColumnType::DateTime);
    }
}
