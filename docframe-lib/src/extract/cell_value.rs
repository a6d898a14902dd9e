use chrono::{DateTime, SecondsFormat, Utc};
use compact_str::CompactString;
use core::fmt;
use serde_json::{Value, json};

/// A single non-null table cell.
///
/// Missing data is represented by wrapping a cell in `Option`, never by a variant of this enum.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Int(i64),
    Float(f64),
    Boolean(bool),
    String(CompactString),
    DateTime(DateTime<Utc>),

    /// A structured value (array or object) pulled out of a document as-is.
    Json(Value),
}

impl CellValue {
    /// Convert a document value into a cell, mapping JSON `null` to `None`.
    #[must_use]
    pub fn from_json(value: &Value) -> Option<Self> {
        match value {
            Value::Null => None,
            Value::Bool(b) => Some(Self::Boolean(*b)),
            Value::Number(n) => n.as_i64().map(Self::Int).or_else(|| n.as_f64().map(Self::Float)),
            Value::String(s) => Some(Self::String(s.as_str().into())),
            Value::Array(_) | Value::Object(_) => Some(Self::Json(value.clone())),
        }
    }

    #[must_use]
    pub fn to_json(&self) -> Value {
        match self {
            Self::Int(i) => json!(i),
            Self::Float(f) => json!(f),
            Self::Boolean(b) => json!(b),
            Self::String(s) => json!(s.as_str()),
            Self::DateTime(dt) => json!(dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Json(v) => v.clone(),
        }
    }

    /// The numeric value of `Int` and `Float` cells.
    #[must_use]
    #[expect(clippy::cast_precision_loss, reason = "integers beyond 2^53 are not expected in measurements")]
    pub const fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Int(i) => Some(*i as f64),
            Self::Float(f) => Some(*f),
            _ => None,
        }
    }

    #[must_use]
    pub const fn is_numeric(&self) -> bool {
        matches!(self, Self::Int(_) | Self::Float(_))
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::String(s) => Some(s),
            _ => None,
        }
    }

    /// Truthiness used by boolean coercion.
    ///
    /// Strings `"false"`, `"no"`, `"0"` and `""` (case-insensitive, trimmed) are false,
    /// numeric zero is false, empty arrays and objects are false. Everything else is true.
    #[must_use]
    pub fn truthy(&self) -> bool {
        match self {
            Self::Boolean(b) => *b,
            Self::Int(i) => *i != 0,
            Self::Float(f) => *f != 0.0,
            Self::String(s) => {
                let s = s.trim();
                !(s.is_empty() || s == "0" || s.eq_ignore_ascii_case("false") || s.eq_ignore_ascii_case("no"))
            }
            Self::DateTime(_) => true,
            Self::Json(Value::Array(a)) => !a.is_empty(),
            Self::Json(Value::Object(o)) => !o.is_empty(),
            Self::Json(v) => !v.is_null(),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(i) => write!(f, "{i}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Boolean(b) => write!(f, "{b}"),
            Self::String(s) => f.write_str(s),
            Self::DateTime(dt) => f.write_str(&dt.to_rfc3339_opts(SecondsFormat::AutoSi, true)),
            Self::Json(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for CellValue {
    fn from(value: i64) -> Self {
        Self::Int(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Float(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Boolean(value)
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::String(value.into())
    }
}

impl From<CompactString> for CellValue {
    fn from(value: CompactString) -> Self {
        Self::String(value)
    }
}

impl From<DateTime<Utc>> for CellValue {
    fn from(value: DateTime<Utc>) -> Self {
        Self::DateTime(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_from_json_scalars() {
        assert_eq!(CellValue::from_json(&json!(null)), None);
        assert_eq!(CellValue::from_json(&json!(3)), Some(CellValue::Int(3)));
        assert_eq!(CellValue::from_json(&json!(-3)), Some(CellValue::Int(-3)));
        assert_eq!(CellValue::from_json(&json!(0.5)), Some(CellValue::Float(0.5)));
        assert_eq!(CellValue::from_json(&json!(true)), Some(CellValue::Boolean(true)));
        assert_eq!(CellValue::from_json(&json!("abc")), Some(CellValue::String("abc".into())));
    }

    #[test]
    fn test_from_json_large_unsigned_becomes_float() {
        let value = CellValue::from_json(&json!(u64::MAX)).unwrap();
        assert!(matches!(value, CellValue::Float(_)));
    }

    #[test]
    fn test_from_json_structured() {
        let value = CellValue::from_json(&json!([1, 2])).unwrap();
        assert_eq!(value, CellValue::Json(json!([1, 2])));
        assert_eq!(value.to_json(), json!([1, 2]));
    }

    #[test]
    fn test_truthy_strings() {
        for falsy in ["false", "FALSE", "no", "No", "0", "", "  "] {
            assert!(!CellValue::from(falsy).truthy(), "'{falsy}' should be false");
        }
        for truthy in ["true", "yes", "1", "anything", "off"] {
            assert!(CellValue::from(truthy).truthy(), "'{truthy}' should be true");
        }
    }

    #[test]
    fn test_truthy_numbers_and_booleans() {
        assert!(!CellValue::Int(0).truthy());
        assert!(CellValue::Int(-1).truthy());
        assert!(!CellValue::Float(0.0).truthy());
        assert!(CellValue::Boolean(true).truthy());
        assert!(!CellValue::Boolean(false).truthy());
        assert!(!CellValue::Json(json!([])).truthy());
        assert!(CellValue::Json(json!({"a": 1})).truthy());
    }

    #[test]
    fn test_display_datetime_is_rfc3339() {
        let dt = Utc.with_ymd_and_hms(2024, 1, 15, 10, 30, 0).unwrap();
        assert_eq!(CellValue::DateTime(dt).to_string(), "2024-01-15T10:30:00Z");
    }

    #[test]
    fn test_as_f64() {
        assert_eq!(CellValue::Int(2).as_f64(), Some(2.0));
        assert_eq!(CellValue::Float(2.5).as_f64(), Some(2.5));
        assert_eq!(CellValue::from("2").as_f64(), None);
    }
}
