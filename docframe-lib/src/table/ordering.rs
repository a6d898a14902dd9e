use crate::Result;
use crate::extract::CellValue;
use compact_str::CompactString;
use core::cmp::Ordering;
use core::fmt;
use core::str::FromStr;
use ohno::bail;

/// One key of a multi-key sort.
///
/// The textual form is the column name, prefixed with `-` for descending order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SortKey {
    pub column: CompactString,
    pub descending: bool,
}

impl SortKey {
    #[must_use]
    pub fn ascending(column: impl Into<CompactString>) -> Self {
        Self {
            column: column.into(),
            descending: false,
        }
    }

    #[must_use]
    pub fn descending(column: impl Into<CompactString>) -> Self {
        Self {
            column: column.into(),
            descending: true,
        }
    }
}

impl FromStr for SortKey {
    type Err = ohno::AppError;

    fn from_str(s: &str) -> Result<Self> {
        let (column, descending) = s.strip_prefix('-').map_or((s, false), |c| (c, true));
        if column.is_empty() {
            bail!("invalid sort key '{s}': missing column name");
        }

        Ok(Self {
            column: column.into(),
            descending,
        })
    }
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.descending {
            write!(f, "-{}", self.column)
        } else {
            f.write_str(&self.column)
        }
    }
}

const fn kind_rank(value: &CellValue) -> u8 {
    match value {
        CellValue::Boolean(_) => 0,
        CellValue::Int(_) | CellValue::Float(_) => 1,
        CellValue::String(_) => 2,
        CellValue::DateTime(_) => 3,
        CellValue::Json(_) => 4,
    }
}

/// Total order over non-null cells.
///
/// Numbers compare numerically regardless of representation. Values of different kinds order
/// as booleans, numbers, strings, timestamps, then structured values.
#[must_use]
pub fn compare_values(a: &CellValue, b: &CellValue) -> Ordering {
    match (a, b) {
        (CellValue::Int(x), CellValue::Int(y)) => x.cmp(y),
        (CellValue::Boolean(x), CellValue::Boolean(y)) => x.cmp(y),
        (CellValue::String(x), CellValue::String(y)) => x.cmp(y),
        (CellValue::DateTime(x), CellValue::DateTime(y)) => x.cmp(y),
        (CellValue::Json(x), CellValue::Json(y)) => x.to_string().cmp(&y.to_string()),
        _ => match (a.as_f64(), b.as_f64()) {
            (Some(x), Some(y)) => x.total_cmp(&y),
            _ => kind_rank(a).cmp(&kind_rank(b)),
        },
    }
}

/// Compare two cells for a sort key, keeping nulls last whatever the direction.
#[must_use]
pub fn compare_cells(a: Option<&CellValue>, b: Option<&CellValue>, descending: bool) -> Ordering {
    match (a, b) {
        (None, None) => Ordering::Equal,
        (None, Some(_)) => Ordering::Greater,
        (Some(_), None) => Ordering::Less,
        (Some(x), Some(y)) if descending => compare_values(x, y).reverse(),
        (Some(x), Some(y)) => compare_values(x, y),
    }
}

/// Whether two cells hold the same value, treating two nulls as equal.
#[must_use]
pub fn cells_equal(a: Option<&CellValue>, b: Option<&CellValue>) -> bool {
    compare_cells(a, b, false) == Ordering::Equal
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sort_key_parse() {
        assert_eq!("commit_date".parse::<SortKey>().unwrap(), SortKey::ascending("commit_date"));
        assert_eq!("-value".parse::<SortKey>().unwrap(), SortKey::descending("value"));
        assert!("-".parse::<SortKey>().is_err());
        assert!("".parse::<SortKey>().is_err());
        assert_eq!(SortKey::descending("value").to_string(), "-value");
    }

    #[test]
    fn test_numbers_compare_numerically() {
        assert_eq!(compare_values(&CellValue::Int(2), &CellValue::Float(1.5)), Ordering::Greater);
        assert_eq!(compare_values(&CellValue::Float(2.0), &CellValue::Int(2)), Ordering::Equal);
        assert_eq!(compare_values(&CellValue::Int(10), &CellValue::Int(9)), Ordering::Greater);
    }

    #[test]
    fn test_kinds_order() {
        let ordered = [
            CellValue::Boolean(true),
            CellValue::Int(-100),
            CellValue::from("a"),
            CellValue::DateTime(chrono::DateTime::UNIX_EPOCH),
            CellValue::Json(serde_json::json!([])),
        ];

        for pair in ordered.windows(2) {
            assert_eq!(compare_values(&pair[0], &pair[1]), Ordering::Less);
        }
    }

    #[test]
    fn test_nulls_last_both_directions() {
        let one = CellValue::Int(1);
        assert_eq!(compare_cells(None, Some(&one), false), Ordering::Greater);
        assert_eq!(compare_cells(None, Some(&one), true), Ordering::Greater);
        assert_eq!(compare_cells(Some(&one), None, true), Ordering::Less);
        assert_eq!(compare_cells(None, None, true), Ordering::Equal);
    }

    #[test]
    fn test_cells_equal() {
        assert!(cells_equal(None, None));
        assert!(cells_equal(Some(&CellValue::Int(1)), Some(&CellValue::Float(1.0))));
        assert!(!cells_equal(Some(&CellValue::Int(1)), None));
        assert!(!cells_equal(Some(&CellValue::from("1")), Some(&CellValue::Int(1))));
    }
}
