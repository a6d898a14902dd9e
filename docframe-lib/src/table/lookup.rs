use crate::Result;
use compact_str::CompactString;
use ohno::app_err;
use strsim::normalized_damerau_levenshtein;

const MIN_SUGGESTION_SCORE: f64 = 0.6;

/// The closest candidate to `name`, if any is close enough to be worth suggesting.
pub fn suggest<'a, I>(name: &str, candidates: I) -> Option<&'a str>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates
        .into_iter()
        .map(|c| (c, normalized_damerau_levenshtein(name, c)))
        .filter(|(_, score)| *score >= MIN_SUGGESTION_SCORE)
        .max_by(|a, b| a.1.total_cmp(&b.1))
        .map(|(c, _)| c)
}

/// Position of column `name` in `columns`.
///
/// `context` names the thing doing the lookup and prefixes the error message.
pub fn column_index(columns: &[CompactString], name: &str, context: &str) -> Result<usize> {
    columns.iter().position(|c| c == name).ok_or_else(|| {
        suggest(name, columns.iter().map(CompactString::as_str)).map_or_else(
            || app_err!("{context}: unknown column '{name}'"),
            |s| app_err!("{context}: unknown column '{name}', did you mean '{s}'?"),
        )
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn columns() -> Vec<CompactString> {
        vec!["test_name".into(), "measurement".into(), "value".into()]
    }

    #[test]
    fn test_column_index() {
        assert_eq!(column_index(&columns(), "value", "sort").unwrap(), 2);
    }

    #[test]
    fn test_unknown_column_suggests() {
        let err = column_index(&columns(), "test_nme", "sort").unwrap_err();
        assert!(err.to_string().contains("sort: unknown column 'test_nme', did you mean 'test_name'?"));
    }

    #[test]
    fn test_unknown_column_without_suggestion() {
        let err = column_index(&columns(), "zzz", "sort").unwrap_err();
        let message = err.to_string();
        assert!(message.contains("sort: unknown column 'zzz'"));
        assert!(!message.contains("did you mean"));
    }
}
