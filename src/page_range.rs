use std::sync::LazyLock;

use regex::Regex;

use crate::chapter::{Chapter, ChapterRegistry};
use crate::error::ChapterfyError;

// Anchored at the start only: "1-5 extra" still counts as range syntax.
// ASCII digits only; `\d` would also take full-width and other Unicode digits.
static RANGE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[0-9]+-[0-9]+").expect("range pattern is valid"));

/// Check a single range token like "3-5".
///
/// Returns `(has_range_syntax, is_range_increasing)`. The first flag is set when the
/// token starts with `<digits>-<digits>`. The second is only computed when the first
/// holds: the token is split on its first `-` and both halves must parse as page
/// numbers with start <= end.
pub fn check_valid_range(token: &str) -> (bool, bool) {
    if !RANGE_PREFIX.is_match(token) {
        return (false, false);
    }
    (true, parse_bounds(token).is_some_and(|(start, end)| start <= end))
}

fn parse_bounds(token: &str) -> Option<(u32, u32)> {
    let (start, end) = token.split_once('-')?;
    Some((start.parse().ok()?, end.parse().ok()?))
}

/// Result of processing one comma-separated token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RangeOutcome {
    /// The token produced a chapter; `added` is false when an equal one was already registered.
    Accepted { chapter: Chapter, added: bool },
    Rejected(ChapterfyError),
}

/// Turn a validated token into a chapter named `{start}_{end}`.
pub fn parse_range_token(token: &str) -> Result<Chapter, ChapterfyError> {
    match check_valid_range(token) {
        (true, true) => {
            let (start, end) = parse_bounds(token)
                .ok_or_else(|| ChapterfyError::InvalidRangeOrder(token.to_string()))?;
            Ok(Chapter::new(format!("{}_{}", start, end), start, end))
        }
        (true, false) => Err(ChapterfyError::InvalidRangeOrder(token.to_string())),
        (false, _) => Err(ChapterfyError::InvalidRangeSyntax(token.to_string())),
    }
}

/// Parse a comma-separated list like "1-5, 7-9" into the registry.
///
/// Every token is handled on its own; a bad token is reported and the rest still apply.
pub fn apply_ranges(input: &str, registry: &mut ChapterRegistry) -> Vec<RangeOutcome> {
    input
        .split(',')
        .map(str::trim)
        .map(|token| match parse_range_token(token) {
            Ok(chapter) => {
                let added = registry.add(chapter.clone());
                RangeOutcome::Accepted { chapter, added }
            }
            Err(err) => {
                tracing::warn!("{}", err);
                RangeOutcome::Rejected(err)
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_increasing_range() {
        assert_eq!(check_valid_range("3-5"), (true, true));
        assert_eq!(check_valid_range("4-4"), (true, true));
    }

    #[test]
    fn test_decreasing_range() {
        assert_eq!(check_valid_range("9-2"), (true, false));
    }

    #[test]
    fn test_no_range_syntax() {
        assert_eq!(check_valid_range("abc"), (false, false));
        assert_eq!(check_valid_range("5-"), (false, false));
        assert_eq!(check_valid_range("7"), (false, false));
        assert_eq!(check_valid_range("-3"), (false, false));
        assert_eq!(check_valid_range(""), (false, false));
    }

    #[test]
    fn test_non_ascii_digits_are_not_range_syntax() {
        assert_eq!(check_valid_range("１-５"), (false, false));
        assert_eq!(check_valid_range("٣-٥"), (false, false));
        assert_eq!(
            parse_range_token("１-５"),
            Err(ChapterfyError::InvalidRangeSyntax("１-５".to_string()))
        );
    }

    #[test]
    fn test_prefix_match_tolerates_suffix() {
        // The syntax check only looks at the prefix; the numeric check sees "5x".
        assert_eq!(check_valid_range("1-5x").0, true);
        assert_eq!(check_valid_range("1-5x"), (true, false));
        assert_eq!(check_valid_range("1-5-9").0, true);
    }

    #[test]
    fn test_parse_token_names_chapter() {
        let chapter = parse_range_token("12-20").unwrap();
        assert_eq!(chapter, Chapter::new("12_20", 12, 20));
    }

    #[test]
    fn test_apply_ranges_continues_past_errors() {
        let mut registry = ChapterRegistry::new();
        let outcomes = apply_ranges("1-5, 9-2, 7, 7-9", &mut registry);

        assert_eq!(outcomes.len(), 4);
        assert!(matches!(
            &outcomes[1],
            RangeOutcome::Rejected(ChapterfyError::InvalidRangeOrder(t)) if t == "9-2"
        ));
        assert!(matches!(
            &outcomes[2],
            RangeOutcome::Rejected(ChapterfyError::InvalidRangeSyntax(t)) if t == "7"
        ));
        assert_eq!(
            registry.as_slice(),
            &[Chapter::new("1_5", 1, 5), Chapter::new("7_9", 7, 9)]
        );
    }

    #[test]
    fn test_apply_ranges_dedups() {
        let mut registry = ChapterRegistry::new();
        let outcomes = apply_ranges("1-5,1-5", &mut registry);
        assert!(matches!(outcomes[0], RangeOutcome::Accepted { added: true, .. }));
        assert!(matches!(outcomes[1], RangeOutcome::Accepted { added: false, .. }));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_empty_input_is_syntax_error() {
        let mut registry = ChapterRegistry::new();
        let outcomes = apply_ranges("", &mut registry);
        assert_eq!(
            outcomes,
            vec![RangeOutcome::Rejected(ChapterfyError::InvalidRangeSyntax(
                String::new()
            ))]
        );
    }
}
