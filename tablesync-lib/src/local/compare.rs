//! Value comparison and text matching for the local engine.

use std::cmp::Ordering;
use std::sync::LazyLock;

use icu_collator::Collator;
use icu_collator::CollatorBorrowed;
use icu_collator::options::CollatorOptions;
use icu_collator::options::Strength;
use log::warn;
use unicase::UniCase;

use crate::model::Value;
use crate::query::Direction;

/// Root-locale collator that ignores case; case only breaks ties.
static COLLATOR: LazyLock<Option<CollatorBorrowed<'static>>> = LazyLock::new(|| {
    let mut options = CollatorOptions::default();
    options.strength = Some(Strength::Secondary);
    Collator::try_new(Default::default(), options)
        .map_err(|e| warn!("Collation data unavailable, sorting by case folding: {}", e))
        .ok()
});

/// Case-insensitive substring match using Unicode case folding.
pub fn contains_folded(haystack: &str, needle: &str) -> bool {
    if needle.is_empty() {
        return true;
    }
    let haystack = UniCase::new(haystack).to_folded_case();
    let needle = UniCase::new(needle).to_folded_case();
    haystack.contains(&needle)
}

/// Compares two present values.
///
/// Date-like values compare by timestamp and numbers numerically. Strings
/// use locale-aware collation ignoring case, with a case-sensitive
/// tie-break. Incomparable pairs
/// (NaN, mixed types) are equal so a stable sort keeps their order.
pub fn compare_values(a: &Value, b: &Value) -> Ordering {
    if let (Some(a), Some(b)) = (a.as_timestamp(), b.as_timestamp()) {
        return a.cmp(&b);
    }
    match (a, b) {
        (Value::Number(a), Value::Number(b)) => a.partial_cmp(b).unwrap_or(Ordering::Equal),
        (Value::String(a), Value::String(b)) => compare_text(a, b),
        (Value::Bool(a), Value::Bool(b)) => a.cmp(b),
        (Value::List(_), Value::List(_)) => match (a.to_text(), b.to_text()) {
            (Some(a), Some(b)) => compare_text(&a, &b),
            _ => Ordering::Equal,
        },
        _ => Ordering::Equal,
    }
}

/// Compares two optional field values in a sort direction.
///
/// Missing and null values come after present ones when ascending and
/// before them when descending.
pub fn compare_fields(a: Option<&Value>, b: Option<&Value>, direction: Direction) -> Ordering {
    let a = a.filter(|v| !v.is_null());
    let b = b.filter(|v| !v.is_null());
    let ordering = match (a, b) {
        (Some(a), Some(b)) => compare_values(a, b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    };
    match direction {
        Direction::Asc => ordering,
        Direction::Desc => ordering.reverse(),
    }
}

fn compare_text(a: &str, b: &str) -> Ordering {
    let ordering = match COLLATOR.as_ref() {
        Some(collator) => collator.compare(a, b),
        None => UniCase::new(a).cmp(&UniCase::new(b)),
    };
    ordering.then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;
    use chrono::Utc;

    use super::*;

    #[test]
    fn test_contains_folded() {
        assert!(contains_folded("Banana", "AN"));
        assert!(contains_folded("Äpfel", "äP"));
        assert!(!contains_folded("Cherry", "a"));
        assert!(contains_folded("anything", ""));
    }

    #[test]
    fn test_numbers() {
        assert_eq!(compare_values(&Value::from(2), &Value::from(10)), Ordering::Less);
        assert_eq!(
            compare_values(&Value::Number(f64::NAN), &Value::from(1)),
            Ordering::Equal
        );
    }

    #[test]
    fn test_strings_fold_case_then_break_ties() {
        assert_eq!(compare_values(&Value::from("apple"), &Value::from("Banana")), Ordering::Less);
        assert_eq!(compare_values(&Value::from("B"), &Value::from("b")), Ordering::Less);
        assert_eq!(compare_values(&Value::from("Éclair"), &Value::from("eagle")), Ordering::Greater);
        assert_eq!(compare_values(&Value::from("Éclair"), &Value::from("zebra")), Ordering::Less);
        assert_eq!(compare_values(&Value::from("résumé"), &Value::from("Resume")), Ordering::Greater);
    }

    #[test]
    fn test_dates_compare_chronologically() {
        let earlier = Value::from("2024-02-01");
        let later = Value::from(Utc.with_ymd_and_hms(2024, 10, 1, 0, 0, 0).unwrap());
        assert_eq!(compare_values(&earlier, &later), Ordering::Less);
        assert_eq!(
            compare_values(&Value::from("2024-12-01"), &Value::from("2024-02-01T10:00:00")),
            Ordering::Greater
        );
    }

    #[test]
    fn test_mixed_types_are_equal() {
        assert_eq!(compare_values(&Value::from("x"), &Value::from(1)), Ordering::Equal);
    }

    #[test]
    fn test_missing_position_depends_on_direction() {
        let present = Value::from(1);
        assert_eq!(
            compare_fields(Some(&present), None, Direction::Asc),
            Ordering::Less
        );
        assert_eq!(
            compare_fields(Some(&present), Some(&Value::Null), Direction::Desc),
            Ordering::Greater
        );
    }
}
