//! Resolves fraction-vs-percentage ambiguity in humidity and cloud-cover style values.
//!
//! Sources disagree on whether `84` or `0.84` means 84 %. The rule applied here:
//! values above 1 and up to 100 are percentages and are divided by 100, values up to 1
//! are already fractions. Values above 100 are passed through untouched so the caller
//! can flag them; historical persisted rows rely on that passthrough, so it must not be
//! turned into a rejection here.

use crate::types::climo_row::Cell;

fn apply_rule(value: f64) -> Option<f64> {
    if !value.is_finite() {
        return None;
    }
    if value > 1.0 && value <= 100.0 {
        Some(value / 100.0)
    } else {
        Some(value)
    }
}

/// Normalizes a raw numeric value into a fraction.
pub fn normalize_fraction(value: Option<f64>) -> Option<f64> {
    value.and_then(apply_rule)
}

/// Normalizes a text value such as `"84"`, `"0.84"` or `"84 %"`.
/// The `%` sign is stripped before the numeric rule is applied.
pub fn normalize_text(text: &str) -> Option<f64> {
    let trimmed = text.trim();
    let number = trimmed.strip_suffix('%').unwrap_or(trimmed).trim();
    if number.is_empty() {
        return None;
    }
    number.parse::<f64>().ok().and_then(apply_rule)
}

/// Normalizes a raw store cell.
pub fn normalize_cell(cell: &Cell) -> Option<f64> {
    match cell {
        Cell::Empty => None,
        Cell::Number(value) => normalize_fraction(Some(*value)),
        Cell::Text(text) => normalize_text(text),
    }
}

/// `true` for a normalized value outside `[0, 1]`, i.e. one the rule passed through.
pub fn is_out_of_range(fraction: f64) -> bool {
    !(0.0..=1.0).contains(&fraction)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fractions_pass_through() {
        assert_eq!(normalize_fraction(Some(0.5)), Some(0.5));
        assert_eq!(normalize_fraction(Some(1.0)), Some(1.0));
        assert_eq!(normalize_fraction(Some(0.0)), Some(0.0));
    }

    #[test]
    fn test_whole_percentages_are_scaled() {
        assert_eq!(normalize_fraction(Some(84.0)), Some(0.84));
        assert_eq!(normalize_fraction(Some(100.0)), Some(1.0));
    }

    #[test]
    fn test_above_hundred_is_passed_through() {
        assert_eq!(normalize_fraction(Some(150.0)), Some(150.0));
        assert!(is_out_of_range(150.0));
        assert!(!is_out_of_range(0.84));
    }

    #[test]
    fn test_missing_and_garbage() {
        assert_eq!(normalize_fraction(None), None);
        assert_eq!(normalize_fraction(Some(f64::NAN)), None);
        assert_eq!(normalize_text(""), None);
        assert_eq!(normalize_text("%"), None);
        assert_eq!(normalize_text("n/a"), None);
    }

    #[test]
    fn test_text_forms() {
        assert_eq!(normalize_text("12%"), Some(0.12));
        assert_eq!(normalize_text(" 84 % "), Some(0.84));
        assert_eq!(normalize_text("0.3"), Some(0.3));
        assert_eq!(normalize_text("150%"), Some(150.0));
    }

    #[test]
    fn test_cells() {
        assert_eq!(normalize_cell(&Cell::Number(84.0)), Some(0.84));
        assert_eq!(normalize_cell(&Cell::Text("12%".into())), Some(0.12));
        assert_eq!(normalize_cell(&Cell::Empty), None);
    }
}
