//! Type coercion for source-faithful strings
//!
//! Every function here is total: any input string produces a [`Coerced`]
//! value. Malformed input is data, so nothing in this module returns an
//! error or panics.
//!
//! Each parser has a matching `format_*` function that renders a valid value
//! back into the source's documented format, e.g. `73` → `6' 1"`.
//!
//! # Formats
//! ```text
//! height       6' 1"            -> 73 (inches)
//! weight       155 lbs.         -> 155 (pounds)
//! reach        72.0"            -> 72.0 (inches)
//! duration     3:42             -> 222 (seconds)
//! percentage   54%              -> 0.54
//! long date    January 24, 2026
//! short date   Jul 13, 1978
//! attempts     15 of 27         -> landed 15, attempted 27
//! ```

pub mod domain;

use chrono::NaiveDate;

use crate::completeness::FieldStatus;

pub use domain::{Attempts, BoutClass, Location, Method, MethodResult, Outcome, WeightClass};

/// Tokens the source uses for "unknown", compared after cleaning
pub const MISSING_TOKENS: &[&str] = &["", "--", "---"];

/// Outcome of coercing one raw field
#[derive(Debug, Clone, PartialEq)]
pub enum Coerced<T> {
    Valid(T),
    /// The source had a value that did not match the expected format
    Unparseable,
    /// The source explicitly marked the value unknown
    Missing,
}

impl<T> Default for Coerced<T> {
    fn default() -> Self {
        Coerced::Missing
    }
}

impl<T> Coerced<T> {
    pub fn status(&self) -> FieldStatus {
        match self {
            Coerced::Valid(_) => FieldStatus::Valid,
            Coerced::Unparseable => FieldStatus::Unparseable,
            Coerced::Missing => FieldStatus::Missing,
        }
    }

    pub fn is_valid(&self) -> bool {
        matches!(self, Coerced::Valid(_))
    }

    pub fn value(&self) -> Option<&T> {
        match self {
            Coerced::Valid(v) => Some(v),
            _ => None,
        }
    }

    pub fn into_value(self) -> Option<T> {
        match self {
            Coerced::Valid(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_ref(&self) -> Coerced<&T> {
        match self {
            Coerced::Valid(v) => Coerced::Valid(v),
            Coerced::Unparseable => Coerced::Unparseable,
            Coerced::Missing => Coerced::Missing,
        }
    }

    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Coerced<U> {
        match self {
            Coerced::Valid(v) => Coerced::Valid(f(v)),
            Coerced::Unparseable => Coerced::Unparseable,
            Coerced::Missing => Coerced::Missing,
        }
    }
}

/// Collapse whitespace the way the extractor does: NBSP becomes a space,
/// runs of whitespace become one space, ends are trimmed.
pub fn clean_text(raw: &str) -> String {
    raw.replace('\u{a0}', " ")
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
}

pub fn is_missing_token(cleaned: &str) -> bool {
    MISSING_TOKENS.contains(&cleaned)
}

/// Clean `raw`, short-circuit on a missing token, then run `parse`
pub fn coerce_with<T>(raw: &str, parse: impl FnOnce(&str) -> Option<T>) -> Coerced<T> {
    let cleaned = clean_text(raw);
    if is_missing_token(&cleaned) {
        return Coerced::Missing;
    }
    match parse(&cleaned) {
        Some(v) => Coerced::Valid(v),
        None => Coerced::Unparseable,
    }
}

fn all_digits(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Non-negative decimal: digits with at most one interior dot
fn parse_unsigned_decimal(s: &str) -> Option<f64> {
    let (int, frac) = match s.split_once('.') {
        Some((i, f)) => (i, Some(f)),
        None => (s, None),
    };
    if !all_digits(int) || frac.is_some_and(|f| !all_digits(f)) {
        return None;
    }
    s.parse().ok().filter(|v: &f64| v.is_finite())
}

// ============================================================================
// Text
// ============================================================================

pub fn coerce_text(raw: &str) -> Coerced<String> {
    coerce_with(raw, |s| Some(s.to_string()))
}

// ============================================================================
// Numbers
// ============================================================================

pub fn coerce_integer(raw: &str) -> Coerced<i64> {
    coerce_with(raw, |s| {
        let digits = s.strip_prefix(['-', '+']).unwrap_or(s);
        if !all_digits(digits) {
            return None;
        }
        s.parse().ok()
    })
}

pub fn coerce_decimal(raw: &str) -> Coerced<f64> {
    coerce_with(raw, |s| match s.strip_prefix('-') {
        Some(rest) => parse_unsigned_decimal(rest).map(|v| -v),
        None => parse_unsigned_decimal(s),
    })
}

// ============================================================================
// Physical attributes
// ============================================================================

/// `6' 1"` → 73
pub fn coerce_height(raw: &str) -> Coerced<i64> {
    coerce_with(raw, parse_height)
}

fn parse_height(s: &str) -> Option<i64> {
    let (feet, rest) = s.split_once('\'')?;
    let inches = rest.trim().strip_suffix('"')?.trim();
    let feet = feet.trim();
    if !all_digits(feet) || !all_digits(inches) {
        return None;
    }
    let feet: i64 = feet.parse().ok()?;
    let inches: i64 = inches.parse().ok()?;
    if inches >= 12 {
        return None;
    }
    feet.checked_mul(12)?.checked_add(inches)
}

pub fn format_height(inches: i64) -> String {
    format!("{}' {}\"", inches / 12, inches % 12)
}

/// `155 lbs.` → 155
pub fn coerce_weight(raw: &str) -> Coerced<i64> {
    coerce_with(raw, |s| {
        let n = s
            .strip_suffix("lbs.")
            .or_else(|| s.strip_suffix("lbs"))?
            .trim();
        if !all_digits(n) {
            return None;
        }
        n.parse().ok()
    })
}

pub fn format_weight(pounds: i64) -> String {
    format!("{} lbs.", pounds)
}

/// `72.0"` or `72"` → 72.0
pub fn coerce_reach(raw: &str) -> Coerced<f64> {
    coerce_with(raw, |s| parse_unsigned_decimal(s.strip_suffix('"')?.trim()))
}

pub fn format_reach(inches: f64) -> String {
    format!("{:.1}\"", inches)
}

// ============================================================================
// Durations and ratios
// ============================================================================

/// `M:SS` → total seconds. Seconds must be two digits below 60.
pub fn coerce_duration(raw: &str) -> Coerced<i64> {
    coerce_with(raw, parse_duration)
}

fn parse_duration(s: &str) -> Option<i64> {
    let (minutes, seconds) = s.split_once(':')?;
    if !all_digits(minutes) || seconds.len() != 2 || !all_digits(seconds) {
        return None;
    }
    let minutes: i64 = minutes.parse().ok()?;
    let seconds: i64 = seconds.parse().ok()?;
    if seconds >= 60 {
        return None;
    }
    minutes.checked_mul(60)?.checked_add(seconds)
}

pub fn format_duration(total_seconds: i64) -> String {
    format!("{}:{:02}", total_seconds / 60, total_seconds % 60)
}

/// `54%` → 0.54. Stored as a fraction in [0, 1].
pub fn coerce_percentage(raw: &str) -> Coerced<f64> {
    coerce_with(raw, |s| {
        let pct = parse_unsigned_decimal(s.strip_suffix('%')?.trim())?;
        if pct > 100.0 {
            return None;
        }
        Some(pct / 100.0)
    })
}

pub fn format_percentage(fraction: f64) -> String {
    // undo the float noise from dividing by 100
    let pct = (fraction * 100.0 * 1e6).round() / 1e6;
    format!("{}%", pct)
}

/// `15 of 27` → landed 15 of 27 attempted
pub fn coerce_attempts(raw: &str) -> Coerced<Attempts> {
    coerce_with(raw, |s| {
        let (landed, attempted) = s.split_once(" of ")?;
        if !all_digits(landed) || !all_digits(attempted) {
            return None;
        }
        let landed: i64 = landed.parse().ok()?;
        let attempted: i64 = attempted.parse().ok()?;
        (landed <= attempted).then_some(Attempts { landed, attempted })
    })
}

pub fn format_attempts(a: &Attempts) -> String {
    format!("{} of {}", a.landed, a.attempted)
}

// ============================================================================
// Dates
// ============================================================================

/// Date layouts the source uses
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateFormat {
    /// Event pages: `January 24, 2026`
    Long,
    /// Fighter pages: `Jul 13, 1978`
    Short,
}

impl DateFormat {
    pub fn pattern(&self) -> &'static str {
        match self {
            DateFormat::Long => "%B %d, %Y",
            DateFormat::Short => "%b %d, %Y",
        }
    }
}

pub fn coerce_date(raw: &str, format: DateFormat) -> Coerced<NaiveDate> {
    coerce_with(raw, |s| NaiveDate::parse_from_str(s, format.pattern()).ok())
}

pub fn format_date(date: NaiveDate, format: DateFormat) -> String {
    date.format(format.pattern()).to_string()
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_clean_text() {
        assert_eq!(clean_text("  Las\u{a0}Vegas,\n  Nevada "), "Las Vegas, Nevada");
        assert_eq!(clean_text("\t"), "");
    }

    #[test]
    fn test_height() {
        assert_eq!(coerce_height("6' 1\""), Coerced::Valid(73));
        assert_eq!(coerce_height("5'11\""), Coerced::Valid(71));
        assert_eq!(coerce_height(" 6'  0\" "), Coerced::Valid(72));
        assert_eq!(coerce_height(""), Coerced::Missing);
        assert_eq!(coerce_height("--"), Coerced::Missing);
        assert_eq!(coerce_height("73"), Coerced::Unparseable);
        assert_eq!(coerce_height("6 ft 1 in"), Coerced::Unparseable);
        assert_eq!(coerce_height("6' 13\""), Coerced::Unparseable);
        assert_eq!(coerce_height("6' 1"), Coerced::Unparseable);
    }

    #[test]
    fn test_height_missing_is_not_unparseable() {
        let c = coerce_height("");
        assert_eq!(c.status(), FieldStatus::Missing);
        assert_eq!(c.value(), None);
    }

    #[test]
    fn test_weight() {
        assert_eq!(coerce_weight("155 lbs."), Coerced::Valid(155));
        assert_eq!(coerce_weight("265 lbs"), Coerced::Valid(265));
        assert_eq!(coerce_weight("--"), Coerced::Missing);
        assert_eq!(coerce_weight("heavy lbs."), Coerced::Unparseable);
        assert_eq!(format_weight(155), "155 lbs.");
    }

    #[test]
    fn test_reach() {
        assert_eq!(coerce_reach("72.0\""), Coerced::Valid(72.0));
        assert_eq!(coerce_reach("76\""), Coerced::Valid(76.0));
        assert_eq!(coerce_reach("--"), Coerced::Missing);
        assert_eq!(coerce_reach("72.0"), Coerced::Unparseable);
        assert_eq!(format_reach(72.0), "72.0\"");
    }

    #[test]
    fn test_duration() {
        assert_eq!(coerce_duration("3:42"), Coerced::Valid(222));
        assert_eq!(coerce_duration("0:05"), Coerced::Valid(5));
        assert_eq!(coerce_duration("15:00"), Coerced::Valid(900));
        assert_eq!(coerce_duration("3:60"), Coerced::Unparseable);
        assert_eq!(coerce_duration("3:4"), Coerced::Unparseable);
        assert_eq!(coerce_duration("3m42s"), Coerced::Unparseable);
        assert_eq!(coerce_duration(""), Coerced::Missing);
    }

    #[test]
    fn test_percentage() {
        assert_eq!(coerce_percentage("54%"), Coerced::Valid(0.54));
        assert_eq!(coerce_percentage("0%"), Coerced::Valid(0.0));
        assert_eq!(coerce_percentage("100%"), Coerced::Valid(1.0));
        assert_eq!(coerce_percentage("abc%"), Coerced::Unparseable);
        assert_eq!(coerce_percentage("54"), Coerced::Unparseable);
        assert_eq!(coerce_percentage("140%"), Coerced::Unparseable);
        assert_eq!(coerce_percentage("--"), Coerced::Missing);
    }

    #[test]
    fn test_integer_and_decimal() {
        assert_eq!(coerce_integer("12"), Coerced::Valid(12));
        assert_eq!(coerce_integer("-3"), Coerced::Valid(-3));
        assert_eq!(coerce_integer("+5"), Coerced::Valid(5));
        assert_eq!(coerce_integer("+-5"), Coerced::Unparseable);
        assert_eq!(coerce_integer("+"), Coerced::Unparseable);
        assert_eq!(coerce_integer("1.5"), Coerced::Unparseable);
        assert_eq!(coerce_decimal("4.89"), Coerced::Valid(4.89));
        assert_eq!(coerce_decimal("0"), Coerced::Valid(0.0));
        assert_eq!(coerce_decimal("NaN"), Coerced::Unparseable);
        assert_eq!(coerce_decimal("inf"), Coerced::Unparseable);
    }

    #[test]
    fn test_attempts() {
        assert_eq!(
            coerce_attempts("15 of 27"),
            Coerced::Valid(Attempts { landed: 15, attempted: 27 })
        );
        assert_eq!(coerce_attempts("27 of 15"), Coerced::Unparseable);
        assert_eq!(coerce_attempts("15/27"), Coerced::Unparseable);
        assert_eq!(coerce_attempts("---"), Coerced::Missing);
    }

    #[test]
    fn test_dates() {
        let d = coerce_date("January 24, 2026", DateFormat::Long);
        assert_eq!(d, Coerced::Valid(NaiveDate::from_ymd_opt(2026, 1, 24).unwrap()));

        let d = coerce_date("Jul 13, 1978", DateFormat::Short);
        assert_eq!(d, Coerced::Valid(NaiveDate::from_ymd_opt(1978, 7, 13).unwrap()));

        assert_eq!(coerce_date("2026-01-24", DateFormat::Long), Coerced::Unparseable);
        assert_eq!(coerce_date("--", DateFormat::Short), Coerced::Missing);
    }

    #[test]
    fn test_round_trip_examples() {
        assert_eq!(format_height(73), "6' 1\"");
        assert_eq!(format_percentage(0.54), "54%");
        assert_eq!(format_duration(222), "3:42");
        assert_eq!(
            format_attempts(&Attempts { landed: 15, attempted: 27 }),
            "15 of 27"
        );

        let d = NaiveDate::from_ymd_opt(2026, 1, 24).unwrap();
        assert_eq!(format_date(d, DateFormat::Long), "January 24, 2026");
        let d = NaiveDate::from_ymd_opt(1978, 7, 13).unwrap();
        assert_eq!(format_date(d, DateFormat::Short), "Jul 13, 1978");
    }

    proptest! {
        #[test]
        fn prop_height_round_trip(feet in 0i64..9, inches in 0i64..12) {
            let raw = format!("{}' {}\"", feet, inches);
            let coerced = coerce_height(&raw);
            prop_assert_eq!(coerced.clone(), Coerced::Valid(feet * 12 + inches));
            prop_assert_eq!(format_height(feet * 12 + inches), raw);
        }

        #[test]
        fn prop_duration_round_trip(minutes in 0i64..60, seconds in 0i64..60) {
            let raw = format!("{}:{:02}", minutes, seconds);
            let total = coerce_duration(&raw).into_value().unwrap();
            prop_assert_eq!(format_duration(total), raw);
        }

        #[test]
        fn prop_percentage_round_trip(pct in 0u32..=100) {
            let raw = format!("{}%", pct);
            let fraction = coerce_percentage(&raw).into_value().unwrap();
            prop_assert!((0.0..=1.0).contains(&fraction));
            prop_assert_eq!(format_percentage(fraction), raw);
        }

        #[test]
        fn prop_coercion_never_panics(raw in ".*") {
            let _ = coerce_height(&raw);
            let _ = coerce_duration(&raw);
            let _ = coerce_percentage(&raw);
            let _ = coerce_attempts(&raw);
            let _ = coerce_date(&raw, DateFormat::Long);
            let _ = coerce_decimal(&raw);
        }
    }
}
