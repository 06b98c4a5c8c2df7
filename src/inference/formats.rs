//! Format detection for string and numeric values

use std::fmt;
use std::net::Ipv6Addr;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime};
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// 2000-01-01T00:00:00Z in seconds. Smaller numbers are never treated as epochs.
pub const EPOCH_LOWER_BOUND: i64 = 946_684_800;

/// Detected value format
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub enum Format {
    /// Calendar date without time
    #[serde(rename = "date")]
    Date,
    /// Date and time, with or without offset
    #[serde(rename = "date-time")]
    DateTime,
    /// Time of day
    #[serde(rename = "time")]
    Time,
    /// Numeric instant since 1970 (string or number)
    #[serde(rename = "epoch")]
    Epoch,
    #[serde(rename = "email")]
    Email,
    #[serde(rename = "uri")]
    Uri,
    #[serde(rename = "uuid")]
    Uuid,
    #[serde(rename = "ipv4")]
    Ipv4,
    #[serde(rename = "ipv6")]
    Ipv6,
    /// Separated card number passing the Luhn check
    #[serde(rename = "creditcard")]
    CreditCard,
}

impl Format {
    pub const ALL: [Format; 10] = [
        Format::Date,
        Format::DateTime,
        Format::Time,
        Format::Epoch,
        Format::Email,
        Format::Uri,
        Format::Uuid,
        Format::Ipv4,
        Format::Ipv6,
        Format::CreditCard,
    ];

    /// Get the format name used in schemas and conflict types
    pub fn as_str(&self) -> &'static str {
        match self {
            Format::Date => "date",
            Format::DateTime => "date-time",
            Format::Time => "time",
            Format::Epoch => "epoch",
            Format::Email => "email",
            Format::Uri => "uri",
            Format::Uuid => "uuid",
            Format::Ipv4 => "ipv4",
            Format::Ipv6 => "ipv6",
            Format::CreditCard => "creditcard",
        }
    }

    /// Whether this is one of the string-shaped temporal formats
    pub fn is_temporal(&self) -> bool {
        matches!(self, Format::Date | Format::DateTime | Format::Time)
    }
}

impl fmt::Display for Format {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Format::ALL
            .into_iter()
            .find(|f| f.as_str() == s)
            .ok_or_else(|| format!("Unknown format: {}", s))
    }
}

// Regex patterns for format detection
static DATE_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d{4}-\d{2}-\d{2}$").unwrap());

static DATETIME_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\d{4}-\d{2}-\d{2}[T ]\d{2}:\d{2}(:\d{2})?(\.\d+)?(Z|[+-]\d{2}:?\d{2})?$").unwrap()
});

static TIME_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{2}:\d{2}(:\d{2})?(\.\d+)?$").unwrap());

static EMAIL_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-zA-Z0-9._%+-]+@[a-zA-Z0-9.-]+\.[a-zA-Z]{2,}$").unwrap());

static URI_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(https?|ftp|file|s3|gs)://[^\s/$.?#].[^\s]*$").unwrap());

static IPV4_REGEX: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"^((25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)\.){3}(25[0-5]|2[0-4][0-9]|[01]?[0-9][0-9]?)$",
    )
    .unwrap()
});

static CREDIT_CARD_REGEX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\d{4}([ -]\d{4}){2}[ -]\d{1,7}$").unwrap());

static DIGITS_REGEX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\d+$").unwrap());

/// Detect the format of a string value.
///
/// Checks run from most to least specific. Temporal results here are only
/// shape matches; callers confirm them with [`looks_temporal`].
pub fn detect_format(value: &str) -> Option<Format> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if value.len() == 36 && Uuid::try_parse(value).is_ok() {
        return Some(Format::Uuid);
    }
    if DATETIME_REGEX.is_match(value) {
        return Some(Format::DateTime);
    }
    if DATE_REGEX.is_match(value) {
        return Some(Format::Date);
    }
    if TIME_REGEX.is_match(value) {
        return Some(Format::Time);
    }
    if EMAIL_REGEX.is_match(value) {
        return Some(Format::Email);
    }
    if URI_REGEX.is_match(value) {
        return Some(Format::Uri);
    }
    if IPV4_REGEX.is_match(value) {
        return Some(Format::Ipv4);
    }
    if value.contains(':') && value.parse::<Ipv6Addr>().is_ok() {
        return Some(Format::Ipv6);
    }
    if CREDIT_CARD_REGEX.is_match(value) && luhn_valid(value) {
        return Some(Format::CreditCard);
    }

    None
}

fn luhn_valid(value: &str) -> bool {
    let digits: Vec<u32> = value.chars().filter_map(|c| c.to_digit(10)).collect();
    if digits.len() < 13 {
        return false;
    }
    let sum: u32 = digits
        .iter()
        .rev()
        .enumerate()
        .map(|(i, &d)| {
            if i % 2 == 1 {
                let doubled = d * 2;
                if doubled > 9 { doubled - 9 } else { doubled }
            } else {
                d
            }
        })
        .sum();
    sum % 10 == 0
}

/// Whether `n` lies past the epoch lower bound and is a representable
/// millisecond instant.
pub fn is_epoch_millis(n: i64) -> bool {
    n >= EPOCH_LOWER_BOUND && DateTime::from_timestamp_millis(n).is_some()
}

/// Epoch check for a string of ASCII digits
pub fn is_epoch_string(value: &str) -> bool {
    DIGITS_REGEX.is_match(value) && value.parse::<i64>().is_ok_and(is_epoch_millis)
}

/// Epoch check for a JSON number
pub fn is_epoch_number(value: &serde_json::Number) -> bool {
    if let Some(n) = value.as_i64() {
        return is_epoch_millis(n);
    }
    match value.as_f64() {
        Some(f) if f.is_finite() && f < i64::MAX as f64 => is_epoch_millis(f as i64),
        _ => false,
    }
}

#[derive(Debug, Clone, Copy)]
enum PatternKind {
    /// Carries an offset (`%z`/`%:z`)
    Zoned,
    Naive,
    DateOnly,
    TimeOnly,
}

#[derive(Debug, Clone)]
struct TemporalPattern {
    layout: String,
    kind: PatternKind,
}

const DATE_LAYOUTS: [&str; 8] = [
    "%Y-%m-%d", "%Y/%m/%d", "%Y.%m.%d", "%d-%m-%Y", "%d/%m/%Y", "%d.%m.%Y", "%m-%d-%Y", "%m/%d/%Y",
];

const TIME_LAYOUTS: [&str; 3] = ["%H:%M:%S", "%H:%M:%S%.f", "%H:%M"];

const DATE_TIME_SEPARATORS: [&str; 2] = ["T", " "];

const EXTRA_DATE_LAYOUTS: [&str; 6] = [
    "%d %b %Y", "%d %B %Y", "%b %d %Y", "%b %d, %Y", "%B %d, %Y", "%a, %d %b %Y",
];

static TEMPORAL_PATTERNS: Lazy<Vec<TemporalPattern>> = Lazy::new(build_temporal_patterns);

fn build_temporal_patterns() -> Vec<TemporalPattern> {
    let mut patterns = Vec::new();
    let mut push =
        |layout: String, kind: PatternKind| patterns.push(TemporalPattern { layout, kind });

    for date in DATE_LAYOUTS {
        for sep in DATE_TIME_SEPARATORS {
            for time in TIME_LAYOUTS {
                push(format!("{date}{sep}{time}"), PatternKind::Naive);
            }
        }
    }

    for sep in DATE_TIME_SEPARATORS {
        for time in TIME_LAYOUTS {
            push(format!("%Y-%m-%d{sep}{time}Z"), PatternKind::Naive);
            push(format!("%Y-%m-%d{sep}{time}%z"), PatternKind::Zoned);
            push(format!("%Y-%m-%d{sep}{time}%:z"), PatternKind::Zoned);
        }
        push(format!("%Y/%m/%d{sep}%H:%M:%S%z"), PatternKind::Zoned);
    }

    for date in DATE_LAYOUTS.iter().chain(EXTRA_DATE_LAYOUTS.iter()) {
        push(date.to_string(), PatternKind::DateOnly);
    }
    push("%d %b %Y %H:%M:%S".to_string(), PatternKind::Naive);
    push("%d/%b/%Y:%H:%M:%S %z".to_string(), PatternKind::Zoned);

    for time in TIME_LAYOUTS {
        push(time.to_string(), PatternKind::TimeOnly);
    }

    patterns
}

/// Whether a string parses as a date, time or timestamp under any of the
/// known layouts (RFC 3339, RFC 2822 and the enumerated chrono patterns).
pub fn looks_temporal(value: &str) -> bool {
    let value = value.trim();
    if value.is_empty() {
        return false;
    }
    if DateTime::parse_from_rfc3339(value).is_ok() || DateTime::parse_from_rfc2822(value).is_ok() {
        return true;
    }

    TEMPORAL_PATTERNS.iter().any(|pattern| match pattern.kind {
        PatternKind::Zoned => DateTime::parse_from_str(value, &pattern.layout).is_ok(),
        PatternKind::Naive => NaiveDateTime::parse_from_str(value, &pattern.layout).is_ok(),
        PatternKind::DateOnly => NaiveDate::parse_from_str(value, &pattern.layout).is_ok(),
        PatternKind::TimeOnly => NaiveTime::parse_from_str(value, &pattern.layout).is_ok(),
    })
}

/// Number of enumerated temporal layouts, excluding RFC 3339 and RFC 2822
pub fn temporal_pattern_count() -> usize {
    TEMPORAL_PATTERNS.len()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_uuid() {
        assert_eq!(
            detect_format("550e8400-e29b-41d4-a716-446655440000"),
            Some(Format::Uuid)
        );
        assert_eq!(detect_format("550e8400e29b41d4a716446655440000"), None);
    }

    #[test]
    fn test_detect_temporal_shapes() {
        assert_eq!(detect_format("2024-01-15"), Some(Format::Date));
        assert_eq!(detect_format("2024-01-15T10:30:00Z"), Some(Format::DateTime));
        assert_eq!(detect_format("2023-07-03 00:00:00"), Some(Format::DateTime));
        assert_eq!(detect_format("10:30:00"), Some(Format::Time));
    }

    #[test]
    fn test_detect_network_formats() {
        assert_eq!(detect_format("user@example.com"), Some(Format::Email));
        assert_eq!(detect_format("https://example.com/a?b=c"), Some(Format::Uri));
        assert_eq!(detect_format("192.168.1.1"), Some(Format::Ipv4));
        assert_eq!(detect_format("2001:db8::ff00:42:8329"), Some(Format::Ipv6));
        assert_eq!(detect_format("::1"), Some(Format::Ipv6));
    }

    #[test]
    fn test_detect_credit_card() {
        assert_eq!(detect_format("4111 1111 1111 1111"), Some(Format::CreditCard));
        assert_eq!(detect_format("4111-1111-1111-1111"), Some(Format::CreditCard));
        assert_eq!(detect_format("4111 1111 1111 1112"), None);
    }

    #[test]
    fn test_empty_and_plain_text() {
        assert_eq!(detect_format(""), None);
        assert_eq!(detect_format("   "), None);
        assert_eq!(detect_format("hello world"), None);
    }

    #[test]
    fn test_epoch_bounds() {
        assert!(is_epoch_millis(EPOCH_LOWER_BOUND));
        assert!(is_epoch_millis(1_688_342_400_000));
        assert!(!is_epoch_millis(EPOCH_LOWER_BOUND - 1));
        assert!(!is_epoch_millis(42));
        assert!(!is_epoch_millis(i64::MAX));
    }

    #[test]
    fn test_epoch_strings_and_numbers() {
        assert!(is_epoch_string("1688342400"));
        assert!(!is_epoch_string("12345"));
        assert!(!is_epoch_string("-1688342400"));
        assert!(!is_epoch_string("99999999999999999999999"));
        assert!(is_epoch_number(&serde_json::Number::from(1_688_342_400i64)));
        assert!(!is_epoch_number(&serde_json::Number::from(7)));
    }

    #[test]
    fn test_looks_temporal() {
        assert!(looks_temporal("2023-07-03 00:00:00"));
        assert!(looks_temporal("2023-07-03T00:00:00.123Z"));
        assert!(looks_temporal("2023-07-03T00:00:00+05:30"));
        assert!(looks_temporal("03/07/2023 10:15"));
        assert!(looks_temporal("2023.07.03"));
        assert!(looks_temporal("3 Jul 2023"));
        assert!(looks_temporal("Mon, 03 Jul 2023 10:00:00 +0000"));
        assert!(looks_temporal("10:30:00"));
        assert!(!looks_temporal("2023-13-45"));
        assert!(!looks_temporal("not a date"));
        assert!(!looks_temporal(""));
    }

    #[test]
    fn test_pattern_table_size() {
        let count = temporal_pattern_count();
        assert!((75..=100).contains(&count), "unexpected pattern count {count}");
    }

    #[test]
    fn test_format_names_round_trip() {
        assert_eq!(Format::CreditCard.to_string(), "creditcard");
        assert_eq!("date-time".parse::<Format>(), Ok(Format::DateTime));
        assert_eq!(
            serde_json::to_value(Format::DateTime).unwrap(),
            serde_json::json!("date-time")
        );
    }
}
