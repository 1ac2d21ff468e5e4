//! Exam time (TOE) and exam duration (DOE) value types.
//!
//! Both travel as text on the wire: the time as RFC3339, the duration in the
//! `1h30m0s` notation the ledger has always used.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, FixedOffset, SecondsFormat, Utc};
use serde::{de, Deserialize, Deserializer, Serialize, Serializer};
use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum ExamFormatError {
    #[error("Invalid Time of Exam format: '{0}' (expected RFC3339)")]
    InvalidTime(String),

    #[error("Invalid Duration of Exam format: '{0}'")]
    InvalidDuration(String),
}

// ────────────────────────────────────────────────────────────────────────────
// ExamTime
// ────────────────────────────────────────────────────────────────────────────

/// The logical key of an allocation run.
///
/// Equality is instant equality: `10:00Z` and `15:30+05:30` are the same exam time.
/// The caller's UTC offset is kept so the ledger echoes back what was sent.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamTime(DateTime<FixedOffset>);

impl ExamTime {
    pub fn parse(raw: &str) -> Result<Self, ExamFormatError> {
        DateTime::parse_from_rfc3339(raw.trim())
            .map(ExamTime)
            .map_err(|_| ExamFormatError::InvalidTime(raw.to_string()))
    }

    pub fn to_rfc3339(&self) -> String {
        self.0.to_rfc3339_opts(SecondsFormat::AutoSi, true)
    }

    pub fn instant(&self) -> DateTime<Utc> {
        self.0.with_timezone(&Utc)
    }
}

impl fmt::Display for ExamTime {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_rfc3339())
    }
}

impl Serialize for ExamTime {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_rfc3339())
    }
}

impl<'de> Deserialize<'de> for ExamTime {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ExamTime::parse(&raw).map_err(de::Error::custom)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// ExamDuration
// ────────────────────────────────────────────────────────────────────────────

const NANOS_PER_SECOND: u128 = 1_000_000_000;

/// Units accepted by [`ExamDuration::parse`], longest suffix first so `ms` wins over `m`.
const UNITS: &[(&str, u128)] = &[
    ("ns", 1),
    ("us", 1_000),
    ("µs", 1_000),
    ("μs", 1_000),
    ("ms", 1_000_000),
    ("s", NANOS_PER_SECOND),
    ("m", 60 * NANOS_PER_SECOND),
    ("h", 3_600 * NANOS_PER_SECOND),
];

/// Length of an exam, written as a sequence of `<number><unit>` terms
/// (`3h`, `1h30m`, `90m`, `1.5h`, `2h0m0s`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct ExamDuration(Duration);

impl ExamDuration {
    pub fn from_duration(duration: Duration) -> Self {
        ExamDuration(duration)
    }

    pub fn as_duration(&self) -> Duration {
        self.0
    }

    pub fn parse(raw: &str) -> Result<Self, ExamFormatError> {
        let invalid = || ExamFormatError::InvalidDuration(raw.to_string());
        let text = raw.trim();
        if text == "0" {
            return Ok(ExamDuration(Duration::ZERO));
        }
        if text.is_empty() {
            return Err(invalid());
        }

        let mut total: u128 = 0;
        let mut rest = text;
        while !rest.is_empty() {
            let number_len = rest
                .find(|c: char| !(c.is_ascii_digit() || c == '.'))
                .ok_or_else(invalid)?;
            let (number, tail) = rest.split_at(number_len);

            let (unit, scale) = UNITS
                .iter()
                .filter(|(suffix, _)| tail.starts_with(suffix))
                .max_by_key(|(suffix, _)| suffix.len())
                .ok_or_else(invalid)?;

            total = total
                .checked_add(scaled_term(number, *scale).ok_or_else(invalid)?)
                .ok_or_else(invalid)?;
            rest = &tail[unit.len()..];
        }

        let secs = u64::try_from(total / NANOS_PER_SECOND).map_err(|_| invalid())?;
        let nanos = (total % NANOS_PER_SECOND) as u32;
        Ok(ExamDuration(Duration::new(secs, nanos)))
    }
}

/// `number` (decimal, optional fraction) times `scale` nanoseconds.
fn scaled_term(number: &str, scale: u128) -> Option<u128> {
    let (whole, fraction) = match number.split_once('.') {
        Some((w, f)) => (w, f),
        None => (number, ""),
    };
    if whole.is_empty() && fraction.is_empty() {
        return None;
    }

    let whole: u128 = if whole.is_empty() { 0 } else { whole.parse().ok()? };
    let mut value = whole.checked_mul(scale)?;

    // Digits beyond nanosecond precision are dropped.
    let mut place = scale;
    for digit in fraction.chars() {
        let digit = digit.to_digit(10)? as u128;
        place /= 10;
        value = value.checked_add(digit * place)?;
    }
    Some(value)
}

/// Writes `value` with `precision` implied decimal places, trimming trailing zeros.
fn write_decimal(f: &mut fmt::Formatter<'_>, value: u128, precision: u32) -> fmt::Result {
    let divisor = 10u128.pow(precision);
    write!(f, "{}", value / divisor)?;
    let fraction = value % divisor;
    if fraction > 0 {
        let digits = format!("{:0width$}", fraction, width = precision as usize);
        write!(f, ".{}", digits.trim_end_matches('0'))?;
    }
    Ok(())
}

impl fmt::Display for ExamDuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let nanos = self.0.as_nanos();
        if nanos == 0 {
            return f.write_str("0s");
        }

        if nanos < NANOS_PER_SECOND {
            let (precision, unit) = match nanos {
                n if n < 1_000 => (0, "ns"),
                n if n < 1_000_000 => (3, "µs"),
                _ => (6, "ms"),
            };
            write_decimal(f, nanos, precision)?;
            return f.write_str(unit);
        }

        let secs = self.0.as_secs();
        let hours = secs / 3_600;
        let minutes = (secs % 3_600) / 60;
        if hours > 0 {
            write!(f, "{hours}h{minutes}m")?;
        } else if minutes > 0 {
            write!(f, "{minutes}m")?;
        }
        let sub_minute = (secs % 60) as u128 * NANOS_PER_SECOND + self.0.subsec_nanos() as u128;
        write_decimal(f, sub_minute, 9)?;
        f.write_str("s")
    }
}

impl Serialize for ExamDuration {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for ExamDuration {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(deserializer)?;
        ExamDuration::parse(&raw).map_err(de::Error::custom)
    }
}

/// Time and length of one exam sitting, validated together before an allocation run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExamWindow {
    pub toe: ExamTime,
    pub doe: ExamDuration,
}

impl ExamWindow {
    pub fn parse(toe: &str, doe: &str) -> Result<Self, ExamFormatError> {
        Ok(ExamWindow {
            toe: ExamTime::parse(toe)?,
            doe: ExamDuration::parse(doe)?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_time_equality_ignores_offset() {
        let utc = ExamTime::parse("2024-05-10T10:00:00Z").unwrap();
        let ist = ExamTime::parse("2024-05-10T15:30:00+05:30").unwrap();
        assert_eq!(utc, ist);
        assert_eq!(ist.to_rfc3339(), "2024-05-10T15:30:00+05:30");
    }

    #[test]
    fn test_time_rejects_non_rfc3339() {
        assert_eq!(
            ExamTime::parse("2024-05-10 10:00"),
            Err(ExamFormatError::InvalidTime("2024-05-10 10:00".to_string()))
        );
    }

    #[test]
    fn test_utc_time_formats_with_z() {
        let t = ExamTime::parse("2024-05-10T10:00:00+00:00").unwrap();
        assert_eq!(t.to_rfc3339(), "2024-05-10T10:00:00Z");
    }

    #[test]
    fn test_duration_parse_common_forms() {
        let cases = [
            ("3h", 3 * 3600),
            ("1h30m", 5400),
            ("90m", 5400),
            ("2h0m0s", 7200),
            ("1.5h", 5400),
            ("45s", 45),
            ("0", 0),
        ];
        for (raw, secs) in cases {
            let parsed = ExamDuration::parse(raw).unwrap();
            assert_eq!(parsed.as_duration(), Duration::from_secs(secs), "parsing {raw}");
        }
    }

    #[test]
    fn test_duration_parse_sub_second_units() {
        let parsed = ExamDuration::parse("1s500ms").unwrap();
        assert_eq!(parsed.as_duration(), Duration::from_millis(1500));
    }

    #[test]
    fn test_duration_rejects_garbage() {
        for raw in ["", "3", "h", "3x", "1h-5m", "..h", "three hours"] {
            assert!(ExamDuration::parse(raw).is_err(), "{raw} should not parse");
        }
    }

    #[test]
    fn test_duration_display() {
        let display = |secs: u64| ExamDuration::from_duration(Duration::from_secs(secs)).to_string();
        assert_eq!(display(0), "0s");
        assert_eq!(display(30), "30s");
        assert_eq!(display(45 * 60), "45m0s");
        assert_eq!(display(5400), "1h30m0s");
        assert_eq!(display(3 * 3600), "3h0m0s");
        assert_eq!(
            ExamDuration::from_duration(Duration::from_millis(61_500)).to_string(),
            "1m1.5s"
        );
        assert_eq!(
            ExamDuration::from_duration(Duration::from_micros(1_500)).to_string(),
            "1.5ms"
        );
    }

    #[test]
    fn test_duration_display_reparses() {
        let d = ExamDuration::parse("2h15m").unwrap();
        assert_eq!(ExamDuration::parse(&d.to_string()).unwrap(), d);
    }

    #[test]
    fn test_window_reports_first_bad_field() {
        assert!(matches!(
            ExamWindow::parse("nope", "3h"),
            Err(ExamFormatError::InvalidTime(_))
        ));
        assert!(matches!(
            ExamWindow::parse("2024-05-10T10:00:00Z", "soon"),
            Err(ExamFormatError::InvalidDuration(_))
        ));
    }
}
