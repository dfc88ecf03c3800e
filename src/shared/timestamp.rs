//! Composite timestamp format
//!
//! Stored payment/refund records carry created/completed fields in a
//! legacy composite string format: `dd-mm-yyyy HH:MM:SS` immediately
//! followed by the unix epoch seconds, with no separator between the
//! seconds field and the epoch suffix (e.g. `23-08-2026 14:30:001787841800`).
//! The format must round-trip bit-for-bit against existing stored records,
//! so parsing cross-checks the human-readable prefix against the epoch.
//!
//! Everything else in the engine uses `chrono::DateTime<Utc>` and plain
//! ISO-8601 through serde.

use chrono::{DateTime, TimeZone, Utc};

use crate::domain::{DomainError, DomainResult};

/// Length of the `dd-mm-yyyy HH:MM:SS` prefix
const PREFIX_LEN: usize = 19;

/// Render a timestamp in the composite format (whole seconds)
pub fn format_composite(ts: DateTime<Utc>) -> String {
    format!("{}{}", ts.format("%d-%m-%Y %H:%M:%S"), ts.timestamp())
}

/// Current time in the composite format
pub fn now_composite() -> String {
    format_composite(Utc::now())
}

/// Parse a composite timestamp back to `DateTime<Utc>`.
///
/// Fails with `Validation` when the epoch suffix is malformed or does not
/// agree with the rendered prefix.
pub fn parse_composite(value: &str) -> DomainResult<DateTime<Utc>> {
    if value.len() <= PREFIX_LEN {
        return Err(DomainError::Validation(format!(
            "composite timestamp too short: {value:?}"
        )));
    }
    let (prefix, suffix) = value.split_at(PREFIX_LEN);

    let epoch: i64 = suffix.parse().map_err(|_| {
        DomainError::Validation(format!("composite timestamp epoch suffix invalid: {value:?}"))
    })?;
    let ts = Utc.timestamp_opt(epoch, 0).single().ok_or_else(|| {
        DomainError::Validation(format!("composite timestamp epoch out of range: {value:?}"))
    })?;

    let rendered = ts.format("%d-%m-%Y %H:%M:%S").to_string();
    if rendered != prefix {
        return Err(DomainError::Validation(format!(
            "composite timestamp prefix {prefix:?} does not match epoch {epoch}"
        )));
    }

    Ok(ts)
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn format_shape() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 23, 14, 30, 0).unwrap();
        let s = format_composite(ts);
        assert!(s.starts_with("23-08-2026 14:30:00"));
        assert_eq!(s, format!("23-08-2026 14:30:00{}", ts.timestamp()));
    }

    #[test]
    fn roundtrip_is_bit_for_bit() {
        let ts = Utc.with_ymd_and_hms(2019, 1, 2, 3, 4, 5).unwrap();
        let s = format_composite(ts);
        let parsed = parse_composite(&s).unwrap();
        assert_eq!(parsed, ts);
        assert_eq!(format_composite(parsed), s);
    }

    #[test]
    fn subsecond_precision_is_dropped() {
        let ts = Utc.timestamp_opt(1_700_000_000, 123_456_789).unwrap();
        let parsed = parse_composite(&format_composite(ts)).unwrap();
        assert_eq!(parsed.timestamp(), 1_700_000_000);
        assert_eq!(parsed.timestamp_subsec_nanos(), 0);
    }

    #[test]
    fn rejects_short_input() {
        assert!(parse_composite("23-08-2026 14:30:00").is_err());
        assert!(parse_composite("").is_err());
    }

    #[test]
    fn rejects_non_numeric_suffix() {
        assert!(parse_composite("23-08-2026 14:30:00abc").is_err());
    }

    #[test]
    fn rejects_mismatched_prefix() {
        let ts = Utc.with_ymd_and_hms(2026, 8, 23, 14, 30, 0).unwrap();
        let lying = format!("24-08-2026 14:30:00{}", ts.timestamp());
        assert!(parse_composite(&lying).is_err());
    }
}
