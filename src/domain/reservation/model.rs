//! Reservation domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Reservation status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReservationStatus {
    /// Created but not yet confirmed
    Pending,
    /// Confirmed; holds a capacity commitment
    Confirmed,
    /// Cancelled by user or operator; no longer blocks any window
    Cancelled,
}

impl ReservationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Confirmed => "Confirmed",
            Self::Cancelled => "Cancelled",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Pending" => Self::Pending,
            "Confirmed" => Self::Confirmed,
            _ => Self::Cancelled,
        }
    }
}

impl std::fmt::Display for ReservationStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Forward booking of one capacity slot for a half-open time window
/// `[start, end)`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reservation {
    pub id: String,
    /// Owning user
    pub username: String,
    pub vehicle_id: String,
    pub lot_id: String,
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
    pub status: ReservationStatus,
    /// Operator-settable only
    pub cost: Option<Decimal>,
    pub created_at: DateTime<Utc>,
}

impl Reservation {
    pub fn new(
        id: impl Into<String>,
        username: impl Into<String>,
        vehicle_id: impl Into<String>,
        lot_id: impl Into<String>,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            username: username.into(),
            vehicle_id: vehicle_id.into(),
            lot_id: lot_id.into(),
            start,
            end,
            status: ReservationStatus::Confirmed,
            cost: None,
            created_at: Utc::now(),
        }
    }

    /// Cancel this reservation
    pub fn cancel(&mut self) {
        self.status = ReservationStatus::Cancelled;
    }

    /// Non-cancelled reservations block conflicting windows
    pub fn is_blocking(&self) -> bool {
        self.status != ReservationStatus::Cancelled
    }

    /// Half-open interval overlap: `[s1,e1)` and `[s2,e2)` overlap iff
    /// `s1 < e2 && s2 < e1`.
    pub fn overlaps(&self, start: DateTime<Utc>, end: DateTime<Utc>) -> bool {
        self.start < end && start < self.end
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone};

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 8, 23, hour, 0, 0).unwrap()
    }

    fn sample_reservation() -> Reservation {
        Reservation::new("1", "alice", "veh-1", "lot-1", at(10), at(12))
    }

    #[test]
    fn new_reservation_is_confirmed_and_blocking() {
        let r = sample_reservation();
        assert_eq!(r.status, ReservationStatus::Confirmed);
        assert!(r.is_blocking());
        assert!(r.cost.is_none());
    }

    #[test]
    fn stored_pending_reservation_still_blocks() {
        // Pending only enters through records persisted by the external
        // store; it must hold its slot like a confirmed one.
        let mut r = sample_reservation();
        r.status = ReservationStatus::from_str("Pending");
        assert!(r.is_blocking());
    }

    #[test]
    fn cancelled_reservation_does_not_block() {
        let mut r = sample_reservation();
        r.cancel();
        assert_eq!(r.status, ReservationStatus::Cancelled);
        assert!(!r.is_blocking());
    }

    #[test]
    fn overlap_is_half_open() {
        let r = sample_reservation(); // [10:00, 12:00)
        assert!(r.overlaps(at(11), at(13)));
        assert!(r.overlaps(at(9), at(11)));
        assert!(r.overlaps(at(10), at(12)));
        // Touching intervals do not overlap
        assert!(!r.overlaps(at(12), at(13)));
        assert!(!r.overlaps(at(8), at(10)));
    }

    #[test]
    fn contained_window_overlaps() {
        let r = sample_reservation();
        assert!(r.overlaps(at(10) + Duration::minutes(30), at(11)));
    }

    #[test]
    fn status_roundtrip() {
        for status in &[
            ReservationStatus::Pending,
            ReservationStatus::Confirmed,
            ReservationStatus::Cancelled,
        ] {
            assert_eq!(&ReservationStatus::from_str(status.as_str()), status);
        }
    }

    #[test]
    fn unknown_status_defaults_to_cancelled() {
        assert_eq!(
            ReservationStatus::from_str("Unknown"),
            ReservationStatus::Cancelled
        );
    }
}
