//! Parking session domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Settlement status of a session
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum PaymentStatus {
    /// No payment recorded yet
    Pending,
    /// A payment has been recorded for this session
    Paid,
}

impl PaymentStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Paid => "Paid",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "Paid" => Self::Paid,
            _ => Self::Pending,
        }
    }
}

impl std::fmt::Display for PaymentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Record of a vehicle's physical occupancy of a lot.
///
/// Opens on entry and closes exactly once on exit; immutable thereafter
/// except for `payment_status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingSession {
    pub id: String,
    pub lot_id: String,
    pub license_plate: String,
    pub username: String,
    pub started_at: DateTime<Utc>,
    /// Unset while the session is open
    pub stopped_at: Option<DateTime<Utc>>,
    /// Whole minutes between start and stop, set at close
    pub duration_minutes: Option<i64>,
    /// Set at close from the lot's tariff schedule
    pub cost: Option<Decimal>,
    pub payment_status: PaymentStatus,
}

impl ParkingSession {
    pub fn new(
        id: impl Into<String>,
        lot_id: impl Into<String>,
        license_plate: impl Into<String>,
        username: impl Into<String>,
        started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: id.into(),
            lot_id: lot_id.into(),
            license_plate: license_plate.into(),
            username: username.into(),
            started_at,
            stopped_at: None,
            duration_minutes: None,
            cost: None,
            payment_status: PaymentStatus::Pending,
        }
    }

    pub fn is_open(&self) -> bool {
        self.stopped_at.is_none()
    }

    /// Close the session and return the elapsed whole minutes.
    ///
    /// `duration_minutes = floor(elapsed seconds / 60)`; the caller prices
    /// the duration and stores the cost.
    pub fn close(&mut self, stopped_at: DateTime<Utc>) -> i64 {
        let seconds = (stopped_at - self.started_at).num_seconds().max(0);
        let minutes = seconds / 60;
        self.stopped_at = Some(stopped_at);
        self.duration_minutes = Some(minutes);
        minutes
    }

    /// Record that a payment settled this session
    pub fn mark_paid(&mut self) {
        self.payment_status = PaymentStatus::Paid;
    }
}

// ── Tests ──────────────────────────────────────────────────────
