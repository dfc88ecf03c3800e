//! Parking lot domain entity

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Geographic position of a lot
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

/// Parking lot with finite capacity and a two-tier tariff schedule
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParkingLot {
    pub id: String,
    pub name: String,
    /// Total number of spots
    pub capacity: u32,
    /// Spots committed to confirmed reservations, independent of live
    /// occupancy. Only the capacity ledger mutates this.
    pub reserved: u32,
    /// Price per started hour
    pub tariff: Decimal,
    /// Flat price per whole elapsed day once duration reaches 24h
    pub day_tariff: Decimal,
    pub location: GeoLocation,
}

impl ParkingLot {
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        capacity: u32,
        tariff: Decimal,
        day_tariff: Decimal,
        location: GeoLocation,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            capacity,
            reserved: 0,
            tariff,
            day_tariff,
            location,
        }
    }

    /// True while at least one capacity slot is uncommitted
    pub fn has_headroom(&self) -> bool {
        self.reserved < self.capacity
    }

    /// Price a session duration against this lot's tariff schedule.
    ///
    /// Started hours are rounded up and charged at `tariff`. Once the
    /// duration reaches a whole day, each 24h block is charged at
    /// `day_tariff` and only the remainder hours at the hourly rate.
    /// A zero (or still running) duration costs nothing.
    ///
    /// The same breakdown is re-derived by billing reconciliation so the
    /// statement view and the session's stored cost cannot diverge.
    pub fn price_breakdown(&self, duration_minutes: i64) -> PriceBreakdown {
        if duration_minutes <= 0 {
            return PriceBreakdown {
                hours: 0,
                days: 0,
                amount: Decimal::ZERO,
            };
        }

        let hours = (duration_minutes + 59) / 60;
        let days = hours / 24;
        let remainder_hours = hours - days * 24;

        let amount =
            Decimal::from(days) * self.day_tariff + Decimal::from(remainder_hours) * self.tariff;

        PriceBreakdown {
            hours,
            days,
            amount,
        }
    }

    /// Total cost for a session duration
    pub fn price(&self, duration_minutes: i64) -> Decimal {
        self.price_breakdown(duration_minutes).amount
    }
}

/// Hours/days split and total for a priced duration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PriceBreakdown {
    /// Started hours (ceiling of minutes / 60)
    pub hours: i64,
    /// Whole 24h blocks charged at the day rate
    pub days: i64,
    pub amount: Decimal,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample_lot() -> ParkingLot {
        ParkingLot::new(
            "lot-1",
            "Central",
            10,
            dec("3.5"),
            dec("25.0"),
            GeoLocation {
                latitude: 52.37,
                longitude: 4.89,
            },
        )
    }

    #[test]
    fn zero_duration_costs_nothing() {
        let lot = sample_lot();
        let bd = lot.price_breakdown(0);
        assert_eq!(bd.hours, 0);
        assert_eq!(bd.days, 0);
        assert_eq!(bd.amount, Decimal::ZERO);
    }

    #[test]
    fn negative_duration_costs_nothing() {
        let lot = sample_lot();
        assert_eq!(lot.price(-30), Decimal::ZERO);
    }

    #[test]
    fn started_hour_is_charged_in_full() {
        let lot = sample_lot();
        // 1 minute rounds up to one hour
        assert_eq!(lot.price(1), dec("3.5"));
        assert_eq!(lot.price(60), dec("3.5"));
        assert_eq!(lot.price(61), dec("7.0"));
    }

    #[test]
    fn four_and_a_half_hours() {
        let lot = sample_lot();
        // 270 min → 5 started hours → 5 * 3.5
        let bd = lot.price_breakdown(270);
        assert_eq!(bd.hours, 5);
        assert_eq!(bd.days, 0);
        assert_eq!(bd.amount, dec("17.5"));
    }

    #[test]
    fn exactly_one_day_charges_the_day_rate() {
        let lot = sample_lot();
        let bd = lot.price_breakdown(24 * 60);
        assert_eq!(bd.hours, 24);
        assert_eq!(bd.days, 1);
        assert_eq!(bd.amount, dec("25.0"));
    }

    #[test]
    fn day_rate_plus_remainder_hours() {
        let lot = sample_lot();
        // 25h30m → 26 started hours → 1 day + 2 hours
        let bd = lot.price_breakdown(25 * 60 + 30);
        assert_eq!(bd.hours, 26);
        assert_eq!(bd.days, 1);
        assert_eq!(bd.amount, dec("25.0") + dec("7.0"));
    }

    #[test]
    fn two_whole_days() {
        let lot = sample_lot();
        let bd = lot.price_breakdown(48 * 60);
        assert_eq!(bd.days, 2);
        assert_eq!(bd.amount, dec("50.0"));
    }

    #[test]
    fn pricing_is_monotonic_when_day_rate_is_not_a_discount() {
        let mut lot = sample_lot();
        lot.day_tariff = dec("84.0"); // 24 * 3.5
        let mut last = Decimal::ZERO;
        for minutes in (0..=3 * 24 * 60).step_by(17) {
            let amount = lot.price(minutes);
            assert!(amount >= last, "price dropped at {} minutes", minutes);
            last = amount;
        }
    }

    #[test]
    fn cheap_day_rate_wins_at_the_boundary() {
        // With day_tariff below 24x hourly the 24h mark charges the day
        // rate, not 24 hourly blocks.
        let lot = sample_lot();
        assert_eq!(lot.price(23 * 60), dec("80.5"));
        assert_eq!(lot.price(24 * 60), dec("25.0"));
    }

    #[test]
    fn headroom_tracks_reserved_count() {
        let mut lot = sample_lot();
        assert!(lot.has_headroom());
        lot.reserved = 10;
        assert!(!lot.has_headroom());
    }
}
