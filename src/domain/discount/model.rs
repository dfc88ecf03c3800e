//! Discount code domain entity

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// How the discount value is applied
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum DiscountKind {
    /// `value` percent off the charged amount (value ≤ 100)
    Percentage,
    /// `value` subtracted from the charged amount, floored at zero
    Fixed,
}

impl DiscountKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Percentage => "percentage",
            Self::Fixed => "fixed",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s {
            "percentage" => Some(Self::Percentage),
            "fixed" => Some(Self::Fixed),
            _ => None,
        }
    }
}

impl std::fmt::Display for DiscountKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Lot binding for manager-created "hotel" codes: the code is only valid
/// at one lot and only within the guest's stay window.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LotScope {
    pub lot_id: String,
    /// Username of the lot manager who created the code
    pub created_by: String,
    pub guest_name: String,
    pub check_in: DateTime<Utc>,
    pub check_out: DateTime<Utc>,
}

/// Redeemable token reducing a payment's charge.
///
/// Soft-deleted via `active = false`, never removed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountCode {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    /// Unset means unlimited
    pub max_uses: Option<u32>,
    pub current_uses: u32,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub expires_at: Option<DateTime<Utc>>,
    /// Set for lot-scoped hotel codes
    pub scope: Option<LotScope>,
}

impl DiscountCode {
    pub fn has_uses_left(&self) -> bool {
        self.max_uses.map_or(true, |max| self.current_uses < max)
    }

    pub fn is_expired(&self, as_of: DateTime<Utc>) -> bool {
        self.expires_at.map_or(false, |at| as_of > at)
    }

    /// Discount this code grants on `amount`, clamped to `[0, amount]`
    pub fn discount_on(&self, amount: Decimal) -> Decimal {
        let raw = match self.kind {
            DiscountKind::Percentage => (amount * self.value / Decimal::from(100)).round_dp(2),
            DiscountKind::Fixed => self.value,
        };
        raw.min(amount).max(Decimal::ZERO)
    }

    /// Count one redemption
    pub fn mark_used(&mut self) {
        self.current_uses += 1;
    }

    /// Soft-delete
    pub fn deactivate(&mut self) {
        self.active = false;
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    fn sample_code(kind: DiscountKind, value: Decimal) -> DiscountCode {
        DiscountCode {
            code: "SAVE10".into(),
            kind,
            value,
            max_uses: None,
            current_uses: 0,
            active: true,
            created_at: Utc::now(),
            expires_at: None,
            scope: None,
        }
    }

    #[test]
    fn percentage_discount() {
        let code = sample_code(DiscountKind::Percentage, dec("10"));
        assert_eq!(code.discount_on(dec("17.5")), dec("1.75"));
    }

    #[test]
    fn full_percentage_discount_covers_everything() {
        let code = sample_code(DiscountKind::Percentage, dec("100"));
        assert_eq!(code.discount_on(dec("42.13")), dec("42.13"));
    }

    #[test]
    fn fixed_discount_is_clamped_to_the_amount() {
        let code = sample_code(DiscountKind::Fixed, dec("20"));
        assert_eq!(code.discount_on(dec("12.50")), dec("12.50"));
        assert_eq!(code.discount_on(dec("30")), dec("20"));
    }

    #[test]
    fn unlimited_code_always_has_uses_left() {
        let mut code = sample_code(DiscountKind::Fixed, dec("5"));
        code.current_uses = 10_000;
        assert!(code.has_uses_left());
    }

    #[test]
    fn max_uses_is_enforced() {
        let mut code = sample_code(DiscountKind::Fixed, dec("5"));
        code.max_uses = Some(1);
        assert!(code.has_uses_left());
        code.mark_used();
        assert!(!code.has_uses_left());
    }

    #[test]
    fn expiry_is_checked_against_as_of() {
        let mut code = sample_code(DiscountKind::Fixed, dec("5"));
        let now = Utc::now();
        code.expires_at = Some(now + Duration::days(1));
        assert!(!code.is_expired(now));
        assert!(code.is_expired(now + Duration::days(2)));
    }

    #[test]
    fn deactivate_is_soft() {
        let mut code = sample_code(DiscountKind::Fixed, dec("5"));
        code.deactivate();
        assert!(!code.active);
        assert_eq!(code.code, "SAVE10");
    }

    #[test]
    fn kind_roundtrip() {
        for kind in &[DiscountKind::Percentage, DiscountKind::Fixed] {
            assert_eq!(DiscountKind::from_str(kind.as_str()).as_ref(), Some(kind));
        }
        assert!(DiscountKind::from_str("bogus").is_none());
    }
}
