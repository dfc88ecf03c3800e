//! Payment and refund domain entities
//!
//! Created/completed fields are persisted in the composite
//! `dd-mm-yyyy HH:MM:SS<unix-epoch>` string format (see
//! [`crate::shared::timestamp`]) for compatibility with existing stored
//! records; they round-trip bit-for-bit.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use uuid::Uuid;

/// Nested method/issuer detail recorded with a payment
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TransactionDetail {
    pub method: String,
    pub issuer: String,
    pub bank: String,
    pub amount: Decimal,
    /// ISO 4217 code, from engine configuration
    pub currency: String,
}

/// Discount applied to a payment, kept for audit
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DiscountMeta {
    pub code: String,
    pub original_amount: Decimal,
    pub discount_amount: Decimal,
}

/// A user's settlement of a parking session.
///
/// Never deleted; `amount` is mutable only by an administrator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Payment {
    /// Opaque transaction hash, unique per payment
    pub transaction_id: String,
    pub amount: Decimal,
    /// Initiating user
    pub username: String,
    /// Composite-format creation timestamp
    pub created_at: String,
    /// Composite-format completion timestamp
    pub completed_at: String,
    pub detail: TransactionDetail,
    pub session_id: String,
    pub lot_id: String,
    pub discount: Option<DiscountMeta>,
}

/// Generate an opaque payment transaction id: sha256 over a fresh UUID,
/// hex encoded.
pub fn generate_transaction_id() -> String {
    let digest = Sha256::digest(Uuid::new_v4().as_bytes());
    hex::encode(digest)
}

/// Refund status
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RefundStatus {
    Completed,
}

impl RefundStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Completed => "completed",
        }
    }
}

impl std::fmt::Display for RefundStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Partial or full return of a payment, created by an administrator.
/// Immutable once completed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Refund {
    pub id: String,
    /// Transaction id of the original payment
    pub transaction_id: String,
    pub amount: Decimal,
    pub reason: String,
    /// Administrator who processed the refund
    pub processed_by: String,
    pub status: RefundStatus,
    /// Composite-format creation timestamp
    pub created_at: String,
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transaction_ids_are_unique_hex_digests() {
        let a = generate_transaction_id();
        let b = generate_transaction_id();
        assert_ne!(a, b);
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_hexdigit()));
    }

    #[test]
    fn refund_status_renders_lowercase() {
        assert_eq!(RefundStatus::Completed.to_string(), "completed");
    }

    #[test]
    fn payment_json_roundtrip() {
        let payment = Payment {
            transaction_id: generate_transaction_id(),
            amount: Decimal::new(1575, 2),
            username: "alice".to_string(),
            created_at: "23-08-2026 14:30:001787841800".to_string(),
            completed_at: "23-08-2026 14:30:001787841800".to_string(),
            detail: TransactionDetail {
                method: "card".to_string(),
                issuer: "visa".to_string(),
                bank: "test-bank".to_string(),
                amount: Decimal::new(1575, 2),
                currency: "EUR".to_string(),
            },
            session_id: "s-1".to_string(),
            lot_id: "lot-1".to_string(),
            discount: Some(DiscountMeta {
                code: "SAVE10".to_string(),
                original_amount: Decimal::new(175, 1),
                discount_amount: Decimal::new(175, 2),
            }),
        };

        let json = serde_json::to_string(&payment).unwrap();
        let back: Payment = serde_json::from_str(&json).unwrap();
        assert_eq!(back.transaction_id, payment.transaction_id);
        assert_eq!(back.amount, payment.amount);
        assert_eq!(back.discount.unwrap().code, "SAVE10");
        assert_eq!(back.created_at, payment.created_at);
    }
}
