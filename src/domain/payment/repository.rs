//! Payment and refund repository interfaces

use async_trait::async_trait;

use super::model::{Payment, Refund};
use crate::domain::DomainResult;

#[async_trait]
pub trait PaymentRepository: Send + Sync {
    /// Save a new payment
    async fn save(&self, payment: Payment) -> DomainResult<()>;

    /// Find payment by transaction id
    async fn find_by_transaction_id(&self, transaction_id: &str)
        -> DomainResult<Option<Payment>>;

    /// Update an existing payment
    async fn update(&self, payment: Payment) -> DomainResult<()>;

    /// Find all payments settling a session
    async fn find_by_session(&self, session_id: &str) -> DomainResult<Vec<Payment>>;

    /// Find all payments initiated by a user
    async fn find_by_user(&self, username: &str) -> DomainResult<Vec<Payment>>;

    /// Find all payments
    async fn find_all(&self) -> DomainResult<Vec<Payment>>;
}

#[async_trait]
pub trait RefundRepository: Send + Sync {
    /// Save a new refund
    async fn save(&self, refund: Refund) -> DomainResult<()>;

    /// Find refund by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Refund>>;

    /// Find all refunds against a payment transaction
    async fn find_by_transaction(&self, transaction_id: &str) -> DomainResult<Vec<Refund>>;

    /// Find all refunds
    async fn find_all(&self) -> DomainResult<Vec<Refund>>;
}
