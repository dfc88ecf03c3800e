//! Repository traits for the domain layer
//!
//! Contains:
//! - `RepositoryProvider`: unified access to all per-aggregate repositories
//! - `DomainResult`: standard result type for domain operations

use super::discount::DiscountRepository;
use super::lot::LotRepository;
use super::payment::{PaymentRepository, RefundRepository};
use super::reservation::ReservationRepository;
use super::session::SessionRepository;
use crate::domain::error::DomainError;

/// Result type for domain operations
pub type DomainResult<T> = Result<T, DomainError>;

// ── RepositoryProvider ──────────────────────────────────────────

/// Provides access to all domain repositories.
///
/// Consumers request only the repository they need:
///
/// ```ignore
/// async fn handle(repos: &dyn RepositoryProvider) {
///     let lot = repos.lots().find_by_id("lot-1").await?;
///     let open = repos.sessions().find_open("lot-1", "AB-123-C").await?;
/// }
/// ```
pub trait RepositoryProvider: Send + Sync {
    fn lots(&self) -> &dyn LotRepository;
    fn reservations(&self) -> &dyn ReservationRepository;
    fn sessions(&self) -> &dyn SessionRepository;
    fn payments(&self) -> &dyn PaymentRepository;
    fn refunds(&self) -> &dyn RefundRepository;
    fn discounts(&self) -> &dyn DiscountRepository;
}
