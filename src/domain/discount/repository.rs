//! Discount code repository interface

use async_trait::async_trait;

use super::model::DiscountCode;
use crate::domain::DomainResult;

#[async_trait]
pub trait DiscountRepository: Send + Sync {
    /// Save a new code; fails with `Conflict` when the code already exists
    async fn save(&self, code: DiscountCode) -> DomainResult<()>;

    /// Find a code by its string
    async fn find_by_code(&self, code: &str) -> DomainResult<Option<DiscountCode>>;

    /// Update an existing code
    async fn update(&self, code: DiscountCode) -> DomainResult<()>;

    /// Find all codes (active and inactive)
    async fn find_all(&self) -> DomainResult<Vec<DiscountCode>>;
}
