//! Lot repository interface

use async_trait::async_trait;

use super::model::ParkingLot;
use crate::domain::DomainResult;

#[async_trait]
pub trait LotRepository: Send + Sync {
    /// Save a new lot
    async fn save(&self, lot: ParkingLot) -> DomainResult<()>;

    /// Find lot by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingLot>>;

    /// Update an existing lot
    async fn update(&self, lot: ParkingLot) -> DomainResult<()>;

    /// Find all lots
    async fn find_all(&self) -> DomainResult<Vec<ParkingLot>>;

    /// Delete a lot by ID
    async fn delete(&self, id: &str) -> DomainResult<()>;
}
