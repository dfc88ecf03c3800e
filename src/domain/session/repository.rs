//! Parking session repository interface

use async_trait::async_trait;

use super::model::ParkingSession;
use crate::domain::DomainResult;

#[async_trait]
pub trait SessionRepository: Send + Sync {
    /// Save a new session
    async fn save(&self, session: ParkingSession) -> DomainResult<()>;

    /// Update an existing session
    async fn update(&self, session: ParkingSession) -> DomainResult<()>;

    /// Find session by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingSession>>;

    /// Find the open session for a (lot, license plate) pair, if any
    async fn find_open(
        &self,
        lot_id: &str,
        license_plate: &str,
    ) -> DomainResult<Option<ParkingSession>>;

    /// Find all sessions for a lot
    async fn find_by_lot(&self, lot_id: &str) -> DomainResult<Vec<ParkingSession>>;

    /// Find all sessions for a user
    async fn find_by_user(&self, username: &str) -> DomainResult<Vec<ParkingSession>>;

    /// Find all sessions
    async fn find_all(&self) -> DomainResult<Vec<ParkingSession>>;
}
