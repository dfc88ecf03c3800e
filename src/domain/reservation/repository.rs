//! Reservation repository interface

use async_trait::async_trait;

use super::model::Reservation;
use crate::domain::DomainResult;

#[async_trait]
pub trait ReservationRepository: Send + Sync {
    /// Save a new reservation
    async fn save(&self, reservation: Reservation) -> DomainResult<()>;

    /// Find reservation by ID
    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Reservation>>;

    /// Update an existing reservation
    async fn update(&self, reservation: Reservation) -> DomainResult<()>;

    /// Delete a reservation by ID
    async fn delete(&self, id: &str) -> DomainResult<()>;

    /// Find all reservations for a lot (any status)
    async fn find_by_lot(&self, lot_id: &str) -> DomainResult<Vec<Reservation>>;

    /// Find all reservations owned by a user
    async fn find_by_user(&self, username: &str) -> DomainResult<Vec<Reservation>>;

    /// Find all reservations
    async fn find_all(&self) -> DomainResult<Vec<Reservation>>;

    /// Generate next reservation ID
    async fn next_id(&self) -> String;
}
