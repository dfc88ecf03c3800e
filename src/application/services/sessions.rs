//! Parking session lifecycle: open on entry, close exactly once on exit.
//!
//! At most one open session may exist per (lot, license plate) pair.
//! Start and stop each run under the pair's key guard, so the
//! find-open-then-write sequence cannot interleave with a concurrent
//! start or stop for the same vehicle at the same lot. Closing prices
//! the elapsed duration against the lot's tariff schedule and leaves the
//! session awaiting payment.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;
use uuid::Uuid;

use crate::domain::{
    DomainError, DomainResult, IdentityProvider, ParkingSession, RepositoryProvider, User,
};
use crate::shared::KeyLocks;

fn session_key(lot_id: &str, license_plate: &str) -> String {
    format!("session:{lot_id}:{license_plate}")
}

/// Service governing the parking session state machine
pub struct SessionService {
    repos: Arc<dyn RepositoryProvider>,
    identity: Arc<dyn IdentityProvider>,
    locks: Arc<KeyLocks>,
}

impl SessionService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        identity: Arc<dyn IdentityProvider>,
        locks: Arc<KeyLocks>,
    ) -> Self {
        Self {
            repos,
            identity,
            locks,
        }
    }

    /// Open a session on a vehicle's entry.
    ///
    /// Fails with `Conflict` when an open session already exists for the
    /// (lot, plate) pair.
    pub async fn start(
        &self,
        lot_id: &str,
        license_plate: &str,
        username: &str,
    ) -> DomainResult<ParkingSession> {
        self.repos
            .lots()
            .find_by_id(lot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("parking lot", "id", lot_id))?;

        let _guard = self.locks.acquire(&session_key(lot_id, license_plate)).await;

        if let Some(open) = self.repos.sessions().find_open(lot_id, license_plate).await? {
            return Err(DomainError::conflict(format!(
                "session {} is already open for plate {} at lot {}",
                open.id, license_plate, lot_id
            )));
        }

        let session = ParkingSession::new(
            Uuid::new_v4().to_string(),
            lot_id,
            license_plate,
            username,
            Utc::now(),
        );
        self.repos.sessions().save(session.clone()).await?;

        info!(
            session_id = %session.id,
            lot_id = %lot_id,
            plate = %license_plate,
            user = %username,
            "Parking session started"
        );
        Ok(session)
    }

    /// Close the open session for a (lot, plate) pair.
    ///
    /// Only the owning user or an administrator may close it. A second
    /// close finds no open session and fails with `NotFound`.
    pub async fn stop(
        &self,
        token: &str,
        lot_id: &str,
        license_plate: &str,
    ) -> DomainResult<ParkingSession> {
        let caller = self.caller(token).await?;

        let _guard = self.locks.acquire(&session_key(lot_id, license_plate)).await;

        let mut session = self
            .repos
            .sessions()
            .find_open(lot_id, license_plate)
            .await?
            .ok_or_else(|| {
                DomainError::not_found("open parking session", "license_plate", license_plate)
            })?;

        if session.username != caller.username && !caller.is_admin() {
            return Err(DomainError::Forbidden(format!(
                "user {} may not close a session owned by {}",
                caller.username, session.username
            )));
        }

        let lot = self
            .repos
            .lots()
            .find_by_id(lot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("parking lot", "id", lot_id))?;

        let duration_minutes = session.close(Utc::now());
        let cost = lot.price(duration_minutes);
        session.cost = Some(cost);
        self.repos.sessions().update(session.clone()).await?;

        info!(
            session_id = %session.id,
            lot_id = %lot_id,
            plate = %license_plate,
            duration_minutes,
            cost = %cost,
            "Parking session closed"
        );
        Ok(session)
    }

    /// The open session for a (lot, plate) pair, if any
    pub async fn find_open(
        &self,
        lot_id: &str,
        license_plate: &str,
    ) -> DomainResult<Option<ParkingSession>> {
        self.repos.sessions().find_open(lot_id, license_plate).await
    }

    pub async fn list_for_lot(&self, lot_id: &str) -> DomainResult<Vec<ParkingSession>> {
        self.repos.sessions().find_by_lot(lot_id).await
    }

    pub async fn list_for_user(&self, username: &str) -> DomainResult<Vec<ParkingSession>> {
        self.repos.sessions().find_by_user(username).await
    }

    async fn caller(&self, token: &str) -> DomainResult<User> {
        self.identity
            .resolve(token)
            .await?
            .ok_or_else(|| DomainError::Forbidden("unknown session token".to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────────
