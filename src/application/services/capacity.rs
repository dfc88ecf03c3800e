//! Capacity ledger: the `reserved` counter per lot and its mutation
//! discipline.
//!
//! The counter only moves through [`CapacityLedger::reserve`] and
//! [`CapacityLedger::release`]; every mutation runs under the lot's key
//! guard so `0 ≤ reserved ≤ capacity` holds even under concurrent
//! requests.

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::{DomainError, DomainResult, RepositoryProvider};
use crate::shared::KeyLocks;

pub(crate) fn lot_key(lot_id: &str) -> String {
    format!("lot:{lot_id}")
}

/// Service owning the per-lot reserved counter
#[derive(Clone)]
pub struct CapacityLedger {
    repos: Arc<dyn RepositoryProvider>,
    locks: Arc<KeyLocks>,
}

impl CapacityLedger {
    pub fn new(repos: Arc<dyn RepositoryProvider>, locks: Arc<KeyLocks>) -> Self {
        Self { repos, locks }
    }

    /// Commit `amount` slots on a lot. Fails with `Conflict` when the lot
    /// lacks headroom; returns the new reserved count otherwise.
    pub async fn reserve(&self, lot_id: &str, amount: u32) -> DomainResult<u32> {
        let _guard = self.locks.acquire(&lot_key(lot_id)).await;
        self.reserve_locked(lot_id, amount).await
    }

    /// Release `amount` slots on a lot, flooring at zero. The clamp
    /// protects against double-release races; only a missing lot fails.
    pub async fn release(&self, lot_id: &str, amount: u32) -> DomainResult<u32> {
        let _guard = self.locks.acquire(&lot_key(lot_id)).await;
        self.release_locked(lot_id, amount).await
    }

    /// Move one commitment from lot `from` to lot `to` as a single unit.
    ///
    /// Both lot guards are held for the duration; when the destination
    /// lacks room the source commitment is restored before returning, so
    /// no intermediate state is ever visible.
    pub async fn transfer(&self, from: &str, to: &str) -> DomainResult<()> {
        if from == to {
            return Ok(());
        }
        let _guards = self.locks.acquire_pair(&lot_key(from), &lot_key(to)).await;

        let source_reserved = self
            .repos
            .lots()
            .find_by_id(from)
            .await?
            .ok_or_else(|| DomainError::not_found("parking lot", "id", from))?
            .reserved;

        self.release_locked(from, 1).await?;
        if let Err(e) = self.reserve_locked(to, 1).await {
            // Restore the source only if the release actually decremented
            if source_reserved > 0 {
                self.reserve_locked(from, 1).await?;
            }
            return Err(e);
        }

        info!(from = %from, to = %to, "Moved capacity commitment between lots");
        Ok(())
    }

    /// Reserve with the lot guard already held by the caller
    pub(crate) async fn reserve_locked(&self, lot_id: &str, amount: u32) -> DomainResult<u32> {
        let mut lot = self
            .repos
            .lots()
            .find_by_id(lot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("parking lot", "id", lot_id))?;

        if lot.reserved + amount > lot.capacity {
            debug!(
                lot_id = %lot_id,
                reserved = lot.reserved,
                capacity = lot.capacity,
                "Capacity exceeded"
            );
            return Err(DomainError::conflict(format!(
                "capacity exceeded for lot {}: {} of {} spots committed",
                lot_id, lot.reserved, lot.capacity
            )));
        }

        lot.reserved += amount;
        let reserved = lot.reserved;
        self.repos.lots().update(lot).await?;

        debug!(lot_id = %lot_id, reserved, "Capacity reserved");
        Ok(reserved)
    }

    /// Release with the lot guard already held by the caller
    pub(crate) async fn release_locked(&self, lot_id: &str, amount: u32) -> DomainResult<u32> {
        let mut lot = self
            .repos
            .lots()
            .find_by_id(lot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("parking lot", "id", lot_id))?;

        lot.reserved = lot.reserved.saturating_sub(amount);
        let reserved = lot.reserved;
        self.repos.lots().update(lot).await?;

        debug!(lot_id = %lot_id, reserved, "Capacity released");
        Ok(reserved)
    }
}

// ── Tests ──────────────────────────────────────────────────────
