//! Reservation booking: time-overlap resolution against finite lot
//! capacity.
//!
//! Acceptance rule: while a lot has capacity headroom any window is
//! accepted and consumes a slot. Once the counter is full, a window is
//! still accepted when it conflicts with no existing non-cancelled
//! reservation (committed-but-disjoint bookings do not block future
//! windows), but then consumes no extra slot. Otherwise the request is
//! rejected together with the earliest time a retry can succeed (the
//! smallest end among the overlapping reservations).

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::domain::{
    DomainError, DomainResult, IdentityProvider, ParkingLot, RepositoryProvider, Reservation,
};
use crate::shared::KeyLocks;

use super::capacity::{lot_key, CapacityLedger};

/// Verdict of the overlap resolver
#[derive(Debug, Clone, PartialEq)]
pub enum Availability {
    Accept {
        /// False when the lot is counter-full but the window conflicts
        /// with nothing; such a booking leaves the ledger untouched.
        consumes_slot: bool,
    },
    Reject {
        /// Smallest end time among the overlapping reservations
        earliest_available: DateTime<Utc>,
    },
}

/// Service for reservation booking and maintenance
pub struct ReservationService {
    repos: Arc<dyn RepositoryProvider>,
    locks: Arc<KeyLocks>,
    ledger: CapacityLedger,
    identity: Arc<dyn IdentityProvider>,
}

impl ReservationService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        locks: Arc<KeyLocks>,
        identity: Arc<dyn IdentityProvider>,
    ) -> Self {
        let ledger = CapacityLedger::new(repos.clone(), locks.clone());
        Self {
            repos,
            locks,
            ledger,
            identity,
        }
    }

    /// Resolver verdict for a window, without mutating anything.
    /// `excluding` skips one reservation id (used when updating).
    pub async fn check_availability(
        &self,
        lot_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        excluding: Option<&str>,
    ) -> DomainResult<Availability> {
        validate_window(start, end)?;
        let lot = self.lot(lot_id).await?;
        self.resolve(&lot, start, end, excluding).await
    }

    /// Book a window. On acceptance the capacity ledger is updated and the
    /// confirmed reservation returned; on rejection the `Conflict` error
    /// carries the earliest-available hint.
    pub async fn create(
        &self,
        username: &str,
        vehicle_id: &str,
        lot_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Reservation> {
        validate_window(start, end)?;

        let _guard = self.locks.acquire(&lot_key(lot_id)).await;
        let lot = self.lot(lot_id).await?;

        match self.resolve(&lot, start, end, None).await? {
            Availability::Reject { earliest_available } => {
                debug!(lot_id = %lot_id, %earliest_available, "Reservation rejected");
                Err(reject_error(lot_id, earliest_available))
            }
            Availability::Accept { consumes_slot } => {
                if consumes_slot {
                    self.ledger.reserve_locked(lot_id, 1).await?;
                }
                let id = self.repos.reservations().next_id().await;
                let reservation = Reservation::new(id, username, vehicle_id, lot_id, start, end);
                self.repos.reservations().save(reservation.clone()).await?;

                info!(
                    reservation_id = %reservation.id,
                    lot_id = %lot_id,
                    user = %username,
                    consumes_slot,
                    "Reservation created"
                );
                Ok(reservation)
            }
        }
    }

    /// Change a reservation's lot and/or window.
    ///
    /// The full overlap check runs against the new lot before any ledger
    /// mutation; when the new lot lacks room the old commitment stays
    /// untouched.
    pub async fn update(
        &self,
        reservation_id: &str,
        lot_id: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> DomainResult<Reservation> {
        validate_window(start, end)?;

        let reservation = self.get(reservation_id).await?;
        if !reservation.is_blocking() {
            return Err(DomainError::Validation(format!(
                "reservation {reservation_id} is cancelled and cannot be updated"
            )));
        }

        let old_lot_id = reservation.lot_id.clone();
        let _guards = self
            .locks
            .acquire_pair(&lot_key(&old_lot_id), &lot_key(lot_id))
            .await;

        let new_lot = self.lot(lot_id).await?;
        match self
            .resolve(&new_lot, start, end, Some(reservation_id))
            .await?
        {
            Availability::Reject { earliest_available } => {
                Err(reject_error(lot_id, earliest_available))
            }
            Availability::Accept { consumes_slot } => {
                if old_lot_id != lot_id {
                    if consumes_slot {
                        self.ledger.reserve_locked(lot_id, 1).await?;
                    }
                    self.ledger.release_locked(&old_lot_id, 1).await?;
                }

                let mut updated = reservation;
                updated.lot_id = lot_id.to_string();
                updated.start = start;
                updated.end = end;
                self.repos.reservations().update(updated.clone()).await?;

                info!(
                    reservation_id = %reservation_id,
                    from_lot = %old_lot_id,
                    to_lot = %lot_id,
                    "Reservation updated"
                );
                Ok(updated)
            }
        }
    }

    /// Mark a reservation cancelled and give its slot back
    pub async fn cancel(&self, reservation_id: &str) -> DomainResult<Reservation> {
        let mut reservation = self.get(reservation_id).await?;

        let _guard = self.locks.acquire(&lot_key(&reservation.lot_id)).await;
        if reservation.is_blocking() {
            self.ledger.release_locked(&reservation.lot_id, 1).await?;
        }
        reservation.cancel();
        self.repos.reservations().update(reservation.clone()).await?;

        info!(reservation_id = %reservation_id, "Reservation cancelled");
        Ok(reservation)
    }

    /// Remove a reservation entirely, releasing its slot
    pub async fn delete(&self, reservation_id: &str) -> DomainResult<()> {
        let reservation = self.get(reservation_id).await?;

        let _guard = self.locks.acquire(&lot_key(&reservation.lot_id)).await;
        if reservation.is_blocking() {
            self.ledger.release_locked(&reservation.lot_id, 1).await?;
        }
        self.repos.reservations().delete(reservation_id).await?;

        info!(reservation_id = %reservation_id, "Reservation deleted");
        Ok(())
    }

    /// Set the operator-only cost field (administrators only)
    pub async fn set_cost(
        &self,
        token: &str,
        reservation_id: &str,
        cost: Decimal,
    ) -> DomainResult<Reservation> {
        let caller = self.caller(token).await?;
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "only administrators may set a reservation cost".to_string(),
            ));
        }
        if cost < Decimal::ZERO {
            return Err(DomainError::UnprocessableAmount {
                detail: format!("reservation cost {cost} is negative"),
                limit: Decimal::ZERO,
            });
        }

        let mut reservation = self.get(reservation_id).await?;
        reservation.cost = Some(cost);
        self.repos.reservations().update(reservation.clone()).await?;
        Ok(reservation)
    }

    pub async fn get(&self, reservation_id: &str) -> DomainResult<Reservation> {
        self.repos
            .reservations()
            .find_by_id(reservation_id)
            .await?
            .ok_or_else(|| DomainError::not_found("reservation", "id", reservation_id))
    }

    /// List reservations, optionally restricted to one lot
    pub async fn list(&self, lot_id: Option<&str>) -> DomainResult<Vec<Reservation>> {
        match lot_id {
            Some(id) => self.repos.reservations().find_by_lot(id).await,
            None => self.repos.reservations().find_all().await,
        }
    }

    pub async fn list_for_user(&self, username: &str) -> DomainResult<Vec<Reservation>> {
        self.repos.reservations().find_by_user(username).await
    }

    // ── Internals ───────────────────────────────────────────────

    async fn resolve(
        &self,
        lot: &ParkingLot,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        excluding: Option<&str>,
    ) -> DomainResult<Availability> {
        if lot.has_headroom() {
            return Ok(Availability::Accept {
                consumes_slot: true,
            });
        }

        let existing = self.repos.reservations().find_by_lot(&lot.id).await?;
        let mut earliest: Option<DateTime<Utc>> = None;
        for other in existing
            .iter()
            .filter(|r| r.is_blocking() && excluding != Some(r.id.as_str()))
        {
            if other.overlaps(start, end) {
                earliest = Some(match earliest {
                    Some(current) => current.min(other.end),
                    None => other.end,
                });
            }
        }

        Ok(match earliest {
            None => Availability::Accept {
                consumes_slot: false,
            },
            Some(earliest_available) => Availability::Reject { earliest_available },
        })
    }

    async fn lot(&self, lot_id: &str) -> DomainResult<ParkingLot> {
        self.repos
            .lots()
            .find_by_id(lot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("parking lot", "id", lot_id))
    }

    async fn caller(&self, token: &str) -> DomainResult<crate::domain::User> {
        self.identity
            .resolve(token)
            .await?
            .ok_or_else(|| DomainError::Forbidden("unknown session token".to_string()))
    }
}

fn validate_window(start: DateTime<Utc>, end: DateTime<Utc>) -> DomainResult<()> {
    if start >= end {
        return Err(DomainError::Validation(format!(
            "reservation window start {start} must precede end {end}"
        )));
    }
    Ok(())
}

fn reject_error(lot_id: &str, earliest_available: DateTime<Utc>) -> DomainError {
    DomainError::Conflict {
        message: format!(
            "lot {lot_id} has no room for the requested window; earliest available {earliest_available}"
        ),
        earliest_available: Some(earliest_available),
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{GeoLocation, ParkingLot, User, UserRole};
    use crate::infrastructure::{InMemoryIdentity, InMemoryRepositories};
    use chrono::TimeZone;

    fn lot(id: &str, capacity: u32) -> ParkingLot {
        ParkingLot::new(
            id,
            format!("Lot {id}"),
            capacity,
            "3.5".parse().unwrap(),
            "25.0".parse().unwrap(),
            GeoLocation {
                latitude: 0.0,
                longitude: 0.0,
            },
        )
    }

    fn at(hour: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2026, 9, 1, hour, 0, 0).unwrap()
    }

    struct Fixture {
        repos: Arc<InMemoryRepositories>,
        service: ReservationService,
    }

    async fn setup(lots: &[(&str, u32)]) -> Fixture {
        let repos = Arc::new(InMemoryRepositories::new());
        for (id, cap) in lots {
            repos.lots().save(lot(id, *cap)).await.unwrap();
        }
        let identity = Arc::new(InMemoryIdentity::new());
        identity.register("admin-token", User::new("root", UserRole::Admin));
        identity.register("alice-token", User::new("alice", UserRole::User));
        let service =
            ReservationService::new(repos.clone(), Arc::new(KeyLocks::new()), identity);
        Fixture { repos, service }
    }

    async fn reserved(fix: &Fixture, id: &str) -> u32 {
        fix.repos
            .lots()
            .find_by_id(id)
            .await
            .unwrap()
            .unwrap()
            .reserved
    }

    #[tokio::test]
    async fn capacity_one_scenario() {
        let fix = setup(&[("a", 1)]).await;

        // A [10:00, 12:00) takes the only slot
        let a = fix
            .service
            .create("alice", "veh-1", "a", at(10), at(12))
            .await
            .unwrap();
        assert_eq!(reserved(&fix, "a").await, 1);

        // B [11:00, 13:00) overlaps A; earliest retry is A's end
        let err = fix
            .service
            .create("bob", "veh-2", "a", at(11), at(13))
            .await
            .unwrap_err();
        match err {
            DomainError::Conflict {
                earliest_available, ..
            } => assert_eq!(earliest_available, Some(at(12))),
            other => panic!("expected conflict, got {other:?}"),
        }

        // C [12:00, 13:00) is disjoint from A: accepted, counter stays put
        let c = fix
            .service
            .create("carol", "veh-3", "a", at(12), at(13))
            .await
            .unwrap();
        assert_ne!(a.id, c.id);
        assert_eq!(reserved(&fix, "a").await, 1);
    }

    #[tokio::test]
    async fn earliest_available_is_smallest_overlapping_end() {
        let fix = setup(&[("a", 2)]).await;
        fix.service
            .create("u1", "v1", "a", at(10), at(12))
            .await
            .unwrap();
        fix.service
            .create("u2", "v2", "a", at(10), at(14))
            .await
            .unwrap();

        // Lot now full; [11:00, 15:00) overlaps both
        let err = fix
            .service
            .create("u3", "v3", "a", at(11), at(15))
            .await
            .unwrap_err();
        match err {
            DomainError::Conflict {
                earliest_available, ..
            } => assert_eq!(earliest_available, Some(at(12))),
            other => panic!("expected conflict, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn cancelled_reservations_do_not_block() {
        let fix = setup(&[("a", 1)]).await;
        let a = fix
            .service
            .create("alice", "v1", "a", at(10), at(12))
            .await
            .unwrap();
        fix.service.cancel(&a.id).await.unwrap();
        assert_eq!(reserved(&fix, "a").await, 0);

        // The freed slot is bookable again for the same window
        fix.service
            .create("bob", "v2", "a", at(10), at(12))
            .await
            .unwrap();
        assert_eq!(reserved(&fix, "a").await, 1);
    }

    #[tokio::test]
    async fn check_availability_does_not_mutate() {
        let fix = setup(&[("a", 1)]).await;
        let verdict = fix
            .service
            .check_availability("a", at(10), at(12), None)
            .await
            .unwrap();
        assert_eq!(
            verdict,
            Availability::Accept {
                consumes_slot: true
            }
        );
        assert_eq!(reserved(&fix, "a").await, 0);
    }

    #[tokio::test]
    async fn invalid_window_is_rejected() {
        let fix = setup(&[("a", 1)]).await;
        let err = fix
            .service
            .create("alice", "v1", "a", at(12), at(12))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation(_)));
    }

    #[tokio::test]
    async fn unknown_lot_is_not_found() {
        let fix = setup(&[]).await;
        let err = fix
            .service
            .create("alice", "v1", "ghost", at(10), at(12))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn update_moves_commitment_between_lots() {
        let fix = setup(&[("a", 1), ("b", 1)]).await;
        let r = fix
            .service
            .create("alice", "v1", "a", at(10), at(12))
            .await
            .unwrap();

        let moved = fix.service.update(&r.id, "b", at(10), at(12)).await.unwrap();
        assert_eq!(moved.lot_id, "b");
        assert_eq!(reserved(&fix, "a").await, 0);
        assert_eq!(reserved(&fix, "b").await, 1);
    }

    #[tokio::test]
    async fn update_to_full_lot_keeps_old_commitment() {
        let fix = setup(&[("a", 1), ("b", 1)]).await;
        let r = fix
            .service
            .create("alice", "v1", "a", at(10), at(12))
            .await
            .unwrap();
        // Fill lot b with an overlapping booking
        fix.service
            .create("bob", "v2", "b", at(10), at(12))
            .await
            .unwrap();

        let err = fix
            .service
            .update(&r.id, "b", at(11), at(13))
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));
        // No partial mutation
        assert_eq!(reserved(&fix, "a").await, 1);
        assert_eq!(reserved(&fix, "b").await, 1);
        assert_eq!(fix.service.get(&r.id).await.unwrap().lot_id, "a");
    }

    #[tokio::test]
    async fn update_window_on_same_lot_excludes_itself() {
        let fix = setup(&[("a", 1)]).await;
        let r = fix
            .service
            .create("alice", "v1", "a", at(10), at(12))
            .await
            .unwrap();

        // Shifting the window overlaps only the reservation being updated
        let updated = fix.service.update(&r.id, "a", at(11), at(13)).await.unwrap();
        assert_eq!(updated.start, at(11));
        assert_eq!(reserved(&fix, "a").await, 1);
    }

    #[tokio::test]
    async fn delete_releases_the_slot() {
        let fix = setup(&[("a", 1)]).await;
        let r = fix
            .service
            .create("alice", "v1", "a", at(10), at(12))
            .await
            .unwrap();
        fix.service.delete(&r.id).await.unwrap();
        assert_eq!(reserved(&fix, "a").await, 0);
        assert!(matches!(
            fix.service.get(&r.id).await.unwrap_err(),
            DomainError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn set_cost_requires_admin() {
        let fix = setup(&[("a", 1)]).await;
        let r = fix
            .service
            .create("alice", "v1", "a", at(10), at(12))
            .await
            .unwrap();

        let err = fix
            .service
            .set_cost("alice-token", &r.id, "5.0".parse().unwrap())
            .await
            .unwrap_err();
        assert!(matches!(err, DomainError::Forbidden(_)));

        let updated = fix
            .service
            .set_cost("admin-token", &r.id, "5.0".parse().unwrap())
            .await
            .unwrap();
        assert_eq!(updated.cost, Some("5.0".parse().unwrap()));
    }

    #[tokio::test]
    async fn concurrent_requests_cannot_both_take_the_last_slot() {
        let Fixture { repos, service } = setup(&[("a", 1)]).await;
        let service = Arc::new(service);

        let s1 = service.clone();
        let s2 = service.clone();
        let (r1, r2) = tokio::join!(
            tokio::spawn(async move { s1.create("u1", "v1", "a", at(10), at(12)).await }),
            tokio::spawn(async move { s2.create("u2", "v2", "a", at(11), at(13)).await }),
        );
        let outcomes = [r1.unwrap(), r2.unwrap()];
        let successes = outcomes.iter().filter(|r| r.is_ok()).count();
        assert_eq!(successes, 1);
        let lot = repos.lots().find_by_id("a").await.unwrap().unwrap();
        assert_eq!(lot.reserved, 1);
    }
}
