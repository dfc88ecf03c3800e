//! In-memory repository implementations
//!
//! DashMap-backed storage for development and testing. Uniqueness and
//! existence checks mirror the persistent backend: `save` of an existing
//! key conflicts, `update` of a missing key is not found.

use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use dashmap::DashMap;

use crate::domain::{
    DiscountCode, DiscountRepository, DomainError, DomainResult, LotRepository, ParkingLot,
    ParkingSession, Payment, PaymentRepository, Refund, RefundRepository, RepositoryProvider,
    Reservation, ReservationRepository, SessionRepository,
};

/// All in-memory repositories behind one [`RepositoryProvider`]
pub struct InMemoryRepositories {
    lots: InMemoryLotRepository,
    reservations: InMemoryReservationRepository,
    sessions: InMemorySessionRepository,
    payments: InMemoryPaymentRepository,
    refunds: InMemoryRefundRepository,
    discounts: InMemoryDiscountRepository,
}

impl InMemoryRepositories {
    pub fn new() -> Self {
        Self {
            lots: InMemoryLotRepository {
                lots: DashMap::new(),
            },
            reservations: InMemoryReservationRepository {
                reservations: DashMap::new(),
                id_counter: AtomicI64::new(1),
            },
            sessions: InMemorySessionRepository {
                sessions: DashMap::new(),
            },
            payments: InMemoryPaymentRepository {
                payments: DashMap::new(),
            },
            refunds: InMemoryRefundRepository {
                refunds: DashMap::new(),
            },
            discounts: InMemoryDiscountRepository {
                codes: DashMap::new(),
            },
        }
    }
}

impl Default for InMemoryRepositories {
    fn default() -> Self {
        Self::new()
    }
}

impl RepositoryProvider for InMemoryRepositories {
    fn lots(&self) -> &dyn LotRepository {
        &self.lots
    }

    fn reservations(&self) -> &dyn ReservationRepository {
        &self.reservations
    }

    fn sessions(&self) -> &dyn SessionRepository {
        &self.sessions
    }

    fn payments(&self) -> &dyn PaymentRepository {
        &self.payments
    }

    fn refunds(&self) -> &dyn RefundRepository {
        &self.refunds
    }

    fn discounts(&self) -> &dyn DiscountRepository {
        &self.discounts
    }
}

// ── Lots ────────────────────────────────────────────────────────

struct InMemoryLotRepository {
    lots: DashMap<String, ParkingLot>,
}

#[async_trait]
impl LotRepository for InMemoryLotRepository {
    async fn save(&self, lot: ParkingLot) -> DomainResult<()> {
        if self.lots.contains_key(&lot.id) {
            return Err(DomainError::conflict(format!(
                "parking lot {} already exists",
                lot.id
            )));
        }
        self.lots.insert(lot.id.clone(), lot);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingLot>> {
        Ok(self.lots.get(id).map(|l| l.clone()))
    }

    async fn update(&self, lot: ParkingLot) -> DomainResult<()> {
        if !self.lots.contains_key(&lot.id) {
            return Err(DomainError::not_found("parking lot", "id", lot.id));
        }
        self.lots.insert(lot.id.clone(), lot);
        Ok(())
    }

    async fn find_all(&self) -> DomainResult<Vec<ParkingLot>> {
        Ok(self.lots.iter().map(|e| e.value().clone()).collect())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.lots
            .remove(id)
            .ok_or_else(|| DomainError::not_found("parking lot", "id", id))?;
        Ok(())
    }
}

// ── Reservations ────────────────────────────────────────────────

struct InMemoryReservationRepository {
    reservations: DashMap<String, Reservation>,
    id_counter: AtomicI64,
}

#[async_trait]
impl ReservationRepository for InMemoryReservationRepository {
    async fn save(&self, reservation: Reservation) -> DomainResult<()> {
        if self.reservations.contains_key(&reservation.id) {
            return Err(DomainError::conflict(format!(
                "reservation {} already exists",
                reservation.id
            )));
        }
        self.reservations
            .insert(reservation.id.clone(), reservation);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Reservation>> {
        Ok(self.reservations.get(id).map(|r| r.clone()))
    }

    async fn update(&self, reservation: Reservation) -> DomainResult<()> {
        if !self.reservations.contains_key(&reservation.id) {
            return Err(DomainError::not_found("reservation", "id", reservation.id));
        }
        self.reservations
            .insert(reservation.id.clone(), reservation);
        Ok(())
    }

    async fn delete(&self, id: &str) -> DomainResult<()> {
        self.reservations
            .remove(id)
            .ok_or_else(|| DomainError::not_found("reservation", "id", id))?;
        Ok(())
    }

    async fn find_by_lot(&self, lot_id: &str) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.lot_id == lot_id)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_by_user(&self, username: &str) -> DomainResult<Vec<Reservation>> {
        Ok(self
            .reservations
            .iter()
            .filter(|r| r.username == username)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<Reservation>> {
        Ok(self.reservations.iter().map(|r| r.value().clone()).collect())
    }

    async fn next_id(&self) -> String {
        self.id_counter.fetch_add(1, Ordering::SeqCst).to_string()
    }
}

// ── Sessions ────────────────────────────────────────────────────

struct InMemorySessionRepository {
    sessions: DashMap<String, ParkingSession>,
}

#[async_trait]
impl SessionRepository for InMemorySessionRepository {
    async fn save(&self, session: ParkingSession) -> DomainResult<()> {
        if self.sessions.contains_key(&session.id) {
            return Err(DomainError::conflict(format!(
                "parking session {} already exists",
                session.id
            )));
        }
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn update(&self, session: ParkingSession) -> DomainResult<()> {
        if !self.sessions.contains_key(&session.id) {
            return Err(DomainError::not_found("parking session", "id", session.id));
        }
        self.sessions.insert(session.id.clone(), session);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<ParkingSession>> {
        Ok(self.sessions.get(id).map(|s| s.clone()))
    }

    async fn find_open(
        &self,
        lot_id: &str,
        license_plate: &str,
    ) -> DomainResult<Option<ParkingSession>> {
        Ok(self
            .sessions
            .iter()
            .find(|s| s.lot_id == lot_id && s.license_plate == license_plate && s.is_open())
            .map(|s| s.value().clone()))
    }

    async fn find_by_lot(&self, lot_id: &str) -> DomainResult<Vec<ParkingSession>> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.lot_id == lot_id)
            .map(|s| s.value().clone())
            .collect())
    }

    async fn find_by_user(&self, username: &str) -> DomainResult<Vec<ParkingSession>> {
        Ok(self
            .sessions
            .iter()
            .filter(|s| s.username == username)
            .map(|s| s.value().clone())
            .collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<ParkingSession>> {
        Ok(self.sessions.iter().map(|s| s.value().clone()).collect())
    }
}

// ── Payments ────────────────────────────────────────────────────

struct InMemoryPaymentRepository {
    payments: DashMap<String, Payment>,
}

#[async_trait]
impl PaymentRepository for InMemoryPaymentRepository {
    async fn save(&self, payment: Payment) -> DomainResult<()> {
        if self.payments.contains_key(&payment.transaction_id) {
            return Err(DomainError::conflict(format!(
                "payment {} already exists",
                payment.transaction_id
            )));
        }
        self.payments.insert(payment.transaction_id.clone(), payment);
        Ok(())
    }

    async fn find_by_transaction_id(
        &self,
        transaction_id: &str,
    ) -> DomainResult<Option<Payment>> {
        Ok(self.payments.get(transaction_id).map(|p| p.clone()))
    }

    async fn update(&self, payment: Payment) -> DomainResult<()> {
        if !self.payments.contains_key(&payment.transaction_id) {
            return Err(DomainError::not_found(
                "payment",
                "transaction_id",
                payment.transaction_id,
            ));
        }
        self.payments.insert(payment.transaction_id.clone(), payment);
        Ok(())
    }

    async fn find_by_session(&self, session_id: &str) -> DomainResult<Vec<Payment>> {
        Ok(self
            .payments
            .iter()
            .filter(|p| p.session_id == session_id)
            .map(|p| p.value().clone())
            .collect())
    }

    async fn find_by_user(&self, username: &str) -> DomainResult<Vec<Payment>> {
        Ok(self
            .payments
            .iter()
            .filter(|p| p.username == username)
            .map(|p| p.value().clone())
            .collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<Payment>> {
        Ok(self.payments.iter().map(|p| p.value().clone()).collect())
    }
}

// ── Refunds ─────────────────────────────────────────────────────

struct InMemoryRefundRepository {
    refunds: DashMap<String, Refund>,
}

#[async_trait]
impl RefundRepository for InMemoryRefundRepository {
    async fn save(&self, refund: Refund) -> DomainResult<()> {
        if self.refunds.contains_key(&refund.id) {
            return Err(DomainError::conflict(format!(
                "refund {} already exists",
                refund.id
            )));
        }
        self.refunds.insert(refund.id.clone(), refund);
        Ok(())
    }

    async fn find_by_id(&self, id: &str) -> DomainResult<Option<Refund>> {
        Ok(self.refunds.get(id).map(|r| r.clone()))
    }

    async fn find_by_transaction(&self, transaction_id: &str) -> DomainResult<Vec<Refund>> {
        Ok(self
            .refunds
            .iter()
            .filter(|r| r.transaction_id == transaction_id)
            .map(|r| r.value().clone())
            .collect())
    }

    async fn find_all(&self) -> DomainResult<Vec<Refund>> {
        Ok(self.refunds.iter().map(|r| r.value().clone()).collect())
    }
}

// ── Discount codes ──────────────────────────────────────────────

struct InMemoryDiscountRepository {
    codes: DashMap<String, DiscountCode>,
}

#[async_trait]
impl DiscountRepository for InMemoryDiscountRepository {
    async fn save(&self, code: DiscountCode) -> DomainResult<()> {
        if self.codes.contains_key(&code.code) {
            return Err(DomainError::conflict(format!(
                "discount code {} already exists",
                code.code
            )));
        }
        self.codes.insert(code.code.clone(), code);
        Ok(())
    }

    async fn find_by_code(&self, code: &str) -> DomainResult<Option<DiscountCode>> {
        Ok(self.codes.get(code).map(|c| c.clone()))
    }

    async fn update(&self, code: DiscountCode) -> DomainResult<()> {
        if !self.codes.contains_key(&code.code) {
            return Err(DomainError::not_found("discount code", "code", code.code));
        }
        self.codes.insert(code.code.clone(), code);
        Ok(())
    }

    async fn find_all(&self) -> DomainResult<Vec<DiscountCode>> {
        Ok(self.codes.iter().map(|c| c.value().clone()).collect())
    }
}

// ── Tests ──────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::GeoLocation;
    use rust_decimal::Decimal;

    fn lot(id: &str) -> ParkingLot {
        ParkingLot::new(
            id,
            format!("Lot {id}"),
            5,
            Decimal::new(35, 1),
            Decimal::new(250, 1),
            GeoLocation {
                latitude: 0.0,
                longitude: 0.0,
            },
        )
    }

    #[tokio::test]
    async fn lot_save_is_unique_and_update_requires_existence() {
        let repos = InMemoryRepositories::new();
        repos.lots().save(lot("a")).await.unwrap();

        let err = repos.lots().save(lot("a")).await.unwrap_err();
        assert!(matches!(err, DomainError::Conflict { .. }));

        let err = repos.lots().update(lot("ghost")).await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }

    #[tokio::test]
    async fn reservation_ids_are_monotonic_and_unique() {
        let repos = InMemoryRepositories::new();
        let a = repos.reservations().next_id().await;
        let b = repos.reservations().next_id().await;
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn find_open_skips_closed_sessions() {
        let repos = InMemoryRepositories::new();
        let mut closed = ParkingSession::new(
            "s-1",
            "lot-1",
            "AB-123-C",
            "alice",
            chrono::Utc::now() - chrono::Duration::hours(1),
        );
        closed.close(chrono::Utc::now());
        repos.sessions().save(closed).await.unwrap();

        assert!(repos
            .sessions()
            .find_open("lot-1", "AB-123-C")
            .await
            .unwrap()
            .is_none());
    }

    #[tokio::test]
    async fn deleted_lot_is_gone() {
        let repos = InMemoryRepositories::new();
        repos.lots().save(lot("a")).await.unwrap();
        repos.lots().delete("a").await.unwrap();
        assert!(repos.lots().find_by_id("a").await.unwrap().is_none());

        let err = repos.lots().delete("a").await.unwrap_err();
        assert!(matches!(err, DomainError::NotFound { .. }));
    }
}
