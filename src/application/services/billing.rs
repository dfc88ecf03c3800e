//! Billing reconciliation: payments, refunds and per-session statements.
//!
//! A statement joins a session with its lot and payments and always
//! satisfies `balance = charged − Σ payments`. The balance is gross of
//! refunds: completed refunds only shrink the remaining refundable
//! amount of their transaction, they are never subtracted from the
//! statement balance. Hours/days on a statement are re-derived from the
//! session's stored `duration_minutes` through the same tariff math used
//! at close, so the billing view cannot diverge from the stored cost.

use std::sync::Arc;

use chrono::Utc;
use rust_decimal::Decimal;
use tracing::{info, warn};
use uuid::Uuid;

use crate::domain::{
    generate_transaction_id, DiscountMeta, DomainError, DomainResult, GeoLocation,
    IdentityProvider, Payment, Refund, RefundStatus, RepositoryProvider, TransactionDetail, User,
};
use crate::shared::{timestamp, KeyLocks};

use super::discounts::{code_key, DiscountService};

fn refund_key(transaction_id: &str) -> String {
    format!("refund:{transaction_id}")
}

/// Client input for settling a session
#[derive(Debug, Clone)]
pub struct PaymentRequest {
    pub session_id: String,
    pub method: String,
    pub issuer: String,
    pub bank: String,
    pub discount_code: Option<String>,
}

/// Session slice of a statement
#[derive(Debug, Clone, serde::Serialize)]
pub struct SessionSummary {
    pub session_id: String,
    pub license_plate: String,
    pub started_at: chrono::DateTime<Utc>,
    pub stopped_at: Option<chrono::DateTime<Utc>>,
    /// Re-derived started hours; zero while the session is open
    pub hours: i64,
    /// Re-derived whole days; zero while the session is open
    pub days: i64,
}

/// Lot slice of a statement
#[derive(Debug, Clone, serde::Serialize)]
pub struct LotSummary {
    pub lot_id: String,
    pub name: String,
    pub location: GeoLocation,
    pub tariff: Decimal,
    pub day_tariff: Decimal,
}

/// One reconciliation record per parking session.
///
/// `balance = charged − paid`; refunds are not netted out here.
#[derive(Debug, Clone, serde::Serialize)]
pub struct Statement {
    pub session: SessionSummary,
    pub lot: LotSummary,
    pub charged: Decimal,
    /// Transaction hash of the settling payment, when one exists
    pub transaction_id: Option<String>,
    pub paid: Decimal,
    pub balance: Decimal,
}

/// Service for payments, refunds and statements
pub struct BillingService {
    repos: Arc<dyn RepositoryProvider>,
    identity: Arc<dyn IdentityProvider>,
    locks: Arc<KeyLocks>,
    discounts: Arc<DiscountService>,
    currency: String,
}

impl BillingService {
    pub fn new(
        repos: Arc<dyn RepositoryProvider>,
        identity: Arc<dyn IdentityProvider>,
        locks: Arc<KeyLocks>,
        discounts: Arc<DiscountService>,
        currency: impl Into<String>,
    ) -> Self {
        Self {
            repos,
            identity,
            locks,
            discounts,
            currency: currency.into(),
        }
    }

    /// Settle a closed session.
    ///
    /// The amount is the session's stored cost, reduced by an optional
    /// discount code; the code's use counter is consumed in the same
    /// operation, so a single-use code can never pay for two sessions.
    pub async fn create_payment(&self, token: &str, request: PaymentRequest) -> DomainResult<Payment> {
        let caller = self.caller(token).await?;

        let mut session = self
            .repos
            .sessions()
            .find_by_id(&request.session_id)
            .await?
            .ok_or_else(|| {
                DomainError::not_found("parking session", "id", request.session_id.clone())
            })?;

        if session.username != caller.username && !caller.is_admin() {
            return Err(DomainError::Forbidden(format!(
                "user {} may not settle a session owned by {}",
                caller.username, session.username
            )));
        }
        if session.is_open() {
            return Err(DomainError::Validation(format!(
                "session {} is still open and cannot be settled",
                session.id
            )));
        }

        // Hold the code guard across check and save so the use counter is
        // consumed only if the payment actually persists, and a
        // concurrent redemption of the same code cannot slip in between.
        let _code_guard = match &request.discount_code {
            Some(code) => Some(self.locks.acquire(&code_key(code)).await),
            None => None,
        };

        let charged = session.cost.unwrap_or(Decimal::ZERO);
        let (amount, redeemed) = match &request.discount_code {
            None => (charged, None),
            Some(code) => {
                let found = self
                    .discounts
                    .redeemable_locked(code, &session.lot_id, Utc::now())
                    .await?;
                (charged - found.discount_on(charged), Some(found))
            }
        };
        let discount = redeemed.as_ref().map(|code| DiscountMeta {
            code: code.code.clone(),
            original_amount: charged,
            discount_amount: charged - amount,
        });
        if amount < Decimal::ZERO {
            return Err(DomainError::UnprocessableAmount {
                detail: format!("payment amount {amount} is negative"),
                limit: Decimal::ZERO,
            });
        }

        let now = timestamp::now_composite();
        let payment = Payment {
            transaction_id: generate_transaction_id(),
            amount,
            username: caller.username.clone(),
            created_at: now.clone(),
            completed_at: now,
            detail: TransactionDetail {
                method: request.method,
                issuer: request.issuer,
                bank: request.bank,
                amount,
                currency: self.currency.clone(),
            },
            session_id: session.id.clone(),
            lot_id: session.lot_id.clone(),
            discount,
        };
        self.repos.payments().save(payment.clone()).await?;

        // The payment is durable; now consume the code's use
        if let Some(code) = redeemed {
            self.discounts.commit_redemption_locked(code).await?;
        }

        session.mark_paid();
        self.repos.sessions().update(session).await?;

        info!(
            transaction_id = %payment.transaction_id,
            session_id = %payment.session_id,
            amount = %payment.amount,
            discounted = payment.discount.is_some(),
            "Payment recorded"
        );
        Ok(payment)
    }

    /// Change a payment's amount (administrators only)
    pub async fn admin_update_amount(
        &self,
        token: &str,
        transaction_id: &str,
        amount: Decimal,
    ) -> DomainResult<Payment> {
        let caller = self.caller(token).await?;
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "only administrators may change a payment amount".to_string(),
            ));
        }
        if amount < Decimal::ZERO {
            return Err(DomainError::UnprocessableAmount {
                detail: format!("payment amount {amount} is negative"),
                limit: Decimal::ZERO,
            });
        }

        let mut payment = self.payment(transaction_id).await?;
        payment.amount = amount;
        self.repos.payments().update(payment.clone()).await?;

        info!(transaction_id = %transaction_id, amount = %amount, "Payment amount updated");
        Ok(payment)
    }

    /// Refund part of a payment (administrators only).
    ///
    /// The refund may not exceed what remains refundable on the
    /// transaction; a violation fails with `UnprocessableAmount` naming
    /// the remaining amount and leaves the ledger unchanged.
    pub async fn create_refund(
        &self,
        token: &str,
        transaction_id: &str,
        amount: Decimal,
        reason: &str,
    ) -> DomainResult<Refund> {
        let caller = self.caller(token).await?;
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "only administrators may create refunds".to_string(),
            ));
        }

        let _guard = self.locks.acquire(&refund_key(transaction_id)).await;

        let payment = self.payment(transaction_id).await?;
        if amount <= Decimal::ZERO {
            return Err(DomainError::UnprocessableAmount {
                detail: format!("refund amount {amount} must be positive"),
                limit: Decimal::ZERO,
            });
        }
        let remaining = payment.amount - self.refunded_total(transaction_id).await?;
        if amount > remaining {
            return Err(DomainError::UnprocessableAmount {
                detail: format!(
                    "refund {amount} exceeds remaining refundable {remaining} on transaction {transaction_id}"
                ),
                limit: remaining,
            });
        }

        let refund = Refund {
            id: Uuid::new_v4().to_string(),
            transaction_id: transaction_id.to_string(),
            amount,
            reason: reason.to_string(),
            processed_by: caller.username.clone(),
            status: RefundStatus::Completed,
            created_at: timestamp::now_composite(),
        };
        self.repos.refunds().save(refund.clone()).await?;

        info!(
            refund_id = %refund.id,
            transaction_id = %transaction_id,
            amount = %amount,
            remaining = %(remaining - amount),
            "Refund completed"
        );
        Ok(refund)
    }

    /// Amount still refundable on a transaction
    pub async fn remaining_refundable(&self, transaction_id: &str) -> DomainResult<Decimal> {
        let payment = self.payment(transaction_id).await?;
        Ok(payment.amount - self.refunded_total(transaction_id).await?)
    }

    pub async fn refunds_for_transaction(&self, transaction_id: &str) -> DomainResult<Vec<Refund>> {
        self.repos.refunds().find_by_transaction(transaction_id).await
    }

    /// One statement per session of `target_user` (defaults to the
    /// caller). Non-admin callers may only view themselves.
    pub async fn statements(
        &self,
        token: &str,
        target_user: Option<&str>,
    ) -> DomainResult<Vec<Statement>> {
        let caller = self.caller(token).await?;
        let target = target_user.unwrap_or(&caller.username);
        if target != caller.username && !caller.is_admin() {
            return Err(DomainError::Forbidden(format!(
                "user {} may not view statements of {}",
                caller.username, target
            )));
        }

        let sessions = self.repos.sessions().find_by_user(target).await?;
        let mut statements = Vec::with_capacity(sessions.len());

        for session in sessions {
            let Some(lot) = self.repos.lots().find_by_id(&session.lot_id).await? else {
                warn!(
                    session_id = %session.id,
                    lot_id = %session.lot_id,
                    "Skipping statement: lot no longer exists"
                );
                continue;
            };

            // An open session is listed but contributes nothing until closed
            let breakdown = match session.duration_minutes {
                Some(minutes) if !session.is_open() => lot.price_breakdown(minutes),
                _ => lot.price_breakdown(0),
            };

            let mut payments = self.repos.payments().find_by_session(&session.id).await?;
            // Storage iteration order is arbitrary; report the earliest
            // payment's transaction hash
            payments.sort_by_key(|p| {
                (
                    timestamp::parse_composite(&p.created_at)
                        .map(|t| t.timestamp())
                        .unwrap_or(i64::MAX),
                    p.transaction_id.clone(),
                )
            });
            let paid: Decimal = payments.iter().map(|p| p.amount).sum();
            let transaction_id = payments.first().map(|p| p.transaction_id.clone());

            statements.push(Statement {
                session: SessionSummary {
                    session_id: session.id.clone(),
                    license_plate: session.license_plate.clone(),
                    started_at: session.started_at,
                    stopped_at: session.stopped_at,
                    hours: breakdown.hours,
                    days: breakdown.days,
                },
                lot: LotSummary {
                    lot_id: lot.id.clone(),
                    name: lot.name.clone(),
                    location: lot.location,
                    tariff: lot.tariff,
                    day_tariff: lot.day_tariff,
                },
                charged: breakdown.amount,
                transaction_id,
                paid,
                balance: breakdown.amount - paid,
            });
        }

        Ok(statements)
    }

    // ── Internals ───────────────────────────────────────────────

    async fn refunded_total(&self, transaction_id: &str) -> DomainResult<Decimal> {
        let refunds = self.repos.refunds().find_by_transaction(transaction_id).await?;
        Ok(refunds
            .iter()
            .filter(|r| r.status == RefundStatus::Completed)
            .map(|r| r.amount)
            .sum())
    }

    async fn payment(&self, transaction_id: &str) -> DomainResult<Payment> {
        self.repos
            .payments()
            .find_by_transaction_id(transaction_id)
            .await?
            .ok_or_else(|| DomainError::not_found("payment", "transaction_id", transaction_id))
    }

    async fn caller(&self, token: &str) -> DomainResult<User> {
        self.identity
            .resolve(token)
            .await?
            .ok_or_else(|| DomainError::Forbidden("unknown session token".to_string()))
    }
}

// ── Tests ──────────────────────────────────────────────────────
