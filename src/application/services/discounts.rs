//! Discount code validation, redemption and issuance.
//!
//! Administrators issue unrestricted percentage/fixed codes. A hotel
//! manager may only issue single-use, 100%-percentage codes scoped to the
//! lot they manage and to a guest's stay window. Redemption runs under
//! the code's key guard so a single-use code can never be consumed twice,
//! even by concurrent attempts.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use rand::Rng;
use rust_decimal::Decimal;
use tracing::{debug, info};

use crate::domain::{
    DiscountCode, DiscountKind, DomainError, DomainResult, IdentityProvider, LotScope,
    RepositoryProvider, User,
};
use crate::shared::KeyLocks;

/// Prefix of generated hotel guest codes
const HOTEL_CODE_PREFIX: &str = "HTL-";

pub(crate) fn code_key(code: &str) -> String {
    format!("code:{code}")
}

/// Why a code was not accepted
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectReason {
    NotFound,
    Inactive,
    UsesExhausted,
    Expired,
    WrongLot,
    OutsideStayWindow,
}

impl RejectReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NotFound => "code not found",
            Self::Inactive => "code is deactivated",
            Self::UsesExhausted => "code has no uses left",
            Self::Expired => "code has expired",
            Self::WrongLot => "code is bound to a different lot",
            Self::OutsideStayWindow => "date is outside the code's stay window",
        }
    }
}

impl std::fmt::Display for RejectReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Validator verdict
#[derive(Debug, Clone)]
pub enum CodeCheck {
    Accept(DiscountCode),
    Reject(RejectReason),
}

/// Parameters for an administrator-issued code
#[derive(Debug, Clone)]
pub struct NewDiscountCode {
    pub code: String,
    pub kind: DiscountKind,
    pub value: Decimal,
    pub max_uses: Option<u32>,
    pub expires_at: Option<DateTime<Utc>>,
}

/// Service for discount code issuance and redemption
pub struct DiscountService {
    repos: Arc<dyn RepositoryProvider>,
    identity: Arc<dyn IdentityProvider>,
    locks: Arc<KeyLocks>,
}

impl DiscountService {
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

    /// Issue an unrestricted code (administrators only)
    pub async fn create_code(&self, token: &str, new: NewDiscountCode) -> DomainResult<DiscountCode> {
        let caller = self.caller(token).await?;
        if !caller.is_admin() {
            return Err(DomainError::Forbidden(
                "only administrators may issue unrestricted discount codes".to_string(),
            ));
        }
        if new.value < Decimal::ZERO {
            return Err(DomainError::UnprocessableAmount {
                detail: format!("discount value {} is negative", new.value),
                limit: Decimal::ZERO,
            });
        }
        if new.kind == DiscountKind::Percentage && new.value > Decimal::from(100) {
            return Err(DomainError::UnprocessableAmount {
                detail: format!("percentage discount {} exceeds 100", new.value),
                limit: Decimal::from(100),
            });
        }

        let code = DiscountCode {
            code: new.code,
            kind: new.kind,
            value: new.value,
            max_uses: new.max_uses,
            current_uses: 0,
            active: true,
            created_at: Utc::now(),
            expires_at: new.expires_at,
            scope: None,
        };
        self.repos.discounts().save(code.clone()).await?;

        info!(code = %code.code, kind = %code.kind, value = %code.value, "Discount code issued");
        Ok(code)
    }

    /// Issue a guest code for a hotel stay (lot managers only).
    ///
    /// The code is generated server-side, single-use, 100% percentage and
    /// bound to the manager's lot and the stay window. Check-out must be
    /// strictly after check-in and check-in must not be in the past.
    pub async fn create_hotel_code(
        &self,
        token: &str,
        lot_id: &str,
        guest_name: &str,
        check_in: DateTime<Utc>,
        check_out: DateTime<Utc>,
    ) -> DomainResult<DiscountCode> {
        let caller = self.caller(token).await?;
        if !caller.manages(lot_id) {
            return Err(DomainError::Forbidden(format!(
                "user {} does not manage lot {}",
                caller.username, lot_id
            )));
        }
        if check_out <= check_in {
            return Err(DomainError::Validation(format!(
                "check-out {check_out} must be after check-in {check_in}"
            )));
        }
        if check_in.date_naive() < Utc::now().date_naive() {
            return Err(DomainError::Validation(format!(
                "check-in {check_in} is in the past"
            )));
        }
        self.repos
            .lots()
            .find_by_id(lot_id)
            .await?
            .ok_or_else(|| DomainError::not_found("parking lot", "id", lot_id))?;

        let code = DiscountCode {
            code: generate_hotel_code(),
            kind: DiscountKind::Percentage,
            value: Decimal::from(100),
            max_uses: Some(1),
            current_uses: 0,
            active: true,
            created_at: Utc::now(),
            expires_at: Some(check_out),
            scope: Some(LotScope {
                lot_id: lot_id.to_string(),
                created_by: caller.username.clone(),
                guest_name: guest_name.to_string(),
                check_in,
                check_out,
            }),
        };
        self.repos.discounts().save(code.clone()).await?;

        info!(
            code = %code.code,
            lot_id = %lot_id,
            manager = %caller.username,
            "Hotel guest code issued"
        );
        Ok(code)
    }

    /// Check a code against a lot and date without consuming a use
    pub async fn validate(
        &self,
        code: &str,
        lot_id: &str,
        as_of: DateTime<Utc>,
    ) -> DomainResult<CodeCheck> {
        let Some(found) = self.repos.discounts().find_by_code(code).await? else {
            return Ok(CodeCheck::Reject(RejectReason::NotFound));
        };
        Ok(match check(&found, lot_id, as_of) {
            None => CodeCheck::Accept(found),
            Some(reason) => CodeCheck::Reject(reason),
        })
    }

    /// Consume one use of a code, atomically with respect to concurrent
    /// redemptions of the same code. Returns the updated code.
    pub async fn redeem(
        &self,
        code: &str,
        lot_id: &str,
        as_of: DateTime<Utc>,
    ) -> DomainResult<DiscountCode> {
        let _guard = self.locks.acquire(&code_key(code)).await;
        let found = self.redeemable_locked(code, lot_id, as_of).await?;
        self.commit_redemption_locked(found).await
    }

    /// Fetch and rule-check a code with the code guard already held by
    /// the caller. Nothing is persisted; pair with
    /// [`Self::commit_redemption_locked`] once the consuming operation
    /// has committed.
    pub(crate) async fn redeemable_locked(
        &self,
        code: &str,
        lot_id: &str,
        as_of: DateTime<Utc>,
    ) -> DomainResult<DiscountCode> {
        let found = self
            .repos
            .discounts()
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::not_found("discount code", "code", code))?;

        if let Some(reason) = check(&found, lot_id, as_of) {
            debug!(code = %code, reason = %reason, "Discount redemption rejected");
            return Err(DomainError::Validation(format!(
                "discount code {code} rejected: {reason}"
            )));
        }
        Ok(found)
    }

    /// Persist one use of a previously checked code; the caller still
    /// holds the code guard.
    pub(crate) async fn commit_redemption_locked(
        &self,
        mut code: DiscountCode,
    ) -> DomainResult<DiscountCode> {
        code.mark_used();
        self.repos.discounts().update(code.clone()).await?;

        info!(code = %code.code, uses = code.current_uses, "Discount code redeemed");
        Ok(code)
    }

    /// Soft-delete a code. Administrators may deactivate any code; a
    /// manager only codes they created.
    pub async fn deactivate(&self, token: &str, code: &str) -> DomainResult<()> {
        let caller = self.caller(token).await?;
        let mut found = self
            .repos
            .discounts()
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::not_found("discount code", "code", code))?;

        let is_creator = found
            .scope
            .as_ref()
            .map_or(false, |s| s.created_by == caller.username);
        if !caller.is_admin() && !is_creator {
            return Err(DomainError::Forbidden(format!(
                "user {} may not deactivate code {}",
                caller.username, code
            )));
        }

        found.deactivate();
        self.repos.discounts().update(found).await?;
        info!(code = %code, "Discount code deactivated");
        Ok(())
    }

    pub async fn get(&self, code: &str) -> DomainResult<DiscountCode> {
        self.repos
            .discounts()
            .find_by_code(code)
            .await?
            .ok_or_else(|| DomainError::not_found("discount code", "code", code))
    }

    pub async fn list(&self) -> DomainResult<Vec<DiscountCode>> {
        self.repos.discounts().find_all().await
    }

    async fn caller(&self, token: &str) -> DomainResult<User> {
        self.identity
            .resolve(token)
            .await?
            .ok_or_else(|| DomainError::Forbidden("unknown session token".to_string()))
    }
}

/// All rejection rules in evaluation order; `None` means acceptable
fn check(code: &DiscountCode, lot_id: &str, as_of: DateTime<Utc>) -> Option<RejectReason> {
    if !code.active {
        return Some(RejectReason::Inactive);
    }
    if !code.has_uses_left() {
        return Some(RejectReason::UsesExhausted);
    }
    if code.is_expired(as_of) {
        return Some(RejectReason::Expired);
    }
    if let Some(scope) = &code.scope {
        if scope.lot_id != lot_id {
            return Some(RejectReason::WrongLot);
        }
        if as_of < scope.check_in || as_of > scope.check_out {
            return Some(RejectReason::OutsideStayWindow);
        }
    }
    None
}

fn generate_hotel_code() -> String {
    let mut rng = rand::thread_rng();
    let random_bytes: [u8; 5] = rng.gen();
    format!("{}{}", HOTEL_CODE_PREFIX, hex::encode(random_bytes).to_uppercase())
}

// ── Tests ──────────────────────────────────────────────────────
