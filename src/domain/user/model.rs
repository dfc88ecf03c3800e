//! User identity as resolved by the external session/identity provider

use serde::{Deserialize, Serialize};

/// User role
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum UserRole {
    User,
    Admin,
    /// Manages a single lot and may issue guest discount codes for it
    HotelManager,
}

impl UserRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::User => "USER",
            Self::Admin => "ADMIN",
            Self::HotelManager => "HOTEL_MANAGER",
        }
    }

    pub fn from_str(s: &str) -> Self {
        match s {
            "ADMIN" => Self::Admin,
            "HOTEL_MANAGER" => Self::HotelManager,
            _ => Self::User,
        }
    }
}

impl Default for UserRole {
    fn default() -> Self {
        Self::User
    }
}

impl std::fmt::Display for UserRole {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Resolved identity; trusted verbatim for authorization checks
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub username: String,
    pub role: UserRole,
    /// Set for `HotelManager` users: the lot they manage
    pub managed_lot_id: Option<String>,
}

impl User {
    pub fn new(username: impl Into<String>, role: UserRole) -> Self {
        Self {
            username: username.into(),
            role,
            managed_lot_id: None,
        }
    }

    pub fn manager_of(username: impl Into<String>, lot_id: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            role: UserRole::HotelManager,
            managed_lot_id: Some(lot_id.into()),
        }
    }

    pub fn is_admin(&self) -> bool {
        self.role == UserRole::Admin
    }

    pub fn manages(&self, lot_id: &str) -> bool {
        self.role == UserRole::HotelManager && self.managed_lot_id.as_deref() == Some(lot_id)
    }
}

// ── Tests ──────────────────────────────────────────────────────
