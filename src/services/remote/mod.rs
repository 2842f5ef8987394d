// Remote shift service
// The authority that stores shifts and users; the controller only talks to it
// through the `ShiftService` trait.

mod http;
mod wire;

pub use http::HttpShiftService;
pub use wire::{format_wire_time, parse_wire_time};

use async_trait::async_trait;
use chrono::{DateTime, Local};
use thiserror::Error;

use crate::models::shift::{NewShift, Shift, ShiftFlag, ShiftId};
use crate::models::user::{CreatedUser, User};
use crate::services::auth::AuthToken;

#[derive(Debug, Error)]
pub enum ServiceError {
    #[error("not signed in")]
    MissingToken,
    #[error("the server rejected the session")]
    Unauthorized,
    #[error("server responded with HTTP {status}: {message}")]
    Status { status: u16, message: String },
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("unexpected response: {0}")]
    Decode(String),
}

impl ServiceError {
    /// Whether signing in again could fix this failure.
    pub fn needs_login(&self) -> bool {
        matches!(self, ServiceError::MissingToken | ServiceError::Unauthorized)
    }
}

#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ShiftService: Send + Sync {
    /// Exchange credentials for a bearer token.
    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthToken, ServiceError>;

    /// Shifts overlapping `[start, end)`.
    async fn list_shifts(
        &self,
        token: &AuthToken,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Vec<Shift>, ServiceError>;

    /// Create a shift and return its server-assigned id.
    async fn create_shift(&self, token: &AuthToken, shift: &NewShift) -> Result<ShiftId, ServiceError>;

    async fn update_shift_duration(
        &self,
        token: &AuthToken,
        id: ShiftId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<(), ServiceError>;

    async fn delete_shift(&self, token: &AuthToken, id: ShiftId) -> Result<(), ServiceError>;

    /// Set one of the idempotent shift annotations.
    async fn set_flag(&self, token: &AuthToken, id: ShiftId, flag: ShiftFlag) -> Result<(), ServiceError>;

    async fn list_users(&self, token: &AuthToken) -> Result<Vec<User>, ServiceError>;

    async fn create_user(
        &self,
        token: &AuthToken,
        username: &str,
        is_admin: bool,
    ) -> Result<CreatedUser, ServiceError>;
}
