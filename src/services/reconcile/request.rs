// Network-ready descriptions of remote calls and their results

use chrono::{DateTime, Local, NaiveDate};

use crate::models::shift::{NewShift, Shift, ShiftFlag, ShiftId};
use crate::models::user::{CreatedUser, User};
use crate::services::auth::AuthToken;
use crate::services::remote::{ServiceError, ShiftService};

#[derive(Debug, Clone, PartialEq)]
pub enum RequestKind {
    Login {
        username: String,
        password: String,
    },
    FetchWeek {
        week_start: NaiveDate,
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    Create(NewShift),
    UpdateDuration {
        id: ShiftId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    },
    Delete(ShiftId),
    SetFlag {
        id: ShiftId,
        flag: ShiftFlag,
    },
    ListUsers,
    CreateUser {
        username: String,
        is_admin: bool,
    },
}

/// One remote call, prepared after the local state change it confirms.
///
/// Owns everything it needs, so it can be moved onto another task.
#[derive(Debug, Clone)]
pub struct PendingRequest {
    token: Option<AuthToken>,
    kind: RequestKind,
}

impl PendingRequest {
    pub(super) fn new(token: Option<AuthToken>, kind: RequestKind) -> Self {
        Self { token, kind }
    }

    pub fn kind(&self) -> &RequestKind {
        &self.kind
    }

    /// Perform the call. Never touches local state; feed the result to `settle`.
    pub async fn send(self, service: &dyn ShiftService) -> RequestOutcome {
        let token = self.token;
        match self.kind {
            RequestKind::Login { username, password } => {
                RequestOutcome::LoggedIn(service.authenticate(&username, &password).await)
            }
            RequestKind::FetchWeek {
                week_start,
                start,
                end,
            } => {
                let result = match &token {
                    Some(token) => service.list_shifts(token, start, end).await,
                    None => Err(ServiceError::MissingToken),
                };
                RequestOutcome::Fetched { week_start, result }
            }
            RequestKind::Create(draft) => {
                let result = match &token {
                    Some(token) => service.create_shift(token, &draft).await,
                    None => Err(ServiceError::MissingToken),
                };
                RequestOutcome::Created { draft, result }
            }
            RequestKind::UpdateDuration { id, start, end } => {
                let result = match &token {
                    Some(token) => service.update_shift_duration(token, id, start, end).await,
                    None => Err(ServiceError::MissingToken),
                };
                RequestOutcome::Updated { id, result }
            }
            RequestKind::Delete(id) => {
                let result = match &token {
                    Some(token) => service.delete_shift(token, id).await,
                    None => Err(ServiceError::MissingToken),
                };
                RequestOutcome::Deleted { id, result }
            }
            RequestKind::SetFlag { id, flag } => {
                let result = match &token {
                    Some(token) => service.set_flag(token, id, flag).await,
                    None => Err(ServiceError::MissingToken),
                };
                RequestOutcome::Flagged { id, flag, result }
            }
            RequestKind::ListUsers => RequestOutcome::Users(match &token {
                Some(token) => service.list_users(token).await,
                None => Err(ServiceError::MissingToken),
            }),
            RequestKind::CreateUser { username, is_admin } => {
                RequestOutcome::UserCreated(match &token {
                    Some(token) => service.create_user(token, &username, is_admin).await,
                    None => Err(ServiceError::MissingToken),
                })
            }
        }
    }
}

/// Result of a [`PendingRequest`], applied on the UI thread by `settle`.
#[derive(Debug)]
pub enum RequestOutcome {
    LoggedIn(Result<AuthToken, ServiceError>),
    Fetched {
        week_start: NaiveDate,
        result: Result<Vec<Shift>, ServiceError>,
    },
    Created {
        draft: NewShift,
        result: Result<ShiftId, ServiceError>,
    },
    Updated {
        id: ShiftId,
        result: Result<(), ServiceError>,
    },
    Deleted {
        id: ShiftId,
        result: Result<(), ServiceError>,
    },
    Flagged {
        id: ShiftId,
        flag: ShiftFlag,
        result: Result<(), ServiceError>,
    },
    Users(Result<Vec<User>, ServiceError>),
    UserCreated(Result<CreatedUser, ServiceError>),
}
