// Test fixtures - reusable test data
// Provides consistent shifts, tokens and an in-memory shift service across test files

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

use async_trait::async_trait;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine;
use chrono::{DateTime, Duration, Local, NaiveDate, TimeZone, Utc};

use shift_calendar::models::shift::{NewShift, Shift, ShiftFlag, ShiftId};
use shift_calendar::models::user::{CreatedUser, User};
use shift_calendar::services::auth::AuthToken;
use shift_calendar::services::remote::{ServiceError, ShiftService};

/// Sample dates for testing
pub mod dates {
    use super::*;

    /// Wednesday, Jan 15 2025
    pub fn wednesday() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 15).unwrap()
    }

    /// Sunday starting the week that contains [`wednesday`]
    pub fn week_start() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 12).unwrap()
    }

    pub fn at(date: NaiveDate, hour: u32, minute: u32) -> DateTime<Local> {
        Local
            .from_local_datetime(&date.and_hms_opt(hour, minute, 0).unwrap())
            .unwrap()
    }
}

/// Sample shifts for testing
pub mod shifts {
    use super::*;

    pub fn shift(id: ShiftId, user: &str, start: DateTime<Local>, minutes: i64) -> Shift {
        NewShift::new(user, user, start, start + Duration::minutes(minutes))
            .unwrap()
            .into_shift(id)
    }
}

/// Unsigned token that decodes to the given user; expires an hour from now.
pub fn token_for(user: &str, is_admin: bool) -> AuthToken {
    let exp = Utc::now().timestamp() + 3600;
    let claims = serde_json::json!({
        "iat": exp - 7200,
        "exp": exp,
        "user": user,
        "isadmin": is_admin,
    });
    let payload = URL_SAFE_NO_PAD.encode(claims.to_string());
    AuthToken::parse(format!("eyJhbGciOiJIUzI1NiJ9.{}.sig", payload)).unwrap()
}

/// In-memory stand-in for the remote shift service.
#[derive(Default)]
pub struct FakeShiftService {
    passwords: HashMap<String, (String, bool)>,
    shifts: Mutex<Vec<Shift>>,
    users: Mutex<Vec<User>>,
    next_id: AtomicUsize,
    pub updates: AtomicUsize,
}

impl FakeShiftService {
    pub fn with_accounts(accounts: &[(&str, &str, bool)]) -> Self {
        let passwords = accounts
            .iter()
            .map(|(user, password, is_admin)| (user.to_string(), (password.to_string(), *is_admin)))
            .collect();
        let users = accounts
            .iter()
            .map(|(user, _, is_admin)| User {
                id: user.to_string(),
                is_admin: *is_admin,
            })
            .collect();
        Self {
            passwords,
            users: Mutex::new(users),
            next_id: AtomicUsize::new(1),
            ..Self::default()
        }
    }

    pub fn stored(&self) -> Vec<Shift> {
        self.shifts.lock().unwrap().clone()
    }

    fn check(&self, token: &AuthToken) -> Result<(), ServiceError> {
        if token.is_valid_at(Utc::now()) {
            Ok(())
        } else {
            Err(ServiceError::Unauthorized)
        }
    }

    fn with_shift<F>(&self, id: ShiftId, f: F) -> Result<(), ServiceError>
    where
        F: FnOnce(&mut Shift),
    {
        let mut shifts = self.shifts.lock().unwrap();
        match shifts.iter_mut().find(|shift| shift.id == id) {
            Some(shift) => {
                f(shift);
                Ok(())
            }
            None => Err(ServiceError::Status {
                status: 404,
                message: format!("no shift {}", id),
            }),
        }
    }
}

#[async_trait]
impl ShiftService for FakeShiftService {
    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthToken, ServiceError> {
        match self.passwords.get(username) {
            Some((expected, is_admin)) if expected == password => Ok(token_for(username, *is_admin)),
            _ => Err(ServiceError::Unauthorized),
        }
    }

    async fn list_shifts(
        &self,
        token: &AuthToken,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Vec<Shift>, ServiceError> {
        self.check(token)?;
        Ok(self
            .stored()
            .into_iter()
            .filter(|shift| shift.start_time < end && shift.end_time > start)
            .collect())
    }

    async fn create_shift(&self, token: &AuthToken, shift: &NewShift) -> Result<ShiftId, ServiceError> {
        self.check(token)?;
        let id = self.next_id.fetch_add(1, Ordering::SeqCst) as ShiftId;
        self.shifts.lock().unwrap().push(shift.clone().into_shift(id));
        Ok(id)
    }

    async fn update_shift_duration(
        &self,
        token: &AuthToken,
        id: ShiftId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<(), ServiceError> {
        self.check(token)?;
        self.updates.fetch_add(1, Ordering::SeqCst);
        self.with_shift(id, |shift| {
            shift.start_time = start;
            shift.end_time = end;
        })
    }

    async fn delete_shift(&self, token: &AuthToken, id: ShiftId) -> Result<(), ServiceError> {
        self.check(token)?;
        self.shifts.lock().unwrap().retain(|shift| shift.id != id);
        Ok(())
    }

    async fn set_flag(&self, token: &AuthToken, id: ShiftId, flag: ShiftFlag) -> Result<(), ServiceError> {
        self.check(token)?;
        self.with_shift(id, |shift| shift.apply_flag(flag))
    }

    async fn list_users(&self, token: &AuthToken) -> Result<Vec<User>, ServiceError> {
        self.check(token)?;
        Ok(self.users.lock().unwrap().clone())
    }

    async fn create_user(
        &self,
        token: &AuthToken,
        username: &str,
        is_admin: bool,
    ) -> Result<CreatedUser, ServiceError> {
        self.check(token)?;
        self.users.lock().unwrap().push(User {
            id: username.to_string(),
            is_admin,
        });
        Ok(CreatedUser {
            id: username.to_string(),
            is_admin,
            generated_secret: "s3cret".to_string(),
        })
    }
}
