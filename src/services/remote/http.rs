use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use reqwest::header::AUTHORIZATION;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;

use super::wire::{
    format_wire_time, shifts_from_records, CreateShiftBody, CreateUserBody, CreatedResponse,
    DurationBody, LoginBody, LoginResponse, ShiftRecord,
};
use super::{ServiceError, ShiftService};
use crate::models::shift::{NewShift, Shift, ShiftFlag, ShiftId};
use crate::models::user::{CreatedUser, User};
use crate::services::auth::AuthToken;

const REQUEST_TIMEOUT: Duration = Duration::from_secs(20);
const MAX_ERROR_BODY: usize = 200;

/// `ShiftService` over the JSON REST API.
#[derive(Debug, Clone)]
pub struct HttpShiftService {
    http: Client,
    base_url: String,
}

impl HttpShiftService {
    pub fn new(base_url: impl Into<String>) -> Result<Self, ServiceError> {
        let http = Client::builder().timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    fn shift_url(&self, id: ShiftId) -> String {
        self.url(&format!("/api/schedules/{}", id))
    }

    pub fn build_login_request(&self, username: &str, password: &str) -> RequestBuilder {
        self.http.post(self.url("/api/login")).json(&LoginBody {
            id: username,
            pass: password,
        })
    }

    pub fn build_list_shifts_request(
        &self,
        token: &AuthToken,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> RequestBuilder {
        self.http
            .get(self.url("/api/schedules"))
            .header(AUTHORIZATION, token.as_str())
            .query(&[("start", format_wire_time(start)), ("end", format_wire_time(end))])
    }

    pub fn build_create_shift_request(&self, token: &AuthToken, shift: &NewShift) -> RequestBuilder {
        self.http
            .post(self.url("/api/schedules"))
            .header(AUTHORIZATION, token.as_str())
            .json(&CreateShiftBody::from_new(shift))
    }

    pub fn build_update_request(
        &self,
        token: &AuthToken,
        id: ShiftId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> RequestBuilder {
        self.http
            .put(self.shift_url(id))
            .header(AUTHORIZATION, token.as_str())
            .json(&DurationBody {
                start_time: format_wire_time(start),
                end_time: format_wire_time(end),
            })
    }

    pub fn build_delete_request(&self, token: &AuthToken, id: ShiftId) -> RequestBuilder {
        self.http
            .delete(self.shift_url(id))
            .header(AUTHORIZATION, token.as_str())
    }

    pub fn build_flag_request(&self, token: &AuthToken, id: ShiftId, flag: ShiftFlag) -> RequestBuilder {
        let action = match flag {
            ShiftFlag::Disabled => "enable",
            ShiftFlag::Permitted => "permit",
            ShiftFlag::Absent => "absent",
        };
        self.http
            .put(format!("{}/{}", self.shift_url(id), action))
            .header(AUTHORIZATION, token.as_str())
    }

    pub fn build_list_users_request(&self, token: &AuthToken) -> RequestBuilder {
        self.http
            .get(self.url("/api/users"))
            .header(AUTHORIZATION, token.as_str())
    }

    pub fn build_create_user_request(
        &self,
        token: &AuthToken,
        username: &str,
        is_admin: bool,
    ) -> RequestBuilder {
        self.http
            .post(self.url("/api/users"))
            .header(AUTHORIZATION, token.as_str())
            .json(&CreateUserBody {
                id: username,
                isadmin: is_admin,
            })
    }

    async fn execute(request: RequestBuilder) -> Result<Response, ServiceError> {
        let response = request.send().await?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        if status == StatusCode::UNAUTHORIZED {
            return Err(ServiceError::Unauthorized);
        }

        let mut message = response.text().await.unwrap_or_default();
        if message.len() > MAX_ERROR_BODY {
            let cut = (0..=MAX_ERROR_BODY)
                .rev()
                .find(|&i| message.is_char_boundary(i))
                .unwrap_or(0);
            message.truncate(cut);
        }
        Err(ServiceError::Status {
            status: status.as_u16(),
            message,
        })
    }

    async fn execute_json<T: DeserializeOwned>(request: RequestBuilder) -> Result<T, ServiceError> {
        let response = Self::execute(request).await?;
        response
            .json::<T>()
            .await
            .map_err(|e| ServiceError::Decode(e.to_string()))
    }
}

#[async_trait]
impl ShiftService for HttpShiftService {
    async fn authenticate(&self, username: &str, password: &str) -> Result<AuthToken, ServiceError> {
        let response: LoginResponse =
            Self::execute_json(self.build_login_request(username, password)).await?;
        AuthToken::parse(response.token).map_err(|e| ServiceError::Decode(e.to_string()))
    }

    async fn list_shifts(
        &self,
        token: &AuthToken,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<Vec<Shift>, ServiceError> {
        let records: Vec<ShiftRecord> =
            Self::execute_json(self.build_list_shifts_request(token, start, end)).await?;
        Ok(shifts_from_records(records))
    }

    async fn create_shift(&self, token: &AuthToken, shift: &NewShift) -> Result<ShiftId, ServiceError> {
        let created: CreatedResponse =
            Self::execute_json(self.build_create_shift_request(token, shift)).await?;
        Ok(created.id)
    }

    async fn update_shift_duration(
        &self,
        token: &AuthToken,
        id: ShiftId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Result<(), ServiceError> {
        Self::execute(self.build_update_request(token, id, start, end)).await?;
        Ok(())
    }

    async fn delete_shift(&self, token: &AuthToken, id: ShiftId) -> Result<(), ServiceError> {
        Self::execute(self.build_delete_request(token, id)).await?;
        Ok(())
    }

    async fn set_flag(&self, token: &AuthToken, id: ShiftId, flag: ShiftFlag) -> Result<(), ServiceError> {
        Self::execute(self.build_flag_request(token, id, flag)).await?;
        Ok(())
    }

    async fn list_users(&self, token: &AuthToken) -> Result<Vec<User>, ServiceError> {
        Self::execute_json(self.build_list_users_request(token)).await
    }

    async fn create_user(
        &self,
        token: &AuthToken,
        username: &str,
        is_admin: bool,
    ) -> Result<CreatedUser, ServiceError> {
        Self::execute_json(self.build_create_user_request(token, username, is_admin)).await
    }
}
