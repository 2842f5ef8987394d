// Reconciliation controller
// Owns the visible week's shifts, applies edits optimistically and settles
// the server's answers.
//
// Every operation is split in two synchronous halves around one await:
// `prepare_*` checks the local rules, changes local state and returns a
// `PendingRequest`; `settle` applies the `RequestOutcome`. The UI thread never
// blocks on the network and nothing is sequenced between requests, so a late
// answer can land on top of a newer local edit.

mod policy;
mod request;

pub use policy::{authorize_admin, authorize_edit, authorize_flag, Rejection};
pub use request::{PendingRequest, RequestKind, RequestOutcome};

use chrono::{DateTime, Duration, Local, NaiveDate};

use crate::layout::lanes::LaneTable;
use crate::layout::time_slot::{cell_start, DAYS_PER_WEEK};
use crate::models::settings::Settings;
use crate::models::shift::{NewShift, Shift, ShiftFlag, ShiftId};
use crate::models::user::{Identity, User};
use crate::services::auth::{AuthToken, TokenStore};
use crate::services::remote::{ServiceError, ShiftService};
use crate::utils::date::{get_week_start, start_of_day, to_local};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Success,
    Info,
    Warning,
    Error,
}

/// A message for the user; blocking notices need to be dismissed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
    pub blocking: bool,
}

impl Notice {
    pub fn toast(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            blocking: false,
        }
    }

    pub fn blocking(level: NoticeLevel, message: impl Into<String>) -> Self {
        Self {
            level,
            message: message.into(),
            blocking: true,
        }
    }
}

/// Screen the UI should switch to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Navigation {
    Login,
    Week,
}

/// Empty cell waiting for a privileged user to pick who works the shift.
#[derive(Debug, Clone, PartialEq)]
pub struct AssigneePicker {
    pub row: usize,
    pub day: usize,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
}

#[derive(Debug)]
pub enum CreateFlow {
    /// Self-assigned shift, ready to send
    Submit(PendingRequest),
    /// Ask for an assignee first, then call `choose_assignee`
    PickAssignee(AssigneePicker),
}

pub struct ReconciliationController {
    settings: Settings,
    tokens: TokenStore,
    week_start: NaiveDate,
    shifts: Vec<Shift>,
    lanes: LaneTable,
    users: Vec<User>,
    notices: Vec<Notice>,
    navigation: Option<Navigation>,
}

impl ReconciliationController {
    pub fn new(settings: Settings, tokens: TokenStore, today: NaiveDate) -> Self {
        let week_start = get_week_start(today, settings.first_day_of_week);
        Self {
            settings,
            tokens,
            week_start,
            shifts: Vec::new(),
            lanes: LaneTable::empty(week_start),
            users: Vec::new(),
            notices: Vec::new(),
            navigation: None,
        }
    }

    pub fn week_start(&self) -> NaiveDate {
        self.week_start
    }

    /// `[start, end)` of the visible week in local time.
    pub fn week_range(&self) -> (DateTime<Local>, DateTime<Local>) {
        let start = to_local(start_of_day(self.week_start));
        let end = to_local(start_of_day(self.week_start + Duration::days(DAYS_PER_WEEK as i64)));
        (start, end)
    }

    pub fn shifts(&self) -> &[Shift] {
        &self.shifts
    }

    pub fn shift(&self, id: ShiftId) -> Option<&Shift> {
        self.shifts.iter().find(|shift| shift.id == id)
    }

    pub fn lanes(&self) -> &LaneTable {
        &self.lanes
    }

    pub fn users(&self) -> &[User] {
        &self.users
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn tokens(&self) -> &TokenStore {
        &self.tokens
    }

    /// Acting identity, while the session token is valid.
    pub fn identity(&self) -> Option<Identity> {
        self.tokens.identity()
    }

    pub fn take_notices(&mut self) -> Vec<Notice> {
        std::mem::take(&mut self.notices)
    }

    pub fn take_navigation(&mut self) -> Option<Navigation> {
        self.navigation.take()
    }

    // ---- session ----

    pub fn prepare_login(&self, username: &str, password: &str) -> PendingRequest {
        PendingRequest::new(
            None,
            RequestKind::Login {
                username: username.trim().to_string(),
                password: password.to_string(),
            },
        )
    }

    pub fn sign_out(&mut self) {
        if let Err(e) = self.tokens.clear() {
            log::warn!("Failed to clear stored token: {:#}", e);
        }
        self.replace_shifts(Vec::new());
        self.users.clear();
        self.navigation = Some(Navigation::Login);
    }

    // ---- fetching ----

    /// Show the week containing `date` and request its shifts.
    pub fn change_week(&mut self, date: NaiveDate) -> Option<PendingRequest> {
        self.week_start = get_week_start(date, self.settings.first_day_of_week);
        self.replace_shifts(Vec::new());
        self.prepare_fetch()
    }

    pub fn refresh(&mut self) -> Option<PendingRequest> {
        self.prepare_fetch()
    }

    fn prepare_fetch(&mut self) -> Option<PendingRequest> {
        let token = self.session_token()?;
        let (start, end) = self.week_range();
        Some(PendingRequest::new(
            Some(token),
            RequestKind::FetchWeek {
                week_start: self.week_start,
                start,
                end,
            },
        ))
    }

    // ---- creation ----

    /// Start creating a shift in an empty cell, using the default duration.
    pub fn click_empty_cell(&mut self, row: usize, day: usize) -> Option<CreateFlow> {
        let identity = self.identity_or_redirect()?;
        let start_time = to_local(cell_start(self.week_start, row, day));
        let end_time = start_time + Duration::minutes(self.settings.default_shift_minutes);

        if identity.is_privileged() {
            return Some(CreateFlow::PickAssignee(AssigneePicker {
                row,
                day,
                start_time,
                end_time,
            }));
        }

        let request = self.prepare_create(&identity, &identity.username, start_time, end_time)?;
        Some(CreateFlow::Submit(request))
    }

    pub fn choose_assignee(&mut self, picker: AssigneePicker, assignee: &str) -> Option<PendingRequest> {
        let identity = self.identity_or_redirect()?;
        self.prepare_create(&identity, assignee, picker.start_time, picker.end_time)
    }

    fn prepare_create(
        &mut self,
        identity: &Identity,
        assignee: &str,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
    ) -> Option<PendingRequest> {
        let draft = match NewShift::new(assignee, identity.username.clone(), start_time, end_time) {
            Ok(draft) => draft,
            Err(e) => {
                self.reject(e.into());
                return None;
            }
        };
        let token = self.session_token()?;
        Some(PendingRequest::new(Some(token), RequestKind::Create(draft)))
    }

    // ---- edits ----

    /// Commit a finished move or resize. `original` is the shift before the gesture.
    pub fn prepare_commit(&mut self, original: &Shift, updated: Shift) -> Option<PendingRequest> {
        self.prepare_times(original, updated.start_time, updated.end_time)
    }

    /// Times typed into the detail popover.
    pub fn prepare_edit_times(
        &mut self,
        id: ShiftId,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Option<PendingRequest> {
        let Some(current) = self.shift(id).cloned() else {
            self.reject(Rejection::UnknownShift(id));
            return None;
        };
        self.prepare_times(&current, start, end)
    }

    fn prepare_times(
        &mut self,
        original: &Shift,
        start: DateTime<Local>,
        end: DateTime<Local>,
    ) -> Option<PendingRequest> {
        let checked = self.checked_edit(original.id).and_then(|current| {
            current.with_times(start, end).map_err(Rejection::from)
        });

        let updated = match checked {
            Ok(updated) => updated,
            Err(rejection) => {
                self.restore(original);
                self.reject(rejection);
                return None;
            }
        };

        let token = self.session_token()?;
        log::info!(
            "Shift {} rescheduled to {} – {}",
            updated.id,
            updated.start_time.format("%a %H:%M"),
            updated.end_time.format("%a %H:%M")
        );
        let request = RequestKind::UpdateDuration {
            id: updated.id,
            start: updated.start_time,
            end: updated.end_time,
        };
        self.upsert(updated);
        Some(PendingRequest::new(Some(token), request))
    }

    pub fn prepare_delete(&mut self, id: ShiftId) -> Option<PendingRequest> {
        if let Err(rejection) = self.checked_edit(id) {
            self.reject(rejection);
            return None;
        }
        let token = self.session_token()?;
        log::info!("Shift {} deleted", id);
        self.shifts.retain(|shift| shift.id != id);
        self.rebuild_lanes();
        Some(PendingRequest::new(Some(token), RequestKind::Delete(id)))
    }

    pub fn prepare_flag(&mut self, id: ShiftId, flag: ShiftFlag) -> Option<PendingRequest> {
        let identity = self.identity_or_redirect()?;
        let Some(mut shift) = self.shift(id).cloned() else {
            self.reject(Rejection::UnknownShift(id));
            return None;
        };
        if let Err(rejection) = authorize_flag(&identity, &shift, flag) {
            self.reject(rejection);
            return None;
        }
        let token = self.session_token()?;
        log::info!("Shift {}: {}", id, flag.label());
        shift.apply_flag(flag);
        self.upsert(shift);
        Some(PendingRequest::new(Some(token), RequestKind::SetFlag { id, flag }))
    }

    // ---- users ----

    pub fn prepare_list_users(&mut self) -> Option<PendingRequest> {
        let token = self.session_token()?;
        Some(PendingRequest::new(Some(token), RequestKind::ListUsers))
    }

    pub fn prepare_create_user(&mut self, username: &str, is_admin: bool) -> Option<PendingRequest> {
        let identity = self.identity_or_redirect()?;
        if let Err(rejection) = authorize_admin(&identity) {
            self.reject(rejection);
            return None;
        }
        let username = username.trim();
        if username.is_empty() {
            self.notices
                .push(Notice::toast(NoticeLevel::Warning, "User name cannot be empty"));
            return None;
        }
        let token = self.session_token()?;
        Some(PendingRequest::new(
            Some(token),
            RequestKind::CreateUser {
                username: username.to_string(),
                is_admin,
            },
        ))
    }

    // ---- settling ----

    /// Apply the result of a request sent earlier.
    pub fn settle(&mut self, outcome: RequestOutcome) {
        match outcome {
            RequestOutcome::LoggedIn(Ok(token)) => match self.tokens.set(token) {
                Ok(()) => self.navigation = Some(Navigation::Week),
                Err(e) => {
                    log::error!("Failed to store session token: {:#}", e);
                    self.notices
                        .push(Notice::toast(NoticeLevel::Error, "Could not save the session"));
                }
            },
            RequestOutcome::LoggedIn(Err(e)) => {
                log::warn!("Sign-in failed: {}", e);
                self.notices
                    .push(Notice::toast(NoticeLevel::Error, "Sign-in failed"));
            }
            RequestOutcome::Fetched { week_start, result } => {
                if week_start != self.week_start {
                    log::debug!("Dropping shifts for {}, now showing {}", week_start, self.week_start);
                    return;
                }
                match result {
                    Ok(shifts) => {
                        log::debug!("Loaded {} shift(s) for week of {}", shifts.len(), week_start);
                        self.replace_shifts(shifts);
                    }
                    Err(e) => self.fail("Loading shifts", e, false),
                }
            }
            RequestOutcome::Created { draft, result } => match result {
                Ok(id) => {
                    log::info!("Shift {} created for {}", id, draft.username);
                    self.upsert(draft.into_shift(id));
                }
                Err(e) => self.fail("Creating the shift", e, true),
            },
            RequestOutcome::Updated { id, result } => {
                if let Err(e) = result {
                    self.fail(&format!("Saving shift {}", id), e, false);
                }
            }
            RequestOutcome::Deleted { id, result } => {
                if let Err(e) = result {
                    self.fail(&format!("Deleting shift {}", id), e, false);
                }
            }
            RequestOutcome::Flagged { id, flag, result } => {
                if let Err(e) = result {
                    self.fail(&format!("{} on shift {}", flag.label(), id), e, false);
                }
            }
            RequestOutcome::Users(result) => match result {
                Ok(users) => self.users = users,
                Err(e) => self.fail("Loading users", e, false),
            },
            RequestOutcome::UserCreated(result) => match result {
                Ok(created) => {
                    log::info!("User {} created", created.id);
                    self.notices.push(Notice::blocking(
                        NoticeLevel::Success,
                        format!(
                            "Created user {}. Initial password: {}",
                            created.id, created.generated_secret
                        ),
                    ));
                    self.users.push(User {
                        id: created.id,
                        is_admin: created.is_admin,
                    });
                }
                Err(e) => self.fail("Creating the user", e, false),
            },
        }
    }

    // ---- one-shot helpers ----

    /// Send a prepared request and settle it in place.
    pub async fn run(&mut self, service: &dyn ShiftService, request: Option<PendingRequest>) {
        if let Some(request) = request {
            let outcome = request.send(service).await;
            self.settle(outcome);
        }
    }

    pub async fn login(&mut self, service: &dyn ShiftService, username: &str, password: &str) {
        let request = self.prepare_login(username, password);
        self.run(service, Some(request)).await;
    }

    pub async fn load_week(&mut self, service: &dyn ShiftService, date: NaiveDate) {
        let request = self.change_week(date);
        self.run(service, request).await;
    }

    pub async fn commit_change(&mut self, service: &dyn ShiftService, original: &Shift, updated: Shift) {
        let request = self.prepare_commit(original, updated);
        self.run(service, request).await;
    }

    pub async fn set_flag(&mut self, service: &dyn ShiftService, id: ShiftId, flag: ShiftFlag) {
        let request = self.prepare_flag(id, flag);
        self.run(service, request).await;
    }

    pub async fn delete(&mut self, service: &dyn ShiftService, id: ShiftId) {
        let request = self.prepare_delete(id);
        self.run(service, request).await;
    }

    // ---- internals ----

    /// Current copy of a shift, if the acting identity may edit it.
    fn checked_edit(&mut self, id: ShiftId) -> Result<Shift, Rejection> {
        let identity = self.tokens.identity().ok_or(Rejection::SignedOut)?;
        let shift = self.shift(id).cloned().ok_or(Rejection::UnknownShift(id))?;
        authorize_edit(&identity, &shift)?;
        Ok(shift)
    }

    fn identity_or_redirect(&mut self) -> Option<Identity> {
        let identity = self.tokens.identity();
        if identity.is_none() {
            self.reject(Rejection::SignedOut);
        }
        identity
    }

    fn session_token(&mut self) -> Option<AuthToken> {
        let token = self.tokens.current().cloned();
        if token.is_none() {
            self.reject(Rejection::SignedOut);
        }
        token
    }

    fn reject(&mut self, rejection: Rejection) {
        if rejection == Rejection::SignedOut {
            log::info!("Session expired, returning to sign-in");
            self.navigation = Some(Navigation::Login);
            return;
        }
        log::warn!("Change rejected: {}", rejection);
        self.notices
            .push(Notice::blocking(NoticeLevel::Warning, rejection.to_string()));
    }

    /// Failure of a request that already left. Redirects when the session is
    /// gone, otherwise reports unless `silent`. Local state is left as is.
    fn fail(&mut self, what: &str, error: ServiceError, silent: bool) {
        log::warn!("{} failed: {}", what, error);
        if matches!(error, ServiceError::Unauthorized) {
            if let Err(e) = self.tokens.clear() {
                log::warn!("Failed to clear stored token: {:#}", e);
            }
        }
        if error.needs_login() || self.tokens.current().is_none() {
            self.navigation = Some(Navigation::Login);
            return;
        }
        if !silent {
            self.notices.push(Notice::toast(
                NoticeLevel::Error,
                format!("{} failed. Please try again.", what),
            ));
        }
    }

    fn restore(&mut self, original: &Shift) {
        if self.shift(original.id).is_some() {
            self.upsert(original.clone());
        }
    }

    fn upsert(&mut self, shift: Shift) {
        match self.shifts.iter_mut().find(|existing| existing.id == shift.id) {
            Some(existing) => *existing = shift,
            None => self.shifts.push(shift),
        }
        self.rebuild_lanes();
    }

    fn replace_shifts(&mut self, shifts: Vec<Shift>) {
        self.shifts = shifts;
        self.rebuild_lanes();
    }

    fn rebuild_lanes(&mut self) {
        self.lanes = LaneTable::build(&self.shifts, self.week_start);
    }
}
