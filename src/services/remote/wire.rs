// JSON shapes exchanged with the shift service

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};

use super::ServiceError;
use crate::models::shift::{NewShift, Shift, ShiftId};

const WIRE_FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.3f";

/// UTC ISO-8601 without a zone suffix, e.g. `2025-01-13T08:00:00.000`.
pub fn format_wire_time(time: DateTime<Local>) -> String {
    time.with_timezone(&Utc).naive_utc().format(WIRE_FORMAT).to_string()
}

/// Inverse of [`format_wire_time`]; a trailing `Z` is tolerated.
pub fn parse_wire_time(raw: &str) -> Result<DateTime<Local>, ServiceError> {
    let trimmed = raw.trim().trim_end_matches('Z');
    let naive = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f")
        .map_err(|e| ServiceError::Decode(format!("bad timestamp {:?}: {}", raw, e)))?;
    Ok(Utc.from_utc_datetime(&naive).with_timezone(&Local))
}

#[derive(Debug, Serialize)]
pub(super) struct LoginBody<'a> {
    pub id: &'a str,
    pub pass: &'a str,
}

#[derive(Debug, Deserialize)]
pub(super) struct LoginResponse {
    pub token: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateShiftBody<'a> {
    pub username: &'a str,
    pub start_time: String,
    pub end_time: String,
}

impl<'a> CreateShiftBody<'a> {
    pub fn from_new(shift: &'a NewShift) -> Self {
        Self {
            username: &shift.username,
            start_time: format_wire_time(shift.start_time),
            end_time: format_wire_time(shift.end_time),
        }
    }
}

#[derive(Debug, Deserialize)]
pub(super) struct CreatedResponse {
    pub id: ShiftId,
}

#[derive(Debug, Serialize)]
pub(super) struct DurationBody {
    pub start_time: String,
    pub end_time: String,
}

#[derive(Debug, Serialize)]
pub(super) struct CreateUserBody<'a> {
    pub id: &'a str,
    pub isadmin: bool,
}

/// Shift record as listed by the server. Business fields may be missing.
#[derive(Debug, Deserialize)]
pub(super) struct ShiftRecord {
    pub id: ShiftId,
    pub username: String,
    #[serde(default)]
    pub created_by: Option<String>,
    pub start_time: String,
    pub end_time: String,
    #[serde(default = "enabled_by_default")]
    pub enable: bool,
    #[serde(default)]
    pub permitted: bool,
    #[serde(default)]
    pub absent: bool,
}

fn enabled_by_default() -> bool {
    true
}

impl ShiftRecord {
    pub fn into_shift(self) -> Result<Shift, ServiceError> {
        let shift = Shift {
            id: self.id,
            created_by: self.created_by.unwrap_or_else(|| self.username.clone()),
            username: self.username,
            start_time: parse_wire_time(&self.start_time)?,
            end_time: parse_wire_time(&self.end_time)?,
            enable: self.enable,
            permitted: self.permitted,
            absent: self.absent,
        };
        shift
            .validate()
            .map_err(|e| ServiceError::Decode(format!("shift {}: {}", shift.id, e)))?;
        Ok(shift)
    }
}

/// Convert a fetched week, skipping records that do not describe a valid shift.
pub(super) fn shifts_from_records(records: Vec<ShiftRecord>) -> Vec<Shift> {
    records
        .into_iter()
        .filter_map(|record| match record.into_shift() {
            Ok(shift) => Some(shift),
            Err(e) => {
                log::warn!("Skipping unusable shift record: {}", e);
                None
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_wire_time_is_utc_without_suffix() {
        let utc = Utc.with_ymd_and_hms(2025, 1, 13, 8, 0, 0).unwrap();
        let formatted = format_wire_time(utc.with_timezone(&Local));
        assert_eq!(formatted, "2025-01-13T08:00:00.000");
        assert_eq!(parse_wire_time(&formatted).unwrap(), utc.with_timezone(&Local));
        assert_eq!(parse_wire_time("2025-01-13T08:00:00Z").unwrap(), utc.with_timezone(&Local));
        assert!(parse_wire_time("yesterday").is_err());
    }

    #[test]
    fn test_record_defaults() {
        let record: ShiftRecord = serde_json::from_str(
            r#"{"id":3,"username":"alice","start_time":"2025-01-13T08:00:00","end_time":"2025-01-13T09:00:00"}"#,
        )
        .unwrap();
        let shift = record.into_shift().unwrap();
        assert_eq!(shift.created_by, "alice");
        assert!(shift.enable);
        assert!(!shift.permitted);
        assert!(!shift.absent);
        assert_eq!(shift.duration(), Duration::hours(1));
    }

    #[test]
    fn test_record_with_inverted_range_is_rejected() {
        let record: ShiftRecord = serde_json::from_str(
            r#"{"id":3,"username":"alice","start_time":"2025-01-13T09:00:00","end_time":"2025-01-13T08:00:00"}"#,
        )
        .unwrap();
        assert!(matches!(record.into_shift(), Err(ServiceError::Decode(_))));
    }

    #[test]
    fn test_bad_record_does_not_hide_the_week() {
        let records: Vec<ShiftRecord> = serde_json::from_str(
            r#"[
                {"id":1,"username":"alice","start_time":"2025-01-13T08:00:00","end_time":"2025-01-13T09:00:00"},
                {"id":2,"username":"bob","start_time":"2025-01-13T09:00:00","end_time":"2025-01-13T09:00:00"},
                {"id":3,"username":"carol","start_time":"not a time","end_time":"2025-01-13T10:00:00"}
            ]"#,
        )
        .unwrap();

        let shifts = shifts_from_records(records);
        assert_eq!(shifts.len(), 1);
        assert_eq!(shifts[0].id, 1);
        assert_eq!(shifts[0].username, "alice");
    }
}
