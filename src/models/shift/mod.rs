// Shift module
// Time-bounded work assignment shown on the weekly grid

use chrono::{DateTime, Duration, Local};
use thiserror::Error;

/// Server-assigned shift identifier.
pub type ShiftId = i64;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ShiftError {
    #[error("shift end time must be after start time")]
    InvalidRange,
    #[error("shift must be assigned to a user")]
    MissingAssignee,
}

/// The three idempotent annotations an authorized actor can set on a shift.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ShiftFlag {
    /// Rejects/blocks the shift (`enable = false`)
    Disabled,
    /// Locks the shift against further move/resize (`permitted = true`)
    Permitted,
    /// Records a requested absence on a permitted shift (`absent = true`)
    Absent,
}

impl ShiftFlag {
    pub fn label(&self) -> &'static str {
        match self {
            ShiftFlag::Disabled => "Disable",
            ShiftFlag::Permitted => "Permit",
            ShiftFlag::Absent => "Record absence",
        }
    }
}

/// A shift as stored by the remote authority.
///
/// All business fields are always present; records that arrive without them are
/// filled with `enable = true`, `permitted = false`, `absent = false`.
#[derive(Debug, Clone, PartialEq)]
pub struct Shift {
    pub id: ShiftId,
    pub username: String,
    pub created_by: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
    pub enable: bool,
    pub permitted: bool,
    pub absent: bool,
}

impl Shift {
    /// Validate the shift
    pub fn validate(&self) -> Result<(), ShiftError> {
        if self.username.trim().is_empty() {
            return Err(ShiftError::MissingAssignee);
        }
        if self.end_time <= self.start_time {
            return Err(ShiftError::InvalidRange);
        }
        Ok(())
    }

    /// Get the duration of the shift
    pub fn duration(&self) -> Duration {
        self.end_time - self.start_time
    }

    /// A permitted shift can no longer be moved, resized or deleted.
    pub fn is_locked(&self) -> bool {
        self.permitted
    }

    /// True when `user` is the assignee or the creator of this shift.
    pub fn is_owned_by(&self, user: &str) -> bool {
        self.username == user || self.created_by == user
    }

    /// Whether the given flag is already set.
    pub fn has_flag(&self, flag: ShiftFlag) -> bool {
        match flag {
            ShiftFlag::Disabled => !self.enable,
            ShiftFlag::Permitted => self.permitted,
            ShiftFlag::Absent => self.absent,
        }
    }

    /// Set a flag. Setting it again leaves the shift unchanged.
    pub fn apply_flag(&mut self, flag: ShiftFlag) {
        match flag {
            ShiftFlag::Disabled => self.enable = false,
            ShiftFlag::Permitted => self.permitted = true,
            ShiftFlag::Absent => self.absent = true,
        }
    }

    /// Copy of this shift with new bounds, validated.
    pub fn with_times(
        &self,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
    ) -> Result<Self, ShiftError> {
        let shift = Self {
            start_time,
            end_time,
            ..self.clone()
        };
        shift.validate()?;
        Ok(shift)
    }
}

/// A shift that has not been accepted by the server yet, so it has no id.
#[derive(Debug, Clone, PartialEq)]
pub struct NewShift {
    pub username: String,
    pub created_by: String,
    pub start_time: DateTime<Local>,
    pub end_time: DateTime<Local>,
}

impl NewShift {
    pub fn new(
        username: impl Into<String>,
        created_by: impl Into<String>,
        start_time: DateTime<Local>,
        end_time: DateTime<Local>,
    ) -> Result<Self, ShiftError> {
        let username = username.into();
        if username.trim().is_empty() {
            return Err(ShiftError::MissingAssignee);
        }
        if end_time <= start_time {
            return Err(ShiftError::InvalidRange);
        }
        Ok(Self {
            username,
            created_by: created_by.into(),
            start_time,
            end_time,
        })
    }

    /// Attach the server-assigned id, defaulting business fields to safe values.
    pub fn into_shift(self, id: ShiftId) -> Shift {
        Shift {
            id,
            username: self.username,
            created_by: self.created_by,
            start_time: self.start_time,
            end_time: self.end_time,
            enable: true,
            permitted: false,
            absent: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn monday_nine() -> DateTime<Local> {
        Local.with_ymd_and_hms(2025, 1, 13, 9, 0, 0).unwrap()
    }

    fn sample_shift() -> Shift {
        NewShift::new("alice", "alice", monday_nine(), monday_nine() + Duration::hours(1))
            .unwrap()
            .into_shift(7)
    }

    #[test]
    fn test_new_shift_defaults() {
        let shift = sample_shift();
        assert_eq!(shift.id, 7);
        assert!(shift.enable);
        assert!(!shift.permitted);
        assert!(!shift.absent);
        assert_eq!(shift.duration(), Duration::hours(1));
    }

    #[test]
    fn test_new_shift_rejects_inverted_range() {
        let result = NewShift::new("alice", "alice", monday_nine(), monday_nine());
        assert_eq!(result.unwrap_err(), ShiftError::InvalidRange);
    }

    #[test]
    fn test_new_shift_rejects_blank_assignee() {
        let result = NewShift::new("  ", "alice", monday_nine(), monday_nine() + Duration::hours(1));
        assert_eq!(result.unwrap_err(), ShiftError::MissingAssignee);
    }

    #[test]
    fn test_with_times_validates() {
        let shift = sample_shift();
        assert!(shift.with_times(shift.end_time, shift.start_time).is_err());

        let moved = shift
            .with_times(shift.start_time + Duration::days(1), shift.end_time + Duration::days(1))
            .unwrap();
        assert_eq!(moved.id, shift.id);
        assert_eq!(moved.duration(), shift.duration());
    }

    #[test]
    fn test_ownership() {
        let mut shift = sample_shift();
        shift.username = "bob".to_string();
        assert!(shift.is_owned_by("bob"));
        assert!(shift.is_owned_by("alice"));
        assert!(!shift.is_owned_by("carol"));
    }

    #[test]
    fn test_flags_are_idempotent() {
        for flag in [ShiftFlag::Disabled, ShiftFlag::Permitted, ShiftFlag::Absent] {
            let mut once = sample_shift();
            once.apply_flag(flag);
            let mut twice = once.clone();
            twice.apply_flag(flag);
            assert_eq!(once, twice);
            assert!(twice.has_flag(flag));
        }
    }

    #[test]
    fn test_permitted_shift_is_locked() {
        let mut shift = sample_shift();
        assert!(!shift.is_locked());
        shift.apply_flag(ShiftFlag::Permitted);
        assert!(shift.is_locked());
    }
}
