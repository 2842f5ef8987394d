// Business rules checked locally before any request is sent

use thiserror::Error;

use crate::models::shift::{Shift, ShiftError, ShiftFlag, ShiftId};
use crate::models::user::Identity;

/// Why a local change was refused without contacting the server.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Rejection {
    #[error("This shift has been permitted and can no longer be changed.")]
    Locked,
    #[error("Only the assignee, the creator or an administrator can change this shift.")]
    NotOwner,
    #[error("Only administrators can do this.")]
    NotAdmin,
    #[error("Absence can only be recorded on a permitted shift.")]
    NotPermitted,
    #[error("Shift {0} is no longer loaded.")]
    UnknownShift(ShiftId),
    #[error("{0}")]
    InvalidRange(#[from] ShiftError),
    #[error("Your session has expired.")]
    SignedOut,
}

/// Move, resize, time edits and deletion.
pub fn authorize_edit(identity: &Identity, shift: &Shift) -> Result<(), Rejection> {
    if shift.is_locked() {
        return Err(Rejection::Locked);
    }
    if !identity.is_admin && !shift.is_owned_by(&identity.username) {
        return Err(Rejection::NotOwner);
    }
    Ok(())
}

pub fn authorize_flag(identity: &Identity, shift: &Shift, flag: ShiftFlag) -> Result<(), Rejection> {
    match flag {
        ShiftFlag::Disabled | ShiftFlag::Permitted => {
            if !identity.is_admin {
                return Err(Rejection::NotAdmin);
            }
        }
        ShiftFlag::Absent => {
            if !shift.permitted {
                return Err(Rejection::NotPermitted);
            }
            if !identity.is_admin && !shift.is_owned_by(&identity.username) {
                return Err(Rejection::NotOwner);
            }
        }
    }
    Ok(())
}

pub fn authorize_admin(identity: &Identity) -> Result<(), Rejection> {
    if identity.is_admin {
        Ok(())
    } else {
        Err(Rejection::NotAdmin)
    }
}
