pub mod assignee_picker;
pub mod login;
pub mod shift_popover;
pub mod user_admin;
