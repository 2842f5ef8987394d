// Module exports for models

pub mod settings;
pub mod shift;
pub mod user;
