// Service module exports

pub mod auth;
pub mod reconcile;
pub mod remote;
pub mod settings;
