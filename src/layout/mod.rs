// Week grid layout: slot indexing, lane assignment and pixel geometry

pub mod geometry;
pub mod lanes;
pub mod span;
pub mod time_slot;
