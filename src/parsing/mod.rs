//! Step text parsing module

pub mod duration;

pub use duration::parse_duration;
