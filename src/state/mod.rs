//! State management module
//! 
//! This module contains the timer entries, the registry that owns them, and
//! the session state shared with the HTTP API.

pub mod timer_entry;
pub mod registry;
pub mod app_state;

// Re-export main types
pub use timer_entry::{TimerCompletion, TimerEntry, TimerStatus};
pub use registry::{TimerRegistry, MAX_DURATION_SECONDS};
pub use app_state::AppState;
