//! Cook Timers - drift-free countdown timers for a cook-mode session
//! 
//! This library keeps any number of per-step countdowns correct across
//! missed ticks and host suspension, and coordinates background
//! notifications so a finished timer is announced even when unattended.

pub mod config;
pub mod error;
pub mod state;
pub mod api;
pub mod parsing;
pub mod services;
pub mod tasks;
pub mod utils;

// Re-export commonly used types
pub use config::Config;
pub use error::{SchedulerError, TimerError};
pub use state::{AppState, TimerCompletion, TimerEntry, TimerRegistry, TimerStatus};
pub use api::create_router;
pub use parsing::parse_duration;
pub use utils::signals::shutdown_signal;
