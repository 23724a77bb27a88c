//! Configuration and CLI argument handling

use std::time::Duration;
use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser, Debug)]
#[command(name = "cook-timers")]
#[command(about = "Drift-free cook-mode step timers with background notifications")]
#[command(version)]
pub struct Config {
    /// Port to bind the server to
    #[arg(short, long, default_value = "20554")]
    pub port: u16,

    /// Host address to bind to
    #[arg(long, default_value = "127.0.0.1")]
    pub host: String,

    /// Tick interval in milliseconds
    #[arg(long, default_value = "1000")]
    pub tick_ms: u64,

    /// Wall-clock jump (seconds) between wakeups treated as a suspension
    #[arg(long, default_value = "5")]
    pub wake_threshold_secs: u64,

    /// Command used to deliver background notifications (called as `<cmd> <title> <body>`)
    #[arg(long, default_value = "notify-send")]
    pub notify_command: String,

    /// Disable background notifications entirely
    #[arg(long)]
    pub no_notifications: bool,

    /// Command run with the timer label when a timer completes
    #[arg(long)]
    pub alert_command: Option<String>,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the server address as a formatted string
    pub fn address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_ms.max(1))
    }

    pub fn wake_threshold(&self) -> Duration {
        Duration::from_secs(self.wake_threshold_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = Config::try_parse_from(["cook-timers"]).unwrap();
        assert_eq!(config.address(), "127.0.0.1:20554");
        assert_eq!(config.tick_interval(), Duration::from_secs(1));
        assert_eq!(config.wake_threshold(), Duration::from_secs(5));
        assert_eq!(config.notify_command, "notify-send");
        assert!(!config.no_notifications);
        assert_eq!(config.log_level(), "info");
    }

    #[test]
    fn flags() {
        let config = Config::try_parse_from([
            "cook-timers", "--port", "8080", "--tick-ms", "0", "--no-notifications",
            "--alert-command", "paplay-chime", "-v",
        ]).unwrap();
        assert_eq!(config.port, 8080);
        assert_eq!(config.tick_interval(), Duration::from_millis(1));
        assert!(config.no_notifications);
        assert_eq!(config.alert_command.as_deref(), Some("paplay-chime"));
        assert_eq!(config.log_level(), "debug");
    }
}
