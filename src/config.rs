//! Configuration and CLI argument handling

use std::time::Duration;

use clap::Parser;

/// CLI argument parsing structure
#[derive(Parser)]
#[command(name = "countdown-face")]
#[command(about = "A countdown timer whose character gets more nervous as the deadline approaches")]
#[command(version = "1.0.0")]
pub struct Config {
    /// Base URL of the timer service
    #[arg(short, long, default_value = "http://localhost:8000")]
    pub server: String,

    /// Countdown length, in seconds or as MM:SS
    #[arg(short, long, default_value = "60")]
    pub duration: String,

    /// Interval between status polls while the timer runs, in milliseconds
    #[arg(long, default_value = "1000")]
    pub poll_interval_ms: u64,

    /// Consecutive poll failures before polling gives up (0 = never)
    #[arg(long, default_value = "5")]
    pub max_poll_failures: u32,

    /// Per-request timeout in seconds
    #[arg(long, default_value = "10")]
    pub request_timeout_secs: u64,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,
}

impl Config {
    /// Parse configuration from command line arguments
    pub fn parse() -> Self {
        Parser::parse()
    }

    /// Get the appropriate log level based on verbose flag
    pub fn log_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Session settings derived from the command line
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            poll_interval: Duration::from_millis(self.poll_interval_ms.max(1)),
            max_poll_failures: self.max_poll_failures,
        }
    }
}

/// Settings of a single timer session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    /// Time between polls while the timer is running
    pub poll_interval: Duration,
    /// Consecutive failed polls after which polling stops; 0 keeps polling forever
    pub max_poll_failures: u32,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_secs(1),
            max_poll_failures: 5,
        }
    }
}
