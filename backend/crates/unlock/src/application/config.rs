//! Application Configuration
//!
//! Tunables of the unlock engine.

use std::time::Duration;

#[derive(Debug, Clone)]
pub struct UnlockConfig {
    /// Validity of signed download URLs for internal files
    pub signed_url_ttl: Duration,
    /// How long a failed-attempt message stays visible
    pub error_display_window: Duration,
    /// Delay between handing out a task link and passing the session
    pub task_grace: Duration,
    /// Countdown tick interval for TIME_DELAY
    pub countdown_period: Duration,
    /// Sessions without a visitor request for this long are dropped
    pub session_idle_ttl: Duration,
    /// How often idle sessions are swept
    pub sweep_interval: Duration,
}

impl Default for UnlockConfig {
    fn default() -> Self {
        Self {
            signed_url_ttl: Duration::from_secs(3600),
            error_display_window: Duration::from_secs(3),
            task_grace: Duration::from_secs(2),
            countdown_period: Duration::from_secs(1),
            session_idle_ttl: Duration::from_secs(30 * 60),
            sweep_interval: Duration::from_secs(60),
        }
    }
}

impl UnlockConfig {
    pub fn error_display_ms(&self) -> i64 {
        self.error_display_window.as_millis() as i64
    }

    pub fn session_idle_ttl_ms(&self) -> i64 {
        self.session_idle_ttl.as_millis() as i64
    }
}
