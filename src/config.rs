use crate::rect::Size;
use std::time::Duration;

/// Host configuration.
#[derive(Debug, Clone, PartialEq)]
pub struct HostConfig {
    /// How long each loop iteration waits for input before polling animations.
    pub poll_interval: Duration,
    /// Initial window size. Updated by resize events.
    pub window_size: Size,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            poll_interval: Duration::from_millis(16),
            window_size: Size::new(800., 600.),
        }
    }
}

impl HostConfig {
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }

    pub fn with_window_size(mut self, window_size: Size) -> Self {
        self.window_size = window_size;
        self
    }
}
