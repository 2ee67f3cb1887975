use tokio::time::Duration;

use crate::state::DEFAULT_SPEED_DELAY_MS;

pub const DEFAULT_BAUD_RATE: u32 = 9600;
pub(crate) const DEFAULT_IDLE_INTERVAL_MS: u64 = 100;
pub(crate) const REVERSE_TIMEOUT_MS: u64 = 120_000;
pub(crate) const PASSES_PER_CYCLE: usize = 2;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerConfig {
    pub initial_speed_delay_ms: i32,
    pub idle_interval: Duration,
    pub reverse_timeout: Duration,
    pub passes_per_cycle: usize,
    pub baud_rate: u32,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        ControllerConfig {
            initial_speed_delay_ms: DEFAULT_SPEED_DELAY_MS,
            idle_interval: Duration::from_millis(DEFAULT_IDLE_INTERVAL_MS),
            reverse_timeout: Duration::from_millis(REVERSE_TIMEOUT_MS),
            passes_per_cycle: PASSES_PER_CYCLE,
            baud_rate: DEFAULT_BAUD_RATE,
        }
    }
}

impl ControllerConfig {
    pub fn with_initial_speed(mut self, delay_ms: i32) -> Self {
        self.initial_speed_delay_ms = delay_ms;
        self
    }

    pub fn with_idle_interval(mut self, idle_interval: Duration) -> Self {
        self.idle_interval = idle_interval;
        self
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }
}
