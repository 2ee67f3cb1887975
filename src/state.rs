use std::fmt;
use tokio::time::{Duration, Instant};

pub(crate) const DEFAULT_SPEED_DELAY_MS: i32 = 15;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ServoId {
    One,
    Two,
}

impl fmt::Display for ServoId {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServoId::One => write!(f, "Servo1"),
            ServoId::Two => write!(f, "Servo2"),
        }
    }
}

/// Shared controller state.
///
/// Written by the interpreter. The motion controller only reads it, apart
/// from clearing `reverse_cycle` once reverse mode has timed out, and
/// recording the current sweep `position`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ControllerState {
    pub running: bool,
    /// Pause between one degree steps. Negative values are kept as parsed.
    pub speed_delay_ms: i32,
    pub reverse_cycle: bool,
    /// Only meaningful while `reverse_cycle` is set.
    pub reverse_start_time: Option<Instant>,
    pub position: i32,
}

impl ControllerState {
    pub fn new(speed_delay_ms: i32) -> ControllerState {
        ControllerState {
            running: false,
            speed_delay_ms,
            reverse_cycle: false,
            reverse_start_time: None,
            position: 0,
        }
    }

    pub fn step_delay(&self) -> Duration {
        Duration::from_millis(self.speed_delay_ms.max(0) as u64)
    }

    /// Enter reverse mode, stamping the start time.
    ///
    /// Returns `false` and leaves the stamp untouched if reverse mode was
    /// already on.
    pub fn enable_reverse(&mut self, now: Instant) -> bool {
        if self.reverse_cycle {
            return false;
        }
        self.reverse_cycle = true;
        self.reverse_start_time = Some(now);
        true
    }

    pub fn disable_reverse(&mut self) {
        self.reverse_cycle = false;
    }
}

impl Default for ControllerState {
    fn default() -> Self {
        ControllerState::new(DEFAULT_SPEED_DELAY_MS)
    }
}
