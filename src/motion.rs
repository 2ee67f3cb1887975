//! Sweep geometry and reverse mode expiry.

use std::ops::RangeInclusive;
use tokio::time::{Duration, Instant};

use crate::state::ControllerState;

pub const SWEEP_MIN: i32 = 0;
pub const SWEEP_MAX: i32 = 180;

pub fn sweep_pass() -> RangeInclusive<i32> {
    SWEEP_MIN..=SWEEP_MAX
}

/// Angles for servo 1 and servo 2 at a sweep position.
///
/// Servo 2 always runs against servo 1's forward direction. In reverse mode
/// servo 1 is mirrored too, so both servos get the same angle.
pub fn step_angles(position: i32, reverse: bool) -> (i32, i32) {
    let mirrored = SWEEP_MAX - position;
    let servo1 = if reverse { mirrored } else { position };
    (servo1, mirrored)
}

/// Clear reverse mode once `timeout` has elapsed since it was enabled.
///
/// Returns `true` only on the call that actually clears it.
pub fn expire_reverse(state: &mut ControllerState, now: Instant, timeout: Duration) -> bool {
    if !state.reverse_cycle {
        return false;
    }
    let started = match state.reverse_start_time {
        Some(started) => started,
        None => return false,
    };
    if now.saturating_duration_since(started) >= timeout {
        state.disable_reverse();
        return true;
    }
    false
}
