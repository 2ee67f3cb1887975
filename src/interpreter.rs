use tokio::time::Instant;
use tracing::debug;

use crate::protocol::{Command, StatusLine};
use crate::state::{ControllerState, ServoId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Outcome {
    pub direct_write: Option<(ServoId, i32)>,
    pub ack: Option<StatusLine>,
}

/// Apply a parsed command to the controller state.
///
/// Direct servo moves are handed back in the [`Outcome`] instead of being
/// performed here, so the state transitions stay free of I/O.
pub fn apply(state: &mut ControllerState, command: Command, now: Instant) -> Outcome {
    match command {
        Command::Start => {
            state.running = true;
            ack(StatusLine::Started)
        }
        Command::Stop => {
            state.running = false;
            ack(StatusLine::Stopped)
        }
        Command::Speed(delay) => {
            state.speed_delay_ms = delay;
            ack(StatusLine::SpeedSet(delay))
        }
        Command::Servo(servo, angle) => Outcome {
            direct_write: Some((servo, angle)),
            ack: Some(StatusLine::ServoMoved(servo, angle)),
        },
        Command::Reverse(true) => {
            if state.enable_reverse(now) {
                ack(StatusLine::ReverseOn)
            } else {
                debug!("reverse mode already on");
                Outcome::default()
            }
        }
        Command::Reverse(false) => {
            state.disable_reverse();
            ack(StatusLine::ReverseOff)
        }
    }
}

/// Parse and apply one raw input line. Unknown lines change nothing.
pub fn apply_line(state: &mut ControllerState, line: &str, now: Instant) -> Outcome {
    match crate::protocol::parse(line) {
        Some(command) => apply(state, command, now),
        None => {
            debug!(line = line.trim(), "ignoring unrecognized input");
            Outcome::default()
        }
    }
}

fn ack(status: StatusLine) -> Outcome {
    Outcome {
        direct_write: None,
        ack: Some(status),
    }
}
