use async_trait::async_trait;
use tracing::debug;

use crate::error::Result;
use crate::motion::{SWEEP_MAX, SWEEP_MIN};
use crate::state::ServoId;

/// Something that can be told to move to an angle in degrees.
///
/// Callers pass angles through unclamped. Implementations decide whether to
/// clamp or to fail on values outside what the hardware accepts.
#[async_trait]
pub trait Actuator: Send {
    async fn set_angle(&mut self, angle: i32) -> Result<()>;
}

pub struct TracingServo {
    id: ServoId,
    last_angle: Option<i32>,
}

impl TracingServo {
    pub fn new(id: ServoId) -> TracingServo {
        TracingServo {
            id,
            last_angle: None,
        }
    }

    pub fn last_angle(&self) -> Option<i32> {
        self.last_angle
    }
}

#[async_trait]
impl Actuator for TracingServo {
    async fn set_angle(&mut self, angle: i32) -> Result<()> {
        let applied = angle.clamp(SWEEP_MIN, SWEEP_MAX);
        if applied != angle {
            debug!(servo = %self.id, requested = angle, applied, "angle clamped");
        }
        debug!(servo = %self.id, angle = applied, "servo write");
        self.last_angle = Some(applied);
        Ok(())
    }
}
