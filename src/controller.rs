use tokio::time::{sleep, Instant};
use tracing::{info, trace, warn};

use crate::actuator::Actuator;
use crate::config::ControllerConfig;
use crate::error::{Result, SweepError};
use crate::interpreter;
use crate::motion;
use crate::protocol::StatusLine;
use crate::serial_link::Link;
use crate::state::{ControllerState, ServoId};

/// Each iteration reads at most one pending command line, applies it, then
/// either runs a full sweep cycle or idles. Commands arriving during a cycle
/// wait for the next iteration.
pub struct Controller<L: Link> {
    link: L,
    servo1: Box<dyn Actuator>,
    servo2: Box<dyn Actuator>,
    state: ControllerState,
    config: ControllerConfig,
}

impl<L: Link> Controller<L> {
    pub fn new(
        link: L,
        servo1: Box<dyn Actuator>,
        servo2: Box<dyn Actuator>,
        config: ControllerConfig,
    ) -> Controller<L> {
        Controller {
            link,
            servo1,
            servo2,
            state: ControllerState::new(config.initial_speed_delay_ms),
            config,
        }
    }

    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    pub async fn run(&mut self) -> Result<()> {
        info!(
            speed_delay_ms = self.state.speed_delay_ms,
            "sweep controller ready"
        );
        loop {
            self.run_iteration().await?;
        }
    }

    /// Only a closed line source is reported, every other failure is logged.
    pub async fn run_iteration(&mut self) -> Result<()> {
        match self.link.try_read_line() {
            Ok(Some(line)) => self.handle_line(&line).await,
            Ok(None) => {}
            Err(SweepError::LinkClosed) => return Err(SweepError::LinkClosed),
            Err(error) => warn!(%error, "failed to read command line"),
        }
        if self.state.running {
            self.sweep_cycle().await;
        } else {
            sleep(self.config.idle_interval).await;
        }
        Ok(())
    }

    async fn handle_line(&mut self, line: &str) {
        let outcome = interpreter::apply_line(&mut self.state, line, Instant::now());
        if let Some((servo, angle)) = outcome.direct_write {
            self.write_servo(servo, angle).await;
        }
        if let Some(status) = outcome.ack {
            self.emit(status).await;
        }
    }

    async fn sweep_cycle(&mut self) {
        for pass in 0..self.config.passes_per_cycle {
            trace!(pass, "sweep pass");
            for position in motion::sweep_pass() {
                self.state.position = position;
                let (angle1, angle2) = motion::step_angles(position, self.state.reverse_cycle);
                self.write_servo(ServoId::One, angle1).await;
                self.write_servo(ServoId::Two, angle2).await;
                sleep(self.state.step_delay()).await;
            }
        }
        if motion::expire_reverse(&mut self.state, Instant::now(), self.config.reverse_timeout) {
            self.emit(StatusLine::ReverseTimeout).await;
        }
    }

    async fn write_servo(&mut self, servo: ServoId, angle: i32) {
        let actuator = match servo {
            ServoId::One => &mut self.servo1,
            ServoId::Two => &mut self.servo2,
        };
        if let Err(error) = actuator.set_angle(angle).await {
            warn!(%servo, angle, %error, "servo write failed");
        }
    }

    async fn emit(&mut self, status: StatusLine) {
        info!("{}", status);
        if let Err(error) = self.link.write_line(&status.to_string()).await {
            warn!(%status, %error, "failed to send status line");
        }
    }
}
