//! Dual servo sweep controller driven by a line based serial protocol.
//!
//! [`Controller`] runs a cooperative loop: poll for one command line, apply
//! it, then sweep both servos through a full two pass cycle or idle.
//! Commands are plain text such as `START`, `SPEED:15` or `REVERSE:1`, see
//! [`protocol`].

mod actuator;
pub mod client;
mod config;
mod controller;
mod error;
pub mod interpreter;
pub mod motion;
pub mod protocol;
mod serial_link;
mod state;

pub use actuator::{Actuator, TracingServo};
pub use config::{ControllerConfig, DEFAULT_BAUD_RATE};
pub use controller::Controller;
pub use error::{Result, SweepError};
pub use protocol::{Command, StatusLine};
pub use serial_link::{
    available_ports, port_opens, FramedSerialLink, LineProtocol, LineSink, LineSource, Link,
};
pub use state::{ControllerState, ServoId};
