use thiserror::Error;

use crate::state::ServoId;

#[derive(Error, Debug)]
#[non_exhaustive]
pub enum SweepError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),
    #[error("line source closed")]
    LinkClosed,
    #[error("{servo} failed: {reason}")]
    Actuator { servo: ServoId, reason: String },
}

pub type Result<T> = std::result::Result<T, SweepError>;
