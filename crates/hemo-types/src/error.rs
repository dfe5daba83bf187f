use thiserror::Error;

/// Errors produced by type operations.
#[derive(Debug, Error, PartialEq)]
pub enum TypeError {
    #[error("unknown blood type: {0:?}")]
    UnknownBloodType(String),

    #[error("unknown urgency level: {0:?}")]
    UnknownUrgency(String),

    #[error("invalid uuid: {0}")]
    InvalidUuid(String),

    #[error("coordinate out of range: {axis} = {value}")]
    CoordinateOutOfRange { axis: &'static str, value: f64 },
}
