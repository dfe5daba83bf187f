use hemo_types::RequestId;
use thiserror::Error;

use crate::request::RequestStatus;

/// Errors produced by request lifecycle operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RequestError {
    #[error("request {id} cannot transition from {from}")]
    InvalidTransition { id: RequestId, from: RequestStatus },

    #[error("request {0} not found")]
    NotFound(RequestId),

    #[error("a request must ask for at least one unit")]
    ZeroUnits,

    #[error("request registry lock poisoned")]
    Poisoned,
}
