use hemo_types::DonorId;
use thiserror::Error;

/// Errors produced by donor directory operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum DonorError {
    #[error("donor {0} not found")]
    NotFound(DonorId),

    #[error("donor directory lock poisoned")]
    Poisoned,
}
