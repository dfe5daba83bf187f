use thiserror::Error;

/// Errors produced by ledger operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum LedgerError {
    #[error("integrity violation at block {index}: {reason}")]
    IntegrityViolation { index: u64, reason: String },

    #[error("chain tail advanced during mining; gave up after {attempts} attempts")]
    TailContention { attempts: u32 },

    #[error("block {0} not found")]
    BlockNotFound(u64),

    #[error("serialization error: {0}")]
    Serialization(String),

    #[error("ledger lock poisoned")]
    Poisoned,
}
