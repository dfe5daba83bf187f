use thiserror::Error;

use hemo_donor::DonorError;
use hemo_inventory::InventoryError;
use hemo_ledger::LedgerError;
use hemo_request::RequestError;
use hemo_types::{DonationId, DonorId, RequestId};

/// Errors surfaced by the donation coordinator.
///
/// Domain-rule violations are always returned to the caller, never
/// absorbed. Internal stale-tail retries live inside the ledger; only
/// their exhaustion surfaces here, as [`BankError::ConcurrencyConflict`].
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum BankError {
    #[error("donor {donor_id} is not eligible: {reason}")]
    IneligibleDonor { donor_id: DonorId, reason: String },

    #[error("request {0} is no longer accepting donations")]
    RequestClosed(RequestId),

    #[error("operation lost the retry race; try again")]
    ConcurrencyConflict,

    #[error("a donation must include at least one unit")]
    ZeroUnits,

    #[error("donation {0} not found")]
    DonationNotFound(DonationId),

    #[error(transparent)]
    Donor(#[from] DonorError),

    #[error(transparent)]
    Request(#[from] RequestError),

    #[error(transparent)]
    Inventory(#[from] InventoryError),

    #[error(transparent)]
    Ledger(#[from] LedgerError),

    #[error("donation store lock poisoned")]
    Poisoned,
}
