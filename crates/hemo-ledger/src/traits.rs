use crate::block::{BlockPayload, LedgerBlock};
use crate::error::LedgerError;
use crate::verify::IntegrityReport;

/// Write boundary for ledger append operations.
pub trait LedgerWriter: Send + Sync {
    /// Mine and append a new block carrying `payload`, referencing the
    /// current chain tail.
    fn append(&self, payload: BlockPayload) -> Result<LedgerBlock, LedgerError>;
}

/// Read boundary for ledger query/verification operations.
pub trait LedgerReader: Send + Sync {
    /// The most recently appended block (genesis at minimum).
    fn tip(&self) -> Result<LedgerBlock, LedgerError>;

    fn get(&self, index: u64) -> Result<Option<LedgerBlock>, LedgerError>;

    /// Every block from genesis to tip, in chain order.
    fn read_all(&self) -> Result<Vec<LedgerBlock>, LedgerError>;

    fn block_count(&self) -> Result<u64, LedgerError>;

    /// Walk the full chain and report every integrity violation found.
    fn verify(&self) -> Result<IntegrityReport, LedgerError>;
}
