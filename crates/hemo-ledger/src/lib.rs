//! Append-only donation ledger for Hemolink.
//!
//! This crate provides:
//! - [`LedgerBlock`] and [`BlockPayload`] — hash-linked donation/event records
//! - Proof-of-work mining with configurable difficulty
//! - [`LedgerWriter`] / [`LedgerReader`] trait boundaries
//! - [`InMemoryLedger`] — optimistic append (mining runs outside the chain
//!   lock; a stale tail triggers a bounded retry)
//! - [`IntegrityReport`] — full-chain verification that detects payload
//!   tampering, reordering, broken links, and under-mined blocks

pub mod block;
pub mod config;
pub mod error;
pub mod memory;
pub mod pow;
pub mod traits;
pub mod verify;

pub use block::{BlockPayload, LedgerBlock, GENESIS_PREV_HASH};
pub use config::LedgerConfig;
pub use error::LedgerError;
pub use memory::InMemoryLedger;
pub use traits::{LedgerReader, LedgerWriter};
pub use verify::{ChainVerifier, IntegrityReport, Violation, ViolationKind};
