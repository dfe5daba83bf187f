//! Donation transaction coordination for Hemolink.
//!
//! This crate is where a donation becomes real. [`BloodBank`] wires the
//! donor directory, request registry, inventory store, orchestrator, and
//! ledger together and exposes the operations external collaborators
//! call:
//!
//! - [`BloodBank::create_request`] — open a request and fan notifications
//!   out to matching donors
//! - [`BloodBank::commit_donation`] — the coordinated commit: re-validate
//!   eligibility, credit inventory, advance the request, award points,
//!   record the donation, and append the ledger block
//! - [`BloodBank::reconcile`] — startup recovery for donations whose
//!   mutations committed but whose ledger append was interrupted
//! - projections: leaderboard, history snapshot, statistics
//!
//! The commit deliberately mutates first and appends last: mining is the
//! expensive, interruptible step, and a mined-but-uncommitted block must
//! never cost a donor their donation. The stored [`Donation`] row with an
//! empty block index is the idempotent marker recovery keys on.

pub mod config;
pub mod donation;
pub mod error;
pub mod projections;
pub mod recovery;
pub mod service;

pub use config::BankConfig;
pub use donation::{Donation, DonationStore};
pub use error::BankError;
pub use projections::{DailyAggregate, HistorySnapshot, Statistics, StockStatus};
pub use recovery::ReconcileReport;
pub use service::BloodBank;
