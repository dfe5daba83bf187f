//! Blood inventory store for Hemolink.
//!
//! One [`InventoryEntry`] per blood type, each behind its own lock:
//! adjustments on the same type serialize, adjustments on different types
//! never contend. Units can never go negative.

pub mod error;
pub mod store;

pub use error::InventoryError;
pub use store::{InventoryEntry, InventoryStore, StockLevel, StockThresholds};
