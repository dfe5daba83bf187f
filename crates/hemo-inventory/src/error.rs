use hemo_types::BloodType;
use thiserror::Error;

/// Errors produced by inventory operations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum InventoryError {
    #[error("insufficient {blood_type} inventory: {available} unit(s) available, {requested} requested")]
    Insufficient {
        blood_type: BloodType,
        available: u32,
        requested: u32,
    },

    #[error("inventory lock poisoned")]
    Poisoned,
}
