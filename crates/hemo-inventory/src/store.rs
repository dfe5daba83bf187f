use std::sync::Mutex;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::debug;

use hemo_types::BloodType;

use crate::error::InventoryError;

/// Default simulated storage temperature for whole blood, in °C.
const DEFAULT_TEMPERATURE_C: f64 = 4.0;

/// Stock state of one blood type relative to the configured thresholds.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StockLevel {
    Critical,
    Low,
    Normal,
}

/// Unit thresholds below which stock is classified Low or Critical.
#[derive(Clone, Copy, Debug, Serialize, Deserialize)]
pub struct StockThresholds {
    pub critical_below: u32,
    pub low_below: u32,
}

impl Default for StockThresholds {
    fn default() -> Self {
        Self {
            critical_below: 10,
            low_below: 20,
        }
    }
}

impl StockThresholds {
    pub fn classify(&self, units: u32) -> StockLevel {
        if units < self.critical_below {
            StockLevel::Critical
        } else if units < self.low_below {
            StockLevel::Low
        } else {
            StockLevel::Normal
        }
    }
}

/// Inventory row for one blood type.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct InventoryEntry {
    pub blood_type: BloodType,
    pub units_available: u32,
    /// Simulated storage temperature in °C.
    pub temperature_c: f64,
    pub last_updated: DateTime<Utc>,
}

impl InventoryEntry {
    fn empty(blood_type: BloodType) -> Self {
        Self {
            blood_type,
            units_available: 0,
            temperature_c: DEFAULT_TEMPERATURE_C,
            last_updated: Utc::now(),
        }
    }
}

/// Per-blood-type inventory with atomic adjustment.
///
/// Each of the 8 types has its own lock, so concurrent adjustments to the
/// same type serialize while different types proceed independently.
pub struct InventoryStore {
    thresholds: StockThresholds,
    slots: [Mutex<InventoryEntry>; 8],
}

impl InventoryStore {
    pub fn new(thresholds: StockThresholds) -> Self {
        Self {
            thresholds,
            slots: BloodType::ALL.map(|bt| Mutex::new(InventoryEntry::empty(bt))),
        }
    }

    /// Set every type to the same unit count. Used at startup to mirror
    /// the seeded central-bank stock.
    pub fn seed(&self, units_per_type: u32) -> Result<(), InventoryError> {
        for slot in &self.slots {
            let mut entry = slot.lock().map_err(|_| InventoryError::Poisoned)?;
            entry.units_available = units_per_type;
            entry.last_updated = Utc::now();
        }
        Ok(())
    }

    /// Adjust the unit count of one blood type by `delta` and return the
    /// new total.
    ///
    /// A negative delta that would take the count below zero is rejected
    /// with [`InventoryError::Insufficient`] and leaves the entry
    /// untouched.
    pub fn adjust(&self, blood_type: BloodType, delta: i64) -> Result<u32, InventoryError> {
        let mut entry = self.slots[blood_type.index()]
            .lock()
            .map_err(|_| InventoryError::Poisoned)?;

        let current = i64::from(entry.units_available);
        let next = current + delta;
        if next < 0 {
            return Err(InventoryError::Insufficient {
                blood_type,
                available: entry.units_available,
                requested: delta.unsigned_abs().min(u64::from(u32::MAX)) as u32,
            });
        }

        entry.units_available = next.min(i64::from(u32::MAX)) as u32;
        entry.last_updated = Utc::now();
        debug!(%blood_type, delta, units = entry.units_available, "inventory adjusted");
        Ok(entry.units_available)
    }

    /// Current unit count for one blood type.
    pub fn units_available(&self, blood_type: BloodType) -> Result<u32, InventoryError> {
        let entry = self.slots[blood_type.index()]
            .lock()
            .map_err(|_| InventoryError::Poisoned)?;
        Ok(entry.units_available)
    }

    /// Stock level of one blood type against the configured thresholds.
    pub fn classify(&self, blood_type: BloodType) -> Result<StockLevel, InventoryError> {
        Ok(self.thresholds.classify(self.units_available(blood_type)?))
    }

    /// All entries, ordered by blood type display order.
    pub fn snapshot(&self) -> Result<Vec<InventoryEntry>, InventoryError> {
        self.slots
            .iter()
            .map(|slot| {
                slot.lock()
                    .map(|entry| entry.clone())
                    .map_err(|_| InventoryError::Poisoned)
            })
            .collect()
    }
}
