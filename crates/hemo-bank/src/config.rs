use serde::{Deserialize, Serialize};

use hemo_inventory::StockThresholds;
use hemo_ledger::LedgerConfig;
use hemo_match::MatchConfig;

/// Top-level configuration for a [`crate::BloodBank`].
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct BankConfig {
    pub ledger: LedgerConfig,
    pub matching: MatchConfig,
    pub stock: StockThresholds,
    /// Units seeded into every blood type at startup (0 = start empty).
    #[serde(default)]
    pub seed_units_per_type: u32,
}
