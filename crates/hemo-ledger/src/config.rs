use serde::{Deserialize, Serialize};

/// Configuration for the ledger.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct LedgerConfig {
    /// Number of leading zero bits a block hash must carry.
    ///
    /// Expected mining work grows with 2^difficulty_bits; the default keeps
    /// appends fast enough for interactive use and tests.
    pub difficulty_bits: u32,
    /// How many times an append re-mines against a fresh tail before
    /// giving up with [`crate::LedgerError::TailContention`].
    pub max_append_attempts: u32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            difficulty_bits: 8,
            max_append_attempts: 8,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_serializable() {
        let config = LedgerConfig::default();
        let toml = serde_json::to_string(&config).unwrap();
        let back: LedgerConfig = serde_json::from_str(&toml).unwrap();
        assert_eq!(back.difficulty_bits, config.difficulty_bits);
    }
}
