use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hemo_types::{BloodType, DonationId, DonorId, RequestId};

use crate::error::LedgerError;

/// Domain-separation prefix for block hashing.
///
/// Prepended to every hash computation so block hashes can never collide
/// with hashes of other record kinds.
pub const HASH_DOMAIN: &[u8] = b"hemo-block-v1:";

/// Sentinel previous-hash carried by the genesis block.
pub const GENESIS_PREV_HASH: [u8; 32] = [0u8; 32];

/// Structured event recorded in a ledger block.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum BlockPayload {
    /// The fixed genesis payload, written exactly once at initialization.
    Genesis,
    /// A committed donation event.
    Donation {
        donation_id: DonationId,
        donor_id: DonorId,
        /// `None` for untargeted donations straight into stock.
        request_id: Option<RequestId>,
        blood_type: BloodType,
        units: u32,
    },
}

/// One block in the append-only chain.
///
/// Integrity invariant: `hash` equals the recomputation over
/// (index, payload, timestamp, prev_hash, nonce, difficulty), and
/// `prev_hash` equals the previous block's `hash` (the genesis block
/// carries [`GENESIS_PREV_HASH`]).
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerBlock {
    /// Sequential position, 0 for genesis.
    pub index: u64,
    pub payload: BlockPayload,
    pub timestamp: DateTime<Utc>,
    pub prev_hash: [u8; 32],
    /// Proof-of-work nonce found during mining.
    pub nonce: u64,
    /// Leading-zero-bit requirement this block was mined at. Recorded per
    /// block so verification checks the claimed difficulty, not the
    /// current configuration.
    pub difficulty: u32,
    pub hash: [u8; 32],
}

impl LedgerBlock {
    /// Recompute this block's hash from its canonical serialized form
    /// (the stored `hash` field zeroed out).
    pub fn compute_hash(&self) -> Result<[u8; 32], LedgerError> {
        let mut canonical = self.clone();
        canonical.hash = [0u8; 32];
        let encoded = serde_json::to_vec(&canonical)
            .map_err(|e| LedgerError::Serialization(e.to_string()))?;

        let mut hasher = blake3::Hasher::new();
        hasher.update(HASH_DOMAIN);
        hasher.update(&encoded);
        Ok(*hasher.finalize().as_bytes())
    }

    /// Short hex form of the block hash, for logs and display.
    pub fn short_hash(&self) -> String {
        hex::encode(&self.hash[..4])
    }

    pub fn is_genesis(&self) -> bool {
        self.index == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation_block() -> LedgerBlock {
        LedgerBlock {
            index: 1,
            payload: BlockPayload::Donation {
                donation_id: DonationId::new(),
                donor_id: DonorId::new(),
                request_id: Some(RequestId::new()),
                blood_type: BloodType::OPos,
                units: 1,
            },
            timestamp: Utc::now(),
            prev_hash: [7u8; 32],
            nonce: 42,
            difficulty: 8,
            hash: [0u8; 32],
        }
    }

    #[test]
    fn hash_is_deterministic() {
        let block = donation_block();
        assert_eq!(block.compute_hash().unwrap(), block.compute_hash().unwrap());
    }

    #[test]
    fn hash_ignores_stored_hash_field() {
        let mut block = donation_block();
        let before = block.compute_hash().unwrap();
        block.hash = [9u8; 32];
        assert_eq!(block.compute_hash().unwrap(), before);
    }

    #[test]
    fn hash_covers_every_header_field() {
        let base = donation_block();
        let reference = base.compute_hash().unwrap();

        let mut changed = base.clone();
        changed.nonce += 1;
        assert_ne!(changed.compute_hash().unwrap(), reference);

        let mut changed = base.clone();
        changed.index += 1;
        assert_ne!(changed.compute_hash().unwrap(), reference);

        let mut changed = base.clone();
        changed.prev_hash = [8u8; 32];
        assert_ne!(changed.compute_hash().unwrap(), reference);

        let mut changed = base.clone();
        changed.timestamp = changed.timestamp + chrono::Duration::seconds(1);
        assert_ne!(changed.compute_hash().unwrap(), reference);

        let mut changed = base;
        changed.payload = BlockPayload::Genesis;
        assert_ne!(changed.compute_hash().unwrap(), reference);
    }
}
