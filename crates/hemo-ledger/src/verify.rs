use crate::block::{LedgerBlock, GENESIS_PREV_HASH};
use crate::error::LedgerError;
use crate::pow::meets_difficulty;

/// A specific integrity violation detected during chain verification.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Violation {
    /// Position in the chain where the violation was detected.
    pub index: u64,
    pub kind: ViolationKind,
    pub description: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ViolationKind {
    /// Block index does not match its chain position.
    IndexMismatch,
    /// Genesis block does not carry the sentinel previous hash.
    GenesisPrevHash,
    /// `prev_hash` does not match the previous block's hash.
    BrokenLink,
    /// Stored hash does not match recomputation over the block content.
    HashMismatch,
    /// Stored hash does not satisfy the block's recorded difficulty.
    DifficultyNotMet,
}

/// Result of verifying a chain from genesis to tip.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct IntegrityReport {
    pub block_count: u64,
    /// Violations in chain order; empty means the chain is intact.
    pub violations: Vec<Violation>,
}

impl IntegrityReport {
    pub fn is_valid(&self) -> bool {
        self.violations.is_empty()
    }

    /// Chain position of the first detected violation, if any.
    pub fn first_violation_index(&self) -> Option<u64> {
        self.violations.first().map(|v| v.index)
    }
}

/// Stateless chain verifier.
///
/// Detects payload tampering (hash recomputation), reordering (index
/// sequence), broken previous-hash links, and blocks whose hash does not
/// meet their recorded difficulty. Verification never repairs; it only
/// reports.
pub struct ChainVerifier;

impl ChainVerifier {
    pub fn verify_chain(blocks: &[LedgerBlock]) -> Result<IntegrityReport, LedgerError> {
        let mut violations = Vec::new();

        for (position, block) in blocks.iter().enumerate() {
            let position = position as u64;

            if block.index != position {
                violations.push(Violation {
                    index: position,
                    kind: ViolationKind::IndexMismatch,
                    description: format!(
                        "expected index {position}, found {}",
                        block.index
                    ),
                });
            }

            if position == 0 {
                if block.prev_hash != GENESIS_PREV_HASH {
                    violations.push(Violation {
                        index: 0,
                        kind: ViolationKind::GenesisPrevHash,
                        description: "genesis previous hash is not the sentinel".into(),
                    });
                }
            } else if block.prev_hash != blocks[position as usize - 1].hash {
                violations.push(Violation {
                    index: position,
                    kind: ViolationKind::BrokenLink,
                    description: "previous hash link mismatch".into(),
                });
            }

            let computed = block.compute_hash()?;
            if computed != block.hash {
                violations.push(Violation {
                    index: position,
                    kind: ViolationKind::HashMismatch,
                    description: "block hash does not match recomputation".into(),
                });
            }

            if !meets_difficulty(&block.hash, block.difficulty) {
                violations.push(Violation {
                    index: position,
                    kind: ViolationKind::DifficultyNotMet,
                    description: format!(
                        "hash does not carry {} leading zero bits",
                        block.difficulty
                    ),
                });
            }
        }

        Ok(IntegrityReport {
            block_count: blocks.len() as u64,
            violations,
        })
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use hemo_types::{BloodType, DonationId, DonorId};

    use crate::block::BlockPayload;
    use crate::pow;

    use super::*;

    fn donation(units: u32) -> BlockPayload {
        BlockPayload::Donation {
            donation_id: DonationId::new(),
            donor_id: DonorId::new(),
            request_id: None,
            blood_type: BloodType::OPos,
            units,
        }
    }

    fn build_chain(len: usize, difficulty: u32) -> Vec<LedgerBlock> {
        let mut blocks: Vec<LedgerBlock> = Vec::with_capacity(len);
        for i in 0..len {
            let prev_hash = blocks
                .last()
                .map(|b| b.hash)
                .unwrap_or(GENESIS_PREV_HASH);
            let payload = if i == 0 {
                BlockPayload::Genesis
            } else {
                donation(i as u32)
            };
            let mut block = LedgerBlock {
                index: i as u64,
                payload,
                timestamp: Utc::now(),
                prev_hash,
                nonce: 0,
                difficulty,
                hash: [0u8; 32],
            };
            pow::mine(&mut block).unwrap();
            blocks.push(block);
        }
        blocks
    }

    #[test]
    fn intact_chain_passes() {
        let chain = build_chain(5, 4);
        let report = ChainVerifier::verify_chain(&chain).unwrap();
        assert!(report.is_valid());
        assert_eq!(report.block_count, 5);
    }

    #[test]
    fn empty_chain_passes() {
        let report = ChainVerifier::verify_chain(&[]).unwrap();
        assert!(report.is_valid());
    }

    #[test]
    fn payload_tampering_is_reported_at_the_mutated_block() {
        let mut chain = build_chain(5, 4);
        chain[2].payload = donation(999);

        let report = ChainVerifier::verify_chain(&chain).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.first_violation_index(), Some(2));
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::HashMismatch && v.index == 2));
        // Blocks before the mutation stay clean.
        assert!(report.violations.iter().all(|v| v.index >= 2));
    }

    #[test]
    fn reordering_is_detected() {
        let mut chain = build_chain(4, 4);
        chain.swap(1, 2);

        let report = ChainVerifier::verify_chain(&chain).unwrap();
        assert!(!report.is_valid());
        assert_eq!(report.first_violation_index(), Some(1));
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::IndexMismatch));
    }

    #[test]
    fn broken_link_is_detected() {
        let mut chain = build_chain(3, 4);
        // Re-mine block 2 against a bogus parent so only the link is
        // wrong, not its self hash.
        chain[2].prev_hash = [5u8; 32];
        pow::mine(&mut chain[2]).unwrap();

        let report = ChainVerifier::verify_chain(&chain).unwrap();
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::BrokenLink && v.index == 2));
        assert!(report
            .violations
            .iter()
            .all(|v| v.kind != ViolationKind::HashMismatch));
    }

    #[test]
    fn under_mined_block_is_detected() {
        let mut chain = build_chain(2, 0);
        // Claim a difficulty the stored hash almost surely does not meet.
        chain[1].difficulty = 30;

        let report = ChainVerifier::verify_chain(&chain).unwrap();
        assert!(!report.is_valid());
        // Raising the claimed difficulty also changes the canonical bytes,
        // so both a hash mismatch and the difficulty check fire.
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::DifficultyNotMet && v.index == 1));
    }

    #[test]
    fn tampered_genesis_prev_hash_is_detected() {
        let mut chain = build_chain(2, 0);
        chain[0].prev_hash = [1u8; 32];

        let report = ChainVerifier::verify_chain(&chain).unwrap();
        assert!(report
            .violations
            .iter()
            .any(|v| v.kind == ViolationKind::GenesisPrevHash));
    }
}
