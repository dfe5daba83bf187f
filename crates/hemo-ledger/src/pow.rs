//! Proof-of-work search over block hashes.

use crate::block::LedgerBlock;
use crate::error::LedgerError;

/// Number of leading zero bits in a 32-byte digest.
pub fn leading_zero_bits(hash: &[u8; 32]) -> u32 {
    let mut bits = 0;
    for byte in hash {
        if *byte == 0 {
            bits += 8;
        } else {
            bits += byte.leading_zeros();
            break;
        }
    }
    bits
}

/// Returns `true` if `hash` satisfies the given difficulty.
pub fn meets_difficulty(hash: &[u8; 32], difficulty_bits: u32) -> bool {
    leading_zero_bits(hash) >= difficulty_bits
}

/// Search nonces from zero until the block hash satisfies the block's
/// recorded difficulty, then store the winning nonce and hash.
///
/// CPU-bound: expected work is proportional to 2^difficulty. Callers must
/// not hold any cross-component lock while mining.
pub fn mine(block: &mut LedgerBlock) -> Result<(), LedgerError> {
    let mut nonce = 0u64;
    loop {
        block.nonce = nonce;
        let hash = block.compute_hash()?;
        if meets_difficulty(&hash, block.difficulty) {
            block.hash = hash;
            return Ok(());
        }
        nonce = nonce.wrapping_add(1);
    }
}
