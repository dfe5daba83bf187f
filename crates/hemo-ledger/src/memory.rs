use std::sync::RwLock;

use chrono::Utc;
use tracing::{debug, info};

use crate::block::{BlockPayload, LedgerBlock, GENESIS_PREV_HASH};
use crate::config::LedgerConfig;
use crate::error::LedgerError;
use crate::pow;
use crate::traits::{LedgerReader, LedgerWriter};
use crate::verify::{ChainVerifier, IntegrityReport};

/// In-memory ledger implementation for tests, demos, and embedding.
///
/// Appends are optimistic: the tail is observed under a read lock, the
/// candidate block is mined with **no lock held**, and the write lock is
/// taken only to commit. If another append landed in the meantime the
/// candidate is re-mined against the new tail, up to
/// [`LedgerConfig::max_append_attempts`] times.
pub struct InMemoryLedger {
    config: LedgerConfig,
    chain: RwLock<Vec<LedgerBlock>>,
}

impl InMemoryLedger {
    /// Create a ledger and mine its genesis block.
    ///
    /// The genesis block is created exactly once here; it carries the
    /// fixed sentinel previous hash and the fixed [`BlockPayload::Genesis`]
    /// payload.
    pub fn new(config: LedgerConfig) -> Result<Self, LedgerError> {
        let mut genesis = LedgerBlock {
            index: 0,
            payload: BlockPayload::Genesis,
            timestamp: Utc::now(),
            prev_hash: GENESIS_PREV_HASH,
            nonce: 0,
            difficulty: config.difficulty_bits,
            hash: [0u8; 32],
        };
        pow::mine(&mut genesis)?;
        info!(hash = %genesis.short_hash(), "ledger initialized");

        Ok(Self {
            config,
            chain: RwLock::new(vec![genesis]),
        })
    }

    /// The active configuration.
    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    fn tail_position(&self) -> Result<(u64, [u8; 32]), LedgerError> {
        let chain = self.chain.read().map_err(|_| LedgerError::Poisoned)?;
        let tail = chain.last().ok_or(LedgerError::BlockNotFound(0))?;
        Ok((tail.index, tail.hash))
    }
}

impl LedgerWriter for InMemoryLedger {
    fn append(&self, payload: BlockPayload) -> Result<LedgerBlock, LedgerError> {
        for attempt in 1..=self.config.max_append_attempts {
            let (tail_index, tail_hash) = self.tail_position()?;

            let mut candidate = LedgerBlock {
                index: tail_index + 1,
                payload: payload.clone(),
                timestamp: Utc::now(),
                prev_hash: tail_hash,
                nonce: 0,
                difficulty: self.config.difficulty_bits,
                hash: [0u8; 32],
            };
            // CPU-bound search, deliberately outside any lock.
            pow::mine(&mut candidate)?;

            let mut chain = self.chain.write().map_err(|_| LedgerError::Poisoned)?;
            let tail = chain.last().ok_or(LedgerError::BlockNotFound(0))?;
            if tail.index == tail_index && tail.hash == tail_hash {
                debug!(
                    index = candidate.index,
                    hash = %candidate.short_hash(),
                    nonce = candidate.nonce,
                    "block appended"
                );
                chain.push(candidate.clone());
                return Ok(candidate);
            }

            drop(chain);
            debug!(attempt, "tail advanced during mining; re-mining");
        }

        Err(LedgerError::TailContention {
            attempts: self.config.max_append_attempts,
        })
    }
}

impl LedgerReader for InMemoryLedger {
    fn tip(&self) -> Result<LedgerBlock, LedgerError> {
        let chain = self.chain.read().map_err(|_| LedgerError::Poisoned)?;
        chain.last().cloned().ok_or(LedgerError::BlockNotFound(0))
    }

    fn get(&self, index: u64) -> Result<Option<LedgerBlock>, LedgerError> {
        let chain = self.chain.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(chain.get(index as usize).cloned())
    }

    fn read_all(&self) -> Result<Vec<LedgerBlock>, LedgerError> {
        let chain = self.chain.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(chain.clone())
    }

    fn block_count(&self) -> Result<u64, LedgerError> {
        let chain = self.chain.read().map_err(|_| LedgerError::Poisoned)?;
        Ok(chain.len() as u64)
    }

    fn verify(&self) -> Result<IntegrityReport, LedgerError> {
        let chain = self.chain.read().map_err(|_| LedgerError::Poisoned)?;
        ChainVerifier::verify_chain(&chain)
    }
}
