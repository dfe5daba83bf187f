use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hemo_ledger::BlockPayload;
use hemo_types::{BloodType, DonationId, DonorId, RequestId};

use crate::error::BankError;

/// One committed donation event. Created exactly once per accepted
/// donation and immutable afterwards, except for [`Self::block_index`]
/// which is filled in when the ledger append lands.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Donation {
    pub id: DonationId,
    pub donor_id: DonorId,
    /// `None` for untargeted donations straight into stock.
    pub request_id: Option<RequestId>,
    pub blood_type: BloodType,
    pub units: u32,
    pub donated_at: DateTime<Utc>,
    /// Index of the ledger block recording this donation. `None` means
    /// the inventory/request/donor mutations committed but the append has
    /// not landed yet — the marker crash recovery keys on.
    pub block_index: Option<u64>,
}

impl Donation {
    pub fn new(
        donor_id: DonorId,
        request_id: Option<RequestId>,
        blood_type: BloodType,
        units: u32,
        donated_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id: DonationId::new(),
            donor_id,
            request_id,
            blood_type,
            units,
            donated_at,
            block_index: None,
        }
    }

    /// `true` once the donation is recorded on the ledger.
    pub fn is_recorded(&self) -> bool {
        self.block_index.is_some()
    }

    /// The ledger payload recording this donation. Deterministic, so a
    /// replayed append produces the same record as the original attempt.
    pub fn payload(&self) -> BlockPayload {
        BlockPayload::Donation {
            donation_id: self.id,
            donor_id: self.donor_id,
            request_id: self.request_id,
            blood_type: self.blood_type,
            units: self.units,
        }
    }
}

/// In-memory store of donation rows.
pub struct DonationStore {
    inner: RwLock<HashMap<DonationId, Donation>>,
}

impl DonationStore {
    pub fn new() -> Self {
        Self {
            inner: RwLock::new(HashMap::new()),
        }
    }

    pub fn insert(&self, donation: Donation) -> Result<(), BankError> {
        let mut map = self.inner.write().map_err(|_| BankError::Poisoned)?;
        map.insert(donation.id, donation);
        Ok(())
    }

    /// Record the ledger block index for a donation.
    pub fn mark_recorded(&self, id: DonationId, block_index: u64) -> Result<(), BankError> {
        let mut map = self.inner.write().map_err(|_| BankError::Poisoned)?;
        let donation = map.get_mut(&id).ok_or(BankError::DonationNotFound(id))?;
        donation.block_index = Some(block_index);
        Ok(())
    }

    pub fn get(&self, id: DonationId) -> Result<Donation, BankError> {
        let map = self.inner.read().map_err(|_| BankError::Poisoned)?;
        map.get(&id).cloned().ok_or(BankError::DonationNotFound(id))
    }

    /// Donations whose ledger append has not landed, in deterministic
    /// replay order (timestamp, then id).
    pub fn pending(&self) -> Result<Vec<Donation>, BankError> {
        let map = self.inner.read().map_err(|_| BankError::Poisoned)?;
        let mut pending: Vec<Donation> = map
            .values()
            .filter(|d| !d.is_recorded())
            .cloned()
            .collect();
        pending.sort_by(|a, b| a.donated_at.cmp(&b.donated_at).then(a.id.cmp(&b.id)));
        Ok(pending)
    }

    /// One donor's donations, newest first.
    pub fn of_donor(&self, donor_id: DonorId) -> Result<Vec<Donation>, BankError> {
        let map = self.inner.read().map_err(|_| BankError::Poisoned)?;
        let mut donations: Vec<Donation> = map
            .values()
            .filter(|d| d.donor_id == donor_id)
            .cloned()
            .collect();
        donations.sort_by(|a, b| b.donated_at.cmp(&a.donated_at).then(a.id.cmp(&b.id)));
        Ok(donations)
    }

    /// Every donation, in commit order.
    pub fn all(&self) -> Result<Vec<Donation>, BankError> {
        let map = self.inner.read().map_err(|_| BankError::Poisoned)?;
        let mut all: Vec<Donation> = map.values().cloned().collect();
        all.sort_by(|a, b| a.donated_at.cmp(&b.donated_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }

    pub fn count(&self) -> Result<usize, BankError> {
        let map = self.inner.read().map_err(|_| BankError::Poisoned)?;
        Ok(map.len())
    }
}

impl Default for DonationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn donation() -> Donation {
        Donation::new(DonorId::new(), None, BloodType::OPos, 1, Utc::now())
    }

    #[test]
    fn insert_and_mark_recorded() {
        let store = DonationStore::new();
        let d = donation();
        store.insert(d.clone()).unwrap();
        assert!(!store.get(d.id).unwrap().is_recorded());

        store.mark_recorded(d.id, 7).unwrap();
        assert_eq!(store.get(d.id).unwrap().block_index, Some(7));
        assert!(store.pending().unwrap().is_empty());
    }

    #[test]
    fn pending_is_ordered_and_shrinks() {
        let store = DonationStore::new();
        let first = donation();
        let second = Donation {
            donated_at: first.donated_at + chrono::Duration::seconds(1),
            ..donation()
        };
        store.insert(second.clone()).unwrap();
        store.insert(first.clone()).unwrap();

        let pending = store.pending().unwrap();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].id, first.id);

        store.mark_recorded(first.id, 1).unwrap();
        assert_eq!(store.pending().unwrap().len(), 1);
    }

    #[test]
    fn of_donor_filters_and_sorts_newest_first() {
        let store = DonationStore::new();
        let donor = DonorId::new();
        let older = Donation {
            donor_id: donor,
            ..donation()
        };
        let newer = Donation {
            donor_id: donor,
            donated_at: older.donated_at + chrono::Duration::seconds(5),
            ..donation()
        };
        store.insert(older.clone()).unwrap();
        store.insert(newer.clone()).unwrap();
        store.insert(donation()).unwrap();

        let mine = store.of_donor(donor).unwrap();
        assert_eq!(mine.len(), 2);
        assert_eq!(mine[0].id, newer.id);
    }

    #[test]
    fn marking_unknown_donation_fails() {
        let store = DonationStore::new();
        let missing = DonationId::new();
        assert_eq!(
            store.mark_recorded(missing, 1).unwrap_err(),
            BankError::DonationNotFound(missing)
        );
    }
}
