use std::collections::HashMap;
use std::sync::RwLock;

use chrono::{DateTime, Utc};
use tracing::info;

use hemo_types::{BloodType, DonorId, GeoPoint};

use crate::donor::{Badge, Donor, GamificationDelta, POINTS_PER_DONATION};
use crate::error::DonorError;

/// In-memory donor directory.
///
/// Mutations touch exactly one donor row and are independent across
/// donors; the map lock is held only for the duration of the row update.
pub struct DonorDirectory {
    donors: RwLock<HashMap<DonorId, Donor>>,
}

impl DonorDirectory {
    pub fn new() -> Self {
        Self {
            donors: RwLock::new(HashMap::new()),
        }
    }

    /// Register a donor and return a snapshot of the stored row.
    pub fn register(
        &self,
        name: impl Into<String>,
        contact: impl Into<String>,
        blood_type: BloodType,
        location: GeoPoint,
    ) -> Result<Donor, DonorError> {
        let donor = Donor::new(name, contact, blood_type, location);
        let snapshot = donor.clone();
        let mut map = self.donors.write().map_err(|_| DonorError::Poisoned)?;
        map.insert(donor.id, donor);
        info!(id = %snapshot.id, blood_type = %snapshot.blood_type, "donor registered");
        Ok(snapshot)
    }

    /// Snapshot of one donor.
    pub fn get(&self, id: DonorId) -> Result<Donor, DonorError> {
        let map = self.donors.read().map_err(|_| DonorError::Poisoned)?;
        map.get(&id).cloned().ok_or(DonorError::NotFound(id))
    }

    /// Snapshot of every registered donor.
    pub fn snapshot(&self) -> Result<Vec<Donor>, DonorError> {
        let map = self.donors.read().map_err(|_| DonorError::Poisoned)?;
        Ok(map.values().cloned().collect())
    }

    pub fn donor_count(&self) -> Result<usize, DonorError> {
        let map = self.donors.read().map_err(|_| DonorError::Poisoned)?;
        Ok(map.len())
    }

    fn update<T>(
        &self,
        id: DonorId,
        apply: impl FnOnce(&mut Donor) -> T,
    ) -> Result<T, DonorError> {
        let mut map = self.donors.write().map_err(|_| DonorError::Poisoned)?;
        let donor = map.get_mut(&id).ok_or(DonorError::NotFound(id))?;
        Ok(apply(donor))
    }

    /// Donor-initiated availability toggle.
    pub fn set_availability(&self, id: DonorId, available: bool) -> Result<(), DonorError> {
        self.update(id, |donor| donor.available = available)
    }

    /// Donor-initiated location update.
    pub fn set_location(&self, id: DonorId, location: GeoPoint) -> Result<(), DonorError> {
        self.update(id, |donor| donor.location = location)
    }

    /// Apply the gamification effects of one committed donation:
    /// bump the lifetime count, credit points, stamp the cooldown clock,
    /// and unlock any badge tier crossed.
    pub fn record_donation(
        &self,
        id: DonorId,
        at: DateTime<Utc>,
    ) -> Result<GamificationDelta, DonorError> {
        let delta = self.update(id, |donor| {
            donor.total_donations += 1;
            donor.points += POINTS_PER_DONATION;
            donor.last_donation = Some(at);

            let mut new_badges = Vec::new();
            if let Some(badge) = Badge::for_total(donor.total_donations) {
                if donor.badges.insert(badge) {
                    new_badges.push(badge);
                }
            }

            GamificationDelta {
                total_donations: donor.total_donations,
                points: donor.points,
                new_badges,
            }
        })?;

        info!(
            id = %id,
            total = delta.total_donations,
            points = delta.points,
            "donation recorded on donor row"
        );
        Ok(delta)
    }
}

impl Default for DonorDirectory {
    fn default() -> Self {
        Self::new()
    }
}
