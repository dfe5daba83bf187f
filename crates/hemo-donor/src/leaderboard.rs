use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use hemo_types::{BloodType, DonorId};

use crate::directory::DonorDirectory;
use crate::donor::Badge;
use crate::error::DonorError;

/// One ranked row of the leaderboard.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub rank: usize,
    pub donor_id: DonorId,
    pub name: String,
    pub blood_type: BloodType,
    pub total_donations: u32,
    pub points: u64,
    pub badges: BTreeSet<Badge>,
}

/// Leaderboard as a derived projection over the donor directory.
///
/// Recomputed on demand rather than maintained as separate mutable
/// state, so it can never drift from the donor rows. Ordering is
/// deterministic: points descending, then donor id ascending.
pub struct LeaderboardProjection;

impl LeaderboardProjection {
    pub fn compute(
        directory: &DonorDirectory,
        limit: usize,
    ) -> Result<Vec<LeaderboardEntry>, DonorError> {
        let mut donors = directory.snapshot()?;
        donors.sort_by(|a, b| b.points.cmp(&a.points).then(a.id.cmp(&b.id)));

        Ok(donors
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(i, donor)| LeaderboardEntry {
                rank: i + 1,
                donor_id: donor.id,
                name: donor.name,
                blood_type: donor.blood_type,
                total_donations: donor.total_donations,
                points: donor.points,
                badges: donor.badges,
            })
            .collect())
    }
}
