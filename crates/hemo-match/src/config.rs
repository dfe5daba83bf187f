use std::time::Duration;

use serde::{Deserialize, Serialize};

/// Configuration for matching and notification dispatch.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Maximum donor-to-request distance. The boundary is inclusive:
    /// a donor at exactly this distance is a candidate.
    pub radius_km: f64,
    /// Days a donor must wait between donations.
    pub cooldown_days: i64,
    /// Cap on how many candidates are notified per request.
    /// `None` notifies every match.
    pub max_fanout: Option<usize>,
    /// Per-candidate delivery budget; a sink that does not answer within
    /// this window counts as a timed-out dispatch.
    pub dispatch_timeout: Duration,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            radius_km: 50.0,
            cooldown_days: 90,
            max_fanout: None,
            dispatch_timeout: Duration::from_secs(5),
        }
    }
}
