//! Donor directory for Hemolink.
//!
//! Holds registered donors and everything that hangs off a donor row:
//! availability and location updates, the 90-day cooldown eligibility
//! rule, gamification (points and badge tiers), and the leaderboard as a
//! derived projection over the directory.

pub mod directory;
pub mod donor;
pub mod eligibility;
pub mod error;
pub mod leaderboard;

pub use directory::DonorDirectory;
pub use donor::{Badge, Donor, GamificationDelta, POINTS_PER_DONATION};
pub use eligibility::{check_eligibility, cooldown_elapsed, IneligibilityReason};
pub use error::DonorError;
pub use leaderboard::{LeaderboardEntry, LeaderboardProjection};
