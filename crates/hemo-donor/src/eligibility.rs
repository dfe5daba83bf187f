use chrono::{DateTime, Duration, Utc};

use crate::donor::Donor;

/// Why a donor cannot donate right now.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum IneligibilityReason {
    /// The donor has marked themself unavailable.
    Unavailable,
    /// The post-donation cooldown has not elapsed yet.
    CooldownActive { days_remaining: i64 },
}

impl std::fmt::Display for IneligibilityReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Unavailable => write!(f, "donor is unavailable"),
            Self::CooldownActive { days_remaining } => {
                write!(f, "cooldown active for {days_remaining} more day(s)")
            }
        }
    }
}

/// Whether the cooldown has elapsed since the last donation.
///
/// Boundary is inclusive: a donation exactly `cooldown_days` ago makes the
/// donor eligible again. Donors who never donated are always past
/// cooldown.
pub fn cooldown_elapsed(
    last_donation: Option<DateTime<Utc>>,
    now: DateTime<Utc>,
    cooldown_days: i64,
) -> bool {
    match last_donation {
        None => true,
        Some(last) => now - last >= Duration::days(cooldown_days),
    }
}

/// Full donation-eligibility check: availability and cooldown.
///
/// Pure in `now` so boundary behavior is testable; callers pass
/// `Utc::now()` in production paths.
pub fn check_eligibility(
    donor: &Donor,
    now: DateTime<Utc>,
    cooldown_days: i64,
) -> Result<(), IneligibilityReason> {
    if !donor.available {
        return Err(IneligibilityReason::Unavailable);
    }
    if !cooldown_elapsed(donor.last_donation, now, cooldown_days) {
        let elapsed = donor
            .last_donation
            .map(|last| (now - last).num_days())
            .unwrap_or(0);
        return Err(IneligibilityReason::CooldownActive {
            days_remaining: cooldown_days - elapsed,
        });
    }
    Ok(())
}
