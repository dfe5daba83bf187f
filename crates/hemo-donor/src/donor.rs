use std::collections::BTreeSet;
use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hemo_types::{BloodType, DonorId, GeoPoint};

/// Points credited for every committed donation.
pub const POINTS_PER_DONATION: u64 = 100;

/// Recognition tiers unlocked at fixed total-donation counts.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    FirstDonation,
    BronzeSaver,
    SilverGuardian,
    GoldChampion,
    PlatinumLegend,
}

impl Badge {
    /// The badge unlocked when the donor reaches exactly `total`
    /// lifetime donations, if any.
    pub fn for_total(total: u32) -> Option<Badge> {
        match total {
            1 => Some(Self::FirstDonation),
            5 => Some(Self::BronzeSaver),
            10 => Some(Self::SilverGuardian),
            25 => Some(Self::GoldChampion),
            50 => Some(Self::PlatinumLegend),
            _ => None,
        }
    }

    /// Donation count required for this badge.
    pub fn threshold(&self) -> u32 {
        match self {
            Self::FirstDonation => 1,
            Self::BronzeSaver => 5,
            Self::SilverGuardian => 10,
            Self::GoldChampion => 25,
            Self::PlatinumLegend => 50,
        }
    }
}

impl fmt::Display for Badge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::FirstDonation => "first donation",
            Self::BronzeSaver => "bronze saver",
            Self::SilverGuardian => "silver guardian",
            Self::GoldChampion => "gold champion",
            Self::PlatinumLegend => "platinum legend",
        };
        f.write_str(s)
    }
}

/// A registered donor.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Donor {
    pub id: DonorId,
    pub name: String,
    /// Delivery handle for the notification sink (opaque to the core).
    pub contact: String,
    pub blood_type: BloodType,
    pub location: GeoPoint,
    pub available: bool,
    pub last_donation: Option<DateTime<Utc>>,
    pub total_donations: u32,
    pub points: u64,
    pub badges: BTreeSet<Badge>,
    pub registered_at: DateTime<Utc>,
}

impl Donor {
    pub fn new(
        name: impl Into<String>,
        contact: impl Into<String>,
        blood_type: BloodType,
        location: GeoPoint,
    ) -> Self {
        Self {
            id: DonorId::new(),
            name: name.into(),
            contact: contact.into(),
            blood_type,
            location,
            available: true,
            last_donation: None,
            total_donations: 0,
            points: 0,
            badges: BTreeSet::new(),
            registered_at: Utc::now(),
        }
    }
}

/// What a single committed donation changed on the donor row.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GamificationDelta {
    pub total_donations: u32,
    pub points: u64,
    /// Badges unlocked by this donation (usually empty).
    pub new_badges: Vec<Badge>,
}
