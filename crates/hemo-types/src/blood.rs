use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::TypeError;

/// ABO blood group component.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AboGroup {
    O,
    A,
    B,
    Ab,
}

/// One of the 8 ABO/Rh blood type combinations.
///
/// Donor→recipient compatibility follows the canonical medical table:
/// the recipient must carry every antigen the donor's cells carry.
/// O- is the universal donor, AB+ the universal recipient.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum BloodType {
    #[serde(rename = "O+")]
    OPos,
    #[serde(rename = "O-")]
    ONeg,
    #[serde(rename = "A+")]
    APos,
    #[serde(rename = "A-")]
    ANeg,
    #[serde(rename = "B+")]
    BPos,
    #[serde(rename = "B-")]
    BNeg,
    #[serde(rename = "AB+")]
    AbPos,
    #[serde(rename = "AB-")]
    AbNeg,
}

impl BloodType {
    /// All 8 blood types, in display order.
    pub const ALL: [BloodType; 8] = [
        Self::OPos,
        Self::ONeg,
        Self::APos,
        Self::ANeg,
        Self::BPos,
        Self::BNeg,
        Self::AbPos,
        Self::AbNeg,
    ];

    /// The ABO component of this type.
    pub fn abo(&self) -> AboGroup {
        match self {
            Self::OPos | Self::ONeg => AboGroup::O,
            Self::APos | Self::ANeg => AboGroup::A,
            Self::BPos | Self::BNeg => AboGroup::B,
            Self::AbPos | Self::AbNeg => AboGroup::Ab,
        }
    }

    /// Whether this type carries the Rh(D) antigen.
    pub fn rh_positive(&self) -> bool {
        matches!(self, Self::OPos | Self::APos | Self::BPos | Self::AbPos)
    }

    /// Returns `true` if blood of this type can be transfused to a
    /// recipient of the given type.
    ///
    /// ABO rule: O donates to anyone, A to A/AB, B to B/AB, AB to AB.
    /// Rh rule: Rh- donates to anyone, Rh+ only to Rh+.
    pub fn can_donate_to(&self, recipient: BloodType) -> bool {
        let abo_ok = match self.abo() {
            AboGroup::O => true,
            AboGroup::A => matches!(recipient.abo(), AboGroup::A | AboGroup::Ab),
            AboGroup::B => matches!(recipient.abo(), AboGroup::B | AboGroup::Ab),
            AboGroup::Ab => recipient.abo() == AboGroup::Ab,
        };
        let rh_ok = !self.rh_positive() || recipient.rh_positive();
        abo_ok && rh_ok
    }

    /// Types that may receive from this donor type, in display order.
    pub fn compatible_recipients(&self) -> Vec<BloodType> {
        Self::ALL
            .into_iter()
            .filter(|r| self.can_donate_to(*r))
            .collect()
    }

    /// Stable index of this type in [`Self::ALL`].
    pub fn index(&self) -> usize {
        Self::ALL.iter().position(|t| t == self).unwrap_or(0)
    }

    /// Canonical label, e.g. `"AB-"`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::OPos => "O+",
            Self::ONeg => "O-",
            Self::APos => "A+",
            Self::ANeg => "A-",
            Self::BPos => "B+",
            Self::BNeg => "B-",
            Self::AbPos => "AB+",
            Self::AbNeg => "AB-",
        }
    }
}

impl fmt::Debug for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "BloodType({})", self.as_str())
    }
}

impl fmt::Display for BloodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for BloodType {
    type Err = TypeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_uppercase().as_str() {
            "O+" => Ok(Self::OPos),
            "O-" => Ok(Self::ONeg),
            "A+" => Ok(Self::APos),
            "A-" => Ok(Self::ANeg),
            "B+" => Ok(Self::BPos),
            "B-" => Ok(Self::BNeg),
            "AB+" => Ok(Self::AbPos),
            "AB-" => Ok(Self::AbNeg),
            other => Err(TypeError::UnknownBloodType(other.to_string())),
        }
    }
}
