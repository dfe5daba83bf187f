use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use hemo_types::{BloodType, GeoPoint, RequestId, Urgency};

use crate::error::RequestError;

/// Lifecycle state of a blood request.
///
/// Partial fulfillment is not a separate state: a request with
/// `0 < fulfilled < needed` is still `Open` and reports
/// [`BloodRequest::is_partially_fulfilled`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestStatus {
    Open,
    /// Terminal: every requested unit has been fulfilled.
    Fulfilled,
    /// Terminal: closed by an administrator before full fulfillment.
    Closed,
}

impl RequestStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Fulfilled | Self::Closed)
    }
}

impl fmt::Display for RequestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Open => "open",
            Self::Fulfilled => "fulfilled",
            Self::Closed => "closed",
        };
        f.write_str(s)
    }
}

/// Outcome of one fulfillment increment.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fulfillment {
    /// Units actually credited to the request (clamped at the remaining
    /// need; never more than was offered).
    pub applied: u32,
    /// Units still needed after this increment.
    pub remaining: u32,
    /// `true` exactly once, on the increment that completed the request.
    pub newly_fulfilled: bool,
}

/// A request for blood units at a location.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BloodRequest {
    pub id: RequestId,
    pub blood_type: BloodType,
    pub units_needed: u32,
    pub units_fulfilled: u32,
    pub urgency: Urgency,
    pub location: GeoPoint,
    /// Label of the requesting facility (opaque to the core).
    pub origin: String,
    pub status: RequestStatus,
    pub created_at: DateTime<Utc>,
    pub fulfilled_at: Option<DateTime<Utc>>,
}

impl BloodRequest {
    pub fn new(
        blood_type: BloodType,
        units_needed: u32,
        urgency: Urgency,
        location: GeoPoint,
        origin: impl Into<String>,
    ) -> Result<Self, RequestError> {
        if units_needed == 0 {
            return Err(RequestError::ZeroUnits);
        }
        Ok(Self {
            id: RequestId::new(),
            blood_type,
            units_needed,
            units_fulfilled: 0,
            urgency,
            location,
            origin: origin.into(),
            status: RequestStatus::Open,
            created_at: Utc::now(),
            fulfilled_at: None,
        })
    }

    pub fn units_remaining(&self) -> u32 {
        self.units_needed.saturating_sub(self.units_fulfilled)
    }

    pub fn is_partially_fulfilled(&self) -> bool {
        self.status == RequestStatus::Open && self.units_fulfilled > 0
    }

    /// Credit `units` toward this request, clamped at the remaining need.
    ///
    /// Only valid while `Open`; a fulfilled or closed request rejects the
    /// increment with [`RequestError::InvalidTransition`]. Transitions to
    /// `Fulfilled` on the increment that covers the last unit.
    pub fn apply_fulfillment(&mut self, units: u32) -> Result<Fulfillment, RequestError> {
        if units == 0 {
            return Err(RequestError::ZeroUnits);
        }
        if self.status != RequestStatus::Open {
            return Err(RequestError::InvalidTransition {
                id: self.id,
                from: self.status,
            });
        }

        let applied = units.min(self.units_remaining());
        self.units_fulfilled += applied;

        let newly_fulfilled = self.units_fulfilled == self.units_needed;
        if newly_fulfilled {
            self.status = RequestStatus::Fulfilled;
            self.fulfilled_at = Some(Utc::now());
        }

        Ok(Fulfillment {
            applied,
            remaining: self.units_remaining(),
            newly_fulfilled,
        })
    }

    /// Close the request. Valid from any non-terminal state.
    pub fn close(&mut self) -> Result<(), RequestError> {
        if self.status.is_terminal() {
            return Err(RequestError::InvalidTransition {
                id: self.id,
                from: self.status,
            });
        }
        self.status = RequestStatus::Closed;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(units: u32) -> BloodRequest {
        BloodRequest::new(
            BloodType::OPos,
            units,
            Urgency::High,
            GeoPoint::new(12.9716, 77.5946),
            "City General",
        )
        .unwrap()
    }

    #[test]
    fn zero_unit_request_is_rejected() {
        let err = BloodRequest::new(
            BloodType::APos,
            0,
            Urgency::Low,
            GeoPoint::new(0.0, 0.0),
            "x",
        )
        .unwrap_err();
        assert_eq!(err, RequestError::ZeroUnits);
    }

    #[test]
    fn fulfillment_accumulates_and_completes() {
        let mut req = request(3);
        let first = req.apply_fulfillment(1).unwrap();
        assert_eq!(first.applied, 1);
        assert_eq!(first.remaining, 2);
        assert!(!first.newly_fulfilled);
        assert!(req.is_partially_fulfilled());

        let second = req.apply_fulfillment(2).unwrap();
        assert!(second.newly_fulfilled);
        assert_eq!(req.status, RequestStatus::Fulfilled);
        assert!(req.fulfilled_at.is_some());
    }

    #[test]
    fn fulfillment_clamps_at_needed() {
        let mut req = request(2);
        let outcome = req.apply_fulfillment(5).unwrap();
        assert_eq!(outcome.applied, 2);
        assert_eq!(req.units_fulfilled, 2);
        assert_eq!(req.status, RequestStatus::Fulfilled);
    }

    #[test]
    fn fulfilled_request_rejects_more() {
        let mut req = request(1);
        req.apply_fulfillment(1).unwrap();
        let err = req.apply_fulfillment(1).unwrap_err();
        assert_eq!(
            err,
            RequestError::InvalidTransition {
                id: req.id,
                from: RequestStatus::Fulfilled,
            }
        );
    }

    #[test]
    fn close_from_open_and_partial() {
        let mut open = request(2);
        open.close().unwrap();
        assert_eq!(open.status, RequestStatus::Closed);

        let mut partial = request(2);
        partial.apply_fulfillment(1).unwrap();
        partial.close().unwrap();
        assert_eq!(partial.status, RequestStatus::Closed);
    }

    #[test]
    fn closed_request_rejects_fulfillment_and_reclose() {
        let mut req = request(2);
        req.close().unwrap();
        assert!(matches!(
            req.apply_fulfillment(1),
            Err(RequestError::InvalidTransition { .. })
        ));
        assert!(matches!(
            req.close(),
            Err(RequestError::InvalidTransition { .. })
        ));
    }
}
