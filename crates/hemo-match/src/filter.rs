use chrono::{DateTime, Utc};

use hemo_donor::{check_eligibility, Donor};
use hemo_request::{BloodRequest, RequestStatus};
use hemo_types::DonorId;

use crate::config::MatchConfig;

/// A donor selected for a request, with the ranking keys attached.
#[derive(Clone, Debug, PartialEq)]
pub struct MatchCandidate {
    pub donor_id: DonorId,
    pub name: String,
    pub contact: String,
    pub distance_km: f64,
    pub points: u64,
}

/// An open request visible to a browsing donor.
#[derive(Clone, Debug, PartialEq)]
pub struct NearbyRequest {
    pub request: BloodRequest,
    pub distance_km: f64,
}

/// Select and rank the donors who can serve `request` right now.
///
/// A donor qualifies when their blood type can donate to the requested
/// type, they are within `radius_km` (inclusive), they are available, and
/// the donation cooldown has elapsed. Ranking: ascending distance, ties
/// broken by descending points so equidistant high-engagement donors come
/// first.
///
/// Pure and side-effect free: identical inputs produce identical output.
pub fn eligible_candidates(
    request: &BloodRequest,
    donors: &[Donor],
    now: DateTime<Utc>,
    config: &MatchConfig,
) -> Vec<MatchCandidate> {
    let mut candidates: Vec<MatchCandidate> = donors
        .iter()
        .filter(|donor| donor.blood_type.can_donate_to(request.blood_type))
        .filter(|donor| check_eligibility(donor, now, config.cooldown_days).is_ok())
        .filter_map(|donor| {
            let distance_km = donor.location.distance_km(&request.location);
            (distance_km <= config.radius_km).then(|| MatchCandidate {
                donor_id: donor.id,
                name: donor.name.clone(),
                contact: donor.contact.clone(),
                distance_km,
                points: donor.points,
            })
        })
        .collect();

    candidates.sort_by(|a, b| {
        a.distance_km
            .total_cmp(&b.distance_km)
            .then(b.points.cmp(&a.points))
    });
    candidates
}

/// Open requests a donor could serve, nearest first.
///
/// The donor-facing mirror of [`eligible_candidates`]: same compatibility
/// and radius rules, applied over the open request set.
pub fn nearby_requests(
    donor: &Donor,
    requests: &[BloodRequest],
    config: &MatchConfig,
) -> Vec<NearbyRequest> {
    let mut nearby: Vec<NearbyRequest> = requests
        .iter()
        .filter(|request| request.status == RequestStatus::Open)
        .filter(|request| donor.blood_type.can_donate_to(request.blood_type))
        .filter_map(|request| {
            let distance_km = donor.location.distance_km(&request.location);
            (distance_km <= config.radius_km).then(|| NearbyRequest {
                request: request.clone(),
                distance_km,
            })
        })
        .collect();

    nearby.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));
    nearby
}

#[cfg(test)]
mod tests {
    use chrono::Duration;

    use hemo_types::{BloodType, GeoPoint, Urgency};

    use super::*;

    const ORIGIN: GeoPoint = GeoPoint::new(0.0, 0.0);

    /// Latitude offset (degrees) that puts a point `km` away from ORIGIN.
    fn degrees_north_for_km(km: f64) -> f64 {
        (km / 6371.0f64).to_degrees()
    }

    fn request(blood_type: BloodType) -> BloodRequest {
        BloodRequest::new(blood_type, 2, Urgency::Critical, ORIGIN, "City General").unwrap()
    }

    fn donor_at(name: &str, blood_type: BloodType, km_north: f64) -> Donor {
        Donor::new(
            name,
            format!("{name}@example.org"),
            blood_type,
            GeoPoint::new(degrees_north_for_km(km_north), 0.0),
        )
    }

    #[test]
    fn incompatible_blood_types_are_excluded() {
        let req = request(BloodType::ONeg);
        let donors = vec![
            donor_at("oneg", BloodType::ONeg, 1.0),
            donor_at("opos", BloodType::OPos, 1.0),
            donor_at("abpos", BloodType::AbPos, 1.0),
        ];

        let candidates = eligible_candidates(&req, &donors, Utc::now(), &MatchConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "oneg");
    }

    #[test]
    fn radius_boundary_is_inclusive() {
        let req = request(BloodType::APos);
        let donor = donor_at("edge", BloodType::APos, 50.0);
        let measured = donor.location.distance_km(&req.location);

        // Exactly the measured distance: included.
        let config = MatchConfig {
            radius_km: measured,
            ..Default::default()
        };
        assert_eq!(
            eligible_candidates(&req, std::slice::from_ref(&donor), Utc::now(), &config).len(),
            1
        );

        // A hair under: excluded.
        let config = MatchConfig {
            radius_km: measured - 1e-6,
            ..Default::default()
        };
        assert!(eligible_candidates(&req, &[donor], Utc::now(), &config).is_empty());
    }

    #[test]
    fn donor_past_fifty_km_is_excluded_by_default() {
        let req = request(BloodType::APos);
        let near = donor_at("near", BloodType::APos, 49.9);
        let far = donor_at("far", BloodType::APos, 50.1);

        let candidates = eligible_candidates(
            &req,
            &[near, far],
            Utc::now(),
            &MatchConfig::default(),
        );
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "near");
    }

    #[test]
    fn cooldown_and_availability_are_enforced() {
        let now = Utc::now();
        let req = request(BloodType::BPos);

        let mut cooling = donor_at("cooling", BloodType::BPos, 1.0);
        cooling.last_donation = Some(now - Duration::days(89));

        let mut rested = donor_at("rested", BloodType::BPos, 1.0);
        rested.last_donation = Some(now - Duration::days(90));

        let mut away = donor_at("away", BloodType::BPos, 1.0);
        away.available = false;

        let candidates =
            eligible_candidates(&req, &[cooling, rested, away], now, &MatchConfig::default());
        assert_eq!(candidates.len(), 1);
        assert_eq!(candidates[0].name, "rested");
    }

    #[test]
    fn ranking_is_distance_then_points() {
        let req = request(BloodType::OPos);
        let mut far = donor_at("far", BloodType::OPos, 20.0);
        far.points = 900;
        let near = donor_at("near", BloodType::OPos, 5.0);

        let mut tied_low = donor_at("tied-low", BloodType::OPos, 10.0);
        tied_low.points = 100;
        let mut tied_high = donor_at("tied-high", BloodType::OPos, 10.0);
        tied_high.points = 500;

        let candidates = eligible_candidates(
            &req,
            &[far, near, tied_low, tied_high],
            Utc::now(),
            &MatchConfig::default(),
        );

        let names: Vec<_> = candidates.iter().map(|c| c.name.as_str()).collect();
        assert_eq!(names, vec!["near", "tied-high", "tied-low", "far"]);
    }

    #[test]
    fn filter_is_idempotent() {
        let now = Utc::now();
        let req = request(BloodType::ANeg);
        let donors = vec![
            donor_at("a", BloodType::ANeg, 3.0),
            donor_at("b", BloodType::ONeg, 7.0),
        ];

        let first = eligible_candidates(&req, &donors, now, &MatchConfig::default());
        let second = eligible_candidates(&req, &donors, now, &MatchConfig::default());
        assert_eq!(first, second);
    }

    #[test]
    fn nearby_requests_respects_status_and_compatibility() {
        let donor = donor_at("browser", BloodType::ONeg, 0.0);

        let open_near = request(BloodType::APos);
        let mut fulfilled = request(BloodType::APos);
        fulfilled.apply_fulfillment(2).unwrap();
        let mut open_far = request(BloodType::BPos);
        open_far.location = GeoPoint::new(degrees_north_for_km(80.0), 0.0);

        let nearby = nearby_requests(
            &donor,
            &[open_near.clone(), fulfilled, open_far],
            &MatchConfig::default(),
        );
        assert_eq!(nearby.len(), 1);
        assert_eq!(nearby[0].request.id, open_near.id);
    }
}
