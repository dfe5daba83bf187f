use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};

use hemo_donor::{
    check_eligibility, Donor, DonorDirectory, LeaderboardEntry, LeaderboardProjection,
};
use hemo_inventory::InventoryStore;
use hemo_ledger::{
    InMemoryLedger, IntegrityReport, LedgerBlock, LedgerError, LedgerReader, LedgerWriter,
};
use hemo_match::{nearby_requests, DispatchReport, MatchOrchestrator, NearbyRequest, NotificationSink};
use hemo_request::{BloodRequest, RequestError, RequestRegistry};
use hemo_types::{BloodType, DonorId, GeoPoint, RequestId, Urgency};

use crate::config::BankConfig;
use crate::donation::{Donation, DonationStore};
use crate::error::BankError;
use crate::projections::{HistorySnapshot, Statistics};

/// The Hemolink core, wired together.
///
/// Owns every domain component and coordinates the one operation that
/// must traverse all of them: committing a donation. Components keep
/// their own locks (per-request, per-blood-type, ledger tail), and the
/// coordinator never holds one component's lock while calling into
/// another — in particular, proof-of-work mining runs with no inventory
/// or request lock held.
pub struct BloodBank {
    config: BankConfig,
    donors: DonorDirectory,
    requests: RequestRegistry,
    inventory: InventoryStore,
    ledger: InMemoryLedger,
    donations: DonationStore,
    orchestrator: MatchOrchestrator,
}

impl BloodBank {
    /// Initialize the bank: mine the genesis block, seed inventory, and
    /// attach the notification sink.
    pub fn new(config: BankConfig, sink: Arc<dyn NotificationSink>) -> Result<Self, BankError> {
        let ledger = InMemoryLedger::new(config.ledger.clone())?;
        let inventory = InventoryStore::new(config.stock);
        if config.seed_units_per_type > 0 {
            inventory.seed(config.seed_units_per_type)?;
        }
        let orchestrator = MatchOrchestrator::new(config.matching.clone(), sink);

        Ok(Self {
            config,
            donors: DonorDirectory::new(),
            requests: RequestRegistry::new(),
            inventory,
            ledger,
            donations: DonationStore::new(),
            orchestrator,
        })
    }

    // ---- Collaborator surfaces ----

    /// Donor registration and self-service updates.
    pub fn donors(&self) -> &DonorDirectory {
        &self.donors
    }

    /// Request lifecycle access for requester collaborators.
    pub fn requests(&self) -> &RequestRegistry {
        &self.requests
    }

    /// Inventory reads (unit counts, stock classification).
    pub fn inventory(&self) -> &InventoryStore {
        &self.inventory
    }

    /// Donation rows (read side).
    pub fn donations(&self) -> &DonationStore {
        &self.donations
    }

    // ---- Requests and matching ----

    /// Create a blood request and fan notifications out to every donor
    /// the geo-eligibility filter selects for it.
    ///
    /// A dispatch failure for one candidate never aborts the rest; the
    /// report carries the per-candidate outcomes.
    pub async fn create_request(
        &self,
        blood_type: BloodType,
        units_needed: u32,
        urgency: Urgency,
        location: GeoPoint,
        origin: impl Into<String>,
    ) -> Result<(BloodRequest, DispatchReport), BankError> {
        let request = self
            .requests
            .create(blood_type, units_needed, urgency, location, origin)?;
        let donors = self.donors.snapshot()?;
        let report = self
            .orchestrator
            .notify_matches(&request, &donors, Utc::now())
            .await;
        Ok((request, report))
    }

    /// Open requests a donor could serve, nearest first.
    pub fn nearby_requests(&self, donor_id: DonorId) -> Result<Vec<NearbyRequest>, BankError> {
        let donor = self.donors.get(donor_id)?;
        let open = self.requests.open_requests()?;
        Ok(nearby_requests(&donor, &open, self.orchestrator.config()))
    }

    /// Close a request from any non-terminal state (admin operation).
    pub fn close_request(&self, id: RequestId) -> Result<(), BankError> {
        match self.requests.close(id) {
            Ok(()) => Ok(()),
            Err(RequestError::InvalidTransition { .. }) => Err(BankError::RequestClosed(id)),
            Err(e) => Err(e.into()),
        }
    }

    // ---- The donation commit ----

    /// Commit a donation against a request.
    ///
    /// Eligibility is re-validated here no matter what a match said
    /// earlier — matches are a snapshot and go stale between notification
    /// and acceptance. The mutation order is deliberate: fulfillment,
    /// inventory, and donor state commit first under their own locks, the
    /// donation row is stored as a pending marker, and the ledger append
    /// (the expensive, interruptible step) runs last with no other lock
    /// held. A crash before the append leaves a pending row that
    /// `reconcile` replays without touching the mutations again.
    pub fn commit_donation(
        &self,
        donor_id: DonorId,
        request_id: RequestId,
        units: u32,
    ) -> Result<Donation, BankError> {
        if units == 0 {
            return Err(BankError::ZeroUnits);
        }
        let now = Utc::now();
        let donor = self.donors.get(donor_id)?;
        let request = self.requests.get(request_id)?;

        if request.status.is_terminal() {
            return Err(BankError::RequestClosed(request_id));
        }
        self.validate_donor_for_request(&donor, &request, now)?;

        // Serialized per-request accounting; clamped, never overshoots.
        // Another donor may have completed the request since the snapshot.
        let fulfillment = match self.requests.record_fulfillment(request_id, units) {
            Ok(f) => f,
            Err(RequestError::InvalidTransition { .. }) => {
                return Err(BankError::RequestClosed(request_id));
            }
            Err(e) => return Err(e.into()),
        };

        // The coupled model: a donation both adds supply and fulfills the
        // request in one coordinated step. Inventory takes the donated
        // units in full; the surplus past the request's need is stock.
        self.inventory
            .adjust(request.blood_type, i64::from(units))?;

        let delta = self.donors.record_donation(donor_id, now)?;

        let donation = Donation::new(donor_id, Some(request_id), request.blood_type, units, now);
        self.donations.insert(donation.clone())?;

        info!(
            donation = %donation.id,
            donor = %donor_id,
            request = %request_id,
            units,
            applied = fulfillment.applied,
            fulfilled = fulfillment.newly_fulfilled,
            points = delta.points,
            new_badges = delta.new_badges.len(),
            "donation committed; appending ledger block"
        );

        self.append_donation_block(donation)
    }

    /// Commit an untargeted donation straight into stock.
    ///
    /// Same coordinated flow as [`Self::commit_donation`] minus the
    /// request leg: no compatibility or distance check applies, only
    /// availability and cooldown.
    pub fn donate_to_stock(&self, donor_id: DonorId, units: u32) -> Result<Donation, BankError> {
        if units == 0 {
            return Err(BankError::ZeroUnits);
        }
        let now = Utc::now();
        let donor = self.donors.get(donor_id)?;

        if let Err(reason) = check_eligibility(&donor, now, self.config.matching.cooldown_days) {
            return Err(BankError::IneligibleDonor {
                donor_id,
                reason: reason.to_string(),
            });
        }

        self.inventory.adjust(donor.blood_type, i64::from(units))?;
        self.donors.record_donation(donor_id, now)?;

        let donation = Donation::new(donor_id, None, donor.blood_type, units, now);
        self.donations.insert(donation.clone())?;
        info!(donation = %donation.id, donor = %donor_id, units, "stock donation committed");

        self.append_donation_block(donation)
    }

    fn validate_donor_for_request(
        &self,
        donor: &Donor,
        request: &BloodRequest,
        now: DateTime<Utc>,
    ) -> Result<(), BankError> {
        if let Err(reason) = check_eligibility(donor, now, self.config.matching.cooldown_days) {
            return Err(BankError::IneligibleDonor {
                donor_id: donor.id,
                reason: reason.to_string(),
            });
        }
        if !donor.blood_type.can_donate_to(request.blood_type) {
            return Err(BankError::IneligibleDonor {
                donor_id: donor.id,
                reason: format!(
                    "blood type {} cannot donate to {}",
                    donor.blood_type, request.blood_type
                ),
            });
        }
        let distance_km = donor.location.distance_km(&request.location);
        if distance_km > self.config.matching.radius_km {
            return Err(BankError::IneligibleDonor {
                donor_id: donor.id,
                reason: format!(
                    "donor is {distance_km:.1} km from the request (limit {} km)",
                    self.config.matching.radius_km
                ),
            });
        }
        Ok(())
    }

    pub(crate) fn append_donation_block(&self, donation: Donation) -> Result<Donation, BankError> {
        match self.ledger.append(donation.payload()) {
            Ok(block) => {
                self.donations.mark_recorded(donation.id, block.index)?;
                Ok(Donation {
                    block_index: Some(block.index),
                    ..donation
                })
            }
            Err(LedgerError::TailContention { attempts }) => {
                // The mutations stand; the row stays pending and the next
                // reconcile pass replays the append.
                warn!(
                    donation = %donation.id,
                    attempts,
                    "ledger append lost the retry race; donation left pending"
                );
                Err(BankError::ConcurrencyConflict)
            }
            Err(e) => Err(e.into()),
        }
    }

    // ---- Inventory ----

    /// Manual inventory adjustment (admin-only; authorization is the
    /// caller's job). Negative deltas that would underflow are rejected.
    pub fn adjust_inventory(&self, blood_type: BloodType, delta: i64) -> Result<u32, BankError> {
        let units = self.inventory.adjust(blood_type, delta)?;
        info!(%blood_type, delta, units, "inventory adjusted by admin");
        Ok(units)
    }

    // ---- Ledger reads ----

    /// Walk the full chain and report every integrity violation.
    pub fn verify_ledger(&self) -> Result<IntegrityReport, BankError> {
        Ok(self.ledger.verify()?)
    }

    /// Every ledger block, genesis first.
    pub fn ledger_blocks(&self) -> Result<Vec<LedgerBlock>, BankError> {
        Ok(self.ledger.read_all()?)
    }

    // ---- Projections ----

    /// Top donors by points (ties broken by ascending donor id).
    pub fn leaderboard(&self, limit: usize) -> Result<Vec<LeaderboardEntry>, BankError> {
        Ok(LeaderboardProjection::compute(&self.donors, limit)?)
    }

    /// One donor's donations, newest first.
    pub fn donations_of(&self, donor_id: DonorId) -> Result<Vec<Donation>, BankError> {
        // Surface a not-found instead of an empty list for unknown donors.
        self.donors.get(donor_id)?;
        self.donations.of_donor(donor_id)
    }

    /// Ordered daily aggregates for the forecasting collaborator.
    pub fn history_snapshot(&self) -> Result<HistorySnapshot, BankError> {
        let donations = self.donations.all()?;
        let requests = self.requests.all_requests()?;
        Ok(HistorySnapshot::build(&donations, &requests))
    }

    /// Operational counters for the admin dashboard.
    pub fn statistics(&self) -> Result<Statistics, BankError> {
        Statistics::build(
            &self.donors,
            &self.requests,
            &self.donations,
            &self.inventory,
        )
    }
}
