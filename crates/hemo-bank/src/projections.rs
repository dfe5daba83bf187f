use std::collections::BTreeMap;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use hemo_donor::DonorDirectory;
use hemo_inventory::{InventoryStore, StockLevel};
use hemo_request::{BloodRequest, RequestRegistry, RequestStatus};
use hemo_types::BloodType;

use crate::donation::{Donation, DonationStore};
use crate::error::BankError;

/// Activity counters for one (day, blood type) cell.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyAggregate {
    pub date: NaiveDate,
    pub blood_type: BloodType,
    pub donations: u32,
    pub units_donated: u32,
    pub requests_opened: u32,
    pub units_requested: u32,
}

/// Ordered daily aggregates consumed by the external forecasting
/// collaborator. Derived from donation and request rows on demand; the
/// core keeps no separate time-series state.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Aggregates ordered by date, then blood type display order.
    pub days: Vec<DailyAggregate>,
}

impl HistorySnapshot {
    pub fn build(donations: &[Donation], requests: &[BloodRequest]) -> Self {
        fn cell(
            cells: &mut BTreeMap<(NaiveDate, usize), DailyAggregate>,
            date: NaiveDate,
            blood_type: BloodType,
        ) -> &mut DailyAggregate {
            cells
                .entry((date, blood_type.index()))
                .or_insert_with(|| DailyAggregate {
                    date,
                    blood_type,
                    donations: 0,
                    units_donated: 0,
                    requests_opened: 0,
                    units_requested: 0,
                })
        }

        let mut cells = BTreeMap::new();
        for donation in donations {
            let entry = cell(&mut cells, donation.donated_at.date_naive(), donation.blood_type);
            entry.donations += 1;
            entry.units_donated += donation.units;
        }
        for request in requests {
            let entry = cell(&mut cells, request.created_at.date_naive(), request.blood_type);
            entry.requests_opened += 1;
            entry.units_requested += request.units_needed;
        }

        Self {
            days: cells.into_values().collect(),
        }
    }
}

/// Stock status of one blood type, as reported in [`Statistics`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct StockStatus {
    pub blood_type: BloodType,
    pub units_available: u32,
    pub level: StockLevel,
}

/// Operational counters for the admin dashboard.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Statistics {
    pub donor_count: usize,
    pub request_count: usize,
    pub open_request_count: usize,
    pub donation_count: usize,
    /// Donations whose ledger append has not landed yet.
    pub pending_ledger_records: usize,
    pub units_collected: u64,
    /// Per-type stock with threshold classification, display order.
    pub stock: Vec<StockStatus>,
}

impl Statistics {
    pub fn build(
        donors: &DonorDirectory,
        requests: &RequestRegistry,
        donations: &DonationStore,
        inventory: &InventoryStore,
    ) -> Result<Self, BankError> {
        let all_requests = requests.all_requests()?;
        let all_donations = donations.all()?;

        let stock = inventory
            .snapshot()?
            .into_iter()
            .map(|entry| {
                inventory
                    .classify(entry.blood_type)
                    .map(|level| StockStatus {
                        blood_type: entry.blood_type,
                        units_available: entry.units_available,
                        level,
                    })
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self {
            donor_count: donors.donor_count()?,
            request_count: all_requests.len(),
            open_request_count: all_requests
                .iter()
                .filter(|r| r.status == RequestStatus::Open)
                .count(),
            donation_count: all_donations.len(),
            pending_ledger_records: all_donations.iter().filter(|d| !d.is_recorded()).count(),
            units_collected: all_donations.iter().map(|d| u64::from(d.units)).sum(),
            stock,
        })
    }
}
