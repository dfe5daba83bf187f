use std::collections::HashMap;
use std::sync::{Arc, Mutex, RwLock};

use tracing::info;

use hemo_types::{BloodType, GeoPoint, RequestId, Urgency};

use crate::error::RequestError;
use crate::request::{BloodRequest, Fulfillment, RequestStatus};

/// Registry of live blood requests with per-request serialization.
///
/// The outer `RwLock` only guards the map of handles; every request sits
/// behind its own `Mutex`, so fulfillment increments on one request are
/// mutually exclusive while different requests proceed in parallel.
pub struct RequestRegistry {
    requests: RwLock<HashMap<RequestId, Arc<Mutex<BloodRequest>>>>,
}

impl RequestRegistry {
    pub fn new() -> Self {
        Self {
            requests: RwLock::new(HashMap::new()),
        }
    }

    /// Create a request in the `Open` state and return a snapshot of it.
    pub fn create(
        &self,
        blood_type: BloodType,
        units_needed: u32,
        urgency: Urgency,
        location: GeoPoint,
        origin: impl Into<String>,
    ) -> Result<BloodRequest, RequestError> {
        let request = BloodRequest::new(blood_type, units_needed, urgency, location, origin)?;
        let snapshot = request.clone();

        let mut map = self.requests.write().map_err(|_| RequestError::Poisoned)?;
        map.insert(request.id, Arc::new(Mutex::new(request)));
        info!(id = %snapshot.id, blood_type = %snapshot.blood_type, units = snapshot.units_needed, urgency = %snapshot.urgency, "request created");
        Ok(snapshot)
    }

    fn handle(&self, id: RequestId) -> Result<Arc<Mutex<BloodRequest>>, RequestError> {
        let map = self.requests.read().map_err(|_| RequestError::Poisoned)?;
        map.get(&id).cloned().ok_or(RequestError::NotFound(id))
    }

    /// Snapshot of one request.
    pub fn get(&self, id: RequestId) -> Result<BloodRequest, RequestError> {
        let handle = self.handle(id)?;
        let request = handle.lock().map_err(|_| RequestError::Poisoned)?;
        Ok(request.clone())
    }

    /// Serialized fulfillment increment on one request.
    pub fn record_fulfillment(
        &self,
        id: RequestId,
        units: u32,
    ) -> Result<Fulfillment, RequestError> {
        let handle = self.handle(id)?;
        let mut request = handle.lock().map_err(|_| RequestError::Poisoned)?;
        let outcome = request.apply_fulfillment(units)?;
        if outcome.newly_fulfilled {
            info!(id = %id, "request fulfilled");
        }
        Ok(outcome)
    }

    /// Close a request from any non-terminal state.
    pub fn close(&self, id: RequestId) -> Result<(), RequestError> {
        let handle = self.handle(id)?;
        let mut request = handle.lock().map_err(|_| RequestError::Poisoned)?;
        request.close()?;
        info!(id = %id, "request closed");
        Ok(())
    }

    /// Snapshots of every request still accepting donors, newest first.
    pub fn open_requests(&self) -> Result<Vec<BloodRequest>, RequestError> {
        let map = self.requests.read().map_err(|_| RequestError::Poisoned)?;
        let mut open = Vec::new();
        for handle in map.values() {
            let request = handle.lock().map_err(|_| RequestError::Poisoned)?;
            if request.status == RequestStatus::Open {
                open.push(request.clone());
            }
        }
        drop(map);
        open.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(a.id.cmp(&b.id)));
        Ok(open)
    }

    /// Snapshots of every request, in creation order.
    pub fn all_requests(&self) -> Result<Vec<BloodRequest>, RequestError> {
        let map = self.requests.read().map_err(|_| RequestError::Poisoned)?;
        let mut all = Vec::new();
        for handle in map.values() {
            let request = handle.lock().map_err(|_| RequestError::Poisoned)?;
            all.push(request.clone());
        }
        drop(map);
        all.sort_by(|a, b| a.created_at.cmp(&b.created_at).then(a.id.cmp(&b.id)));
        Ok(all)
    }
}

impl Default for RequestRegistry {
    fn default() -> Self {
        Self::new()
    }
}
