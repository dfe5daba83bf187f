use std::sync::Arc;

use chrono::{DateTime, Utc};
use tokio::task::JoinSet;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use hemo_donor::Donor;
use hemo_request::BloodRequest;
use hemo_types::{DonorId, RequestId};

use crate::config::MatchConfig;
use crate::filter::eligible_candidates;
use crate::sink::{NotificationSink, SinkError};

/// How one candidate's notification dispatch ended.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DispatchOutcome {
    Delivered,
    Failed(SinkError),
    TimedOut,
}

/// Per-candidate dispatch record.
#[derive(Clone, Debug, PartialEq)]
pub struct CandidateDispatch {
    pub donor_id: DonorId,
    pub distance_km: f64,
    pub outcome: DispatchOutcome,
}

/// Result of one notification fan-out.
#[derive(Clone, Debug, PartialEq)]
pub struct DispatchReport {
    pub request_id: RequestId,
    /// How many candidates matched before the fan-out cap.
    pub matched: usize,
    /// Dispatches in ranking order (nearest candidate first).
    pub dispatches: Vec<CandidateDispatch>,
}

impl DispatchReport {
    /// Candidates whose notification was delivered.
    pub fn notified_count(&self) -> usize {
        self.dispatches
            .iter()
            .filter(|d| d.outcome == DispatchOutcome::Delivered)
            .count()
    }

    /// Candidates whose dispatch failed or timed out.
    pub fn failed_count(&self) -> usize {
        self.dispatches.len() - self.notified_count()
    }
}

/// Matches donors to a new request and fans notifications out to them.
///
/// Matching is recomputed fresh on every call — there is no persistent
/// match cache, so the result always reflects current donor availability
/// and location. Dispatch is fire-and-collect: every candidate gets an
/// independent, timeout-bounded delivery task, and one slow or failing
/// delivery never blocks or aborts the others.
pub struct MatchOrchestrator {
    config: MatchConfig,
    sink: Arc<dyn NotificationSink>,
}

impl MatchOrchestrator {
    pub fn new(config: MatchConfig, sink: Arc<dyn NotificationSink>) -> Self {
        Self { config, sink }
    }

    pub fn config(&self) -> &MatchConfig {
        &self.config
    }

    /// Notify every matching donor about `request`.
    ///
    /// `donors` is the current directory snapshot; `now` anchors the
    /// cooldown check.
    pub async fn notify_matches(
        &self,
        request: &BloodRequest,
        donors: &[Donor],
        now: DateTime<Utc>,
    ) -> DispatchReport {
        let mut candidates = eligible_candidates(request, donors, now, &self.config);
        let matched = candidates.len();

        if let Some(cap) = self.config.max_fanout {
            if candidates.len() > cap {
                debug!(matched, cap, "capping notification fan-out");
                candidates.truncate(cap);
            }
        }

        let message = format!(
            "Urgent: {} blood needed at {} ({} unit(s), urgency {})",
            request.blood_type, request.origin, request.units_needed, request.urgency
        );

        let mut tasks = JoinSet::new();
        for candidate in &candidates {
            let sink = Arc::clone(&self.sink);
            let contact = candidate.contact.clone();
            let message = message.clone();
            let donor_id = candidate.donor_id;
            let distance_km = candidate.distance_km;
            let budget = self.config.dispatch_timeout;

            tasks.spawn(async move {
                let outcome = match timeout(budget, sink.send(&contact, &message)).await {
                    Ok(Ok(())) => DispatchOutcome::Delivered,
                    Ok(Err(e)) => DispatchOutcome::Failed(e),
                    Err(_) => DispatchOutcome::TimedOut,
                };
                CandidateDispatch {
                    donor_id,
                    distance_km,
                    outcome,
                }
            });
        }

        let mut dispatches = Vec::with_capacity(candidates.len());
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(dispatch) => {
                    if dispatch.outcome != DispatchOutcome::Delivered {
                        warn!(donor = %dispatch.donor_id, outcome = ?dispatch.outcome, "notification dispatch failed");
                    }
                    dispatches.push(dispatch);
                }
                Err(e) => warn!(error = %e, "dispatch task panicked"),
            }
        }

        // Tasks complete in arbitrary order; restore ranking order.
        dispatches.sort_by(|a, b| a.distance_km.total_cmp(&b.distance_km));

        let report = DispatchReport {
            request_id: request.id,
            matched,
            dispatches,
        };
        info!(
            request = %request.id,
            matched = report.matched,
            notified = report.notified_count(),
            failed = report.failed_count(),
            "notification fan-out complete"
        );
        report
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use hemo_types::{BloodType, GeoPoint, Urgency};

    use crate::sink::InMemorySink;

    use super::*;

    fn request() -> BloodRequest {
        BloodRequest::new(
            BloodType::OPos,
            2,
            Urgency::Critical,
            GeoPoint::new(0.0, 0.0),
            "City General",
        )
        .unwrap()
    }

    fn donor(name: &str, km_north: f64) -> Donor {
        Donor::new(
            name,
            format!("{name}@example.org"),
            BloodType::OPos,
            GeoPoint::new((km_north / 6371.0f64).to_degrees(), 0.0),
        )
    }

    fn orchestrator(sink: Arc<InMemorySink>, config: MatchConfig) -> MatchOrchestrator {
        MatchOrchestrator::new(config, sink)
    }

    #[tokio::test]
    async fn notifies_every_match() {
        let sink = Arc::new(InMemorySink::new());
        let orch = orchestrator(Arc::clone(&sink), MatchConfig::default());
        let donors = vec![donor("a", 1.0), donor("b", 2.0)];

        let report = orch.notify_matches(&request(), &donors, Utc::now()).await;
        assert_eq!(report.matched, 2);
        assert_eq!(report.notified_count(), 2);
        assert_eq!(sink.sent().len(), 2);
        assert!(sink.sent()[0].message.contains("O+"));
    }

    #[tokio::test]
    async fn one_failure_does_not_abort_the_batch() {
        let sink = Arc::new(InMemorySink::new().failing_for("b@example.org"));
        let orch = orchestrator(Arc::clone(&sink), MatchConfig::default());
        let donors = vec![donor("a", 1.0), donor("b", 2.0), donor("c", 3.0)];

        let report = orch.notify_matches(&request(), &donors, Utc::now()).await;
        assert_eq!(report.notified_count(), 2);
        assert_eq!(report.failed_count(), 1);
        assert!(matches!(
            report.dispatches[1].outcome,
            DispatchOutcome::Failed(_)
        ));
    }

    #[tokio::test]
    async fn slow_sink_is_timed_out_without_blocking_others() {
        let sink = Arc::new(
            InMemorySink::new().delayed_for("slow@example.org", Duration::from_secs(30)),
        );
        let config = MatchConfig {
            dispatch_timeout: Duration::from_millis(50),
            ..Default::default()
        };
        let orch = orchestrator(Arc::clone(&sink), config);
        let donors = vec![donor("slow", 1.0), donor("fast", 2.0)];

        let started = std::time::Instant::now();
        let report = orch.notify_matches(&request(), &donors, Utc::now()).await;
        assert!(started.elapsed() < Duration::from_secs(5));

        assert_eq!(report.notified_count(), 1);
        assert_eq!(report.dispatches[0].outcome, DispatchOutcome::TimedOut);
        assert_eq!(sink.sent().len(), 1);
    }

    #[tokio::test]
    async fn fanout_cap_limits_dispatches_to_nearest() {
        let sink = Arc::new(InMemorySink::new());
        let config = MatchConfig {
            max_fanout: Some(2),
            ..Default::default()
        };
        let orch = orchestrator(Arc::clone(&sink), config);
        let donors = vec![donor("far", 30.0), donor("near", 1.0), donor("mid", 10.0)];

        let report = orch.notify_matches(&request(), &donors, Utc::now()).await;
        assert_eq!(report.matched, 3);
        assert_eq!(report.dispatches.len(), 2);
        // The two nearest were picked.
        assert!(report.dispatches.iter().all(|d| d.distance_km < 15.0));
    }

    #[tokio::test]
    async fn matching_is_recomputed_fresh_each_call() {
        let sink = Arc::new(InMemorySink::new());
        let orch = orchestrator(Arc::clone(&sink), MatchConfig::default());
        let mut donors = vec![donor("a", 1.0)];

        let first = orch.notify_matches(&request(), &donors, Utc::now()).await;
        assert_eq!(first.matched, 1);

        donors[0].available = false;
        let second = orch.notify_matches(&request(), &donors, Utc::now()).await;
        assert_eq!(second.matched, 0);
        assert!(second.dispatches.is_empty());
    }
}
