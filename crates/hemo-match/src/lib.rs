//! Donor matching and notification fan-out for Hemolink.
//!
//! The [`filter`] module is pure: given a request and a donor snapshot it
//! returns the blood-compatible, in-radius, donation-eligible candidates
//! ranked by distance then engagement. The [`MatchOrchestrator`] consumes
//! that ranking and dispatches notifications through an external
//! [`NotificationSink`], one timeout-bounded task per candidate, so a slow
//! or failing delivery never blocks the rest of the batch.

pub mod config;
pub mod filter;
pub mod orchestrator;
pub mod sink;

pub use config::MatchConfig;
pub use filter::{eligible_candidates, nearby_requests, MatchCandidate, NearbyRequest};
pub use orchestrator::{CandidateDispatch, DispatchOutcome, DispatchReport, MatchOrchestrator};
pub use sink::{InMemorySink, NotificationSink, SentNotification, SinkError};
