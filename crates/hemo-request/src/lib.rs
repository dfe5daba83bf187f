//! Blood request lifecycle for Hemolink.
//!
//! A [`BloodRequest`] moves `Open -> Fulfilled` through clamped
//! fulfillment increments, or to `Closed` from any non-terminal state.
//! The [`RequestRegistry`] gives every request its own lock so concurrent
//! fulfillment on one request serializes while other requests proceed
//! independently.

pub mod error;
pub mod registry;
pub mod request;

pub use error::RequestError;
pub use registry::RequestRegistry;
pub use request::{BloodRequest, Fulfillment, RequestStatus};
