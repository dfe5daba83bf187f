//! Foundation types for Hemolink.
//!
//! This crate provides the identity, medical, and geographic types used
//! throughout the Hemolink system. Every other Hemolink crate depends on
//! `hemo-types`.
//!
//! # Key Types
//!
//! - [`BloodType`] — the 8 ABO/Rh combinations plus the donor→recipient
//!   compatibility table
//! - [`Urgency`] — ordered urgency scale for blood requests
//! - [`GeoPoint`] — latitude/longitude pair with great-circle distance
//! - [`DonorId`], [`RequestId`], [`DonationId`] — UUID newtypes

pub mod blood;
pub mod error;
pub mod geo;
pub mod id;
pub mod urgency;

pub use blood::BloodType;
pub use error::TypeError;
pub use geo::GeoPoint;
pub use id::{DonationId, DonorId, RequestId};
pub use urgency::Urgency;
