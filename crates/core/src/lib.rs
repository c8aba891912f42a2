//! `landspice-core` — identifiers and error primitives shared by every LandSpice crate.
//!
//! This crate has no infrastructure concerns.

pub mod error;
pub mod id;

pub use error::DomainError;
pub use id::{RestaurantId, UserId};
