//! Admin authentication types for Zari services.
//!
//! Provides bearer JWT issuing/validation and the `AdminIdentity` extractor.

pub mod identity;
pub mod token;
