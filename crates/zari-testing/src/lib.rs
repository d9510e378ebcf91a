//! Test utilities for Zari services.
//!
//! Dev-dependency only.

pub mod auth;
