//! Scholar HTTP client and navigation policy.
//!
//! This crate provides:
//! - [`ScholarClient`]: fetches result pages that become merge sources
//! - [`classify`]: the host rule separating Scholar URLs from external ones

pub mod client;
pub mod policy;

pub use client::{ResultsPage, ScholarClient};
pub use policy::{Navigation, SCHOLAR_HOST, classify, classify_against};
