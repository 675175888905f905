//! Integration test entry point.
//!
//! These tests talk to the running kernel. Family resolution only needs
//! cfg80211 loaded; scans need root and a wireless interface and are skipped
//! otherwise.
//!
//! # Running Tests
//!
//! ```bash
//! # Run all integration tests
//! sudo cargo test --test integration --features integration
//!
//! # Run specific test module
//! sudo cargo test --test integration --features integration scan
//!
//! # Run with output
//! sudo cargo test --test integration --features integration -- --nocapture
//! ```
//!
//! # Test Organization
//!
//! - `genl.rs` - Generic Netlink family resolution
//! - `scan.rs` - nl80211 wiphy dump and scanning

#[macro_use]
#[path = "common/mod.rs"]
mod common;

#[path = "integration/genl.rs"]
mod genl;

#[path = "integration/scan.rs"]
mod scan;
