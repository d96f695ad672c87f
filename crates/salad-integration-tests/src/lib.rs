//! Integration test crate for the salad staking system.
//!
//! This crate has no library code — it only contains integration tests
//! that exercise end-to-end staking flows across the workspace crates.
//!
//! Run all integration tests:
//! ```sh
//! cargo test -p salad-integration-tests
//! ```
