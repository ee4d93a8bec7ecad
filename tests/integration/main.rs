//! Integration tests for gridcheck.
//!
//! Run with: `cargo test --test integration`

mod end_to_end;
mod loader;
