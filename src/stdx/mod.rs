//! Small self-contained utilities shared across the crate.

pub mod rng;

pub use rng::XorShift64;
