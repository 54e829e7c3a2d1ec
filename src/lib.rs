//! Measurement engine for a self-hosted internet speed test.
//!
//! A run selects the nearest node from a directory service by latency,
//! samples round trips, then drives time-boxed multi-stream download and
//! upload phases against it. See [`speedtest::tests::engine::SpeedTest`].

pub mod display;
pub mod errors;
pub mod measurements;
pub mod progress;
pub mod results;
pub mod retry;
pub mod speedtest;
pub mod stats;
