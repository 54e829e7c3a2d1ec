//! The measurement engine: selection, latency and the transfer phases.

pub mod upload;
