//! Result data structures for speed test output.
//!
//! A [`MeasurementResult`] is built once per run by the engine and handed
//! to the presentation layer by value. Everything implements `Serialize`
//! for JSON output.

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::progress::TestPhase;
use crate::speedtest::requests::servers::ServerDescriptor;
use crate::speedtest::tests::pool::TransferReport;
use crate::speedtest::tests::upload::UploadMode;
use crate::stats::LatencyStats;

/// Final snapshot of one run.
///
/// `status` is [`TestPhase::Done`] for a completed run and
/// [`TestPhase::Stopped`] when it was cancelled; a stopped run carries
/// the phases it finished (or interrupted) and `None` for the rest. The
/// server is absent only when the run was stopped during selection.
#[derive(Debug, Clone, Serialize)]
pub struct MeasurementResult {
    /// When the run finished
    pub timestamp: DateTime<Utc>,
    pub status: TestPhase,
    pub server: Option<ServerDescriptor>,
    /// Mean round trip; absent when no latency sample succeeded
    pub latency_ms: Option<f64>,
    /// Population standard deviation of the round trips
    pub jitter_ms: Option<f64>,
    pub download: Option<TransferSummary>,
    pub upload: Option<TransferSummary>,
}

impl MeasurementResult {
    pub fn new(
        status: TestPhase,
        server: Option<ServerDescriptor>,
        latency: Option<LatencyStats>,
        download: Option<TransferSummary>,
        upload: Option<TransferSummary>,
    ) -> Self {
        Self {
            timestamp: Utc::now(),
            status,
            server,
            latency_ms: latency.map(|stats| stats.avg_ms),
            jitter_ms: latency.map(|stats| stats.jitter_ms),
            download,
            upload,
        }
    }

    pub fn download_mbps(&self) -> Option<f64> {
        self.download.as_ref().map(|summary| summary.mbps)
    }

    pub fn upload_mbps(&self) -> Option<f64> {
        self.upload.as_ref().map(|summary| summary.mbps)
    }

    /// Whether every phase ran to its deadline.
    pub fn is_complete(&self) -> bool {
        self.status == TestPhase::Done
    }
}

/// Throughput of one transfer phase.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TransferSummary {
    pub mbps: f64,
    pub bytes: u64,
    pub seconds: f64,
    pub streams: usize,
    /// Upload mode the phase finished in
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mode: Option<UploadMode>,
}

impl TransferSummary {
    pub fn from_report(report: &TransferReport, mode: Option<UploadMode>) -> Self {
        Self {
            mbps: report.mbps(),
            bytes: report.bytes,
            seconds: report.elapsed.as_secs_f64(),
            streams: report.streams,
            mode,
        }
    }
}
