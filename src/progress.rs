//! Progress event types and callback interface.
//!
//! The engine emits a sequence of [`ProgressEvent`]s while a run is in
//! flight; the presentation layer subscribes through [`ProgressCallback`].

use crate::speedtest::requests::servers::ServerDescriptor;
use crate::speedtest::tests::upload::UploadMode;
use crate::stats::LatencyStats;
use serde::Serialize;
use std::fmt;
use std::time::Duration;

/// States of one measurement run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TestPhase {
    /// Nothing started yet
    Idle,
    /// Querying the directory and probing candidates
    SelectingServer,
    /// Sampling round trips against the chosen server
    MeasuringLatency,
    /// Download phase
    Downloading,
    /// Upload phase
    Uploading,
    /// All phases finished
    Done,
    /// Cancelled by the user
    Stopped,
}

impl TestPhase {
    /// `Done` and `Stopped` end a run.
    pub fn is_terminal(&self) -> bool {
        matches!(self, TestPhase::Done | TestPhase::Stopped)
    }
}

impl fmt::Display for TestPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            TestPhase::Idle => "idle",
            TestPhase::SelectingServer => "selecting server",
            TestPhase::MeasuringLatency => "measuring latency",
            TestPhase::Downloading => "downloading",
            TestPhase::Uploading => "uploading",
            TestPhase::Done => "done",
            TestPhase::Stopped => "stopped",
        };
        f.write_str(name)
    }
}

/// Direction of a transfer phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Download,
    Upload,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::Download => f.write_str("download"),
            Direction::Upload => f.write_str("upload"),
        }
    }
}

/// Progress events emitted during a run.
#[derive(Debug, Clone)]
pub enum ProgressEvent {
    /// The run moved to another state
    PhaseChange(TestPhase),
    /// A server was chosen by latency probing
    ServerSelected {
        server: ServerDescriptor,
        /// Probe result for the chosen server, absent on the degraded
        /// first-candidate fallback
        latency: Option<LatencyStats>,
    },
    /// Latency phase finished with statistics
    LatencyMeasured(LatencyStats),
    /// Periodic snapshot of a running transfer phase
    Transfer {
        direction: Direction,
        /// Cumulative bytes moved so far in this phase
        bytes: u64,
        /// Time since the phase started
        elapsed: Duration,
    },
    /// Final total of a transfer phase, emitted exactly once after all of
    /// its workers have stopped
    TransferComplete {
        direction: Direction,
        bytes: u64,
        elapsed: Duration,
    },
    /// Upload continues in another mode
    UploadModeChanged(UploadMode),
}

/// Callback interface for progress updates.
///
/// Implementations must be non-blocking; they are called from inside the
/// measurement loop.
pub trait ProgressCallback: Send + Sync {
    /// Called when a progress event occurs.
    fn on_progress(&self, event: ProgressEvent);
}

impl<F> ProgressCallback for F
where
    F: Fn(ProgressEvent) + Send + Sync,
{
    fn on_progress(&self, event: ProgressEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoProgress;

impl ProgressCallback for NoProgress {
    fn on_progress(&self, _event: ProgressEvent) {}
}
