//! Console presentation: display mode detection, live progress and the
//! final result.

use crate::errors::SpeedTestError;
use crate::progress::{Direction, ProgressCallback, ProgressEvent, TestPhase};
use crate::results::{MeasurementResult, TransferSummary};
use crate::measurements::calculate_speed_mbps;
use crate::speedtest::tests::upload::UploadMode;
use colored::{Color, Colorize};
use std::io::Write;

/// The display mode for the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DisplayMode {
    /// Live progress line while the run is in flight
    Live,
    /// No output until final results
    Plain,
    /// Structured output only
    Json,
}

impl DisplayMode {
    /// `--json` wins; otherwise live output only on an interactive
    /// terminal.
    pub fn detect(json_flag: bool, is_tty: bool) -> Self {
        if json_flag {
            DisplayMode::Json
        } else if is_tty {
            DisplayMode::Live
        } else {
            DisplayMode::Plain
        }
    }
}

/// Get color for speed value based on thresholds.
///
/// - Green: >= 100 Mbps (fast)
/// - Yellow: 25-100 Mbps (moderate)
/// - Red: < 25 Mbps (slow)
pub fn speed_color(speed_mbps: f64) -> Color {
    if speed_mbps >= 100.0 {
        Color::Green
    } else if speed_mbps >= 25.0 {
        Color::Yellow
    } else {
        Color::Red
    }
}

/// Format speed value with 2 decimal places.
pub fn format_speed(speed_mbps: f64) -> String {
    format!("{:.2} Mbps", speed_mbps)
}

/// Format latency value with 2 decimal places.
pub fn format_latency(latency_ms: f64) -> String {
    format!("{:.2} ms", latency_ms)
}

/// Format a byte count for display.
pub fn format_size_label(bytes: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = 1024 * KB;
    const GB: u64 = 1024 * MB;

    if bytes >= GB {
        format!("{:.1}GB", bytes as f64 / GB as f64)
    } else if bytes >= MB {
        format!("{:.1}MB", bytes as f64 / MB as f64)
    } else if bytes >= KB {
        format!("{:.1}KB", bytes as f64 / KB as f64)
    } else {
        format!("{}B", bytes)
    }
}

fn direction_label(direction: Direction) -> &'static str {
    match direction {
        Direction::Download => "Download",
        Direction::Upload => "Upload",
    }
}

/// Progress printer for the terminal. Writes to stderr so stdout carries
/// only the result.
#[derive(Debug, Clone, Copy)]
pub struct ConsoleProgress {
    mode: DisplayMode,
}

impl ConsoleProgress {
    pub fn new(mode: DisplayMode) -> Self {
        Self { mode }
    }

    fn print(&self, line: String) {
        let mut stderr = std::io::stderr().lock();
        let _ = write!(stderr, "{}", line);
        let _ = stderr.flush();
    }
}

impl ProgressCallback for ConsoleProgress {
    fn on_progress(&self, event: ProgressEvent) {
        if self.mode != DisplayMode::Live {
            return;
        }

        match event {
            ProgressEvent::PhaseChange(TestPhase::SelectingServer) => {
                self.print(format!("{}\n", "Selecting server...".dimmed()));
            }
            ProgressEvent::PhaseChange(TestPhase::Stopped) => {
                self.print(format!("\n{}\n", "Stopped".yellow()));
            }
            ProgressEvent::PhaseChange(_) => {}
            ProgressEvent::ServerSelected { server, .. } => {
                self.print(format!(
                    "{} {} {}\n",
                    "Server:".bold().white(),
                    server.label().bright_blue(),
                    format!("({})", server.base_url).dimmed()
                ));
            }
            ProgressEvent::LatencyMeasured(stats) => {
                self.print(format!(
                    "{} {} {} {}\n",
                    "Latency:".bold().white(),
                    format_latency(stats.avg_ms),
                    "Jitter:".bold().white(),
                    format_latency(stats.jitter_ms)
                ));
            }
            ProgressEvent::Transfer { direction, bytes, elapsed } => {
                let mbps = calculate_speed_mbps(bytes, elapsed);
                self.print(format!(
                    "\r{} {} {:>10}   ",
                    format!("{}:", direction_label(direction)).bold().white(),
                    format_speed(mbps).color(speed_color(mbps)),
                    format_size_label(bytes).dimmed()
                ));
            }
            ProgressEvent::TransferComplete { direction, bytes, elapsed } => {
                let mbps = calculate_speed_mbps(bytes, elapsed);
                self.print(format!(
                    "\r{} {} {:>10}   \n",
                    format!("{}:", direction_label(direction)).bold().white(),
                    format_speed(mbps).color(speed_color(mbps)),
                    format_size_label(bytes).dimmed()
                ));
            }
            ProgressEvent::UploadModeChanged(UploadMode::Fallback) => {
                self.print(format!(
                    "{}\n",
                    "Streaming upload failed, using fixed-size requests".yellow()
                ));
            }
            ProgressEvent::UploadModeChanged(UploadMode::Streaming) => {}
        }
    }
}

fn transfer_line(label: &str, summary: Option<&TransferSummary>) -> String {
    let value = match summary {
        Some(summary) => {
            let mut value = format_speed(summary.mbps)
                .color(speed_color(summary.mbps))
                .to_string();
            if summary.mode == Some(UploadMode::Fallback) {
                value.push_str(&format!(" {}", "(fixed-size requests)".dimmed()));
            }
            value
        }
        None => "-".dimmed().to_string(),
    };

    format!("{} {}", label.bold().white(), value)
}

/// Human-readable summary of a run.
pub fn render_text(result: &MeasurementResult) -> String {
    let latency = match (result.latency_ms, result.jitter_ms) {
        (Some(latency), Some(jitter)) => {
            format!("{}, jitter {}", format_latency(latency), format_latency(jitter))
        }
        _ => "-".to_string(),
    };

    let server = match &result.server {
        Some(server) => format!(
            "{} {}",
            server.label().bright_blue(),
            format!("({})", server.base_url).bright_blue()
        ),
        None => "-".dimmed().to_string(),
    };

    let mut lines = vec![
        format!("{} {}", "Server:".bold().white(), server),
        format!("{} {}", "Latency:".bold().white(), latency),
        transfer_line("Download:", result.download.as_ref()),
        transfer_line("Upload:", result.upload.as_ref()),
    ];

    if result.status == TestPhase::Stopped {
        lines.push("Run stopped before completion.".yellow().to_string());
    }

    lines.join("\n")
}

/// Print the result to stdout in the form `mode` asks for.
pub fn print_results(
    result: &MeasurementResult,
    mode: DisplayMode,
) -> Result<(), SpeedTestError> {
    match mode {
        DisplayMode::Json => println!("{}", serde_json::to_string_pretty(result)?),
        DisplayMode::Live | DisplayMode::Plain => println!("{}", render_text(result)),
    }

    Ok(())
}
