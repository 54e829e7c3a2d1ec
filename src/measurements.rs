use std::time::Duration;

/// Shortest elapsed time used as a divisor, so a phase that was stopped
/// immediately does not report an absurd rate.
const MIN_ELAPSED: Duration = Duration::from_millis(1);

/// Throughput in megabits per second for `bytes` moved in `elapsed`.
pub fn calculate_speed_mbps(bytes: u64, elapsed: Duration) -> f64 {
    let seconds = elapsed.max(MIN_ELAPSED).as_secs_f64();

    (bytes as f64 * 8.0) / (seconds * 1_000_000.0)
}
