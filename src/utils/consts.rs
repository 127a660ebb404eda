/// Log level (overridden by RUST_LOG)
pub const LOG_LEVEL: &str = "info";

/// Progress refresh interval (ms)
pub const PROGRESS_UPDATE_INTERVAL_MS: u64 = 50;

// ============================================================================
// MAC Parameters (seconds)
// ============================================================================

// --- NullMacExponentialBackoff ---
/// Total DATA transmissions per packet.
pub const BACKOFF_ATTEMPTS: u32 = 2;
/// Ceiling on any single backoff wait.
pub const MAX_BACKOFF_S: f64 = 0.05;
pub const BACKOFF_JITTER_MIN_S: f64 = 0.01;
pub const BACKOFF_JITTER_MAX_S: f64 = 0.025;

// --- CSMA/CA ---
/// Busy-poll interval bounds, sampled once per packet.
pub const CSMA_WAIT_MIN_S: f64 = 0.01;
pub const CSMA_WAIT_MAX_S: f64 = 0.025;

// --- RTS/CTS ---
/// Reservation retry interval bounds, sampled once per reservation round.
pub const RTS_WAIT_MIN_S: f64 = 0.02;
pub const RTS_WAIT_MAX_S: f64 = 0.05;

// ============================================================================
// Simulation Defaults
// ============================================================================

pub const DEFAULT_STATIONS: usize = 4;
pub const MAX_STATIONS: usize = 256;
pub const DEFAULT_DURATION_S: f64 = 10.0;
/// Longest run accepted by config validation (one day).
pub const MAX_DURATION_S: f64 = 86_400.0;
/// Mean gap between packet arrivals at one station.
pub const DEFAULT_ARRIVAL_INTERVAL_MS: u64 = 100;
/// On-air time of a DATA frame.
pub const DEFAULT_DATA_AIRTIME_MS: u64 = 8;
/// On-air time of RTS, CTS and ACK frames.
pub const DEFAULT_CONTROL_AIRTIME_MS: u64 = 2;
/// How long `receive` waits for an ACK or CTS.
pub const DEFAULT_RESPONSE_TIMEOUT_MS: u64 = 30;
pub const DEFAULT_SEED: u64 = 0x5EED;

/// Longest uninterrupted sleep before re-checking the stop signal (ms).
pub const STOP_POLL_INTERVAL_MS: u64 = 5;
