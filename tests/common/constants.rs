//! Shared constants for end-to-end tests
//!
//! When the fake upstream setup or sample replies change, update only this file.

// ============================================================================
// Upstream credentials
// ============================================================================

/// API key the test server sends to the fake upstream
pub const TEST_API_KEY: &str = "test-api-key";

/// Model identifier the test server is configured with
pub const TEST_MODEL: &str = "gemini-test";

// ============================================================================
// Sample replies
// ============================================================================

/// A well-formed reply following the prompt template
pub const SAMPLE_REPLY: &str = "Song: \"Pink Moon\"\n\
Artist: Nick Drake\n\
Why: Hushed guitar and gentle melancholy for a grey afternoon.\n\
Vibe tags: mellow, acoustic, rainy, introspective";

pub const SAMPLE_TITLE: &str = "Pink Moon";
pub const SAMPLE_ARTIST: &str = "Nick Drake";
pub const SAMPLE_REASONING: &str = "Hushed guitar and gentle melancholy for a grey afternoon.";

// ============================================================================
// Timing
// ============================================================================

/// Timeout for individual HTTP requests made by the test client
pub const REQUEST_TIMEOUT_SECS: u64 = 10;

/// How long to wait for a spawned server to answer its first request
pub const SERVER_READY_TIMEOUT_MS: u64 = 5000;

/// Interval between readiness polls
pub const SERVER_READY_POLL_INTERVAL_MS: u64 = 10;

/// Backoff used by the test server, kept short so retry tests stay fast
pub const TEST_INITIAL_BACKOFF_MS: u64 = 5;
pub const TEST_MAX_BACKOFF_MS: u64 = 20;

/// Backoff long enough that a shutdown always lands while a retry is waiting
pub const SLOW_INITIAL_BACKOFF_MS: u64 = 5000;

/// Delay before a test triggers shutdown while a request is in flight
pub const SHUTDOWN_DELAY_MS: u64 = 300;
