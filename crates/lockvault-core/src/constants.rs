//! Core constants for the lock vault client.
//!
//! Centralises the values shared between the network layer, the session
//! store and the code generation engine so every crate agrees on endpoints,
//! wire formats and the default epoch schedule.
//!
//! # Usage
//!
//! ```
//! use lockvault_core::constants::*;
//!
//! assert_eq!(EPOCH_HOURS, 4);
//! assert!(DEFAULT_BASE_URL.ends_with('/'));
//! ```

// ============================================================================
// Service Endpoint
// ============================================================================

/// Base URL of the vendor REST API.
///
/// Must end with `/` because endpoint paths are appended verbatim.
pub const DEFAULT_BASE_URL: &str = "https://api.masterlockvault.com/";

/// Client identifier sent as `apikey` on unauthenticated account calls.
///
/// Authenticated calls replace it with the account token.
pub const DEFAULT_CLIENT_ID: &str = "androidble";

/// `ServiceResult` value the service returns for an accepted notification request.
pub const SERVICE_RESULT_OK: i64 = 1;

// ============================================================================
// Code Epochs
// ============================================================================

/// Width of one temporary-code epoch in hours.
///
/// The service issues a new temporary code every 4 hours.
pub const EPOCH_HOURS: i64 = 4;

/// Number of epochs generated by a default run.
///
/// Covers roughly ten years of 4-hour slots (10 × 365.25 × 6 ≈ 21,915),
/// rounded down.
///
/// ```
/// use lockvault_core::constants::{DEFAULT_EPOCH_COUNT, EPOCH_HOURS};
///
/// let days = u64::from(DEFAULT_EPOCH_COUNT) * EPOCH_HOURS as u64 / 24;
/// assert_eq!(days, 3650);
/// ```
pub const DEFAULT_EPOCH_COUNT: u32 = 21_900;

// ============================================================================
// Time Formats
// ============================================================================

/// Wire format of the `accessTime` query parameter.
///
/// Naive local time with no offset, e.g. `2024-01-02 04:00:00`.
pub const ACCESS_TIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Alternate input format accepted when parsing user-supplied access times.
pub const ACCESS_TIME_FORMAT_ISO: &str = "%Y-%m-%dT%H:%M:%S";

/// Compact stamp printed next to each generated code, e.g. `2024-01-02_04`.
pub const CODE_STAMP_FORMAT: &str = "%Y-%m-%d_%H";

// ============================================================================
// Local Configuration
// ============================================================================

/// Config file used when none is given on the command line.
pub const DEFAULT_CONFIG_PATH: &str = "config.json";

/// Indentation width of the persisted config file.
pub const CONFIG_INDENT: &[u8] = b"  ";
