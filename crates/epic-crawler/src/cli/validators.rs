//! CLI input validation functions.
//!
//! These validators are used by clap's `value_parser` attribute to validate
//! user input at parse time, providing immediate feedback for invalid values.

use crate::config::{self, MAX_CONCURRENCY};

/// Validate an epic key.
///
/// Delegates to [`config::validate_epic_key`] so flags and config files
/// follow the same rules.
///
/// Examples: `EPIC-1`, `PLAT_2-418`
pub fn validate_epic_key(s: &str) -> Result<String, String> {
    let trimmed = s.trim();
    config::validate_epic_key(trimmed).map_err(|e| e.to_string())?;
    Ok(trimmed.to_string())
}

/// Validate a tracker server URL.
///
/// Delegates to [`config::validate_server_url`]; a trailing slash is
/// removed.
pub fn validate_server_url(s: &str) -> Result<String, String> {
    config::validate_server_url(s.trim()).map_err(|e| e.to_string())
}

/// Validate the number of blocker queries in flight.
pub fn validate_concurrency(s: &str) -> Result<usize, String> {
    let value: usize = s
        .trim()
        .parse()
        .map_err(|_| format!("Concurrency must be a number, got '{s}'"))?;

    if value == 0 || value > MAX_CONCURRENCY {
        return Err(format!(
            "Concurrency must be between 1 and {MAX_CONCURRENCY}"
        ));
    }
    Ok(value)
}
