//! CLI output: error mapping from domain errors to stable CLI surface.

use crate::error::ApiError;

/// Exit code for a run that completed but left some files unprocessed
pub const EXIT_PARTIAL_FAILURE: i32 = 2;

/// Exit code for a fatal error
pub const EXIT_FATAL: i32 = 1;

/// Map domain/service errors to a string for CLI output: `error[<kind>]: <message>`.
pub fn map_error(e: &ApiError) -> String {
    format!("error[{}]: {}", e.kind(), e)
}
