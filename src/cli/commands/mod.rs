//! CLI command implementations
//!
//! Every handler returns the process exit code: 0 on success, 2 for
//! configuration errors, 4 for connection errors and 5 for anything fatal.

pub mod demo;
pub mod init;
pub mod query;
pub mod validate;

use crate::domain::{ErrorKind, HearthError};

/// Successful run
pub const EXIT_SUCCESS: i32 = 0;
/// Configuration error
pub const EXIT_CONFIG: i32 = 2;
/// The store could not be reached
pub const EXIT_CONNECTION: i32 = 4;
/// Any other failure
pub const EXIT_FATAL: i32 = 5;

/// Exit code for a failed operation
pub fn exit_code_for(err: &HearthError) -> i32 {
    match err.kind() {
        ErrorKind::Configuration => EXIT_CONFIG,
        ErrorKind::Transient => EXIT_CONNECTION,
        _ => EXIT_FATAL,
    }
}
