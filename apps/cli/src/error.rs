use std::io;

use thiserror::Error;
use usermgmt_core::AppError;

/// Failure that ends the console session.
#[derive(Debug, Error)]
pub enum CliError {
    /// Startup or action error raised by the application layers.
    #[error(transparent)]
    App(#[from] AppError),
    /// The console could not be read or written.
    #[error("console i/o failed: {0}")]
    Io(#[from] io::Error),
}

/// Result alias for console operations.
pub type CliResult<T> = Result<T, CliError>;
