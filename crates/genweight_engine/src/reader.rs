//! Collaborator contract for reading one numeric column from a file.
//!
//! The engine treats file access as an opaque capability: open a locator
//! with a timeout, read a named column as a numeric array. How locators
//! are resolved (local path, catalog lookup, remote-storage redirection)
//! and what the on-disk format is are entirely the collaborator's
//! business.

use crate::types::FileLocator;
use std::time::Duration;
use thiserror::Error;

/// Error from a single open/read attempt.
///
/// Opaque to the engine: attempt errors are logged by the retry loop and
/// absorbed, never propagated past the task boundary.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct ReadError {
    message: String,
}

impl ReadError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl From<std::io::Error> for ReadError {
    fn from(err: std::io::Error) -> Self {
        Self::new(err.to_string())
    }
}

/// Opens data files. Shared read-only across all workers of a scan.
pub trait ColumnReader: Send + Sync {
    /// Open the file behind `locator`, giving up after `timeout`.
    fn open(
        &self,
        locator: &FileLocator,
        timeout: Duration,
    ) -> Result<Box<dyn ColumnHandle>, ReadError>;
}

/// An opened file from which named columns can be read.
pub trait ColumnHandle {
    /// Read the column `name` as a numeric array.
    fn read_column(&mut self, name: &str) -> Result<Vec<f64>, ReadError>;
}
