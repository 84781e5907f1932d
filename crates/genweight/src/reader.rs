//! Local JSON column reader.
//!
//! Stand-in collaborator for the scientific-format readers that live
//! outside this repository: each locator is a path to a JSON object
//! mapping column names to numeric arrays. The engine only ever sees the
//! `ColumnReader` contract, so swapping in a remote reader changes
//! nothing upstream.

use genweight_engine::{ColumnHandle, ColumnReader, FileLocator, ReadError};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub struct JsonColumnReader {
    data_root: Option<PathBuf>,
}

impl JsonColumnReader {
    pub fn new(data_root: Option<PathBuf>) -> Self {
        Self { data_root }
    }

    /// Relative locators resolve against the data root, absolute ones
    /// pass through.
    fn resolve(&self, locator: &FileLocator) -> PathBuf {
        let path = Path::new(locator.as_str());
        match (&self.data_root, path.is_absolute()) {
            (Some(root), false) => root.join(path),
            _ => path.to_path_buf(),
        }
    }
}

struct JsonColumnHandle {
    columns: HashMap<String, Vec<f64>>,
}

impl ColumnHandle for JsonColumnHandle {
    fn read_column(&mut self, name: &str) -> Result<Vec<f64>, ReadError> {
        self.columns
            .get(name)
            .cloned()
            .ok_or_else(|| ReadError::new(format!("column not present: {name}")))
    }
}

impl ColumnReader for JsonColumnReader {
    fn open(
        &self,
        locator: &FileLocator,
        _timeout: Duration,
    ) -> Result<Box<dyn ColumnHandle>, ReadError> {
        // Local filesystem only; the timeout is a remote-reader concern.
        let path = self.resolve(locator);
        let raw = std::fs::read_to_string(&path)?;
        let columns: HashMap<String, Vec<f64>> = serde_json::from_str(&raw)
            .map_err(|err| ReadError::new(format!("{}: {err}", path.display())))?;
        Ok(Box::new(JsonColumnHandle { columns }))
    }
}
