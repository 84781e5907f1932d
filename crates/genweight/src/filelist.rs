//! Filelist documents.
//!
//! A filelist is a JSON object `{ "filelist": ["<locator>", ...] }`
//! produced by whatever catalog tooling sits upstream. Locators are
//! passed through to the reader untouched.

use anyhow::{bail, Context, Result};
use genweight_engine::FileLocator;
use serde::Deserialize;
use std::fs;
use std::path::Path;

#[derive(Debug, Deserialize)]
struct FilelistDoc {
    filelist: Vec<String>,
}

/// Load a filelist document.
///
/// Missing, empty, or fileless documents are hard errors: a scan over
/// nothing can only end indeterminate, so there is no point starting it.
pub fn load(path: &Path) -> Result<Vec<FileLocator>> {
    let metadata = fs::metadata(path)
        .with_context(|| format!("Filelist {} does not exist", path.display()))?;
    if metadata.len() == 0 {
        bail!("Filelist {} is empty", path.display());
    }

    let raw = fs::read_to_string(path)
        .with_context(|| format!("Failed to read filelist {}", path.display()))?;
    let doc: FilelistDoc = serde_json::from_str(&raw)
        .with_context(|| format!("Filelist {} is not a valid filelist document", path.display()))?;
    if doc.filelist.is_empty() {
        bail!("Filelist {} lists no files", path.display());
    }

    Ok(doc.filelist.into_iter().map(FileLocator::from).collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn loads_locators_in_order() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filelist.json");
        fs::write(
            &path,
            r#"{"filelist": ["/data/a.json", "root://host//store/b.root:Events"]}"#,
        )
        .unwrap();

        let locators = load(&path).unwrap();
        assert_eq!(locators.len(), 2);
        assert_eq!(locators[0].as_str(), "/data/a.json");
        assert_eq!(locators[1].as_str(), "root://host//store/b.root:Events");
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load(&dir.path().join("nope.json")).is_err());
    }

    #[test]
    fn empty_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filelist.json");
        fs::write(&path, "").unwrap();
        assert!(load(&path).is_err());
    }

    #[test]
    fn empty_list_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("filelist.json");
        fs::write(&path, r#"{"filelist": []}"#).unwrap();
        assert!(load(&path).is_err());
    }
}
