//! Parses a single invowkfile (or module manifest) from disk.

use std::path::Path;

use invowk_core::{InvowkError, Invowkfile, ModuleMetadata, Result};

use crate::cuelite;

pub fn load_invowkfile(path: &Path) -> Result<Invowkfile> {
    let content = std::fs::read_to_string(path).map_err(|e| InvowkError::DiscoveryIo {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value = cuelite::parse(&content).map_err(|e| InvowkError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    serde_json::from_value(value).map_err(|e| InvowkError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })
}

pub fn load_module_manifest(path: &Path) -> Result<ModuleMetadata> {
    let content = std::fs::read_to_string(path).map_err(|e| InvowkError::DiscoveryIo {
        path: path.to_path_buf(),
        source: e,
    })?;
    let value = cuelite::parse(&content).map_err(|e| InvowkError::ParseError {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    let metadata: ModuleMetadata =
        serde_json::from_value(value).map_err(|e| InvowkError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
    if metadata.module.trim().is_empty() {
        return Err(InvowkError::ParseError {
            path: path.to_path_buf(),
            message: "module manifest must declare a non-empty 'module' id".to_string(),
        });
    }
    Ok(metadata)
}
