//! `~/.invowk/config.toml` (or `INVOWK_CONFIG`) loader (§4.8), mirroring
//! the teacher's `Config::load`: missing file falls back to defaults,
//! a malformed file is a typed parse error.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use invowk_core::{InvowkError, Result, RuntimeKind};
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct Config {
    pub default_runtime: Option<String>,
    pub module_aliases: HashMap<PathBuf, String>,
    pub virtual_shell: VirtualShellConfig,
    pub container_engine: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default, rename_all = "PascalCase")]
pub struct VirtualShellConfig {
    pub enable_uroot_utils: bool,
}

impl Config {
    /// Loads from `INVOWK_CONFIG` if set, else `~/.invowk/config.toml`.
    /// A missing file yields `Config::default()`; a present-but-invalid
    /// file is a hard error.
    pub fn load() -> Result<Self> {
        let path = config_path();
        Self::load_from(&path)
    }

    fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }
        let content = std::fs::read_to_string(path).map_err(|e| InvowkError::DiscoveryIo {
            path: path.to_path_buf(),
            source: e,
        })?;
        toml::from_str(&content).map_err(|e| InvowkError::ParseError {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
    }

    pub fn default_runtime(&self) -> Option<RuntimeKind> {
        self.default_runtime
            .as_deref()
            .and_then(|s| s.parse::<RuntimeKind>().ok())
    }
}

fn config_path() -> PathBuf {
    if let Ok(path) = std::env::var("INVOWK_CONFIG") {
        return PathBuf::from(path);
    }
    dirs::home_dir()
        .unwrap_or_default()
        .join(".invowk")
        .join("config.toml")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_file_yields_default() {
        let config = Config::load_from(Path::new("/nonexistent/invowk-config.toml")).unwrap();
        assert!(config.default_runtime.is_none());
        assert!(!config.virtual_shell.enable_uroot_utils);
    }

    #[test]
    fn parses_known_keys() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
            DefaultRuntime = "virtual"
            ContainerEngine = "podman"

            [VirtualShell]
            EnableUrootUtils = true
            "#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.default_runtime(), Some(RuntimeKind::Virtual));
        assert_eq!(config.container_engine.as_deref(), Some("podman"));
        assert!(config.virtual_shell.enable_uroot_utils);
    }

    #[test]
    fn malformed_file_is_a_parse_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "this is not valid toml =").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, InvowkError::ParseError { .. }));
    }
}
