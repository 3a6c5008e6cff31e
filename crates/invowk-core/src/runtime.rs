//! Runtime kinds and per-(runtime, platform) implementations (§3).

use std::path::PathBuf;
use std::time::Duration;

use serde::Deserialize;

use crate::depends_on::DependsOn;
use crate::platform::Platform;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuntimeKind {
    Native,
    Virtual,
    Container,
}

impl RuntimeKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuntimeKind::Native => "native",
            RuntimeKind::Virtual => "virtual",
            RuntimeKind::Container => "container",
        }
    }
}

impl std::fmt::Display for RuntimeKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for RuntimeKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "native" => Ok(RuntimeKind::Native),
            "virtual" => Ok(RuntimeKind::Virtual),
            "container" => Ok(RuntimeKind::Container),
            other => Err(format!("unknown runtime '{other}'")),
        }
    }
}

/// Where the implementation's script text comes from.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum Script {
    Inline(String),
    File { file: PathBuf },
}

/// Per-runtime configuration, only meaningful when that runtime is
/// selected. Container carries an image reference and its own
/// `depends_on` checked in Phase 2 (§4.4).
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ContainerConfig {
    pub image: Option<String>,
    pub depends_on: Option<DependsOn>,
}

/// One (runtime x platform) binding of a command's script (§3).
#[derive(Debug, Clone, Deserialize)]
pub struct Implementation {
    pub script: Script,
    pub runtimes: Vec<RuntimeKind>,
    pub platforms: Vec<Platform>,
    #[serde(default, with = "humantime_secs_opt")]
    pub timeout: Option<Duration>,
    #[serde(default)]
    pub env: Option<std::collections::HashMap<String, String>>,
    #[serde(default)]
    pub depends_on: Option<DependsOn>,
    #[serde(default)]
    pub container: Option<ContainerConfig>,
}

impl Implementation {
    pub fn supports(&self, platform: Platform, runtime: RuntimeKind) -> bool {
        self.platforms.contains(&platform) && self.runtimes.contains(&runtime)
    }
}

/// `timeout` is authored as a plain integer number of seconds in the
/// invowkfile; this module adapts that to `Duration` without pulling
/// in a date/time crate the rest of the core doesn't otherwise need.
mod humantime_secs_opt {
    use serde::{Deserialize, Deserializer};
    use std::time::Duration;

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let secs: Option<u64> = Option::deserialize(deserializer)?;
        Ok(secs.map(Duration::from_secs))
    }
}
