//! Request-scoped discovery cache (§4.7). Keyed by `(config path,
//! command name)`; populated on first lookup within an invocation and
//! discarded along with whatever context owns it. Not required to be
//! thread-safe — the DAG executor drives one invocation sequentially.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use invowk_core::Result;

use crate::command_set::CommandInfo;

#[derive(Default)]
pub struct RequestCache {
    entries: HashMap<(PathBuf, String), Option<Arc<CommandInfo>>>,
}

impl RequestCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cached lookup for `(config_path, command_name)` if
    /// one exists, else invokes `discover` and caches whatever it
    /// produces (including a cached "not found").
    pub fn get_or_discover(
        &mut self,
        config_path: &Path,
        command_name: &str,
        discover: impl FnOnce() -> Result<Option<Arc<CommandInfo>>>,
    ) -> Result<Option<Arc<CommandInfo>>> {
        let key = (config_path.to_path_buf(), command_name.to_string());
        if let Some(cached) = self.entries.get(&key) {
            return Ok(cached.clone());
        }
        let result = discover()?;
        self.entries.insert(key, result.clone());
        Ok(result)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::Cell;

    #[test]
    fn discover_runs_once_per_key() {
        let mut cache = RequestCache::new();
        let calls = Cell::new(0);
        let config_path = PathBuf::from("/tmp/invowkfile.cue");

        for _ in 0..3 {
            let result = cache
                .get_or_discover(&config_path, "build", || {
                    calls.set(calls.get() + 1);
                    Ok(None)
                })
                .unwrap();
            assert!(result.is_none());
        }

        assert_eq!(calls.get(), 1);
    }

    #[test]
    fn different_commands_are_distinct_keys() {
        let mut cache = RequestCache::new();
        let config_path = PathBuf::from("/tmp/invowkfile.cue");
        cache.get_or_discover(&config_path, "build", || Ok(None)).unwrap();
        cache.get_or_discover(&config_path, "deploy", || Ok(None)).unwrap();
        assert_eq!(cache.len(), 2);
    }
}
