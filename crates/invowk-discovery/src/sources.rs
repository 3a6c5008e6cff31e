//! Enumerates the search-path sources a discovery run should load,
//! in the fixed order from §4.1: workspace, then user modules
//! (alphabetical), then configured search paths.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

pub const WORKSPACE_FILE: &str = "invowkfile.cue";
pub const MODULE_MANIFEST: &str = "invowkmod.cue";
pub const MODULE_SUFFIX: &str = ".invowkmod";

#[derive(Debug, Clone, Default)]
pub struct DiscoveryConfig {
    /// The current working directory, where `invowkfile.cue` is looked
    /// up directly.
    pub workspace_dir: PathBuf,
    /// `~/.invowk/cmds` by default (or a configured override).
    pub user_modules_dir: Option<PathBuf>,
    /// Additional module-containing directories from config.
    pub extra_search_paths: Vec<PathBuf>,
    /// Absolute module directory -> alias, from config (§4.1 "Source
    /// aliases").
    pub module_aliases: HashMap<PathBuf, String>,
}

impl DiscoveryConfig {
    pub fn for_cwd(workspace_dir: PathBuf) -> Self {
        Self {
            workspace_dir,
            user_modules_dir: dirs::home_dir().map(|home| home.join(".invowk/cmds")),
            extra_search_paths: Vec::new(),
            module_aliases: HashMap::new(),
        }
    }
}

/// A directory on disk that is a candidate module (ends in
/// `.invowkmod`, manifest presence is checked at load time).
#[derive(Debug, Clone)]
pub struct ModuleDir {
    pub path: PathBuf,
}

/// Lists module directories under `root`, sorted by directory name so
/// callers get deterministic (if provisional — final ordering uses the
/// resolved module id) iteration order.
pub fn list_module_dirs(root: &Path) -> std::io::Result<Vec<ModuleDir>> {
    if !root.exists() {
        return Ok(Vec::new());
    }
    let mut dirs = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        let path = entry.path();
        if !path.is_dir() {
            continue;
        }
        let name = path.file_name().and_then(|n| n.to_str()).unwrap_or("");
        if name.ends_with(MODULE_SUFFIX) {
            dirs.push(ModuleDir { path });
        }
    }
    dirs.sort_by(|a, b| a.path.cmp(&b.path));
    Ok(dirs)
}
