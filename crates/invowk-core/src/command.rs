//! `Command` and `Invowkfile` — the in-memory invowkfile model (§3).

use std::collections::HashMap;

use serde::Deserialize;

use crate::depends_on::DependsOn;
use crate::flag::{ArgDef, FlagDef};
use crate::runtime::Implementation;

#[derive(Debug, Clone, Deserialize)]
pub struct Command {
    /// Space-separated tokens form a tree path (e.g. "db migrate").
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub category: Option<String>,
    pub implementations: Vec<Implementation>,
    #[serde(default)]
    pub flags: Vec<FlagDef>,
    #[serde(default)]
    pub args: Vec<ArgDef>,
    #[serde(default)]
    pub env: Option<HashMap<String, String>>,
    #[serde(default)]
    pub depends_on: Option<DependsOn>,
}

impl Command {
    /// The space-separated path for this command's declared name.
    pub fn path_tokens(&self) -> Vec<&str> {
        self.name.split(' ').filter(|t| !t.is_empty()).collect()
    }

    /// True iff `other` is a strict descendant of this command's name
    /// (this command's tokens are a strict prefix of `other`'s).
    pub fn is_strict_prefix_of(&self, other: &Command) -> bool {
        let mine = self.path_tokens();
        let theirs = other.path_tokens();
        theirs.len() > mine.len() && theirs[..mine.len()] == mine[..]
    }
}

/// Optional module metadata; present iff the invowkfile belongs to a
/// module rather than being the workspace root file (§3).
#[derive(Debug, Clone, Deserialize)]
pub struct ModuleMetadata {
    pub module: String,
    pub version: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Invowkfile {
    pub depends_on: Option<DependsOn>,
    pub cmds: Vec<Command>,
    pub metadata: Option<ModuleMetadata>,
}

impl Invowkfile {
    pub fn is_module(&self) -> bool {
        self.metadata.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::runtime::{Implementation, RuntimeKind, Script};
    use crate::platform::Platform;

    fn cmd(name: &str, args: Vec<ArgDef>) -> Command {
        Command {
            name: name.to_string(),
            description: String::new(),
            category: None,
            implementations: vec![Implementation {
                script: Script::Inline("true".into()),
                runtimes: vec![RuntimeKind::Native],
                platforms: vec![Platform::Linux],
                timeout: None,
                env: None,
                depends_on: None,
                container: None,
            }],
            flags: vec![],
            args,
            env: None,
            depends_on: None,
        }
    }

    #[test]
    fn strict_prefix_detection() {
        let parent = cmd("db", vec![]);
        let child = cmd("db migrate", vec![]);
        let unrelated = cmd("build", vec![]);

        assert!(parent.is_strict_prefix_of(&child));
        assert!(!parent.is_strict_prefix_of(&unrelated));
        assert!(!child.is_strict_prefix_of(&parent));
        assert!(!parent.is_strict_prefix_of(&parent));
    }
}
