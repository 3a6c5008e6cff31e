//! The six-kind `depends_on` record and its merge semantics (§3, §4.4).

use serde::Deserialize;

/// One alternatives-list entry. OR semantics within `alternatives`; an
/// empty list means the entry is a no-op.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ToolsEntry {
    #[serde(default)]
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct FilepathsEntry {
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub readable: bool,
    #[serde(default)]
    pub writable: bool,
    #[serde(default)]
    pub executable: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct EnvVarsEntry {
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub matches: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CapabilitiesEntry {
    #[serde(default)]
    pub alternatives: Vec<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomCheckEntry {
    #[serde(default)]
    pub alternatives: Vec<CustomCheckAlternative>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CustomCheckAlternative {
    pub script: String,
    #[serde(default)]
    pub expected_exit_code: Option<i32>,
    #[serde(default)]
    pub expected_output_matches: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct CommandsEntry {
    #[serde(default)]
    pub alternatives: Vec<String>,
    #[serde(default)]
    pub execute: bool,
}

/// The merged dependency record for one invocation: root + command +
/// implementation, concatenated in that order (§3 "Lifecycle").
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct DependsOn {
    #[serde(default)]
    pub tools: Vec<ToolsEntry>,
    #[serde(default)]
    pub filepaths: Vec<FilepathsEntry>,
    #[serde(default)]
    pub env_vars: Vec<EnvVarsEntry>,
    #[serde(default)]
    pub capabilities: Vec<CapabilitiesEntry>,
    #[serde(default)]
    pub custom_checks: Vec<CustomCheckEntry>,
    #[serde(default)]
    pub commands: Vec<CommandsEntry>,
}

impl DependsOn {
    /// Merge `root`, `command`, and `impl_` depends_on in that order.
    /// Concatenates alternatives-lists; no deduplication (duplicates
    /// are tolerated per §3, except capabilities which the host
    /// validator silently skips when structurally identical — §9 Open
    /// Question, preserved as observed behaviour, not reinterpreted
    /// here since that happens at validation time, not merge time).
    pub fn merge(root: &DependsOn, command: &DependsOn, impl_: &DependsOn) -> DependsOn {
        let mut merged = DependsOn::default();
        for part in [root, command, impl_] {
            merged.tools.extend(part.tools.iter().cloned());
            merged.filepaths.extend(part.filepaths.iter().cloned());
            merged.env_vars.extend(part.env_vars.iter().cloned());
            merged
                .capabilities
                .extend(part.capabilities.iter().cloned());
            merged
                .custom_checks
                .extend(part.custom_checks.iter().cloned());
            merged.commands.extend(part.commands.iter().cloned());
        }
        merged
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
            && self.filepaths.is_empty()
            && self.env_vars.is_empty()
            && self.capabilities.is_empty()
            && self.custom_checks.is_empty()
            && self.commands.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_preserves_order_and_is_associative() {
        let root = DependsOn {
            tools: vec![ToolsEntry {
                alternatives: vec!["git".into()],
            }],
            ..Default::default()
        };
        let command = DependsOn {
            tools: vec![ToolsEntry {
                alternatives: vec!["make".into()],
            }],
            ..Default::default()
        };
        let impl_ = DependsOn {
            tools: vec![ToolsEntry {
                alternatives: vec!["cc".into()],
            }],
            ..Default::default()
        };

        let merged = DependsOn::merge(&root, &command, &impl_);
        let names: Vec<&str> = merged
            .tools
            .iter()
            .flat_map(|e| e.alternatives.iter())
            .map(|s| s.as_str())
            .collect();
        assert_eq!(names, vec!["git", "make", "cc"]);

        // Associative: merging (root, command) then folding impl_ in
        // yields the same order as a single three-way merge.
        let partial = DependsOn::merge(&root, &command, &DependsOn::default());
        let refolded = DependsOn::merge(&partial, &impl_, &DependsOn::default());
        let refolded_names: Vec<&str> = refolded
            .tools
            .iter()
            .flat_map(|e| e.alternatives.iter())
            .map(|s| s.as_str())
            .collect();
        assert_eq!(refolded_names, names);
    }

    #[test]
    fn empty_entry_is_a_noop() {
        let entry = ToolsEntry::default();
        assert!(entry.alternatives.is_empty());
    }
}
