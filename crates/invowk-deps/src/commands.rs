//! "Commands" dependency kind (§4.4): an alternative is satisfied once
//! it resolves to a discoverable command; when `execute` is set, it
//! must additionally run successfully. Running a command is an
//! execution-layer concern, so the caller supplies the executor.

use invowk_core::depends_on::CommandsEntry;
use invowk_core::utils::is_safe_for_interpolation;
use invowk_core::{InvowkError, Result};
use invowk_discovery::CommandSet;

use crate::shell_target::ContainerTarget;

pub fn check_commands_entry(
    entry: &CommandsEntry,
    command_set: &CommandSet,
    mut execute: impl FnMut(&str) -> Result<bool>,
    missing: &mut Vec<String>,
) -> Result<()> {
    if entry.alternatives.is_empty() {
        return Ok(());
    }

    for name in &entry.alternatives {
        let discoverable =
            command_set.lookup_qualified(name).is_some() || !command_set.by_simple_name(name).is_empty();
        if !discoverable {
            continue;
        }
        if !entry.execute {
            return Ok(());
        }
        if execute(name)? {
            return Ok(());
        }
    }

    missing.push(entry.alternatives.join(" OR "));
    Ok(())
}

/// Phase 2 (§4.4): invokes `invowk internal check-cmd NAME` inside a
/// throwaway container invocation; exit 0 means the container's own
/// `invowk` binary considers it discoverable. `execute: true` is not
/// re-applied here — recursively executing a dependency is a host-
/// side DAG concern, not replicated inside the container.
pub fn check_commands_entry_in_container(
    entry: &CommandsEntry,
    target: &ContainerTarget,
    missing: &mut Vec<String>,
) -> Result<()> {
    if entry.alternatives.is_empty() {
        return Ok(());
    }
    for name in &entry.alternatives {
        if !is_safe_for_interpolation(name) {
            return Err(InvowkError::UnsafeInterpolation { value: name.clone() });
        }
    }
    for name in &entry.alternatives {
        let outcome = target.run(&format!("invowk internal check-cmd {name}"))?;
        if outcome.exit_code == 0 {
            return Ok(());
        }
    }
    missing.push(entry.alternatives.join(" OR "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use invowk_core::runtime::{RuntimeKind, Script};
    use invowk_core::{Command, Implementation, Invowkfile, Platform, SourceId};
    use std::sync::Arc;

    fn command_set_with(name: &str) -> CommandSet {
        let invowkfile = Arc::new(Invowkfile::default());
        let mut builder = CommandSet::builder();
        builder.push(
            SourceId::Workspace,
            "x".into(),
            Arc::new(Command {
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
                args: vec![],
                env: None,
                depends_on: None,
            }),
            invowkfile,
        );
        builder.build()
    }

    #[test]
    fn discoverability_alone_satisfies_when_execute_is_false() {
        let set = command_set_with("build");
        let entry = CommandsEntry {
            alternatives: vec!["build".into()],
            execute: false,
        };
        let mut missing = Vec::new();
        check_commands_entry(&entry, &set, |_| Ok(true), &mut missing).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn missing_command_is_recorded() {
        let set = command_set_with("build");
        let entry = CommandsEntry {
            alternatives: vec!["ghost".into()],
            execute: false,
        };
        let mut missing = Vec::new();
        check_commands_entry(&entry, &set, |_| Ok(true), &mut missing).unwrap();
        assert_eq!(missing.len(), 1);
    }

    #[test]
    fn execute_flag_requires_successful_run() {
        let set = command_set_with("build");
        let entry = CommandsEntry {
            alternatives: vec!["build".into()],
            execute: true,
        };
        let mut missing = Vec::new();
        check_commands_entry(&entry, &set, |_| Ok(false), &mut missing).unwrap();
        assert_eq!(missing.len(), 1);
    }
}
