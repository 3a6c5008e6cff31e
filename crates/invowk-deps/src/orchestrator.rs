//! Two-phase dependency validation orchestration (§4.4): Phase 1 runs
//! every kind against the host, always. Phase 2 additionally runs
//! when the selected runtime is `container` and the implementation's
//! `ContainerConfig` carries its own `depends_on` — evaluated inside a
//! throwaway invocation of that same container image, since a tool,
//! filepath, or env var living in the image is what Phase 2 is meant
//! to confirm, not the host. Capabilities always stay host-only: a
//! LAN-reachable or admin check describes the machine invowk runs on,
//! not the image.

use std::collections::HashSet;

use invowk_core::{DependencyFailure, DependsOn, InvowkError, Result};
use invowk_core::utils::CapturedEnv;
use invowk_discovery::CommandSet;

use crate::capabilities::check_capabilities_entry;
use crate::commands::{check_commands_entry, check_commands_entry_in_container};
use crate::custom_checks::check_custom_check_entry;
use crate::env_vars::{check_env_vars_entry, check_env_vars_entry_in_container};
use crate::filepaths::{check_filepaths_entry, check_filepaths_entry_in_container};
use crate::shell_target::{ContainerTarget, ShellTarget};
use crate::tools::{check_tools_entry, check_tools_entry_in_container};

/// Where Phase 2 reaches for its container image and engine: the
/// implementation's own `container_depends_on`, plus enough to resolve
/// a `ContainerTarget` (mirrors `ContainerRuntime::discover`'s engine
/// fallback).
pub struct ContainerPhase {
    pub depends_on: DependsOn,
    pub image: String,
    pub engine_hint: Option<String>,
}

/// Runs every kind in `depends_on` against the host, accumulating
/// failures across every entry (no short-circuiting between entries;
/// each entry's own alternatives short-circuit on first success).
///
/// Capabilities entries are the one exception: an alternatives set
/// structurally equal to one already checked earlier in this same
/// pass is skipped silently rather than probed again. Whether this is
/// intentional de-duplication or an accidental no-op when a user
/// repeats a check is unclear upstream; this preserves the observed
/// behavior rather than guessing at intent.
pub fn validate_phase(
    depends_on: &DependsOn,
    env: &CapturedEnv,
    command_set: &CommandSet,
    mut execute_command: impl FnMut(&str) -> Result<bool>,
) -> Result<DependencyFailure> {
    let mut failure = DependencyFailure::default();

    for entry in &depends_on.tools {
        check_tools_entry(entry, &mut failure.missing_tools)?;
    }
    for entry in &depends_on.filepaths {
        check_filepaths_entry(entry, &mut failure.missing_filepaths)?;
    }
    for entry in &depends_on.env_vars {
        check_env_vars_entry(entry, env, &mut failure.missing_env_vars)?;
    }
    let mut seen_capability_sets: HashSet<Vec<String>> = HashSet::new();
    for entry in &depends_on.capabilities {
        if !seen_capability_sets.insert(entry.alternatives.clone()) {
            continue;
        }
        check_capabilities_entry(entry, &mut failure.missing_capabilities)?;
    }
    for entry in &depends_on.custom_checks {
        check_custom_check_entry(entry, &ShellTarget::Host, &mut failure.failed_custom_checks)?;
    }
    for entry in &depends_on.commands {
        check_commands_entry(entry, command_set, &mut execute_command, &mut failure.missing_commands)?;
    }

    Ok(failure)
}

/// Runs the same six kinds as [`validate_phase`], except tools,
/// filepaths, env vars, custom checks, and commands are checked inside
/// a throwaway invocation of `target`'s image rather than on the host.
/// Capabilities are probed on the host, with their own duplicate-set
/// dedup scoped to this phase.
pub fn validate_phase_container(
    depends_on: &DependsOn,
    target: &ContainerTarget,
) -> Result<DependencyFailure> {
    let mut failure = DependencyFailure::default();

    for entry in &depends_on.tools {
        check_tools_entry_in_container(entry, target, &mut failure.missing_tools)?;
    }
    for entry in &depends_on.filepaths {
        check_filepaths_entry_in_container(entry, target, &mut failure.missing_filepaths)?;
    }
    for entry in &depends_on.env_vars {
        check_env_vars_entry_in_container(entry, target, &mut failure.missing_env_vars)?;
    }
    let mut seen_capability_sets: HashSet<Vec<String>> = HashSet::new();
    for entry in &depends_on.capabilities {
        if !seen_capability_sets.insert(entry.alternatives.clone()) {
            continue;
        }
        check_capabilities_entry(entry, &mut failure.missing_capabilities)?;
    }
    for entry in &depends_on.custom_checks {
        check_custom_check_entry(
            entry,
            &ShellTarget::Container(target),
            &mut failure.failed_custom_checks,
        )?;
    }
    for entry in &depends_on.commands {
        check_commands_entry_in_container(entry, target, &mut failure.missing_commands)?;
    }

    Ok(failure)
}

/// Runs Phase 1 (always) and, when `container_phase` is present,
/// Phase 2 against a throwaway invocation of its image — merging both
/// failure sets into one report. Returns `Err(DependencyUnsatisfied)`
/// if either phase found anything.
pub fn validate(
    host_depends_on: &DependsOn,
    container_phase: Option<ContainerPhase>,
    env: &CapturedEnv,
    command_set: &CommandSet,
    mut execute_command: impl FnMut(&str) -> Result<bool>,
) -> Result<()> {
    let mut failure = validate_phase(host_depends_on, env, command_set, &mut execute_command)?;

    if let Some(phase) = container_phase {
        let target = ContainerTarget::discover(phase.engine_hint.as_deref(), phase.image)?;
        let phase2 = validate_phase_container(&phase.depends_on, &target)?;
        failure.merge(phase2);
    }

    if failure.is_empty() {
        Ok(())
    } else {
        Err(InvowkError::DependencyUnsatisfied(Box::new(failure)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invowk_core::depends_on::{CapabilitiesEntry, ToolsEntry};
    use std::collections::HashMap;

    fn empty_command_set() -> CommandSet {
        CommandSet::builder().build()
    }

    #[test]
    fn empty_depends_on_is_trivially_satisfied() {
        let env = CapturedEnv::from_map(HashMap::new());
        let set = empty_command_set();
        let result = validate(&DependsOn::default(), None, &env, &set, |_| Ok(true));
        assert!(result.is_ok());
    }

    #[test]
    fn missing_tool_surfaces_as_dependency_unsatisfied() {
        let depends_on = DependsOn {
            tools: vec![ToolsEntry {
                alternatives: vec!["definitely-not-a-real-tool-xyz".into()],
            }],
            ..Default::default()
        };
        let env = CapturedEnv::from_map(HashMap::new());
        let set = empty_command_set();
        let err = validate(&depends_on, None, &env, &set, |_| Ok(true)).unwrap_err();
        assert!(matches!(err, InvowkError::DependencyUnsatisfied(_)));
    }

    #[test]
    fn duplicate_capability_sets_are_probed_once() {
        let depends_on = DependsOn {
            capabilities: vec![
                CapabilitiesEntry {
                    alternatives: vec!["not-a-real-probe".into()],
                },
                CapabilitiesEntry {
                    alternatives: vec!["not-a-real-probe".into()],
                },
            ],
            ..Default::default()
        };
        let env = CapturedEnv::from_map(HashMap::new());
        let set = empty_command_set();
        let err = validate(&depends_on, None, &env, &set, |_| Ok(true)).unwrap_err();
        match err {
            InvowkError::DependencyUnsatisfied(failure) => {
                assert_eq!(failure.missing_capabilities.len(), 1);
            }
            _ => panic!("expected DependencyUnsatisfied"),
        }
    }

    #[test]
    fn container_phase_with_unresolvable_engine_surfaces_engine_not_found() {
        let host = DependsOn::default();
        let phase = ContainerPhase {
            depends_on: DependsOn::default(),
            image: "alpine".into(),
            engine_hint: Some("definitely-not-a-real-engine-xyz".into()),
        };
        let env = CapturedEnv::from_map(HashMap::new());
        let set = empty_command_set();
        let err = validate(&host, Some(phase), &env, &set, |_| Ok(true)).unwrap_err();
        assert!(matches!(err, InvowkError::ContainerEngineNotFound { .. }));
    }
}
