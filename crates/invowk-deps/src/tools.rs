//! Tool-presence validation: each `ToolsEntry`'s `alternatives` are
//! OR'd together — the entry is satisfied the moment any alternative
//! resolves on `PATH` (§4.4).

use invowk_core::depends_on::ToolsEntry;
use invowk_core::utils::{cmd_exists, is_safe_for_interpolation};
use invowk_core::{InvowkError, Result};

use crate::shell_target::ContainerTarget;

/// Returns `Ok(())` if satisfied, `Ok` with the unmet entry recorded
/// into `missing` otherwise. Bails out with `UnsafeInterpolation` if
/// any alternative name cannot be safely spliced into a shell-facing
/// check.
pub fn check_tools_entry(entry: &ToolsEntry, missing: &mut Vec<String>) -> Result<()> {
    if entry.alternatives.is_empty() {
        return Ok(());
    }
    for name in &entry.alternatives {
        if !is_safe_for_interpolation(name) {
            return Err(InvowkError::UnsafeInterpolation { value: name.clone() });
        }
    }
    if entry.alternatives.iter().any(|name| cmd_exists(name)) {
        return Ok(());
    }
    missing.push(entry.alternatives.join(" OR "));
    Ok(())
}

/// Phase 2 (§4.4): `command -v NAME || which NAME` inside a throwaway
/// container invocation, since PATH inside the image is what matters,
/// not the host's.
pub fn check_tools_entry_in_container(
    entry: &ToolsEntry,
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
        let outcome = target.run(&format!("command -v {name} || which {name}"))?;
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

    #[test]
    fn satisfied_when_any_alternative_exists() {
        let entry = ToolsEntry {
            alternatives: vec!["definitely-not-a-real-tool-xyz".into(), "sh".into()],
        };
        let mut missing = Vec::new();
        check_tools_entry(&entry, &mut missing).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn missing_when_no_alternative_exists() {
        let entry = ToolsEntry {
            alternatives: vec!["definitely-not-a-real-tool-xyz".into()],
        };
        let mut missing = Vec::new();
        check_tools_entry(&entry, &mut missing).unwrap();
        assert_eq!(missing, vec!["definitely-not-a-real-tool-xyz".to_string()]);
    }

    #[test]
    fn unsafe_name_is_rejected() {
        let entry = ToolsEntry {
            alternatives: vec!["git; rm -rf /".into()],
        };
        let mut missing = Vec::new();
        let err = check_tools_entry(&entry, &mut missing).unwrap_err();
        assert!(matches!(err, InvowkError::UnsafeInterpolation { .. }));
    }
}
