//! Environment-variable validation (§4.4). The host environment is
//! captured once, before invowk injects any `INVOWK_*` variables, so
//! validation never observes its own projections.

use regex::Regex;

use invowk_core::depends_on::EnvVarsEntry;
use invowk_core::utils::{is_safe_for_interpolation, CapturedEnv};
use invowk_core::{InvowkError, Result};

use crate::shell_target::ContainerTarget;

pub fn check_env_vars_entry(
    entry: &EnvVarsEntry,
    env: &CapturedEnv,
    missing: &mut Vec<String>,
) -> Result<()> {
    if entry.alternatives.is_empty() {
        return Ok(());
    }

    let pattern = match &entry.matches {
        Some(raw) => Some(
            Regex::new(raw).map_err(|e| InvowkError::InvalidValue {
                name: "env_vars.matches".to_string(),
                value: format!("{raw}: {e}"),
            })?,
        ),
        None => None,
    };

    let satisfied = entry.alternatives.iter().any(|name| match env.get(name) {
        Some(value) => pattern.as_ref().map(|re| re.is_match(value)).unwrap_or(true),
        None => false,
    });

    if !satisfied {
        missing.push(entry.alternatives.join(" OR "));
    }
    Ok(())
}

/// Phase 2 (§4.4): `printenv NAME` inside a throwaway container
/// invocation — the variable has to be set in the image's
/// environment, not the host's.
pub fn check_env_vars_entry_in_container(
    entry: &EnvVarsEntry,
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

    let pattern = match &entry.matches {
        Some(raw) => Some(
            Regex::new(raw).map_err(|e| InvowkError::InvalidValue {
                name: "env_vars.matches".to_string(),
                value: format!("{raw}: {e}"),
            })?,
        ),
        None => None,
    };

    for name in &entry.alternatives {
        let outcome = target.run(&format!("printenv {name}"))?;
        if outcome.exit_code != 0 {
            continue;
        }
        let matched = pattern
            .as_ref()
            .map(|re| re.is_match(outcome.stdout.trim_end_matches('\n')))
            .unwrap_or(true);
        if matched {
            return Ok(());
        }
    }
    missing.push(entry.alternatives.join(" OR "));
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_with(pairs: &[(&str, &str)]) -> CapturedEnv {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        CapturedEnv::from_map(map)
    }

    #[test]
    fn satisfied_when_var_present_without_pattern() {
        let entry = EnvVarsEntry {
            alternatives: vec!["HOME".into()],
            matches: None,
        };
        let env = env_with(&[("HOME", "/root")]);
        let mut missing = Vec::new();
        check_env_vars_entry(&entry, &env, &mut missing).unwrap();
        assert!(missing.is_empty());
    }

    #[test]
    fn pattern_mismatch_counts_as_missing() {
        let entry = EnvVarsEntry {
            alternatives: vec!["STAGE".into()],
            matches: Some("^prod$".into()),
        };
        let env = env_with(&[("STAGE", "dev")]);
        let mut missing = Vec::new();
        check_env_vars_entry(&entry, &env, &mut missing).unwrap();
        assert_eq!(missing.len(), 1);
    }
}
