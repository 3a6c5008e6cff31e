//! Custom-check validation (§4.4): each alternative runs a script and
//! is satisfied if its exit code and/or stdout match the declared
//! expectations. Phase 1 runs it via the host shell; Phase 2 runs the
//! same script inside the selected container image — only where it
//! runs differs, so both go through `ShellTarget`.

use regex::Regex;

use invowk_core::depends_on::{CustomCheckAlternative, CustomCheckEntry};
use invowk_core::{InvowkError, Result};

use crate::shell_target::ShellTarget;

fn alternative_satisfied(alt: &CustomCheckAlternative, target: &ShellTarget) -> Result<bool> {
    let outcome = target.run(&alt.script)?;

    if let Some(expected) = alt.expected_exit_code {
        if outcome.exit_code != expected {
            return Ok(false);
        }
    } else if outcome.exit_code != 0 {
        return Ok(false);
    }

    if let Some(pattern) = &alt.expected_output_matches {
        let re = Regex::new(pattern).map_err(|e| InvowkError::InvalidValue {
            name: "custom_checks.expected_output_matches".to_string(),
            value: format!("{pattern}: {e}"),
        })?;
        if !re.is_match(&outcome.stdout) {
            return Ok(false);
        }
    }

    Ok(true)
}

pub fn check_custom_check_entry(
    entry: &CustomCheckEntry,
    target: &ShellTarget,
    failed: &mut Vec<String>,
) -> Result<()> {
    if entry.alternatives.is_empty() {
        return Ok(());
    }
    for alt in &entry.alternatives {
        if alternative_satisfied(alt, target)? {
            return Ok(());
        }
    }
    failed.push(
        entry
            .alternatives
            .iter()
            .map(|a| a.script.clone())
            .collect::<Vec<_>>()
            .join(" OR "),
    );
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exit_code_zero_satisfies_default_expectation() {
        let entry = CustomCheckEntry {
            alternatives: vec![CustomCheckAlternative {
                script: "true".into(),
                expected_exit_code: None,
                expected_output_matches: None,
            }],
        };
        let mut failed = Vec::new();
        check_custom_check_entry(&entry, &ShellTarget::Host, &mut failed).unwrap();
        assert!(failed.is_empty());
    }

    #[test]
    fn nonzero_exit_without_override_is_failed() {
        let entry = CustomCheckEntry {
            alternatives: vec![CustomCheckAlternative {
                script: "false".into(),
                expected_exit_code: None,
                expected_output_matches: None,
            }],
        };
        let mut failed = Vec::new();
        check_custom_check_entry(&entry, &ShellTarget::Host, &mut failed).unwrap();
        assert_eq!(failed.len(), 1);
    }

    #[test]
    fn stdout_pattern_must_match() {
        let entry = CustomCheckEntry {
            alternatives: vec![CustomCheckAlternative {
                script: "echo hello".into(),
                expected_exit_code: None,
                expected_output_matches: Some("^world".into()),
            }],
        };
        let mut failed = Vec::new();
        check_custom_check_entry(&entry, &ShellTarget::Host, &mut failed).unwrap();
        assert_eq!(failed.len(), 1);
    }
}
