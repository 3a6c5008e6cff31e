//! Extracts the reserved `--ivk-*` flags (§6) from the token list
//! remaining after subcommand dispatch, leaving behind whatever the
//! command-path resolver and declared-flag parser should see.

use std::path::PathBuf;

use invowk_core::{InvowkError, Result, RuntimeKind};
use invowk_runtime::EnvInheritMode;

#[derive(Debug, Default)]
pub struct ReservedFlags {
    pub runtime: Option<RuntimeKind>,
    pub env_files: Vec<PathBuf>,
    pub env_vars: Vec<(String, String)>,
    pub env_inherit_mode: Option<EnvInheritMode>,
    pub env_inherit_allow: Vec<String>,
    pub env_inherit_deny: Vec<String>,
    pub workdir: Option<PathBuf>,
    pub force_rebuild: bool,
    pub dry_run: bool,
}

/// Splits `tokens` into `(reserved, rest)`. `--ivk-from` and a leading
/// `@src` token are left untouched — `invowk_discovery::parse_source_filter`
/// owns those, since it already tracks the Open Question precedence
/// between the two forms.
pub fn extract(tokens: &[&str]) -> Result<(ReservedFlags, Vec<String>)> {
    let mut reserved = ReservedFlags::default();
    let mut rest = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        match token {
            "--ivk-runtime" => {
                let value = next_value(tokens, &mut i, token)?;
                reserved.runtime = Some(
                    value
                        .parse()
                        .map_err(|_| InvowkError::InvalidValue { name: "ivk-runtime".into(), value: value.to_string() })?,
                );
            }
            "--ivk-env-file" => {
                let value = next_value(tokens, &mut i, token)?;
                reserved.env_files.push(PathBuf::from(value));
            }
            "--ivk-env-var" => {
                let value = next_value(tokens, &mut i, token)?;
                let (key, val) = value.split_once('=').ok_or_else(|| InvowkError::InvalidValue {
                    name: "ivk-env-var".into(),
                    value: value.to_string(),
                })?;
                reserved.env_vars.push((key.to_string(), val.to_string()));
            }
            "--ivk-env-inherit-mode" => {
                let value = next_value(tokens, &mut i, token)?;
                reserved.env_inherit_mode = Some(match value {
                    "none" => EnvInheritMode::None,
                    "allow" => EnvInheritMode::Allow,
                    "all" => EnvInheritMode::All,
                    other => {
                        return Err(InvowkError::InvalidValue {
                            name: "ivk-env-inherit-mode".into(),
                            value: other.to_string(),
                        })
                    }
                });
            }
            "--ivk-env-inherit-allow" => {
                let value = next_value(tokens, &mut i, token)?;
                reserved.env_inherit_allow.push(value.to_string());
            }
            "--ivk-env-inherit-deny" => {
                let value = next_value(tokens, &mut i, token)?;
                reserved.env_inherit_deny.push(value.to_string());
            }
            "--ivk-workdir" => {
                let value = next_value(tokens, &mut i, token)?;
                reserved.workdir = Some(PathBuf::from(value));
            }
            "--ivk-force-rebuild" => {
                reserved.force_rebuild = true;
                i += 1;
            }
            "--ivk-dry-run" => {
                reserved.dry_run = true;
                i += 1;
            }
            other => {
                rest.push(other.to_string());
                i += 1;
            }
        }
    }

    Ok((reserved, rest))
}

fn next_value<'a>(tokens: &[&'a str], i: &mut usize, flag: &str) -> Result<&'a str> {
    let value = tokens.get(*i + 1).copied().ok_or_else(|| InvowkError::MissingRequired {
        name: flag.trim_start_matches("--").to_string(),
    })?;
    *i += 2;
    Ok(value)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extracts_env_var_override() {
        let tokens = ["--ivk-env-var", "FOO=bar", "build"];
        let (reserved, rest) = extract(&tokens).unwrap();
        assert_eq!(reserved.env_vars, vec![("FOO".to_string(), "bar".to_string())]);
        assert_eq!(rest, vec!["build".to_string()]);
    }

    #[test]
    fn extracts_runtime_override() {
        let tokens = ["build", "--ivk-runtime", "virtual"];
        let (reserved, rest) = extract(&tokens).unwrap();
        assert_eq!(reserved.runtime, Some(RuntimeKind::Virtual));
        assert_eq!(rest, vec!["build".to_string()]);
    }

    #[test]
    fn leaves_ivk_from_and_at_token_untouched() {
        let tokens = ["@mymod", "--ivk-from=invowkfile", "deploy"];
        let (_, rest) = extract(&tokens).unwrap();
        assert_eq!(rest, vec!["@mymod".to_string(), "--ivk-from=invowkfile".to_string(), "deploy".to_string()]);
    }

    #[test]
    fn malformed_env_var_is_rejected() {
        let tokens = ["--ivk-env-var", "nope"];
        let err = extract(&tokens).unwrap_err();
        assert!(matches!(err, InvowkError::InvalidValue { .. }));
    }

    #[test]
    fn dry_run_and_force_rebuild_are_plain_switches() {
        let tokens = ["--ivk-dry-run", "--ivk-force-rebuild", "build"];
        let (reserved, rest) = extract(&tokens).unwrap();
        assert!(reserved.dry_run);
        assert!(reserved.force_rebuild);
        assert_eq!(rest, vec!["build".to_string()]);
    }
}
