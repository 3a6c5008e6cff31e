//! Declared flags and positional args, and their projection into the
//! child process environment (§6, §9 "Dynamic dispatch over flag types").

use serde::Deserialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FlagKind {
    Bool,
    Int,
    Float,
    String,
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum FlagValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    String(String),
}

impl FlagValue {
    /// Stringify with the fixed format rules from §9: `%t`, `%d`, `%g`,
    /// passthrough for strings. No reflection involved.
    pub fn project(&self) -> String {
        match self {
            FlagValue::Bool(b) => b.to_string(),
            FlagValue::Int(i) => i.to_string(),
            FlagValue::Float(f) => format!("{f}"),
            FlagValue::String(s) => s.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct FlagDef {
    pub name: String,
    #[serde(default)]
    pub short: Option<char>,
    pub kind: FlagKind,
    #[serde(default)]
    pub default: Option<FlagValue>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ArgDef {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub required: bool,
}

/// The fixed prefixes flags/args project to, per §4.4 and §6.
pub fn flag_env_name(flag_name: &str) -> String {
    format!("INVOWK_FLAG_{}", shout(flag_name))
}

pub fn named_arg_env_name(arg_name: &str) -> String {
    format!("INVOWK_ARG_{}", shout(arg_name))
}

fn shout(name: &str) -> String {
    name.to_uppercase().replace('-', "_")
}

/// Project positional args into `ARG1..ARGN`, `ARGC`, and named args
/// into `INVOWK_ARG_<NAME>` when the corresponding `ArgDef` carries a
/// name. `defs` and `values` are assumed to be the same length (the
/// caller validates arity before projecting).
pub fn project_args(defs: &[ArgDef], values: &[String]) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for (i, value) in values.iter().enumerate() {
        out.push((format!("ARG{}", i + 1), value.clone()));
        if let Some(def) = defs.get(i) {
            if let Some(name) = &def.name {
                out.push((named_arg_env_name(name), value.clone()));
            }
        }
    }
    out.push(("ARGC".to_string(), values.len().to_string()));
    out
}

pub fn project_flags(defs: &[FlagDef], values: &std::collections::HashMap<String, FlagValue>) -> Vec<(String, String)> {
    let mut out = Vec::new();
    for def in defs {
        let value = values
            .get(&def.name)
            .or(def.default.as_ref());
        if let Some(value) = value {
            out.push((flag_env_name(&def.name), value.project()));
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn flag_names_uppercase_and_underscore_hyphens() {
        assert_eq!(flag_env_name("dry-run"), "INVOWK_FLAG_DRY_RUN");
        assert_eq!(named_arg_env_name("target-dir"), "INVOWK_ARG_TARGET_DIR");
    }

    #[test]
    fn positional_projection_includes_argc() {
        let defs = vec![ArgDef {
            name: Some("target".into()),
            description: String::new(),
            required: true,
        }];
        let values = vec!["release".to_string()];
        let projected = project_args(&defs, &values);
        assert!(projected.contains(&("ARG1".to_string(), "release".to_string())));
        assert!(projected.contains(&("INVOWK_ARG_TARGET".to_string(), "release".to_string())));
        assert!(projected.contains(&("ARGC".to_string(), "1".to_string())));
    }

    #[test]
    fn flag_value_projection_uses_fixed_format_rules() {
        assert_eq!(FlagValue::Bool(true).project(), "true");
        assert_eq!(FlagValue::Int(5).project(), "5");
        assert_eq!(FlagValue::String("x".into()).project(), "x");
    }
}
