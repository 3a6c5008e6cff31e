//! Splits the token list remaining after command-name resolution into
//! declared-flag values and positional args (§6, §9 "Dynamic dispatch
//! over flag types"). The core never sees raw argv for this — only the
//! resulting `HashMap<String, FlagValue>` and `Vec<String>`.

use std::collections::HashMap;

use invowk_core::{FlagDef, FlagKind, FlagValue, InvowkError, Result};

pub fn parse_command_args(
    flag_defs: &[FlagDef],
    tokens: &[&str],
) -> Result<(HashMap<String, FlagValue>, Vec<String>)> {
    let mut flags = HashMap::new();
    let mut positional = Vec::new();

    let mut i = 0;
    while i < tokens.len() {
        let token = tokens[i];
        if let Some(def) = match_flag(flag_defs, token) {
            if def.kind == FlagKind::Bool {
                flags.insert(def.name.clone(), FlagValue::Bool(true));
                i += 1;
            } else {
                let value = tokens.get(i + 1).ok_or_else(|| InvowkError::MissingRequired {
                    name: def.name.clone(),
                })?;
                flags.insert(def.name.clone(), parse_value(def, value)?);
                i += 2;
            }
        } else {
            positional.push(token.to_string());
            i += 1;
        }
    }

    for def in flag_defs {
        if def.required && !flags.contains_key(&def.name) {
            return Err(InvowkError::MissingRequired { name: def.name.clone() });
        }
    }

    Ok((flags, positional))
}

fn match_flag<'a>(defs: &'a [FlagDef], token: &str) -> Option<&'a FlagDef> {
    let long = token.strip_prefix("--")?;
    if let Some(def) = defs.iter().find(|d| d.name == long) {
        return Some(def);
    }
    let short = token.strip_prefix('-').filter(|s| s.len() == 1)?.chars().next()?;
    defs.iter().find(|d| d.short == Some(short))
}

fn parse_value(def: &FlagDef, raw: &str) -> Result<FlagValue> {
    match def.kind {
        FlagKind::Bool => raw.parse::<bool>().map(FlagValue::Bool),
        FlagKind::Int => raw.parse::<i64>().map(FlagValue::Int),
        FlagKind::Float => raw.parse::<f64>().map(FlagValue::Float),
        FlagKind::String => return Ok(FlagValue::String(raw.to_string())),
    }
    .map_err(|_| InvowkError::InvalidValue {
        name: def.name.clone(),
        value: raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn flag(name: &str, short: Option<char>, kind: FlagKind, required: bool) -> FlagDef {
        FlagDef {
            name: name.to_string(),
            short,
            kind,
            default: None,
            description: String::new(),
            required,
        }
    }

    #[test]
    fn bool_flag_needs_no_value() {
        let defs = vec![flag("dry-run", None, FlagKind::Bool, false)];
        let (flags, positional) = parse_command_args(&defs, &["--dry-run", "extra"]).unwrap();
        assert_eq!(flags.get("dry-run"), Some(&FlagValue::Bool(true)));
        assert_eq!(positional, vec!["extra".to_string()]);
    }

    #[test]
    fn string_flag_consumes_next_token() {
        let defs = vec![flag("environment", Some('e'), FlagKind::String, false)];
        let (flags, _) = parse_command_args(&defs, &["-e", "prod"]).unwrap();
        assert_eq!(flags.get("environment"), Some(&FlagValue::String("prod".into())));
    }

    #[test]
    fn missing_required_flag_is_an_error() {
        let defs = vec![flag("target", None, FlagKind::String, true)];
        let err = parse_command_args(&defs, &[]).unwrap_err();
        assert!(matches!(err, InvowkError::MissingRequired { .. }));
    }

    #[test]
    fn invalid_int_value_is_rejected() {
        let defs = vec![flag("retries", None, FlagKind::Int, false)];
        let err = parse_command_args(&defs, &["--retries", "nope"]).unwrap_err();
        assert!(matches!(err, InvowkError::InvalidValue { .. }));
    }
}
