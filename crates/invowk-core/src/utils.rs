//! Shared utility functions, generalized from the teacher's `which`-based
//! tool lookup.

use std::collections::HashMap;
use std::sync::OnceLock;

use regex::Regex;
use which::which;

/// Check if a command exists in PATH.
pub fn cmd_exists(name: &str) -> bool {
    which(name).is_ok()
}

fn safe_interpolation_pattern() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^[A-Za-z0-9._+\-/]+$").unwrap())
}

/// Conservative character-set check for any value that will be
/// spliced into a validation script (§4.4 "Shell interpolation
/// safety"). Values failing this are rejected as a validation error
/// rather than passed to a shell.
pub fn is_safe_for_interpolation(value: &str) -> bool {
    !value.is_empty() && safe_interpolation_pattern().is_match(value)
}

/// The process environment captured before invowk injects any
/// `INVOWK_*` variables (§4.4 "Env-var validation is special").
#[derive(Debug, Clone, Default)]
pub struct CapturedEnv(HashMap<String, String>);

impl CapturedEnv {
    pub fn capture() -> Self {
        Self(std::env::vars().collect())
    }

    pub fn from_map(map: HashMap<String, String>) -> Self {
        Self(map)
    }

    pub fn get(&self, key: &str) -> Option<&String> {
        self.0.get(key)
    }

    pub fn as_map(&self) -> &HashMap<String, String> {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn safe_values_pass() {
        assert!(is_safe_for_interpolation("git"));
        assert!(is_safe_for_interpolation("./bin/tool"));
        assert!(is_safe_for_interpolation("some.file-name_1.2+3"));
    }

    #[test]
    fn unsafe_values_are_rejected() {
        assert!(!is_safe_for_interpolation("git; rm -rf /"));
        assert!(!is_safe_for_interpolation("$(whoami)"));
        assert!(!is_safe_for_interpolation("a b"));
        assert!(!is_safe_for_interpolation(""));
    }

    #[test]
    fn captured_env_reads_back_values() {
        let mut map = HashMap::new();
        map.insert("FOO".to_string(), "bar".to_string());
        let env = CapturedEnv::from_map(map);
        assert_eq!(env.get("FOO"), Some(&"bar".to_string()));
        assert_eq!(env.get("MISSING"), None);
    }
}
