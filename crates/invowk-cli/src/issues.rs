//! Renders an `InvowkError` into a styled message (§7): a small issue
//! catalog of hints layered on top of the error's own `Display`, kept
//! separate from the core so the core crates stay free of presentation
//! concerns.

use console::style;
use invowk_core::InvowkError;

/// A one-line hint appended below the error's own message, for the
/// handful of error kinds where a generic retry tip helps.
fn hint(error: &InvowkError) -> Option<&'static str> {
    match error {
        InvowkError::ContainerEngineNotFound { .. } => {
            Some("Install docker or podman, or set ContainerEngine in ~/.invowk/config.toml")
        }
        InvowkError::AmbiguousCommand { .. } => {
            Some("Disambiguate with @<source> or --ivk-from=<source>")
        }
        InvowkError::RuntimeNotAllowed { .. } => {
            Some("Pass --ivk-runtime with one of the allowed runtimes")
        }
        InvowkError::DependencyUnsatisfied(_) => {
            Some("Resolve the listed dependencies, then retry")
        }
        _ => None,
    }
}

/// Prints `error` to stderr, styled, with an optional hint. Does not
/// print anything for `ChildExit`, whose code is surfaced by the exit
/// status alone (§7 "no extra diagnostics").
pub fn report(error: &InvowkError) {
    if matches!(error, InvowkError::ChildExit { .. }) {
        return;
    }
    eprintln!("{}", style(format!("Error: {error}")).red());
    if let Some(hint) = hint(error) {
        eprintln!("{}", style(format!("  hint: {hint}")).dim());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn child_exit_has_no_hint_and_is_not_reported() {
        let err = InvowkError::ChildExit { code: 3 };
        assert!(hint(&err).is_none());
    }

    #[test]
    fn ambiguous_command_carries_a_disambiguation_hint() {
        let err = InvowkError::ambiguous_command("deploy".into(), vec!["invowkfile".into(), "mymod".into()]);
        assert!(hint(&err).is_some());
    }
}
