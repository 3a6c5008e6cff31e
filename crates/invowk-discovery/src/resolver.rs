//! Argv-level source-filter parsing and command-path resolution
//! (§4.2).

use invowk_core::{InvowkError, Result, SourceId};

use crate::command_set::{CommandInfo, CommandSet};

const IVK_FROM_PREFIX: &str = "--ivk-from=";

/// The outcome of scanning argv for a source filter, before any
/// command-path resolution happens.
#[derive(Debug, Default, Clone)]
pub struct SourceFilter {
    pub source: Option<SourceId>,
    /// Index of the leading `@src` token in argv, if one was present.
    /// Per the spec's Open Question, this token is left in place (not
    /// removed from argv) whenever `--ivk-from` was also given.
    at_token_index: Option<usize>,
    /// Index of the `--ivk-from=<id>` token, if present.
    option_token_index: Option<usize>,
}

impl SourceFilter {
    /// Tokens remaining once the consumed filter token (if any) has
    /// been dropped. Only the `@src` leading token is ever dropped,
    /// and only when `--ivk-from` was absent.
    pub fn remaining_argv<'a>(&self, argv: &'a [String]) -> Vec<&'a str> {
        argv.iter()
            .enumerate()
            .filter(|(i, _)| Some(*i) != self.consumed_index())
            .map(|(_, s)| s.as_str())
            .collect()
    }

    fn consumed_index(&self) -> Option<usize> {
        if self.option_token_index.is_some() {
            // --ivk-from wins; the @src token (if any) is NOT consumed.
            None
        } else {
            self.at_token_index
        }
    }
}

/// Scans `argv` for a source filter. `--ivk-from=<id>` is recognized
/// anywhere in argv; a leading `@<id>` token is recognized only at
/// position 0. Per the spec's Open Question: when both are present,
/// `--ivk-from` wins as the effective source, and the `@src` token is
/// *not* removed from argv (it is left for command-path resolution to
/// fail on, rather than silently dropped or merged).
pub fn parse_source_filter(argv: &[String]) -> SourceFilter {
    let option_token_index = argv.iter().position(|t| t.starts_with(IVK_FROM_PREFIX));
    let at_token_index = argv.first().filter(|t| t.starts_with('@')).map(|_| 0usize);

    let source = if let Some(idx) = option_token_index {
        let raw = argv[idx].strip_prefix(IVK_FROM_PREFIX).unwrap_or("");
        Some(SourceId::normalize(raw))
    } else {
        at_token_index.map(|idx| SourceId::normalize(&argv[idx]))
    };

    SourceFilter {
        source,
        at_token_index,
        option_token_index,
    }
}

pub struct Resolution<'a> {
    pub info: &'a CommandInfo,
    /// Number of leading path tokens consumed to name the command.
    pub consumed: usize,
}

/// Resolves a command path against `command_set`, honoring an
/// optional source filter. Implements the longest-prefix rule: the
/// longest run of leading tokens that names a declared command wins,
/// with any further tokens treated as positional args.
pub fn resolve<'a>(
    path_tokens: &[&str],
    command_set: &'a CommandSet,
    filter: Option<&SourceId>,
) -> Result<Resolution<'a>> {
    if let Some(source) = filter {
        if !command_set.source_order().contains(source) {
            return Err(InvowkError::source_not_found(
                source.as_str().to_string(),
                command_set
                    .source_order()
                    .iter()
                    .map(|s| s.as_str().to_string())
                    .collect(),
            ));
        }
    }

    for len in (1..=path_tokens.len()).rev() {
        let candidate = path_tokens[..len].join(" ");

        if let Some(source) = filter {
            if let Some(info) = command_set.lookup_in_source(&candidate, source) {
                return Ok(Resolution { info, consumed: len });
            }
            continue;
        }

        let matches = command_set.by_simple_name(&candidate);
        if matches.is_empty() {
            continue;
        }
        if command_set.is_ambiguous(&candidate) {
            return Err(InvowkError::ambiguous_command(
                candidate,
                matches.iter().map(|m| m.source.as_str().to_string()).collect(),
            ));
        }
        return Ok(Resolution {
            info: matches[0],
            consumed: len,
        });
    }

    if let Some(source) = filter {
        Err(InvowkError::command_not_found_in_source(
            path_tokens.join(" "),
            source.as_str().to_string(),
            command_set.names_in_source(source),
        ))
    } else {
        Err(InvowkError::command_not_found(
            path_tokens.join(" "),
            command_set.commands().iter().map(|c| c.qualified_name.clone()).collect(),
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invowk_core::runtime::{RuntimeKind, Script};
    use invowk_core::{Command, Implementation, Invowkfile, Platform};
    use std::sync::Arc;

    fn make_command(name: &str) -> Arc<Command> {
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
        })
    }

    fn build_set() -> CommandSet {
        let invowkfile = Arc::new(Invowkfile::default());
        let mut builder = CommandSet::builder();
        builder.push(SourceId::Workspace, "x".into(), make_command("db"), invowkfile.clone());
        builder.push(
            SourceId::Workspace,
            "x".into(),
            make_command("db migrate"),
            invowkfile.clone(),
        );
        builder.push(
            SourceId::Module("mymod".into()),
            "y".into(),
            make_command("deploy"),
            invowkfile.clone(),
        );
        builder.push(SourceId::Workspace, "x".into(), make_command("deploy"), invowkfile);
        builder.build()
    }

    #[test]
    fn at_token_consumed_when_no_option_present() {
        let argv: Vec<String> = vec!["@mymod".into(), "deploy".into()];
        let filter = parse_source_filter(&argv);
        assert_eq!(filter.source, Some(SourceId::Module("mymod".into())));
        assert_eq!(filter.remaining_argv(&argv), vec!["deploy"]);
    }

    #[test]
    fn option_wins_and_at_token_is_not_consumed() {
        let argv: Vec<String> = vec!["@mymod".into(), "--ivk-from=invowkfile".into(), "deploy".into()];
        let filter = parse_source_filter(&argv);
        assert_eq!(filter.source, Some(SourceId::Workspace));
        // @mymod remains in the token stream, per the Open Question.
        assert_eq!(filter.remaining_argv(&argv), vec!["@mymod", "--ivk-from=invowkfile", "deploy"]);
    }

    #[test]
    fn longest_prefix_wins() {
        let set = build_set();
        let tokens = ["db", "migrate", "now"];
        let res = resolve(&tokens, &set, None).unwrap();
        assert_eq!(res.info.qualified_name, "db migrate");
        assert_eq!(res.consumed, 2);
    }

    #[test]
    fn ambiguous_without_source_filter() {
        let set = build_set();
        let tokens = ["deploy"];
        let err = resolve(&tokens, &set, None).unwrap_err();
        assert!(matches!(err, InvowkError::AmbiguousCommand { .. }));
    }

    #[test]
    fn source_filter_disambiguates() {
        let set = build_set();
        let tokens = ["deploy"];
        let source = SourceId::Module("mymod".into());
        let res = resolve(&tokens, &set, Some(&source)).unwrap();
        assert_eq!(res.info.qualified_name, "mymod deploy");
    }

    #[test]
    fn unknown_source_is_an_error() {
        let set = build_set();
        let tokens = ["deploy"];
        let source = SourceId::Module("ghost".into());
        let err = resolve(&tokens, &set, Some(&source)).unwrap_err();
        assert!(matches!(err, InvowkError::SourceNotFound { .. }));
    }
}
