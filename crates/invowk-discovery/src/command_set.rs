//! `CommandInfo` and `CommandSet` (§3, §4.1).

use std::collections::{HashMap, HashSet};
use std::path::PathBuf;
use std::sync::Arc;

use invowk_core::{Command, Invowkfile, SourceId};

/// A discovered command bound to the source it was declared in.
#[derive(Debug, Clone)]
pub struct CommandInfo {
    /// The name as declared in the invowkfile.
    pub simple_name: String,
    /// Source-prefixed for modules, identical to `simple_name` for the
    /// workspace file.
    pub qualified_name: String,
    pub source: SourceId,
    pub file_path: PathBuf,
    pub command: Arc<Command>,
    pub invowkfile: Arc<Invowkfile>,
    pub ambiguous: bool,
}

impl CommandInfo {
    pub fn qualify(source: &SourceId, simple_name: &str) -> String {
        match source {
            SourceId::Workspace => simple_name.to_string(),
            SourceId::Module(id) => format!("{id} {simple_name}"),
        }
    }
}

/// A diagnostic produced while loading one source. Non-fatal: the
/// source that produced it is omitted from the resulting `CommandSet`
/// (§4.1 "Failure semantics").
#[derive(Debug, Clone)]
pub struct Diagnostic {
    pub source: SourceId,
    pub message: String,
}

/// Source-grouped, name-indexed view over every discovered command
/// (§3 `CommandSet`).
#[derive(Debug, Default)]
pub struct CommandSet {
    commands: Vec<CommandInfo>,
    by_simple_name: HashMap<String, Vec<usize>>,
    by_source: HashMap<SourceId, Vec<usize>>,
    ambiguous_names: HashSet<String>,
    source_order: Vec<SourceId>,
}

impl CommandSet {
    pub fn builder() -> CommandSetBuilder {
        CommandSetBuilder::default()
    }

    pub fn commands(&self) -> &[CommandInfo] {
        &self.commands
    }

    pub fn source_order(&self) -> &[SourceId] {
        &self.source_order
    }

    pub fn is_ambiguous(&self, simple_name: &str) -> bool {
        self.ambiguous_names.contains(simple_name)
    }

    /// All `CommandInfo` entries sharing a simple name, across every
    /// source.
    pub fn by_simple_name(&self, simple_name: &str) -> Vec<&CommandInfo> {
        self.by_simple_name
            .get(simple_name)
            .map(|idxs| idxs.iter().map(|&i| &self.commands[i]).collect())
            .unwrap_or_default()
    }

    /// The single entry for `simple_name` within `source`, if any.
    pub fn lookup_in_source(&self, simple_name: &str, source: &SourceId) -> Option<&CommandInfo> {
        self.by_source
            .get(source)?
            .iter()
            .map(|&i| &self.commands[i])
            .find(|info| info.simple_name == simple_name)
    }

    /// Every simple name declared within `source`, for error messages.
    pub fn names_in_source(&self, source: &SourceId) -> Vec<String> {
        self.by_source
            .get(source)
            .map(|idxs| {
                idxs.iter()
                    .map(|&i| self.commands[i].simple_name.clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn lookup_qualified(&self, qualified_name: &str) -> Option<&CommandInfo> {
        self.commands
            .iter()
            .find(|info| info.qualified_name == qualified_name)
    }

    pub fn len(&self) -> usize {
        self.commands.len()
    }

    pub fn is_empty(&self) -> bool {
        self.commands.is_empty()
    }
}

#[derive(Default)]
pub struct CommandSetBuilder {
    commands: Vec<CommandInfo>,
    source_order: Vec<SourceId>,
}

impl CommandSetBuilder {
    pub fn add_source(&mut self, source: SourceId) {
        if !self.source_order.contains(&source) {
            self.source_order.push(source);
        }
    }

    pub fn push(
        &mut self,
        source: SourceId,
        file_path: PathBuf,
        command: Arc<Command>,
        invowkfile: Arc<Invowkfile>,
    ) {
        let simple_name = command.name.clone();
        let qualified_name = CommandInfo::qualify(&source, &simple_name);
        self.add_source(source.clone());
        self.commands.push(CommandInfo {
            simple_name,
            qualified_name,
            source,
            file_path,
            command,
            invowkfile,
            ambiguous: false,
        });
    }

    pub fn build(mut self) -> CommandSet {
        self.source_order.sort();

        let mut by_simple_name: HashMap<String, Vec<usize>> = HashMap::new();
        let mut by_source: HashMap<SourceId, Vec<usize>> = HashMap::new();
        let mut sources_per_name: HashMap<String, HashSet<SourceId>> = HashMap::new();

        for (i, info) in self.commands.iter().enumerate() {
            by_simple_name.entry(info.simple_name.clone()).or_default().push(i);
            by_source.entry(info.source.clone()).or_default().push(i);
            sources_per_name
                .entry(info.simple_name.clone())
                .or_default()
                .insert(info.source.clone());
        }

        let ambiguous_names: HashSet<String> = sources_per_name
            .into_iter()
            .filter(|(_, sources)| sources.len() >= 2)
            .map(|(name, _)| name)
            .collect();

        for info in self.commands.iter_mut() {
            info.ambiguous = ambiguous_names.contains(&info.simple_name);
        }

        CommandSet {
            commands: self.commands,
            by_simple_name,
            by_source,
            ambiguous_names,
            source_order: self.source_order,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use invowk_core::runtime::{RuntimeKind, Script};
    use invowk_core::{Implementation, Platform};

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

    #[test]
    fn ambiguity_set_iff_two_or_more_sources() {
        let invowkfile = Arc::new(Invowkfile::default());
        let mut builder = CommandSet::builder();
        builder.push(
            SourceId::Workspace,
            "invowkfile.cue".into(),
            make_command("deploy"),
            invowkfile.clone(),
        );
        builder.push(
            SourceId::Module("mymod".into()),
            "mymod.invowkmod/invowkfile.cue".into(),
            make_command("deploy"),
            invowkfile.clone(),
        );
        builder.push(
            SourceId::Workspace,
            "invowkfile.cue".into(),
            make_command("build"),
            invowkfile,
        );

        let set = builder.build();
        assert!(set.is_ambiguous("deploy"));
        assert!(!set.is_ambiguous("build"));
        assert_eq!(set.by_simple_name("deploy").len(), 2);

        let deploy_in_mod = set
            .lookup_in_source("deploy", &SourceId::Module("mymod".into()))
            .unwrap();
        assert_eq!(deploy_in_mod.qualified_name, "mymod deploy");
    }

    #[test]
    fn source_order_is_workspace_first_then_alphabetical() {
        let invowkfile = Arc::new(Invowkfile::default());
        let mut builder = CommandSet::builder();
        builder.add_source(SourceId::Module("zeta".into()));
        builder.add_source(SourceId::Workspace);
        builder.add_source(SourceId::Module("alpha".into()));
        builder.push(SourceId::Workspace, "x".into(), make_command("noop"), invowkfile);

        let set = builder.build();
        assert_eq!(
            set.source_order(),
            &[
                SourceId::Workspace,
                SourceId::Module("alpha".into()),
                SourceId::Module("zeta".into())
            ]
        );
    }
}
