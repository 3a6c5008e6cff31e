//! Discovery engine — produces a `CommandSet` from a `DiscoveryConfig`
//! (§4.1).

use std::sync::Arc;

use invowk_core::{InvowkError, Invowkfile, Result, SourceId};
use tracing::{info_span, warn};

use crate::command_set::{CommandSet, CommandSetBuilder, Diagnostic};
use crate::loader::{load_invowkfile, load_module_manifest};
use crate::sources::{list_module_dirs, DiscoveryConfig, MODULE_MANIFEST, WORKSPACE_FILE};

pub struct DiscoveryOutcome {
    pub command_set: CommandSet,
    pub diagnostics: Vec<Diagnostic>,
}

/// Loads every source, parses each file, flattens commands. A parse
/// failure in one source does not abort discovery (§4.1 "Failure
/// semantics").
pub fn discover_command_set(config: &DiscoveryConfig) -> Result<DiscoveryOutcome> {
    let _span = info_span!("discover_command_set").entered();
    let mut builder = CommandSet::builder();
    let mut diagnostics = Vec::new();

    load_workspace_source(config, &mut builder, &mut diagnostics)?;
    load_module_sources(config, &mut builder, &mut diagnostics);

    Ok(DiscoveryOutcome {
        command_set: builder.build(),
        diagnostics,
    })
}

fn load_workspace_source(
    config: &DiscoveryConfig,
    builder: &mut CommandSetBuilder,
    diagnostics: &mut Vec<Diagnostic>,
) -> Result<()> {
    let workspace_file = config.workspace_dir.join(WORKSPACE_FILE);
    if !workspace_file.exists() {
        return Ok(());
    }

    match load_invowkfile(&workspace_file) {
        Ok(invowkfile) => {
            let invowkfile = Arc::new(invowkfile);
            builder.add_source(SourceId::Workspace);
            for command in &invowkfile.cmds {
                builder.push(
                    SourceId::Workspace,
                    workspace_file.clone(),
                    Arc::new(command.clone()),
                    invowkfile.clone(),
                );
            }
            Ok(())
        }
        Err(InvowkError::DiscoveryIo { path, source }) => {
            // §4.1: I/O errors on the root dir are fatal.
            Err(InvowkError::DiscoveryIo { path, source })
        }
        Err(e) => {
            warn!(%e, path = %workspace_file.display(), "failed to parse workspace invowkfile");
            diagnostics.push(Diagnostic {
                source: SourceId::Workspace,
                message: e.to_string(),
            });
            Ok(())
        }
    }
}

fn load_module_sources(
    config: &DiscoveryConfig,
    builder: &mut CommandSetBuilder,
    diagnostics: &mut Vec<Diagnostic>,
) {
    let mut roots = Vec::new();
    if let Some(dir) = &config.user_modules_dir {
        roots.push(dir.clone());
    }
    roots.extend(config.extra_search_paths.iter().cloned());

    for root in roots {
        let module_dirs = match list_module_dirs(&root) {
            Ok(dirs) => dirs,
            Err(e) => {
                warn!(%e, root = %root.display(), "failed to list module directory");
                continue;
            }
        };

        for module_dir in module_dirs {
            let manifest_path = module_dir.path.join(MODULE_MANIFEST);
            let invowkfile_path = module_dir.path.join(WORKSPACE_FILE);

            let manifest = match load_module_manifest(&manifest_path) {
                Ok(m) => m,
                Err(e) => {
                    diagnostics.push(Diagnostic {
                        source: SourceId::Module(
                            module_dir
                                .path
                                .file_name()
                                .map(|n| n.to_string_lossy().to_string())
                                .unwrap_or_default(),
                        ),
                        message: e.to_string(),
                    });
                    continue;
                }
            };

            let declared_id = manifest.module.clone();
            let source_id = config
                .module_aliases
                .get(&module_dir.path)
                .cloned()
                .unwrap_or(declared_id);
            let source = SourceId::Module(source_id);

            match load_invowkfile(&invowkfile_path) {
                Ok(mut invowkfile) => {
                    invowkfile.metadata = Some(manifest);
                    let invowkfile = Arc::new(invowkfile);
                    builder.add_source(source.clone());
                    for command in &invowkfile.cmds {
                        builder.push(
                            source.clone(),
                            invowkfile_path.clone(),
                            Arc::new(command.clone()),
                            invowkfile.clone(),
                        );
                    }
                }
                Err(e) => {
                    diagnostics.push(Diagnostic {
                        source,
                        message: e.to_string(),
                    });
                }
            }
        }
    }
}

/// Additionally applies the command-tree validation (§4.1): a command
/// whose name is a strict prefix of another command's name in the same
/// source must not declare positional args.
pub fn discover_and_validate_command_set(config: &DiscoveryConfig) -> Result<DiscoveryOutcome> {
    let outcome = discover_command_set(config)?;
    validate_command_tree(&outcome.command_set)?;
    Ok(outcome)
}

fn validate_command_tree(command_set: &CommandSet) -> Result<()> {
    for source in command_set.source_order() {
        let infos: Vec<_> = command_set
            .commands()
            .iter()
            .filter(|info| &info.source == source)
            .collect();

        for candidate in &infos {
            if candidate.command.args.is_empty() {
                continue;
            }
            let children: Vec<String> = infos
                .iter()
                .filter(|other| candidate.command.is_strict_prefix_of(&other.command))
                .map(|other| other.command.name.clone())
                .collect();

            if !children.is_empty() {
                return Err(InvowkError::TreeValidationConflict {
                    command: candidate.command.name.clone(),
                    children: children.join(", "),
                });
            }
        }
    }
    Ok(())
}

/// Convenience: discovers, then looks up by qualified name. Returns
/// `Ok(None)` (not an error) if not found — §4.1 "distinguishing 'no
/// match' from 'discovery failed'".
pub fn get_command(
    config: &DiscoveryConfig,
    qualified_name: &str,
) -> Result<(DiscoveryOutcome, Option<usize>)> {
    let outcome = discover_command_set(config)?;
    let index = outcome
        .command_set
        .commands()
        .iter()
        .position(|info| info.qualified_name == qualified_name);
    Ok((outcome, index))
}

#[allow(dead_code)]
fn _assert_invowkfile_cloneable(_f: &Invowkfile) {}
