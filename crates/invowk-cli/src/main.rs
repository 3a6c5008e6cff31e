//! `invowk` — the command-line entry point wiring config, discovery,
//! resolution, and the DAG executor together (§6).

mod config;
mod flags;
mod issues;
mod reserved;

use std::collections::HashMap;
use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};

use invowk_core::{InvowkError, Platform, Result};
use invowk_discovery::{
    discover_and_validate_command_set, discover_command_set, parse_source_filter, resolve, DiscoveryConfig,
};
use invowk_runtime::{CancellationToken, DagConfig, EnvInheritMode, InvocationInputs, IoStreams};

use config::Config;

#[derive(Parser)]
#[command(name = "invowk")]
#[command(about = "Discovers and runs commands declared in invowkfiles", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: CliCommand,
}

#[derive(Subcommand)]
enum CliCommand {
    /// Run a discovered command, or list what's discoverable.
    Cmd {
        #[arg(long = "list", short = 'l')]
        list: bool,
        #[arg(trailing_var_arg = true, allow_hyphen_values = true)]
        rest: Vec<String>,
    },
    /// Discover every command under `path` (defaults to the cwd) and
    /// fail on any tree-validation conflict.
    Validate { path: Option<PathBuf> },
    #[command(hide = true)]
    Internal {
        #[command(subcommand)]
        command: InternalCommand,
    },
}

#[derive(Subcommand)]
enum InternalCommand {
    /// Used by in-container "commands" dependency checks (§4.4):
    /// exits 0 if `name` is discoverable, 1 otherwise, no other output.
    CheckCmd { name: String },
}

fn main() -> ExitCode {
    init_tracing();

    match run() {
        Ok(code) => exit_code(code),
        Err(e) => {
            issues::report(&e);
            exit_code(e.exit_code())
        }
    }
}

fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_env("INVOWK_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).with_writer(std::io::stderr).try_init();
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(code.clamp(0, 255) as u8)
}

fn run() -> Result<i32> {
    let cli = Cli::parse();
    let config = Config::load()?;

    match cli.command {
        CliCommand::Cmd { list, rest: _ } if list => run_list(&config),
        CliCommand::Cmd { rest, .. } => run_cmd(&config, rest),
        CliCommand::Validate { path } => run_validate(&config, path),
        CliCommand::Internal {
            command: InternalCommand::CheckCmd { name },
        } => run_check_cmd(&config, name),
    }
}

fn discovery_config(config: &Config, workspace_dir: PathBuf) -> DiscoveryConfig {
    let mut discovery = DiscoveryConfig::for_cwd(workspace_dir);
    discovery.module_aliases = config.module_aliases.clone();
    discovery
}

fn run_list(config: &Config) -> Result<i32> {
    let cwd = std::env::current_dir().map_err(InvowkError::Io)?;
    let outcome = discover_command_set(&discovery_config(config, cwd))?;

    for info in outcome.command_set.commands() {
        if info.ambiguous {
            println!("{} (@{})", info.qualified_name, info.source.as_str());
        } else {
            println!("{}", info.qualified_name);
        }
    }
    for diagnostic in &outcome.diagnostics {
        tracing::warn!(source = %diagnostic.source, message = %diagnostic.message, "discovery diagnostic");
    }

    Ok(0)
}

fn run_validate(config: &Config, path: Option<PathBuf>) -> Result<i32> {
    let workspace_dir = match path {
        Some(path) => path,
        None => std::env::current_dir().map_err(InvowkError::Io)?,
    };
    discover_and_validate_command_set(&discovery_config(config, workspace_dir))?;
    println!("ok");
    Ok(0)
}

fn run_check_cmd(config: &Config, name: String) -> Result<i32> {
    let cwd = std::env::current_dir().map_err(InvowkError::Io)?;
    let outcome = discover_command_set(&discovery_config(config, cwd))?;
    let found = outcome.command_set.lookup_qualified(&name).is_some()
        || outcome.command_set.by_simple_name(&name).len() == 1;
    Ok(if found { 0 } else { 1 })
}

fn run_cmd(config: &Config, rest: Vec<String>) -> Result<i32> {
    let filter = parse_source_filter(&rest);
    let after_filter: Vec<String> = filter.remaining_argv(&rest).into_iter().map(str::to_string).collect();

    let token_refs: Vec<&str> = after_filter.iter().map(String::as_str).collect();
    let (reserved, path_and_args) = reserved::extract(&token_refs)?;

    let cwd = std::env::current_dir().map_err(InvowkError::Io)?;
    let workspace_dir = reserved.workdir.clone().unwrap_or(cwd);
    let outcome = discover_and_validate_command_set(&discovery_config(config, workspace_dir.clone()))?;

    let path_tokens: Vec<&str> = path_and_args.iter().map(String::as_str).collect();
    let resolution = resolve(&path_tokens, &outcome.command_set, filter.source.as_ref())?;
    let target = resolution.info.clone();
    let leftover = &path_tokens[resolution.consumed..];

    let (flag_values, arg_values) = flags::parse_command_args(&target.command.flags, leftover)?;
    validate_arity(&target.command.args, &arg_values)?;

    let env_files = load_env_files(&reserved.env_files)?;

    if reserved.dry_run {
        println!(
            "would run '{}' via {:?} runtime in {}",
            target.qualified_name,
            reserved.runtime,
            workspace_dir.display()
        );
        return Ok(0);
    }

    let dag_config = DagConfig {
        command_set: &outcome.command_set,
        platform: Platform::current(),
        cli_runtime_override: reserved.runtime,
        config_default_runtime: config.default_runtime(),
        container_engine: config.container_engine.clone(),
        working_dir: workspace_dir,
        io: IoStreams::Inherit,
        env_inherit_mode: reserved.env_inherit_mode.unwrap_or(EnvInheritMode::All),
        env_inherit_allow: reserved.env_inherit_allow,
        env_inherit_deny: reserved.env_inherit_deny,
        env_file_vars: env_files,
        env_var_overrides: reserved.env_vars.into_iter().collect(),
    };

    let cancellation = CancellationToken::new();
    cancellation.install_sigint_handler()?;

    let inputs = InvocationInputs { flag_values, arg_values };
    let outcome = invowk_runtime::execute_target(&dag_config, &target, inputs, cancellation)?;

    Ok(outcome.exit_code)
}

fn validate_arity(defs: &[invowk_core::ArgDef], values: &[String]) -> Result<()> {
    if defs.is_empty() {
        return Ok(());
    }
    let required = defs.iter().filter(|d| d.required).count();
    if values.len() < required {
        return Err(InvowkError::MissingRequired {
            name: defs[values.len()].name.clone().unwrap_or_else(|| "<positional>".to_string()),
        });
    }
    if values.len() > defs.len() {
        return Err(InvowkError::TooManyArgs {
            expected: defs.len(),
            actual: values.len(),
        });
    }
    Ok(())
}

fn load_env_files(paths: &[PathBuf]) -> Result<HashMap<String, String>> {
    let mut vars = HashMap::new();
    for path in paths {
        for item in dotenvy::from_path_iter(path).map_err(|e| InvowkError::DiscoveryIo {
            path: path.clone(),
            source: std::io::Error::new(std::io::ErrorKind::Other, e.to_string()),
        })? {
            let (key, value) = item.map_err(|e| InvowkError::ParseError {
                path: path.clone(),
                message: e.to_string(),
            })?;
            vars.insert(key, value);
        }
    }
    Ok(vars)
}
