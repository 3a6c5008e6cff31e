//! Error taxonomy for invowk.
//!
//! One variant family per §7 of the spec: discovery, resolution,
//! platform/runtime selection, dependency validation, execution, and
//! argument/flag validation. The CLI layer renders these; this crate
//! never prints anything itself.

use std::path::PathBuf;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, InvowkError>;

#[derive(Debug, Error)]
pub enum InvowkError {
    // -- Discovery -----------------------------------------------------
    #[error("failed to read {path}: {source}")]
    DiscoveryIo {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse invowkfile {path}: {message}")]
    ParseError { path: PathBuf, message: String },

    #[error(
        "command '{command}' cannot declare positional args because it is a prefix of: {children}"
    )]
    TreeValidationConflict { command: String, children: String },

    // -- Resolution ------------------------------------------------------
    #[error("command '{name}' not found\nAvailable commands: {available}")]
    CommandNotFound { name: String, available: String },

    #[error(
        "command '{name}' not found in source '@{source}'\nAvailable commands in '@{source}': {available}"
    )]
    CommandNotFoundInSource {
        name: String,
        source: String,
        available: String,
    },

    #[error("Ambiguous command '{name}' found in multiple sources: {sources}")]
    AmbiguousCommand { name: String, sources: String },

    #[error("source '@{source}' not found\nAvailable sources: {available}")]
    SourceNotFound { source: String, available: String },

    // -- Platform / runtime selection ------------------------------------
    #[error(
        "command '{command}' does not support this host's platform ({platform})\nSupported platforms: {supported}"
    )]
    HostNotSupported {
        command: String,
        platform: String,
        supported: String,
    },

    #[error(
        "runtime '{requested}' is not allowed for command '{command}'\nAllowed runtimes: {allowed}"
    )]
    RuntimeNotAllowed {
        command: String,
        requested: String,
        allowed: String,
    },

    // -- Dependency validation --------------------------------------------
    #[error("{0}")]
    DependencyUnsatisfied(Box<DependencyFailure>),

    #[error("unsafe value for shell interpolation: '{value}'")]
    UnsafeInterpolation { value: String },

    // -- Execution ---------------------------------------------------------
    #[error("command timed out after {seconds}s")]
    DeadlineExceeded { seconds: u64 },

    #[error("command was canceled")]
    Canceled,

    #[error("runtime '{runtime}' is not available: {reason}")]
    RuntimeNotAvailable { runtime: String, reason: String },

    #[error("container engine '{engine}' was not found on PATH")]
    ContainerEngineNotFound { engine: String },

    #[error("permission denied running '{command}'")]
    PermissionDenied { command: String },

    #[error("shell not found: {shell}")]
    ShellNotFound { shell: String },

    /// Carries the child process's own exit code verbatim. The CLI
    /// layer must exit with this code and print nothing extra.
    #[error("child process exited with code {code}")]
    ChildExit { code: i32 },

    #[error("failed to execute script: {message}")]
    ScriptExecutionFailed { message: String },

    // -- Cycle ---------------------------------------------------------------
    #[error("dependency cycle detected at runtime: {path}")]
    DependencyCycle { path: String },

    // -- Argument / flag validation -------------------------------------------
    #[error("missing required flag or argument: {name}")]
    MissingRequired { name: String },

    #[error("too many positional arguments: expected at most {expected}, got {actual}")]
    TooManyArgs { expected: usize, actual: usize },

    #[error("invalid value for '{name}': {value}")]
    InvalidValue { name: String, value: String },

    // -- Escape hatches -----------------------------------------------------
    #[error("{0}")]
    Other(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl InvowkError {
    /// The exit code the CLI should use for this error, absent a
    /// child-process carrier. Per §6, internal errors exit 1.
    pub fn exit_code(&self) -> i32 {
        match self {
            InvowkError::ChildExit { code } => *code,
            _ => 1,
        }
    }

    pub fn command_not_found(name: String, available: Vec<String>) -> Self {
        Self::CommandNotFound {
            name,
            available: join_or_none(&available),
        }
    }

    pub fn command_not_found_in_source(name: String, source: String, available: Vec<String>) -> Self {
        Self::CommandNotFoundInSource {
            name,
            source,
            available: join_or_none(&available),
        }
    }

    pub fn ambiguous_command(name: String, sources: Vec<String>) -> Self {
        Self::AmbiguousCommand {
            name,
            sources: sources
                .iter()
                .map(|s| format!("@{s}"))
                .collect::<Vec<_>>()
                .join(", "),
        }
    }

    pub fn source_not_found(source: String, available: Vec<String>) -> Self {
        Self::SourceNotFound {
            source,
            available: join_or_none(&available),
        }
    }

    pub fn host_not_supported(command: String, platform: String, supported: Vec<String>) -> Self {
        Self::HostNotSupported {
            command,
            platform,
            supported: join_or_none(&supported),
        }
    }

    pub fn runtime_not_allowed(command: String, requested: String, allowed: Vec<String>) -> Self {
        Self::RuntimeNotAllowed {
            command,
            requested,
            allowed: join_or_none(&allowed),
        }
    }

    pub fn dependency_cycle(stack: &[String], repeated: &str) -> Self {
        let mut path = stack.to_vec();
        path.push(repeated.to_string());
        Self::DependencyCycle {
            path: path.join(" \u{2192} "),
        }
    }
}

fn join_or_none(items: &[String]) -> String {
    if items.is_empty() {
        "none".to_string()
    } else {
        items.join(", ")
    }
}

/// The six dependency-kind failure lists, per §4.4 / §7. Each list is
/// empty when that kind had no failures; the error Display renders
/// only the non-empty sections so messages stay focused (scenario 4:
/// "Missing Tools" appears, nothing else does).
#[derive(Debug, Default, Clone)]
pub struct DependencyFailure {
    pub missing_tools: Vec<String>,
    pub missing_commands: Vec<String>,
    pub missing_filepaths: Vec<String>,
    pub missing_capabilities: Vec<String>,
    pub failed_custom_checks: Vec<String>,
    pub missing_env_vars: Vec<String>,
}

impl DependencyFailure {
    pub fn is_empty(&self) -> bool {
        self.missing_tools.is_empty()
            && self.missing_commands.is_empty()
            && self.missing_filepaths.is_empty()
            && self.missing_capabilities.is_empty()
            && self.failed_custom_checks.is_empty()
            && self.missing_env_vars.is_empty()
    }

    pub fn merge(&mut self, other: DependencyFailure) {
        self.missing_tools.extend(other.missing_tools);
        self.missing_commands.extend(other.missing_commands);
        self.missing_filepaths.extend(other.missing_filepaths);
        self.missing_capabilities.extend(other.missing_capabilities);
        self.failed_custom_checks.extend(other.failed_custom_checks);
        self.missing_env_vars.extend(other.missing_env_vars);
    }
}

impl std::fmt::Display for DependencyFailure {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Dependency validation failed:")?;
        let mut wrote_any = false;
        let mut section = |f: &mut std::fmt::Formatter<'_>, label: &str, items: &[String]| -> std::fmt::Result {
            if items.is_empty() {
                return Ok(());
            }
            wrote_any = true;
            writeln!(f, "  {label}: {}", items.join(", "))
        };
        section(f, "Missing Tools", &self.missing_tools)?;
        section(f, "Missing Commands", &self.missing_commands)?;
        section(f, "Missing Filepaths", &self.missing_filepaths)?;
        section(f, "Missing Capabilities", &self.missing_capabilities)?;
        section(f, "Failed Custom Checks", &self.failed_custom_checks)?;
        section(f, "Missing Env Vars", &self.missing_env_vars)?;
        if !wrote_any {
            writeln!(f, "  (no details)")?;
        }
        Ok(())
    }
}
