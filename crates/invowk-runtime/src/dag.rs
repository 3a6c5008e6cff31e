//! DAG Executor (§4.6): processes execute-true `depends_on.commands`
//! entries before running the target's own script, with runtime-
//! carried cycle detection and a request-scoped discovery cache.
//!
//! The "commands" dependency kind (§4.4) and this DAG processing are
//! one mechanism seen from two angles: validating a commands-entry
//! with `execute: true` IS recursively executing the resolved
//! dependency, so this module supplies `invowk_deps::validate` with an
//! executor closure that recurses back into itself.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use invowk_core::flag::{project_args, project_flags};
use invowk_core::utils::CapturedEnv;
use invowk_core::{DependsOn, FlagValue, InvowkError, Platform, Result, RuntimeKind};
use invowk_discovery::{effective_runtime, select_implementation, CommandInfo, CommandSet, RequestCache};

use crate::cancellation::CancellationToken;
use crate::container::ContainerRuntime;
use crate::context::{ExecutionContext, IoStreams};
use crate::executor::{ExecutionOutcome, RuntimeExecutor};
use crate::native::NativeRuntime;
use crate::virtual_shell::VirtualRuntime;

/// How the reserved `--ivk-env-inherit-mode` flag filters the captured
/// host environment before it becomes the executed script's base env.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum EnvInheritMode {
    None,
    Allow,
    #[default]
    All,
}

pub struct DagConfig<'a> {
    pub command_set: &'a CommandSet,
    pub platform: Platform,
    pub cli_runtime_override: Option<RuntimeKind>,
    pub config_default_runtime: Option<RuntimeKind>,
    pub container_engine: Option<String>,
    pub working_dir: PathBuf,
    pub io: IoStreams,
    pub env_inherit_mode: EnvInheritMode,
    pub env_inherit_allow: Vec<String>,
    pub env_inherit_deny: Vec<String>,
    /// Contents of `--ivk-env-file` entries, applied after inherited env
    /// and before `--ivk-env-var` overrides.
    pub env_file_vars: HashMap<String, String>,
    /// `--ivk-env-var KEY=VALUE` overrides, applied last.
    pub env_var_overrides: HashMap<String, String>,
}

/// Invocation-level inputs that only apply to the user-requested
/// target, never to its dependencies.
#[derive(Default)]
pub struct InvocationInputs {
    pub flag_values: HashMap<String, FlagValue>,
    pub arg_values: Vec<String>,
}

pub fn execute_target(
    config: &DagConfig,
    target: &CommandInfo,
    inputs: InvocationInputs,
    cancellation: CancellationToken,
) -> Result<ExecutionOutcome> {
    let cache = Rc::new(RefCell::new(RequestCache::new()));
    let captured = CapturedEnv::capture();
    execute_internal(config, target, inputs, &captured, cancellation, &cache, Vec::new())
}

fn execute_internal(
    config: &DagConfig,
    target: &CommandInfo,
    inputs: InvocationInputs,
    captured: &CapturedEnv,
    cancellation: CancellationToken,
    cache: &Rc<RefCell<RequestCache>>,
    stack: Vec<String>,
) -> Result<ExecutionOutcome> {
    if stack.iter().any(|s| s == &target.qualified_name) {
        return Err(InvowkError::dependency_cycle(&stack, &target.qualified_name));
    }
    cancellation.check()?;

    let runtime = effective_runtime(
        &target.command,
        config.platform,
        config.cli_runtime_override,
        config.config_default_runtime,
    )?;
    let implementation = select_implementation(&target.command, config.platform, runtime)?.clone();

    let root_depends_on = target.invowkfile.depends_on.clone().unwrap_or_default();
    let command_depends_on = target.command.depends_on.clone().unwrap_or_default();
    let impl_depends_on = implementation.depends_on.clone().unwrap_or_default();
    let merged = DependsOn::merge(&root_depends_on, &command_depends_on, &impl_depends_on);

    let container_phase = if runtime == RuntimeKind::Container {
        implementation.container.as_ref().and_then(|c| c.depends_on.clone()).map(|depends_on| {
            let image = implementation
                .container
                .as_ref()
                .and_then(|c| c.image.clone())
                .ok_or_else(|| InvowkError::RuntimeNotAvailable {
                    runtime: "container".to_string(),
                    reason: "implementation has no container.image configured".to_string(),
                });
            image.map(|image| invowk_deps::ContainerPhase {
                depends_on,
                image,
                engine_hint: config.container_engine.clone(),
            })
        })
    } else {
        None
    };
    let container_phase = container_phase.transpose()?;

    let config_path = config.working_dir.clone();
    let mut execute_dependency = |name: &str| -> Result<bool> {
        cancellation.check()?;
        let found = cache.borrow_mut().get_or_discover(&config_path, name, || {
            Ok(resolve_by_name(config.command_set, name).map(|info| Arc::new(info.clone())))
        })?;
        let Some(info) = found else {
            return Ok(false);
        };
        let mut child_stack = stack.clone();
        child_stack.push(target.qualified_name.clone());
        let outcome = execute_internal(
            config,
            &info,
            InvocationInputs::default(),
            captured,
            cancellation.clone(),
            cache,
            child_stack,
        )?;
        Ok(outcome.is_success())
    };

    invowk_deps::validate(
        &merged,
        container_phase,
        captured,
        config.command_set,
        &mut execute_dependency,
    )?;

    let env = build_env(target, &implementation, captured, &inputs, config);

    // A per-implementation timeout derives a tighter deadline without
    // discarding the invocation-wide cancellation flag (§5).
    let cancellation = match implementation.timeout {
        Some(timeout) => cancellation.with_derived_deadline(timeout),
        None => cancellation,
    };

    let ctx = ExecutionContext {
        qualified_name: target.qualified_name.clone(),
        command: target.command.clone(),
        invowkfile: target.invowkfile.clone(),
        implementation,
        runtime,
        working_dir: config.working_dir.clone(),
        invowkfile_dir: target
            .file_path
            .parent()
            .map(|p| p.to_path_buf())
            .unwrap_or_else(|| config.working_dir.clone()),
        env,
        io: config.io,
        cancellation,
        cache: cache.clone(),
        stack,
    };

    dispatch(&ctx, config)
}

fn dispatch(ctx: &ExecutionContext, config: &DagConfig) -> Result<ExecutionOutcome> {
    match ctx.runtime {
        RuntimeKind::Native => NativeRuntime.execute(ctx),
        RuntimeKind::Virtual => VirtualRuntime.execute(ctx),
        RuntimeKind::Container => {
            let engine = ContainerRuntime::discover(config.container_engine.as_deref())?;
            engine.execute(ctx)
        }
    }
}

fn resolve_by_name<'a>(command_set: &'a CommandSet, name: &str) -> Option<&'a CommandInfo> {
    command_set.lookup_qualified(name).or_else(|| {
        let matches = command_set.by_simple_name(name);
        if matches.len() == 1 {
            Some(matches[0])
        } else {
            None
        }
    })
}

fn build_env(
    target: &CommandInfo,
    implementation: &invowk_core::Implementation,
    captured: &CapturedEnv,
    inputs: &InvocationInputs,
    config: &DagConfig,
) -> HashMap<String, String> {
    let mut env = inherited_env(captured, config);

    if let Some(command_env) = &target.command.env {
        env.extend(command_env.clone());
    }
    if let Some(impl_env) = &implementation.env {
        env.extend(impl_env.clone());
    }

    for (key, value) in project_flags(&target.command.flags, &inputs.flag_values) {
        env.insert(key, value);
    }
    for (key, value) in project_args(&target.command.args, &inputs.arg_values) {
        env.insert(key, value);
    }

    env.extend(config.env_file_vars.clone());
    env.extend(config.env_var_overrides.clone());

    env
}

fn inherited_env(captured: &CapturedEnv, config: &DagConfig) -> HashMap<String, String> {
    match config.env_inherit_mode {
        EnvInheritMode::None => HashMap::new(),
        EnvInheritMode::All => {
            let mut env = captured.as_map().clone();
            for key in &config.env_inherit_deny {
                env.remove(key);
            }
            env
        }
        EnvInheritMode::Allow => captured
            .as_map()
            .iter()
            .filter(|(key, _)| config.env_inherit_allow.contains(key))
            .map(|(key, value)| (key.clone(), value.clone()))
            .collect(),
    }
}
