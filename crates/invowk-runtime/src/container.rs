//! The `container` runtime: shells the script into the configured
//! container engine (`docker`, falling back to `podman`), serialized
//! process-wide via a file lock plus an in-process mutex — at most one
//! container invocation runs at a time per process (§4.5, §5).

use std::fs::OpenOptions;
use std::path::PathBuf;
use std::process::{Command as ProcessCommand, Stdio};
use std::sync::Mutex;

use fd_lock::RwLock;
use invowk_core::{InvowkError, Result};
use tracing::info_span;

use crate::context::{ExecutionContext, IoStreams};
use crate::executor::{resolve_script_text, ExecutionOutcome, RuntimeExecutor};

static CONTAINER_MUTEX: Mutex<()> = Mutex::new(());

pub struct ContainerRuntime {
    engine: String,
    lock_path: PathBuf,
}

impl ContainerRuntime {
    /// Resolves the engine binary the same way the teacher probes for
    /// a `docker-compose` program: try the configured name first, then
    /// fall back through a fixed preference list.
    pub fn discover(configured: Option<&str>) -> Result<Self> {
        let candidates: Vec<&str> = match configured {
            Some(name) => vec![name],
            None => vec!["docker", "podman"],
        };
        for candidate in candidates {
            if which::which(candidate).is_ok() {
                return Ok(Self {
                    engine: candidate.to_string(),
                    lock_path: default_lock_path(),
                });
            }
        }
        Err(InvowkError::ContainerEngineNotFound {
            engine: configured.unwrap_or("docker/podman").to_string(),
        })
    }
}

fn default_lock_path() -> PathBuf {
    std::env::temp_dir().join("invowk-container.lock")
}

impl RuntimeExecutor for ContainerRuntime {
    fn execute(&self, ctx: &ExecutionContext) -> Result<ExecutionOutcome> {
        let _span = info_span!("container_execute", command = %ctx.qualified_name).entered();
        ctx.cancellation.check()?;

        // In-process serialization first (cheap), then the cross-process
        // file lock — at most one container invocation at a time, even
        // across concurrent invowk processes sharing the same machine.
        let _process_guard = CONTAINER_MUTEX.lock().unwrap_or_else(|e| e.into_inner());

        let lock_file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(&self.lock_path)
            .map_err(|e| InvowkError::DiscoveryIo {
                path: self.lock_path.clone(),
                source: e,
            })?;
        let mut rw_lock = RwLock::new(lock_file);
        let _file_guard = rw_lock.write().map_err(|e| InvowkError::ScriptExecutionFailed {
            message: format!("failed to acquire container execution lock: {e}"),
        })?;

        let image = ctx
            .implementation
            .container
            .as_ref()
            .and_then(|c| c.image.clone())
            .ok_or_else(|| InvowkError::RuntimeNotAvailable {
                runtime: "container".to_string(),
                reason: "implementation has no container.image configured".to_string(),
            })?;

        let script_text = resolve_script_text(&ctx.implementation.script, &ctx.invowkfile_dir)?;

        let mut command = ProcessCommand::new(&self.engine);
        command.arg("run").arg("--rm");
        for (key, value) in &ctx.env {
            command.arg("-e").arg(format!("{key}={value}"));
        }
        command.arg(&image).arg("sh").arg("-c").arg(&script_text);

        match ctx.io {
            IoStreams::Inherit => {
                command.stdin(Stdio::inherit());
                command.stdout(Stdio::inherit());
                command.stderr(Stdio::inherit());
            }
            IoStreams::Null => {
                command.stdin(Stdio::null());
                command.stdout(Stdio::null());
                command.stderr(Stdio::null());
            }
        }

        let status = command.status().map_err(|e| InvowkError::ScriptExecutionFailed {
            message: format!("failed to run '{}': {e}", self.engine),
        })?;

        Ok(ExecutionOutcome {
            exit_code: status.code().unwrap_or(1),
        })
    }
}
