//! The `native` runtime: runs the implementation's script through the
//! host shell as a child process, propagating cancellation and
//! timeouts by polling rather than blocking indefinitely on `wait()`.

use std::process::{Command as ProcessCommand, Stdio};
use std::thread;
use std::time::Duration;

use invowk_core::{InvowkError, Result};
use tracing::{info_span, warn};

use crate::context::{ExecutionContext, IoStreams};
use crate::executor::{resolve_script_text, ExecutionOutcome, RuntimeExecutor};

const POLL_INTERVAL: Duration = Duration::from_millis(25);

pub struct NativeRuntime;

impl RuntimeExecutor for NativeRuntime {
    fn execute(&self, ctx: &ExecutionContext) -> Result<ExecutionOutcome> {
        let _span = info_span!("native_execute", command = %ctx.qualified_name).entered();
        ctx.cancellation.check()?;

        let script_text = resolve_script_text(&ctx.implementation.script, &ctx.invowkfile_dir)?;

        let (shell, flag) = if cfg!(windows) {
            ("cmd", "/C")
        } else {
            ("sh", "-c")
        };

        let mut command = ProcessCommand::new(shell);
        command.arg(flag).arg(&script_text);
        command.current_dir(&ctx.working_dir);
        command.envs(&ctx.env);

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

        let mut child = command.spawn().map_err(|e| InvowkError::ScriptExecutionFailed {
            message: format!("failed to spawn '{shell}': {e}"),
        })?;

        loop {
            if let Some(status) = child.try_wait().map_err(|e| InvowkError::ScriptExecutionFailed {
                message: e.to_string(),
            })? {
                return Ok(ExecutionOutcome {
                    exit_code: status.code().unwrap_or(1),
                });
            }

            if let Err(e) = ctx.cancellation.check() {
                warn!(command = %ctx.qualified_name, "terminating child process due to cancellation");
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }

            thread::sleep(POLL_INTERVAL);
        }
    }
}
