//! The `virtual` runtime: a scoped-down embedded shell interpreter
//! (§4.5 "Virtual shell boundary").

mod interpreter;
mod lexer;

use invowk_core::Result;
use tracing::info_span;

use crate::context::ExecutionContext;
use crate::executor::{resolve_script_text, ExecutionOutcome, RuntimeExecutor};
use interpreter::ShellState;

pub struct VirtualRuntime;

impl RuntimeExecutor for VirtualRuntime {
    fn execute(&self, ctx: &ExecutionContext) -> Result<ExecutionOutcome> {
        let _span = info_span!("virtual_execute", command = %ctx.qualified_name).entered();
        ctx.cancellation.check()?;

        let script_text = resolve_script_text(&ctx.implementation.script, &ctx.invowkfile_dir)?;
        let mut state = ShellState {
            cwd: ctx.working_dir.clone(),
            env: ctx.env.clone(),
        };

        let outcome = interpreter::run(&script_text, &mut state)?;
        Ok(ExecutionOutcome {
            exit_code: outcome.exit_code,
        })
    }
}
