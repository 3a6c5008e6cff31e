//! `RuntimeExecutor` (§4.5): the single `Execute` operation every
//! runtime (native, virtual, container) implements.

use std::path::Path;

use invowk_core::runtime::Script;
use invowk_core::{InvowkError, Result};

use crate::context::ExecutionContext;

#[derive(Debug, Clone, Copy)]
pub struct ExecutionOutcome {
    pub exit_code: i32,
}

impl ExecutionOutcome {
    pub fn success() -> Self {
        Self { exit_code: 0 }
    }

    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

pub trait RuntimeExecutor {
    fn execute(&self, ctx: &ExecutionContext) -> Result<ExecutionOutcome>;
}

/// Resolves an implementation's `Script` to the literal text to run,
/// reading `file` relative to `base_dir` (the invowkfile's own
/// directory) when it's a file reference.
pub fn resolve_script_text(script: &Script, base_dir: &Path) -> Result<String> {
    match script {
        Script::Inline(text) => Ok(text.clone()),
        Script::File { file } => {
            let path = if file.is_absolute() {
                file.clone()
            } else {
                base_dir.join(file)
            };
            std::fs::read_to_string(&path).map_err(|e| InvowkError::DiscoveryIo { path, source: e })
        }
    }
}
