//! `ExecutionContext` (§3): one per executed command. Child
//! dependencies see a derived context sharing the same cancellation
//! token and request cache, with the DAG stack extended by the
//! parent's qualified name.

use std::cell::RefCell;
use std::collections::HashMap;
use std::path::PathBuf;
use std::rc::Rc;
use std::sync::Arc;

use invowk_core::{Command, Implementation, Invowkfile, RuntimeKind};
use invowk_discovery::RequestCache;

use crate::cancellation::CancellationToken;

/// Where a runtime executor should send the child process's stdio.
/// Defaults to inheriting the invoking process's streams, matching a
/// CLI tool users expect to behave like any other program on their
/// terminal.
#[derive(Debug, Clone, Copy, Default)]
pub enum IoStreams {
    #[default]
    Inherit,
    Null,
}

pub struct ExecutionContext {
    pub qualified_name: String,
    pub command: Arc<Command>,
    pub invowkfile: Arc<Invowkfile>,
    pub implementation: Implementation,
    pub runtime: RuntimeKind,
    pub working_dir: PathBuf,
    /// Directory containing the invowkfile that declared `command`,
    /// used to resolve `Script::File { file }` references.
    pub invowkfile_dir: PathBuf,
    pub env: HashMap<String, String>,
    pub io: IoStreams,
    pub cancellation: CancellationToken,
    pub cache: Rc<RefCell<RequestCache>>,
    /// Qualified names currently executing, for cycle detection
    /// (§4.6). The target's own name is pushed before dependency
    /// resolution begins.
    pub stack: Vec<String>,
}

impl ExecutionContext {
    /// Derives a child context for a dependency: same cancellation
    /// token and request cache, DAG stack extended with this
    /// context's own qualified name.
    pub fn derive_for_dependency(
        &self,
        qualified_name: String,
        command: Arc<Command>,
        invowkfile: Arc<Invowkfile>,
        implementation: Implementation,
        runtime: RuntimeKind,
        env: HashMap<String, String>,
    ) -> ExecutionContext {
        let mut stack = self.stack.clone();
        stack.push(self.qualified_name.clone());
        ExecutionContext {
            qualified_name,
            command,
            invowkfile,
            implementation,
            runtime,
            working_dir: self.working_dir.clone(),
            invowkfile_dir: self.invowkfile_dir.clone(),
            env,
            io: self.io,
            cancellation: self.cancellation.clone(),
            cache: self.cache.clone(),
            stack,
        }
    }

    pub fn is_in_stack(&self, qualified_name: &str) -> bool {
        self.stack.iter().any(|s| s == qualified_name) || self.qualified_name == qualified_name
    }
}
