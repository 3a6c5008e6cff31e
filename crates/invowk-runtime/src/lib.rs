//! Runtime Registry & DAG Executor (§4.5, §4.6): the component that
//! turns a resolved `CommandInfo` into a child-process exit code,
//! dispatching to the native, virtual, or container runtime and
//! recursively executing `depends_on.commands` entries first.

pub mod cancellation;
pub mod container;
pub mod context;
pub mod dag;
pub mod executor;
pub mod native;
pub mod ssh_helper;
pub mod virtual_shell;

pub use cancellation::CancellationToken;
pub use container::ContainerRuntime;
pub use context::{ExecutionContext, IoStreams};
pub use dag::{execute_target, DagConfig, EnvInheritMode, InvocationInputs};
pub use executor::{resolve_script_text, ExecutionOutcome, RuntimeExecutor};
pub use native::NativeRuntime;
pub use virtual_shell::VirtualRuntime;
