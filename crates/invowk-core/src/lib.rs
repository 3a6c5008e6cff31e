//! Core data model, error types, and shared utilities for invowk.
//!
//! This crate has no knowledge of discovery, validation, or execution
//! — it only defines the shapes those layers operate on.

pub mod command;
pub mod depends_on;
pub mod error;
pub mod flag;
pub mod platform;
pub mod runtime;
pub mod source;
pub mod utils;

pub use command::{Command, Invowkfile, ModuleMetadata};
pub use depends_on::DependsOn;
pub use error::{DependencyFailure, InvowkError, Result};
pub use flag::{ArgDef, FlagDef, FlagKind, FlagValue};
pub use platform::Platform;
pub use runtime::{ContainerConfig, Implementation, RuntimeKind, Script};
pub use source::SourceId;
pub use utils::CapturedEnv;
