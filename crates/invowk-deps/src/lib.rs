//! Dependency validation for invowk (§4.4): six dependency kinds,
//! host/container two-phase orchestration, and the capability probe
//! registry.

pub mod capabilities;
pub mod commands;
pub mod custom_checks;
pub mod env_vars;
pub mod filepaths;
pub mod orchestrator;
pub mod shell_target;
pub mod tools;

pub use capabilities::{run_probe, ProbeError};
pub use orchestrator::{validate, validate_phase, ContainerPhase};
pub use shell_target::ContainerTarget;
