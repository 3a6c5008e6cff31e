//! Discovery, resolution, and platform/runtime selection for invowk
//! (§4.1-4.3, §4.7).

pub mod command_set;
pub mod cuelite;
pub mod discovery;
pub mod loader;
pub mod platform_runtime;
pub mod request_cache;
pub mod resolver;
pub mod sources;

pub use command_set::{CommandInfo, CommandSet, CommandSetBuilder, Diagnostic};
pub use discovery::{discover_and_validate_command_set, discover_command_set, get_command, DiscoveryOutcome};
pub use platform_runtime::{default_runtime_for_platform, effective_runtime, select_implementation};
pub use request_cache::RequestCache;
pub use resolver::{parse_source_filter, resolve, Resolution, SourceFilter};
pub use sources::{list_module_dirs, DiscoveryConfig, ModuleDir, MODULE_MANIFEST, MODULE_SUFFIX, WORKSPACE_FILE};
