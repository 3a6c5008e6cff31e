//! Platform & runtime selection (§4.3): the current host's platform,
//! the command's default runtime on that platform, the effective
//! runtime once CLI/config overrides are applied, and the
//! `Implementation` that finally gets executed.

use invowk_core::{Command, Implementation, InvowkError, Platform, Result, RuntimeKind};

/// Implementations of `command` that declare support for `platform`,
/// in declaration order.
fn implementations_for_platform<'a>(
    command: &'a Command,
    platform: Platform,
) -> Vec<&'a Implementation> {
    command
        .implementations
        .iter()
        .filter(|imp| imp.platforms.contains(&platform))
        .collect()
}

/// The first runtime listed by the first implementation that supports
/// `platform` — the per-command default absent any override (§4.3).
pub fn default_runtime_for_platform(command: &Command, platform: Platform) -> Option<RuntimeKind> {
    implementations_for_platform(command, platform)
        .first()
        .and_then(|imp| imp.runtimes.first().copied())
}

fn allowed_runtimes(command: &Command, platform: Platform) -> Vec<RuntimeKind> {
    let mut allowed = Vec::new();
    for imp in implementations_for_platform(command, platform) {
        for runtime in &imp.runtimes {
            if !allowed.contains(runtime) {
                allowed.push(*runtime);
            }
        }
    }
    allowed
}

fn supported_platforms(command: &Command) -> Vec<Platform> {
    let mut platforms = Vec::new();
    for imp in &command.implementations {
        for p in &imp.platforms {
            if !platforms.contains(p) {
                platforms.push(*p);
            }
        }
    }
    platforms
}

/// Resolves the runtime this invocation will actually use, applying
/// the precedence CLI override > config default > per-command default
/// (§4.3), and validating it against the command's declared runtimes
/// for the current platform.
///
/// Only an explicit CLI override is a hard error when unsupported —
/// "a user override that the command does not support is a hard
/// error" (§4.3 step 4). The config default is a soft preference: if
/// the command doesn't support it on this platform, it's skipped in
/// favor of the per-command default rather than rejected.
pub fn effective_runtime(
    command: &Command,
    platform: Platform,
    cli_override: Option<RuntimeKind>,
    config_default: Option<RuntimeKind>,
) -> Result<RuntimeKind> {
    let allowed = allowed_runtimes(command, platform);
    if allowed.is_empty() {
        return Err(InvowkError::host_not_supported(
            command.name.clone(),
            platform.to_string(),
            supported_platforms(command).iter().map(|p| p.to_string()).collect(),
        ));
    }

    if let Some(requested) = cli_override {
        return if allowed.contains(&requested) {
            Ok(requested)
        } else {
            Err(InvowkError::runtime_not_allowed(
                command.name.clone(),
                requested.to_string(),
                allowed.iter().map(|r| r.to_string()).collect(),
            ))
        };
    }

    let requested = config_default
        .filter(|r| allowed.contains(r))
        .or_else(|| default_runtime_for_platform(command, platform));

    match requested {
        Some(r) => Ok(r),
        None => Err(InvowkError::host_not_supported(
            command.name.clone(),
            platform.to_string(),
            supported_platforms(command).iter().map(|p| p.to_string()).collect(),
        )),
    }
}

/// Finds the `Implementation` to execute for `(platform, runtime)`.
/// Callers should already have validated `runtime` via
/// `effective_runtime`; this picks the first implementation declaring
/// support for both, matching the declaration order used to compute
/// the default.
pub fn select_implementation(
    command: &Command,
    platform: Platform,
    runtime: RuntimeKind,
) -> Result<&Implementation> {
    command
        .implementations
        .iter()
        .find(|imp| imp.supports(platform, runtime))
        .ok_or_else(|| {
            InvowkError::host_not_supported(
                command.name.clone(),
                platform.to_string(),
                supported_platforms(command).iter().map(|p| p.to_string()).collect(),
            )
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use invowk_core::runtime::Script;

    fn command_with(implementations: Vec<Implementation>) -> Command {
        Command {
            name: "build".into(),
            description: String::new(),
            category: None,
            implementations,
            flags: vec![],
            args: vec![],
            env: None,
            depends_on: None,
        }
    }

    fn imp(runtimes: Vec<RuntimeKind>, platforms: Vec<Platform>) -> Implementation {
        Implementation {
            script: Script::Inline("true".into()),
            runtimes,
            platforms,
            timeout: None,
            env: None,
            depends_on: None,
            container: None,
        }
    }

    #[test]
    fn default_runtime_is_first_runtime_of_first_matching_implementation() {
        let command = command_with(vec![
            imp(vec![RuntimeKind::Virtual, RuntimeKind::Native], vec![Platform::Linux]),
            imp(vec![RuntimeKind::Container], vec![Platform::Macos]),
        ]);
        assert_eq!(
            default_runtime_for_platform(&command, Platform::Linux),
            Some(RuntimeKind::Virtual)
        );
        assert_eq!(
            default_runtime_for_platform(&command, Platform::Macos),
            Some(RuntimeKind::Container)
        );
        assert_eq!(default_runtime_for_platform(&command, Platform::Windows), None);
    }

    #[test]
    fn cli_override_wins_over_config_and_default() {
        let command = command_with(vec![imp(
            vec![RuntimeKind::Native, RuntimeKind::Container],
            vec![Platform::Linux],
        )]);
        let runtime = effective_runtime(
            &command,
            Platform::Linux,
            Some(RuntimeKind::Container),
            Some(RuntimeKind::Native),
        )
        .unwrap();
        assert_eq!(runtime, RuntimeKind::Container);
    }

    #[test]
    fn unsupported_platform_is_host_not_supported() {
        let command = command_with(vec![imp(vec![RuntimeKind::Native], vec![Platform::Linux])]);
        let err = effective_runtime(&command, Platform::Windows, None, None).unwrap_err();
        assert!(matches!(err, InvowkError::HostNotSupported { .. }));
    }

    #[test]
    fn disallowed_runtime_override_is_rejected() {
        let command = command_with(vec![imp(vec![RuntimeKind::Native], vec![Platform::Linux])]);
        let err = effective_runtime(&command, Platform::Linux, Some(RuntimeKind::Container), None)
            .unwrap_err();
        assert!(matches!(err, InvowkError::RuntimeNotAllowed { .. }));
    }

    #[test]
    fn unsupported_config_default_falls_back_to_per_command_default_silently() {
        let command = command_with(vec![imp(vec![RuntimeKind::Native], vec![Platform::Linux])]);
        let runtime = effective_runtime(&command, Platform::Linux, None, Some(RuntimeKind::Container))
            .unwrap();
        assert_eq!(runtime, RuntimeKind::Native);
    }

    #[test]
    fn select_implementation_finds_matching_binding() {
        let command = command_with(vec![
            imp(vec![RuntimeKind::Native], vec![Platform::Linux]),
            imp(vec![RuntimeKind::Container], vec![Platform::Linux]),
        ]);
        let selected = select_implementation(&command, Platform::Linux, RuntimeKind::Container).unwrap();
        assert!(selected.runtimes.contains(&RuntimeKind::Container));
    }
}
