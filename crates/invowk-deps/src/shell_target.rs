//! Where a dependency's shell probe script actually runs (§4.4): the
//! host's native shell for Phase 1, or a throwaway invocation of the
//! selected container image for Phase 2. `tools`, `filepaths`, and
//! `env_vars` have their own non-shell host-side checks and only
//! reach for this when checking a container; `custom_checks` always
//! shells out, on either side.

use std::process::Command as ProcessCommand;

use invowk_core::{InvowkError, Result};

pub struct CheckOutcome {
    pub exit_code: i32,
    pub stdout: String,
}

/// A throwaway `<engine> run --rm <image> sh -c <script>` invocation,
/// resolved the same way the `container` runtime resolves its engine.
pub struct ContainerTarget {
    engine: String,
    image: String,
}

impl ContainerTarget {
    pub fn discover(engine_hint: Option<&str>, image: String) -> Result<Self> {
        let candidates: Vec<&str> = match engine_hint {
            Some(name) => vec![name],
            None => vec!["docker", "podman"],
        };
        for candidate in candidates {
            if which::which(candidate).is_ok() {
                return Ok(Self {
                    engine: candidate.to_string(),
                    image,
                });
            }
        }
        Err(InvowkError::ContainerEngineNotFound {
            engine: engine_hint.unwrap_or("docker/podman").to_string(),
        })
    }

    pub(crate) fn run(&self, script: &str) -> Result<CheckOutcome> {
        let output = ProcessCommand::new(&self.engine)
            .arg("run")
            .arg("--rm")
            .arg(&self.image)
            .arg("sh")
            .arg("-c")
            .arg(script)
            .output()
            .map_err(|e| InvowkError::ScriptExecutionFailed {
                message: format!("failed to run '{}' for an in-container dependency check: {e}", self.engine),
            })?;
        Ok(CheckOutcome {
            exit_code: output.status.code().unwrap_or(1),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
        })
    }
}

fn run_on_host(script: &str) -> Result<CheckOutcome> {
    let shell = if cfg!(windows) { "cmd" } else { "sh" };
    let flag = if cfg!(windows) { "/C" } else { "-c" };
    let output = ProcessCommand::new(shell)
        .arg(flag)
        .arg(script)
        .output()
        .map_err(|e| InvowkError::ScriptExecutionFailed {
            message: e.to_string(),
        })?;
    Ok(CheckOutcome {
        exit_code: output.status.code().unwrap_or(1),
        stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
    })
}

/// `custom_checks` alternatives run the same script either way; only
/// where it runs differs.
pub enum ShellTarget<'a> {
    Host,
    Container(&'a ContainerTarget),
}

impl<'a> ShellTarget<'a> {
    pub fn run(&self, script: &str) -> Result<CheckOutcome> {
        match self {
            ShellTarget::Host => run_on_host(script),
            ShellTarget::Container(target) => target.run(script),
        }
    }
}
