//! SSH helper singleton (§5): an init-on-demand, idempotent-start,
//! teardown-on-shutdown collaborator used by container runs "when
//! enabled." The real forwarding daemon is an external process outside
//! this core's scope; this module only models the lifecycle contract
//! and ships a no-op default so the container runtime works fully
//! without it.

use std::sync::{Mutex, OnceLock};

use invowk_core::Result;

pub trait SshHelper: Send + Sync {
    fn start(&self) -> Result<()>;
    fn stop(&self) -> Result<()>;
}

struct NoopSshHelper;

impl SshHelper for NoopSshHelper {
    fn start(&self) -> Result<()> {
        Ok(())
    }

    fn stop(&self) -> Result<()> {
        Ok(())
    }
}

fn holder() -> &'static Mutex<Box<dyn SshHelper>> {
    static HOLDER: OnceLock<Mutex<Box<dyn SshHelper>>> = OnceLock::new();
    HOLDER.get_or_init(|| Mutex::new(Box::new(NoopSshHelper)))
}

/// Installs a custom SSH helper implementation, replacing the no-op
/// default. Intended to be called once, early in `main`.
pub fn install(helper: Box<dyn SshHelper>) {
    *holder().lock().unwrap_or_else(|e| e.into_inner()) = helper;
}

pub fn start() -> Result<()> {
    holder().lock().unwrap_or_else(|e| e.into_inner()).start()
}

pub fn stop() -> Result<()> {
    holder().lock().unwrap_or_else(|e| e.into_inner()).stop()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_helper_is_a_noop() {
        assert!(start().is_ok());
        assert!(stop().is_ok());
    }
}
