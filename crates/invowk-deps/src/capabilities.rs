//! Host capability probes (§4.4 "Capability probe registry"). A small
//! closed set of named, pure probes that the dependency validator
//! looks up by name. Capabilities are always evaluated against the
//! host, even during Phase 2 (container) validation.

use std::collections::HashMap;
use std::io::IsTerminal;
use std::net::TcpStream;
use std::sync::OnceLock;
use std::time::Duration;

use invowk_core::depends_on::CapabilitiesEntry;
use invowk_core::utils::is_safe_for_interpolation;
use invowk_core::{InvowkError, Result};

#[derive(Debug, thiserror::Error)]
#[error("capability probe '{0}' failed")]
pub struct ProbeError(pub String);

type Probe = fn() -> std::result::Result<bool, ProbeError>;

fn registry() -> &'static HashMap<&'static str, Probe> {
    static REGISTRY: OnceLock<HashMap<&'static str, Probe>> = OnceLock::new();
    REGISTRY.get_or_init(|| {
        let mut map: HashMap<&'static str, Probe> = HashMap::new();
        map.insert("lan-reachable", probe_lan_reachable);
        map.insert("internet-reachable", probe_internet_reachable);
        map.insert("tty", probe_tty);
        map
    })
}

fn probe_lan_reachable() -> std::result::Result<bool, ProbeError> {
    // Any non-loopback interface with an assigned address counts as
    // local-area-network reachability; invowk never probes a gateway.
    let has_non_loopback = std::net::UdpSocket::bind("0.0.0.0:0")
        .and_then(|socket| {
            socket.connect("10.255.255.255:1")?;
            socket.local_addr()
        })
        .map(|addr| !addr.ip().is_loopback())
        .unwrap_or(false);
    Ok(has_non_loopback)
}

fn probe_internet_reachable() -> std::result::Result<bool, ProbeError> {
    // Best-effort short TCP connect; never treated as a hard
    // prerequisite of other probes.
    let reachable = TcpStream::connect_timeout(
        &"1.1.1.1:443".parse().unwrap(),
        Duration::from_millis(500),
    )
    .is_ok();
    Ok(reachable)
}

fn probe_tty() -> std::result::Result<bool, ProbeError> {
    Ok(std::io::stdin().is_terminal())
}

pub fn run_probe(name: &str) -> std::result::Result<bool, ProbeError> {
    match registry().get(name) {
        Some(probe) => probe(),
        None => Err(ProbeError(name.to_string())),
    }
}

pub fn check_capabilities_entry(
    entry: &CapabilitiesEntry,
    missing: &mut Vec<String>,
) -> Result<()> {
    if entry.alternatives.is_empty() {
        return Ok(());
    }
    for name in &entry.alternatives {
        if !is_safe_for_interpolation(name) {
            return Err(InvowkError::UnsafeInterpolation { value: name.clone() });
        }
    }
    let satisfied = entry
        .alternatives
        .iter()
        .any(|name| run_probe(name).unwrap_or(false));
    if !satisfied {
        missing.push(entry.alternatives.join(" OR "));
    }
    Ok(())
}
