//! The process-wide bus.
//!
//! One signaling bus serves the whole client process. Install it after
//! login, look it up wherever events are published or consumed, and tear it
//! down on logout so the next login starts from a fresh bus.
use std::sync::Mutex;

use crate::{Error, Result, SignalBus};

static CURRENT: Mutex<Option<SignalBus>> = Mutex::new(None);

/// Make `bus` the process-wide bus.
///
/// Fails with [`Error::AlreadyInstalled`] while a live bus is installed. A
/// destroyed bus left behind is replaced.
pub fn install(bus: SignalBus) -> Result {
    let mut current = CURRENT.lock()?;
    if current.as_ref().is_some_and(|b| !b.is_destroyed()) {
        return Err(Error::AlreadyInstalled);
    }
    tracing::debug!(bus_id = %bus.id(), "Signal bus installed");
    *current = Some(bus);
    Ok(())
}

/// The installed bus, unless it was destroyed.
pub fn current() -> Option<SignalBus> {
    let current = CURRENT.lock().ok()?;
    current.as_ref().filter(|b| !b.is_destroyed()).cloned()
}

pub fn is_installed() -> bool {
    current().is_some()
}

/// Destroy and remove the installed bus. Returns it, if there was one.
pub fn teardown() -> Option<SignalBus> {
    let bus = CURRENT.lock().ok()?.take()?;
    bus.destroy();
    tracing::debug!(bus_id = %bus.id(), "Signal bus torn down");
    Some(bus)
}
