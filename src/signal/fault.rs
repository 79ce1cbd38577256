//! Process-wide sink for handler failures.

use parking_lot::RwLock;
use std::any::Any;
use std::fmt;
use std::sync::Arc;

/// A signal handler that failed during delivery.
#[derive(Debug)]
pub enum SignalFault {
    /// The handler returned an error.
    Failed(anyhow::Error),
    /// The handler panicked; carries the panic message.
    Panicked(String),
}

impl SignalFault {
    pub(super) fn panicked(payload: Box<dyn Any + Send>) -> Self {
        let message = payload
            .downcast_ref::<&str>()
            .map(|s| (*s).to_string())
            .or_else(|| payload.downcast_ref::<String>().cloned())
            .unwrap_or_else(|| "non-string panic payload".to_string());
        Self::Panicked(message)
    }
}

impl fmt::Display for SignalFault {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Failed(error) => write!(f, "handler failed: {error:#}"),
            Self::Panicked(message) => write!(f, "handler panicked: {message}"),
        }
    }
}

/// Callback invoked for every handler fault.
pub type FaultHook = Arc<dyn Fn(&SignalFault) + Send + Sync>;

static FAULT_HOOK: RwLock<Option<FaultHook>> = parking_lot::const_rwlock(None);

/// Install the fault hook, returning the previous one.
///
/// Without a hook, faults are logged at `error` level.
pub fn set_fault_hook<F>(hook: F) -> Option<FaultHook>
where
    F: Fn(&SignalFault) + Send + Sync + 'static,
{
    FAULT_HOOK.write().replace(Arc::new(hook))
}

/// Remove the fault hook and go back to logging.
pub fn clear_fault_hook() -> Option<FaultHook> {
    FAULT_HOOK.write().take()
}

pub(super) fn report(fault: SignalFault) {
    let hook = FAULT_HOOK.read().clone();
    match hook {
        Some(hook) => hook(&fault),
        None => tracing::error!(fault = %fault, "Signal handler fault"),
    }
}
