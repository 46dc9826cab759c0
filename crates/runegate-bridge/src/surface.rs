//! The fixed host-facing call surface.
//!
//! The host scripting layer talks to exactly two operations: select a call
//! target, then invoke it with arguments. Both are safe to call at any
//! time, in any state; nothing here can crash the host process.

use crate::dispatch::Bridge;
use runegate_hosting::RuntimeHost;
use runegate_interop_core::{BridgeError, BridgeResult, CallTarget, DynValue};
use std::sync::Mutex;
use tracing::{error, warn};

/// Distinguished error value handed to the host when any stage of a call
/// fails.
pub const INTEROP_ERROR: &str = "INTEROP ERROR";

/// The process-wide call surface.
///
/// Holds the bridge (when bootstrap succeeded) and the single selected-call
/// mailbox. The mailbox mutex makes select and invoke individually atomic,
/// and invoke holds the lock for its full duration, so a concurrent select
/// cannot swap the target mid-dispatch.
pub struct CallSurface<R: RuntimeHost> {
    bridge: Option<Bridge<R>>,
    pending: Mutex<Option<CallTarget>>,
}

impl<R: RuntimeHost> CallSurface<R> {
    /// A live surface over a bootstrapped bridge.
    pub fn new(bridge: Bridge<R>) -> Self {
        Self {
            bridge: Some(bridge),
            pending: Mutex::new(None),
        }
    }

    /// A permanently disabled surface, used when bootstrap failed.
    ///
    /// Selects are still accepted; invokes report the error value. The
    /// host's scripts keep running either way.
    pub fn disabled() -> Self {
        Self {
            bridge: None,
            pending: Mutex::new(None),
        }
    }

    /// Whether a bridge is live behind this surface.
    pub fn is_enabled(&self) -> bool {
        self.bridge.is_some()
    }

    /// Stores the target for the next invoke, replacing any previous one.
    /// Always reports success to the host; no resolution happens here.
    pub fn select_call_target(&self, target: CallTarget) -> DynValue {
        match self.pending.lock() {
            Ok(mut slot) => *slot = Some(target),
            Err(poisoned) => *poisoned.into_inner() = Some(target),
        }
        DynValue::Real(1.0)
    }

    /// Invokes the currently selected call with the given arguments.
    ///
    /// Never fails outright: every error is logged and collapsed to the
    /// distinguished [`INTEROP_ERROR`] string value. The selected target is
    /// not consumed; invoking it again is permitted until the next select
    /// overwrites it.
    pub fn invoke_selected_call(&self, args: &[DynValue]) -> DynValue {
        let slot = match self.pending.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };

        match self.dispatch(&slot, args) {
            Ok(value) => value,
            Err(e) => {
                error!(error = %e, "call collapsed to error value");
                DynValue::Str(INTEROP_ERROR.to_string())
            }
        }
    }

    fn dispatch(&self, slot: &Option<CallTarget>, args: &[DynValue]) -> BridgeResult<DynValue> {
        let bridge = self.bridge.as_ref().ok_or_else(|| {
            warn!("bridge is disabled, dropping call");
            BridgeError::PreconditionViolation("bridge is disabled".to_string())
        })?;

        let target = slot.as_ref().ok_or_else(|| {
            BridgeError::PreconditionViolation("no call target selected".to_string())
        })?;

        bridge.invoke_target(target, args)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runegate_hosting::InvokeOutcome;
    use runegate_interop_core::BridgeResult;
    use std::path::Path;
    use tempfile::TempDir;

    struct EchoRuntime;

    impl RuntimeHost for EchoRuntime {
        type EntryPoint = String;

        fn module_extension(&self) -> &'static str {
            "stub"
        }

        fn load_module(&mut self, _path: &Path) -> BridgeResult<()> {
            Ok(())
        }

        fn resolve_function(&self, _qualified_type: &str, function: &str) -> BridgeResult<String> {
            Ok(function.to_string())
        }

        fn invoke(&self, entry: &String, _args: &[DynValue]) -> BridgeResult<InvokeOutcome> {
            Ok(InvokeOutcome::Value(DynValue::Str(entry.clone())))
        }
    }

    fn live_surface() -> (CallSurface<EchoRuntime>, TempDir) {
        let dir = TempDir::new().unwrap();
        let bridge = Bridge::new(EchoRuntime, dir.path());
        (CallSurface::new(bridge), dir)
    }

    fn target(function: &str) -> CallTarget {
        CallTarget::new("Mod.stub", "Ns", "Type", function, 0)
    }

    #[test]
    fn test_invoke_without_select_reports_error_value() {
        let (surface, _dir) = live_surface();
        assert_eq!(
            surface.invoke_selected_call(&[]),
            DynValue::Str(INTEROP_ERROR.to_string())
        );
    }

    #[test]
    fn test_disabled_surface_accepts_select_and_drops_invoke() {
        let surface: CallSurface<EchoRuntime> = CallSurface::disabled();
        assert!(!surface.is_enabled());

        assert_eq!(surface.select_call_target(target("Do")), DynValue::Real(1.0));
        assert_eq!(
            surface.invoke_selected_call(&[]),
            DynValue::Str(INTEROP_ERROR.to_string())
        );
    }

    #[test]
    fn test_select_then_invoke() {
        let (surface, _dir) = live_surface();
        surface.select_call_target(target("Greet"));
        assert_eq!(
            surface.invoke_selected_call(&[]),
            DynValue::Str("Greet".to_string())
        );
    }

    #[test]
    fn test_target_not_consumed_by_invoke() {
        let (surface, _dir) = live_surface();
        surface.select_call_target(target("Again"));
        surface.invoke_selected_call(&[]);
        assert_eq!(
            surface.invoke_selected_call(&[]),
            DynValue::Str("Again".to_string())
        );
    }

    #[test]
    fn test_select_overwrites_previous_target() {
        let (surface, _dir) = live_surface();
        surface.select_call_target(target("First"));
        surface.select_call_target(target("Second"));
        assert_eq!(
            surface.invoke_selected_call(&[]),
            DynValue::Str("Second".to_string())
        );
    }
}
