//! Typed call dispatch into the hosted runtime.

use crate::registry::ModuleRegistry;
use runegate_hosting::{InvokeOutcome, RuntimeHost};
use runegate_interop_core::{BridgeError, BridgeResult, CallTarget, DynValue};
use std::path::Path;
use tracing::{debug, error};

/// An initialized runtime plus its loaded module registry.
///
/// Construction is the ordering guarantee: a `Bridge` only exists after the
/// backend initialized, and the mods directory is scanned while it is
/// built. There is no teardown; the bridge lives until process exit.
pub struct Bridge<R: RuntimeHost> {
    runtime: R,
    registry: ModuleRegistry,
}

impl<R: RuntimeHost> Bridge<R> {
    /// Builds a bridge by loading every module under `mods_dir` into an
    /// initialized runtime.
    pub fn new(mut runtime: R, mods_dir: &Path) -> Self {
        let registry = ModuleRegistry::load_all(&mut runtime, mods_dir);
        Self { runtime, registry }
    }

    /// The loaded module registry.
    pub fn registry(&self) -> &ModuleRegistry {
        &self.registry
    }

    /// The hosted runtime backend.
    pub fn runtime(&self) -> &R {
        &self.runtime
    }

    /// Dispatches one call described by `target`.
    ///
    /// Resolution happens on every dispatch; nothing is cached, so a target
    /// that failed to resolve can be corrected and retried. The argument
    /// count is validated against the target's declared count before the
    /// call is made.
    pub fn invoke_target(&self, target: &CallTarget, args: &[DynValue]) -> BridgeResult<DynValue> {
        let qualified_type = target.assembly_qualified_type(self.runtime.module_extension());
        debug!(
            module = %target.module,
            qualified_type = %qualified_type,
            function = %target.function,
            "dispatching call"
        );

        let entry = self
            .runtime
            .resolve_function(&qualified_type, &target.function)
            .map_err(|e| {
                error!(
                    module = %target.module,
                    qualified_type = %qualified_type,
                    function = %target.function,
                    error = %e,
                    "function resolution failed"
                );
                e
            })?;

        if args.len() != target.argc {
            return Err(BridgeError::ArgumentCountMismatch {
                declared: target.argc,
                provided: args.len(),
            });
        }

        match self.runtime.invoke(&entry, args)? {
            InvokeOutcome::Value(value) => Ok(value),
            InvokeOutcome::Fault(fault) => {
                error!(
                    function = %target.function,
                    message = %fault.message,
                    "managed call raised"
                );
                for (field, value) in &fault.fields {
                    error!(field = %field, value = %value, "fault detail");
                }
                Err(BridgeError::ManagedException(fault))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use runegate_interop_core::ManagedError;
    use tempfile::TempDir;

    /// Resolves everything except types containing "Ghost"; `Fail`
    /// functions fault when invoked, everything else echoes its argument
    /// count.
    struct StubRuntime;

    impl RuntimeHost for StubRuntime {
        type EntryPoint = String;

        fn module_extension(&self) -> &'static str {
            "stub"
        }

        fn load_module(&mut self, _path: &Path) -> BridgeResult<()> {
            Ok(())
        }

        fn resolve_function(&self, qualified_type: &str, function: &str) -> BridgeResult<String> {
            if qualified_type.contains("Ghost") {
                return Err(BridgeError::FunctionResolutionFailed {
                    qualified_type: qualified_type.to_string(),
                    function: function.to_string(),
                    status: 0x8013_1522,
                });
            }
            Ok(function.to_string())
        }

        fn invoke(&self, entry: &String, args: &[DynValue]) -> BridgeResult<InvokeOutcome> {
            if entry == "Fail" {
                return Ok(InvokeOutcome::Fault(
                    ManagedError::new("stub fault").with_field("Source", "Stub"),
                ));
            }
            Ok(InvokeOutcome::Value(DynValue::Real(args.len() as f64)))
        }
    }

    fn stub_bridge() -> (Bridge<StubRuntime>, TempDir) {
        let dir = TempDir::new().unwrap();
        (Bridge::new(StubRuntime, dir.path()), dir)
    }

    fn target(type_name: &str, function: &str, argc: usize) -> CallTarget {
        CallTarget::new("Mod.stub", "Ns", type_name, function, argc)
    }

    #[test]
    fn test_invoke_returns_value() {
        let (bridge, _dir) = stub_bridge();
        let value = bridge
            .invoke_target(&target("Thing", "Do", 2), &[DynValue::Real(1.0), DynValue::Real(2.0)])
            .unwrap();
        assert_eq!(value, DynValue::Real(2.0));
    }

    #[test]
    fn test_resolution_failure_propagates() {
        let (bridge, _dir) = stub_bridge();
        let err = bridge
            .invoke_target(&target("Ghost", "Do", 0), &[])
            .unwrap_err();
        assert!(matches!(err, BridgeError::FunctionResolutionFailed { .. }));
    }

    #[test]
    fn test_argument_count_mismatch_rejected() {
        let (bridge, _dir) = stub_bridge();
        let err = bridge
            .invoke_target(&target("Thing", "Do", 2), &[DynValue::Real(1.0)])
            .unwrap_err();
        assert!(matches!(
            err,
            BridgeError::ArgumentCountMismatch {
                declared: 2,
                provided: 1
            }
        ));
    }

    #[test]
    fn test_fault_becomes_managed_exception() {
        let (bridge, _dir) = stub_bridge();
        let err = bridge
            .invoke_target(&target("Thing", "Fail", 0), &[])
            .unwrap_err();
        match err {
            BridgeError::ManagedException(fault) => {
                assert_eq!(fault.message, "stub fault");
                assert_eq!(fault.fields.get("Source").map(String::as_str), Some("Stub"));
            }
            other => panic!("expected managed exception, got {:?}", other),
        }
    }
}
