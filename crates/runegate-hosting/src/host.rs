//! The hosting contract between the bridge and a runtime backend.

use runegate_interop_core::{BridgeResult, DynValue, ManagedError};
use std::path::Path;

/// A managed runtime backend hosted by the bridge.
///
/// Exactly one backend is active per build. The contract deliberately has no
/// shutdown operation: a hosted runtime stays initialized for the process
/// lifetime, and its modules stay loaded.
pub trait RuntimeHost {
    /// Backend-specific resolved entry point.
    type EntryPoint;

    /// File extension of this backend's module artifacts, without the dot.
    fn module_extension(&self) -> &'static str;

    /// Loads a module artifact into the runtime.
    fn load_module(&mut self, path: &Path) -> BridgeResult<()>;

    /// Resolves a function by assembly-qualified type name
    /// (`<namespace>.<type>, <module>`) and function name.
    fn resolve_function(
        &self,
        qualified_type: &str,
        function: &str,
    ) -> BridgeResult<Self::EntryPoint>;

    /// Invokes a resolved entry point with the given arguments.
    ///
    /// Marshalling failures are errors; a call that reached managed code and
    /// raised there reports [`InvokeOutcome::Fault`] instead.
    fn invoke(&self, entry: &Self::EntryPoint, args: &[DynValue]) -> BridgeResult<InvokeOutcome>;
}

/// Result of dispatching a call into the runtime.
#[derive(Debug)]
pub enum InvokeOutcome {
    /// The call returned a value.
    Value(DynValue),

    /// The managed side raised an exception.
    Fault(ManagedError),
}
