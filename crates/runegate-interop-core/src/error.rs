//! Error types for the bridge.

use crate::value::ValueKind;
use std::collections::BTreeMap;
use thiserror::Error;

/// Result alias for bridge operations.
pub type BridgeResult<T> = Result<T, BridgeError>;

/// Errors produced while hosting the runtime and dispatching calls.
#[derive(Debug, Error)]
pub enum BridgeError {
    /// The execution environment is not installed or could not be located.
    #[error("execution environment not found: {0}")]
    EnvironmentNotFound(String),

    /// Runtime initialization returned a failure status.
    #[error("runtime initialization failed with status 0x{0:08x}")]
    InitializationFailed(u32),

    /// A required hosting delegate could not be obtained after init.
    #[error("hosting delegate '{name}' unavailable, status 0x{status:08x}")]
    DelegateUnavailable {
        /// Delegate name as known to the hosting layer.
        name: &'static str,
        /// Raw status code from the delegate request.
        status: u32,
    },

    /// A module artifact failed to load into the runtime.
    #[error("failed to load module '{module}', status 0x{status:08x}")]
    ModuleLoadFailed {
        /// Module artifact name.
        module: String,
        /// Raw status code from the load call.
        status: u32,
    },

    /// A function could not be resolved inside a loaded module.
    #[error("failed to resolve '{function}' on '{qualified_type}', status 0x{status:08x}")]
    FunctionResolutionFailed {
        /// Assembly-qualified type string used for the lookup.
        qualified_type: String,
        /// Function name that was requested.
        function: String,
        /// Raw status code from the resolution call.
        status: u32,
    },

    /// An argument value cannot be represented across the boundary.
    #[error("argument {index} of kind '{kind}' cannot be marshalled")]
    ArgumentMarshalUnsupported {
        /// Zero-based position of the offending argument.
        index: usize,
        /// Kind tag of the offending argument.
        kind: ValueKind,
    },

    /// The invocation supplied a different number of arguments than the
    /// target declared.
    #[error("target declares {declared} argument(s) but {provided} were provided")]
    ArgumentCountMismatch {
        /// Argument count from the call target.
        declared: usize,
        /// Argument count supplied at invoke time.
        provided: usize,
    },

    /// The managed side raised an exception during the call.
    #[error("managed call raised: {0}")]
    ManagedException(ManagedError),

    /// An operation was attempted before its preconditions held, for
    /// example dispatching without a selected target.
    #[error("precondition violated: {0}")]
    PreconditionViolation(String),

    /// Filesystem access failed while locating or scanning artifacts.
    #[error("i/o error at '{path}': {source}")]
    Io {
        /// Path involved in the failed operation.
        path: String,
        /// Underlying error.
        #[source]
        source: std::io::Error,
    },

    /// A native library could not be opened or a symbol was missing.
    #[error("native library error: {0}")]
    NativeLibrary(String),
}

/// A structured fault raised by the managed side of a call.
///
/// Carries the exception message plus any backend-specific detail fields,
/// keyed by field name.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManagedError {
    /// Human-readable exception message.
    pub message: String,

    /// Backend-specific detail fields (source, stack frames, inner causes).
    pub fields: BTreeMap<String, String>,
}

impl ManagedError {
    /// Creates a fault with a message and no detail fields.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            fields: BTreeMap::new(),
        }
    }

    /// Adds a named detail field.
    pub fn with_field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fields.insert(key.into(), value.into());
        self
    }
}

impl std::fmt::Display for ManagedError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}
