//! Embedded backend: hosts the statically-linked Wyrm interpreter.
//!
//! Because the interpreter is compiled into the bridge, the execution
//! environment is always present; initialization only checks the optional
//! runtime configuration artifact. Failures from the interpreter map onto
//! the same error taxonomy the external backend reports, with backend status
//! codes from the constant table below standing in for native status codes.

use crate::artifact_name;
use crate::host::{InvokeOutcome, RuntimeHost};
use runegate_interop_core::{BridgeError, BridgeResult, DynValue, ManagedError};
use serde::Deserialize;
use std::path::Path;
use tracing::{debug, info, warn};
use wyrm_vm::{CallOutcome, FunctionRef, ModuleLoader, Vm, VmError, VmFault, VmValue};

/// Backend status: configuration artifact unreadable or not valid JSON.
pub const VM_STATUS_CONFIG_INVALID: u32 = 0x0100_0001;
/// Backend status: configuration declares an unsupported format version.
pub const VM_STATUS_CONFIG_UNSUPPORTED: u32 = 0x0100_0002;
/// Backend status: module artifact unreadable.
pub const VM_STATUS_IMAGE_UNREADABLE: u32 = 0x0100_0011;
/// Backend status: module image malformed or failed validation.
pub const VM_STATUS_IMAGE_INVALID: u32 = 0x0100_0012;
/// Backend status: a module with the same ID is already loaded.
pub const VM_STATUS_DUPLICATE_MODULE: u32 = 0x0100_0013;
/// Backend status: module image ID does not match its artifact name.
pub const VM_STATUS_IMAGE_MISNAMED: u32 = 0x0100_0014;
/// Backend status: the qualified type string is not `<type>, <module>`.
pub const VM_STATUS_QUALIFIED_NAME_INVALID: u32 = 0x0100_0021;
/// Backend status: the named module is not loaded.
pub const VM_STATUS_MODULE_NOT_FOUND: u32 = 0x0100_0022;
/// Backend status: the named type does not exist in the module.
pub const VM_STATUS_TYPE_NOT_FOUND: u32 = 0x0100_0023;
/// Backend status: the named function does not exist on the type.
pub const VM_STATUS_FUNCTION_NOT_FOUND: u32 = 0x0100_0024;

/// Runtime-config format version this backend accepts.
const SUPPORTED_CONFIG_VERSION: u32 = 1;

/// The optional runtime configuration artifact, a small JSON document.
#[derive(Debug, Deserialize)]
struct RuntimeConfigDoc {
    version: u32,
}

/// The embedded interpreter backend.
#[derive(Debug)]
pub struct EmbeddedRuntime {
    vm: Vm,
}

impl EmbeddedRuntime {
    /// Brings up the embedded interpreter.
    ///
    /// A missing configuration artifact is accepted; a present one must
    /// parse as JSON and declare a supported format version.
    pub fn initialize(runtime_config: &Path) -> BridgeResult<Self> {
        if runtime_config.exists() {
            let text = std::fs::read_to_string(runtime_config).map_err(|e| {
                warn!(path = %runtime_config.display(), error = %e, "runtime config unreadable");
                BridgeError::InitializationFailed(VM_STATUS_CONFIG_INVALID)
            })?;
            let doc: RuntimeConfigDoc = serde_json::from_str(&text).map_err(|e| {
                warn!(path = %runtime_config.display(), error = %e, "runtime config malformed");
                BridgeError::InitializationFailed(VM_STATUS_CONFIG_INVALID)
            })?;
            if doc.version != SUPPORTED_CONFIG_VERSION {
                warn!(
                    declared = doc.version,
                    supported = SUPPORTED_CONFIG_VERSION,
                    "runtime config version unsupported"
                );
                return Err(BridgeError::InitializationFailed(
                    VM_STATUS_CONFIG_UNSUPPORTED,
                ));
            }
        } else {
            debug!(path = %runtime_config.display(), "no runtime config present, using defaults");
        }

        info!("embedded runtime initialized");
        Ok(Self { vm: Vm::new() })
    }

    /// Number of modules currently loaded.
    pub fn module_count(&self) -> usize {
        self.vm.module_count()
    }
}

impl RuntimeHost for EmbeddedRuntime {
    type EntryPoint = FunctionRef;

    fn module_extension(&self) -> &'static str {
        "wyb"
    }

    fn load_module(&mut self, path: &Path) -> BridgeResult<()> {
        let module = artifact_name(path);

        let image = ModuleLoader::load(path).map_err(|e| {
            warn!(module = %module, error = %e, "module image rejected");
            BridgeError::ModuleLoadFailed {
                module: module.clone(),
                status: load_failure_status(&e),
            }
        })?;

        // Resolution addresses modules by artifact stem, so the embedded ID
        // must agree with the file name
        let stem = artifact_stem(path);
        if image.metadata.module_id != stem {
            warn!(
                module = %module,
                embedded_id = %image.metadata.module_id,
                "module image ID does not match artifact name"
            );
            return Err(BridgeError::ModuleLoadFailed {
                module,
                status: VM_STATUS_IMAGE_MISNAMED,
            });
        }

        self.vm.load_image(image).map_err(|e| {
            warn!(module = %module, error = %e, "module load rejected");
            BridgeError::ModuleLoadFailed {
                module,
                status: load_failure_status(&e),
            }
        })
    }

    fn resolve_function(
        &self,
        qualified_type: &str,
        function: &str,
    ) -> BridgeResult<FunctionRef> {
        let (type_name, module_id) = match qualified_type.split_once(", ") {
            Some((type_name, module_id)) => (type_name, module_id),
            None => {
                return Err(BridgeError::FunctionResolutionFailed {
                    qualified_type: qualified_type.to_string(),
                    function: function.to_string(),
                    status: VM_STATUS_QUALIFIED_NAME_INVALID,
                });
            }
        };

        self.vm.resolve(module_id, type_name, function).map_err(|e| {
            debug!(
                qualified_type = %qualified_type,
                function = %function,
                error = %e,
                "function resolution failed"
            );
            BridgeError::FunctionResolutionFailed {
                qualified_type: qualified_type.to_string(),
                function: function.to_string(),
                status: resolve_failure_status(&e),
            }
        })
    }

    fn invoke(&self, entry: &FunctionRef, args: &[DynValue]) -> BridgeResult<InvokeOutcome> {
        let mut vm_args: Vec<VmValue> = Vec::with_capacity(args.len());
        for (index, arg) in args.iter().enumerate() {
            vm_args.push(match arg {
                DynValue::Real(v) => VmValue::Float(*v),
                DynValue::Bool(b) => VmValue::Bool(*b),
                DynValue::Str(s) => VmValue::Str(s.clone()),
                DynValue::Undefined | DynValue::Array(_) => {
                    return Err(BridgeError::ArgumentMarshalUnsupported {
                        index,
                        kind: arg.kind(),
                    });
                }
            });
        }

        match self.vm.call(entry, &vm_args) {
            Ok(CallOutcome::Return(value)) => Ok(InvokeOutcome::Value(surface_value(value))),
            Ok(CallOutcome::Fault(fault)) => {
                Ok(InvokeOutcome::Fault(fault_to_managed(entry, fault)))
            }
            // Interpreter-level rejections (arity, depth, integrity) surface
            // as faults too: the environment refused or aborted the call
            Err(e) => Ok(InvokeOutcome::Fault(
                ManagedError::new(e.to_string()).with_field("Source", entry.module_id.clone()),
            )),
        }
    }
}

fn surface_value(value: VmValue) -> DynValue {
    match value {
        VmValue::Null => DynValue::Undefined,
        VmValue::Bool(b) => DynValue::Bool(b),
        VmValue::Int(i) => DynValue::Real(i as f64),
        VmValue::Float(f) => DynValue::Real(f),
        VmValue::Str(s) => DynValue::Str(s),
    }
}

fn fault_to_managed(entry: &FunctionRef, fault: VmFault) -> ManagedError {
    let message = fault.message.clone();
    let mut err = ManagedError::new(message.clone())
        .with_field("Message", message)
        .with_field("Source", entry.module_id.clone());
    if !fault.frames.is_empty() {
        err = err.with_field("StackTrace", fault.frames.join(" <- "));
    }
    err
}

fn load_failure_status(error: &VmError) -> u32 {
    match error {
        VmError::Io(_) => VM_STATUS_IMAGE_UNREADABLE,
        VmError::DuplicateModule(_) => VM_STATUS_DUPLICATE_MODULE,
        _ => VM_STATUS_IMAGE_INVALID,
    }
}

fn resolve_failure_status(error: &VmError) -> u32 {
    match error {
        VmError::ModuleNotFound(_) => VM_STATUS_MODULE_NOT_FOUND,
        VmError::TypeNotFound(_) => VM_STATUS_TYPE_NOT_FOUND,
        VmError::FunctionNotFound(_) => VM_STATUS_FUNCTION_NOT_FOUND,
        _ => VM_STATUS_QUALIFIED_NAME_INVALID,
    }
}

fn artifact_stem(path: &Path) -> String {
    path.file_stem()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
