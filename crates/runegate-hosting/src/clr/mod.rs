//! CLR backend: hosts an installed .NET runtime through the hostfxr
//! contract.
//!
//! Initialization runs once: the locator loads the hosting library, the
//! runtime is brought up against the runtime configuration artifact, an
//! error writer is registered, and the two delegates the bridge needs
//! (load-assembly and get-function-pointer) are acquired. The delegate set
//! is immutable afterwards.
//!
//! The runtime is never torn down. `hostfxr_close` is resolved to honor the
//! hosting contract but never invoked, and the hosting libraries are
//! deliberately leaked: the runtime does not support unloading its native
//! libraries, and releasing them is undefined behavior.

pub mod exports;

use crate::artifact_name;
use crate::host::{InvokeOutcome, RuntimeHost};
use crate::locator;
use exports::{
    CharT, CloseFn, ComponentEntryPointFn, GetFunctionPointerFn, GetRuntimeDelegateFn,
    InitializeForConfigFn, LoadAssemblyFn, SetErrorWriterFn, HDT_GET_FUNCTION_POINTER,
    HDT_LOAD_ASSEMBLY,
};
use libloading::{Library, Symbol};
use runegate_interop_core::{
    BridgeError, BridgeResult, DynValue, InitStatus, STATUS_SUCCESS,
};
use std::ffi::c_void;
use std::path::Path;
use std::ptr;
use tracing::{debug, error, info};

/// Delegates acquired from the initialized runtime. Immutable after
/// acquisition.
struct HostDelegates {
    load_assembly: LoadAssemblyFn,
    get_function_pointer: GetFunctionPointerFn,
}

/// A resolved managed entry point with the default component signature.
pub struct ClrEntryPoint(ComponentEntryPointFn);

/// The CLR backend. Holds the opaque host context handle and the acquired
/// delegate set for the process lifetime.
pub struct ClrRuntime {
    handle: *mut c_void,
    delegates: HostDelegates,
}

// SAFETY: the delegate pointers are immutable global process state owned by
// the runtime, and the context handle is an opaque token the runtime
// synchronizes internally.
unsafe impl Send for ClrRuntime {}
// SAFETY: see Send above; no interior mutability exists on this type.
unsafe impl Sync for ClrRuntime {}

impl ClrRuntime {
    /// Locates the runtime, initializes it against the configuration
    /// artifact, and acquires the hosting delegates.
    pub fn initialize(install_root: &Path, runtime_config: &Path) -> BridgeResult<Self> {
        let hosting = locator::locate_runtime_library(install_root)?;

        let init_for_config: InitializeForConfigFn =
            resolve_export(&hosting, b"hostfxr_initialize_for_runtime_config\0")?;
        let get_delegate: GetRuntimeDelegateFn =
            resolve_export(&hosting, b"hostfxr_get_runtime_delegate\0")?;
        let set_error_writer: SetErrorWriterFn =
            resolve_export(&hosting, b"hostfxr_set_error_writer\0")?;
        // Resolved per the hosting contract; never called. Unloading the
        // runtime is not supported.
        let _close: CloseFn = resolve_export(&hosting, b"hostfxr_close\0")?;

        // The raw export pointers above outlive the library handle; dropping
        // it would unload the hosting library, which is undefined behavior
        // once the runtime has started.
        std::mem::forget(hosting);

        let config_native = exports::path_to_native(runtime_config);
        let mut handle: *mut c_void = ptr::null_mut();
        // SAFETY: the config path is NUL-terminated and outlives the call;
        // null parameters select defaults; the handle out-pointer is a live
        // local.
        let status = unsafe { init_for_config(config_native.as_ptr(), ptr::null(), &mut handle) };

        match InitStatus::classify(status) {
            InitStatus::Ok if !handle.is_null() => {}
            InitStatus::EnvironmentMissing => {
                return Err(BridgeError::EnvironmentNotFound(format!(
                    "no compatible runtime installed for '{}' (status 0x{:08x})",
                    runtime_config.display(),
                    status
                )));
            }
            InitStatus::Ok => return Err(BridgeError::InitializationFailed(status)),
            InitStatus::Failed(code) => return Err(BridgeError::InitializationFailed(code)),
        }

        // SAFETY: the writer stays registered for the process lifetime.
        unsafe { set_error_writer(Some(forward_runtime_diagnostics)) };

        info!(config = %runtime_config.display(), "managed runtime initialized");

        let load_assembly = acquire_delegate(get_delegate, handle, HDT_LOAD_ASSEMBLY, "hdt_load_assembly")?;
        let get_function_pointer = acquire_delegate(
            get_delegate,
            handle,
            HDT_GET_FUNCTION_POINTER,
            "hdt_get_function_pointer",
        )?;

        let delegates = HostDelegates {
            // SAFETY: the runtime returned these pointers for the requested
            // delegate shapes.
            load_assembly: unsafe {
                std::mem::transmute::<*mut c_void, LoadAssemblyFn>(load_assembly)
            },
            // SAFETY: see above.
            get_function_pointer: unsafe {
                std::mem::transmute::<*mut c_void, GetFunctionPointerFn>(get_function_pointer)
            },
        };

        Ok(Self { handle, delegates })
    }

    /// The opaque host context handle, kept for the process lifetime.
    pub fn context_handle(&self) -> *const c_void {
        self.handle
    }
}

impl RuntimeHost for ClrRuntime {
    type EntryPoint = ClrEntryPoint;

    fn module_extension(&self) -> &'static str {
        "dll"
    }

    fn load_module(&mut self, path: &Path) -> BridgeResult<()> {
        let native = exports::path_to_native(path);
        // SAFETY: the path is NUL-terminated; null load context and reserved
        // pointers are the documented defaults.
        let status = unsafe {
            (self.delegates.load_assembly)(native.as_ptr(), ptr::null_mut(), ptr::null_mut())
        };
        if status != STATUS_SUCCESS {
            return Err(BridgeError::ModuleLoadFailed {
                module: artifact_name(path),
                status,
            });
        }
        debug!(module = %path.display(), "assembly loaded");
        Ok(())
    }

    fn resolve_function(
        &self,
        qualified_type: &str,
        function: &str,
    ) -> BridgeResult<ClrEntryPoint> {
        let type_native = exports::to_native(qualified_type);
        let fn_native = exports::to_native(function);
        let mut entry: *mut c_void = ptr::null_mut();

        // SAFETY: both name strings are NUL-terminated and outlive the call;
        // a null delegate-type name selects the default component entry point
        // signature.
        let status = unsafe {
            (self.delegates.get_function_pointer)(
                type_native.as_ptr(),
                fn_native.as_ptr(),
                ptr::null(),
                ptr::null_mut(),
                ptr::null_mut(),
                &mut entry,
            )
        };
        if status != STATUS_SUCCESS || entry.is_null() {
            return Err(BridgeError::FunctionResolutionFailed {
                qualified_type: qualified_type.to_string(),
                function: function.to_string(),
                status,
            });
        }

        // SAFETY: the runtime produced this pointer for the default component
        // entry point shape.
        Ok(ClrEntryPoint(unsafe {
            std::mem::transmute::<*mut c_void, ComponentEntryPointFn>(entry)
        }))
    }

    fn invoke(&self, entry: &ClrEntryPoint, args: &[DynValue]) -> BridgeResult<InvokeOutcome> {
        // Marshalled storage is pre-sized so pushes never reallocate while
        // raw pointers into it are live.
        let mut real_storage: Vec<f64> = Vec::with_capacity(args.len());
        let mut string_storage: Vec<Vec<CharT>> = Vec::with_capacity(args.len());

        enum Slot {
            Real(usize),
            Str(usize),
        }
        let mut slots: Vec<Slot> = Vec::with_capacity(args.len());

        for (index, arg) in args.iter().enumerate() {
            match arg {
                DynValue::Real(v) => {
                    real_storage.push(*v);
                    slots.push(Slot::Real(real_storage.len() - 1));
                }
                DynValue::Bool(b) => {
                    // Booleans travel as their numeric storage
                    real_storage.push(if *b { 1.0 } else { 0.0 });
                    slots.push(Slot::Real(real_storage.len() - 1));
                }
                DynValue::Str(s) => {
                    string_storage.push(exports::to_native(s));
                    slots.push(Slot::Str(string_storage.len() - 1));
                }
                DynValue::Undefined | DynValue::Array(_) => {
                    return Err(BridgeError::ArgumentMarshalUnsupported {
                        index,
                        kind: arg.kind(),
                    });
                }
            }
        }

        let mut pointers: Vec<*mut c_void> = Vec::with_capacity(slots.len());
        for slot in &slots {
            let ptr = match slot {
                // SAFETY: indices come from the pushes above and the storage
                // vectors are no longer grown.
                Slot::Real(i) => unsafe { real_storage.as_mut_ptr().add(*i) as *mut c_void },
                Slot::Str(i) => string_storage[*i].as_mut_ptr() as *mut c_void,
            };
            pointers.push(ptr);
        }

        let size_bytes = (pointers.len() * std::mem::size_of::<*mut c_void>()) as i32;
        // SAFETY: the entry point follows the default component signature;
        // the pointer vector and its backing storage stay alive across the
        // call.
        let ret = unsafe { (entry.0)(pointers.as_mut_ptr() as *mut c_void, size_bytes) };
        debug!(ret, "entry point returned");

        // The hosting contract exposes no exception object to the native
        // side; runtime errors arrive through the error writer instead.
        Ok(InvokeOutcome::Value(DynValue::Real(ret as f64)))
    }
}

/// Error-writer callback registered with the runtime. Forwards diagnostic
/// text into the log.
unsafe extern "C" fn forward_runtime_diagnostics(message: *const CharT) {
    // SAFETY: the runtime passes a NUL-terminated native string or null.
    let text = unsafe { exports::from_native(message) };
    error!(target: "runegate::clr", "{}", text);
}

/// Resolves a hosting-library export as a raw function pointer.
fn resolve_export<T: Copy>(library: &Library, name: &'static [u8]) -> BridgeResult<T> {
    // SAFETY: the requested symbol names and shapes come from the published
    // hosting headers.
    let symbol: Symbol<T> = unsafe { library.get(name) }.map_err(|e| {
        BridgeError::NativeLibrary(format!(
            "hosting export '{}' missing: {}",
            String::from_utf8_lossy(&name[..name.len().saturating_sub(1)]),
            e
        ))
    })?;
    Ok(*symbol)
}

fn acquire_delegate(
    get_delegate: GetRuntimeDelegateFn,
    handle: *mut c_void,
    delegate_type: i32,
    name: &'static str,
) -> BridgeResult<*mut c_void> {
    let mut delegate: *mut c_void = ptr::null_mut();
    // SAFETY: the handle came from successful initialization and the
    // out-pointer is a live local.
    let status = unsafe { get_delegate(handle, delegate_type, &mut delegate) };
    if status != STATUS_SUCCESS || delegate.is_null() {
        return Err(BridgeError::DelegateUnavailable { name, status });
    }
    Ok(delegate)
}
