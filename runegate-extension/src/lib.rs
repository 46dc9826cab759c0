//! # runegate-extension
//!
//! The bridge extension loaded into the host game process.
//!
//! This crate provides:
//! - The process-wide bridge singleton over the build-time runtime backend
//! - The exported C ABI the host's scripting layer binds against
//! - `bridge.toml` configuration and one-time logging bootstrap
//!
//! ## Exported surface
//!
//! ```text
//! runegate_bridge_init() -> i32                      0 live, 1 disabled
//! runegate_select_call_target(result, argc, argv)
//! runegate_invoke_selected_call(result, argc, argv)
//! runegate_string_release(ptr)
//! ```
//!
//! Every export is safe to call at any time and in any order. Failures are
//! reported through result values and the log, never by unwinding into or
//! aborting the host process.

pub mod abi;
pub mod config;

use abi::RawValue;
use config::BridgeConfig;
use runegate_bridge::{Bridge, CallSurface, INTEROP_ERROR};
use runegate_hosting::{initialize_runtime, ActiveRuntime};
use runegate_interop_core::{CallTarget, DynValue};
use std::ffi::c_char;
use std::ptr;
use std::sync::OnceLock;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

static SURFACE: OnceLock<CallSurface<ActiveRuntime>> = OnceLock::new();

/// Initializes the bridge singleton.
///
/// Idempotent: the first call does the work, later calls report the
/// existing state. Returns `0` when the bridge is live and `1` when it came
/// up disabled because the runtime could not be initialized; the host keeps
/// running either way.
#[no_mangle]
pub extern "C" fn runegate_bridge_init() -> i32 {
    let surface = SURFACE.get_or_init(bootstrap);
    if surface.is_enabled() {
        0
    } else {
        1
    }
}

/// Stores the call described by the quintuple
/// `(module, namespace, type, function, argc)` for the next invoke.
///
/// Writes real `1.0` into `result` on success, and the distinguished error
/// string when the quintuple is malformed or the bridge was never
/// initialized.
///
/// # Safety
///
/// `result` must be null or writable. `argv` must be null or point to
/// `argc` readable values whose string payloads are NUL-terminated.
#[no_mangle]
pub unsafe extern "C" fn runegate_select_call_target(
    result: *mut RawValue,
    argc: i32,
    argv: *const RawValue,
) {
    // SAFETY: the caller upholds the argv contract
    let args = unsafe { read_args(argc, argv) };

    let value = match surface() {
        Some(surface) => match args.as_deref().and_then(parse_target) {
            Some(target) => surface.select_call_target(target),
            None => {
                error!(argc, "malformed select quintuple");
                DynValue::Str(INTEROP_ERROR.to_string())
            }
        },
        None => DynValue::Str(INTEROP_ERROR.to_string()),
    };

    // SAFETY: the caller upholds the result contract
    unsafe { write_result(result, &value) };
}

/// Invokes the currently selected call with the given arguments, writing
/// the marshalled result (or the distinguished error string) into
/// `result`.
///
/// # Safety
///
/// Same contracts as [`runegate_select_call_target`]. A string payload in
/// the written result is owned by the host and must be released through
/// [`runegate_string_release`].
#[no_mangle]
pub unsafe extern "C" fn runegate_invoke_selected_call(
    result: *mut RawValue,
    argc: i32,
    argv: *const RawValue,
) {
    // SAFETY: the caller upholds the argv contract
    let args = unsafe { read_args(argc, argv) };

    let value = match surface() {
        Some(surface) => match args {
            Some(args) => surface.invoke_selected_call(&args),
            None => {
                error!(argc, "argument vector unreadable");
                DynValue::Str(INTEROP_ERROR.to_string())
            }
        },
        None => DynValue::Str(INTEROP_ERROR.to_string()),
    };

    // SAFETY: the caller upholds the result contract
    unsafe { write_result(result, &value) };
}

/// Releases a string the bridge allocated into a result value.
///
/// # Safety
///
/// `ptr` must be null or a string pointer received in a result `RawValue`,
/// released at most once.
#[no_mangle]
pub unsafe extern "C" fn runegate_string_release(ptr: *mut c_char) {
    // SAFETY: forwarded contract
    unsafe { RawValue::release_text(ptr) };
}

fn bootstrap() -> CallSurface<ActiveRuntime> {
    let install_root = BridgeConfig::install_root();
    let config = BridgeConfig::load_or_default(&install_root);
    init_tracing(&config.bridge.log_level);

    info!(
        version = env!("CARGO_PKG_VERSION"),
        install_root = %install_root.display(),
        mods_dir = %config.mods_dir(&install_root).display(),
        "bridge starting"
    );

    match initialize_runtime(&config.host_paths(&install_root)) {
        Ok(runtime) => {
            let bridge = Bridge::new(runtime, &config.mods_dir(&install_root));
            info!(
                modules = bridge.registry().len(),
                failed = bridge.registry().failures().len(),
                "bridge ready"
            );
            CallSurface::new(bridge)
        }
        Err(e) => {
            error!(error = %e, "runtime initialization failed, bridge disabled");
            CallSurface::disabled()
        }
    }
}

/// Installs the process-wide subscriber once; `RUST_LOG` wins over the
/// configured level.
fn init_tracing(log_level: &str) {
    static INIT: OnceLock<()> = OnceLock::new();
    INIT.get_or_init(|| {
        let filter =
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(log_level));
        let _ = tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_ansi(false)
            .with_target(true)
            .try_init();
    });
}

fn surface() -> Option<&'static CallSurface<ActiveRuntime>> {
    let surface = SURFACE.get();
    if surface.is_none() {
        error!("bridge was never initialized");
    }
    surface
}

unsafe fn read_args(argc: i32, argv: *const RawValue) -> Option<Vec<DynValue>> {
    if argc < 0 {
        return None;
    }
    if argc == 0 {
        return Some(Vec::new());
    }
    if argv.is_null() {
        return None;
    }

    // SAFETY: argv points to argc readable values per the export contract
    let raws = unsafe { std::slice::from_raw_parts(argv, argc as usize) };
    Some(raws.iter().map(|raw| unsafe { raw.to_dyn() }).collect())
}

fn parse_target(args: &[DynValue]) -> Option<CallTarget> {
    if args.len() != 5 {
        return None;
    }

    let module = text(&args[0])?;
    let namespace = text(&args[1])?;
    let type_name = text(&args[2])?;
    let function = text(&args[3])?;
    let argc = match &args[4] {
        DynValue::Real(n) if *n >= 0.0 => *n as usize,
        _ => return None,
    };

    Some(CallTarget::new(module, namespace, type_name, function, argc))
}

fn text(value: &DynValue) -> Option<&str> {
    match value {
        DynValue::Str(s) => Some(s.as_str()),
        _ => None,
    }
}

unsafe fn write_result(result: *mut RawValue, value: &DynValue) {
    if !result.is_null() {
        // SAFETY: result is writable per the export contract
        unsafe { ptr::write(result, RawValue::from_dyn(value)) };
    }
}
