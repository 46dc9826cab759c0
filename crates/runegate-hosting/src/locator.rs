//! Discovery of the managed runtime's hosting library.
//!
//! The discovery library ships with the bridge under
//! `<install-root>/interop/lib/`. Its `get_hostfxr_path` export inspects the
//! machine's runtime installation and writes the hosting library's path into
//! a caller-provided buffer; that library is then loaded and handed to the
//! backend.
//!
//! Every failure here means the execution environment is unavailable on this
//! machine; all paths report [`BridgeError::EnvironmentNotFound`] so the
//! caller can disable itself without crashing the host.

use crate::clr::exports::{self, CharT, GetHostPathFn, DISCOVERY_PATH_CAPACITY};
use libloading::{Library, Symbol};
use runegate_interop_core::{BridgeError, BridgeResult};
use std::path::Path;
use tracing::{debug, info};

#[cfg(target_os = "windows")]
const DISCOVERY_LIBRARY: &str = "nethost.dll";
#[cfg(target_os = "macos")]
const DISCOVERY_LIBRARY: &str = "libnethost.dylib";
#[cfg(all(unix, not(target_os = "macos")))]
const DISCOVERY_LIBRARY: &str = "libnethost.so";

/// Locates and loads the runtime hosting library for this machine.
///
/// The returned library is never unloaded; its loader handle is leaked by
/// the caller once exports are resolved, because unloading the runtime's
/// native libraries is undefined behavior.
pub fn locate_runtime_library(install_root: &Path) -> BridgeResult<Library> {
    let discovery_path = install_root
        .join("interop")
        .join("lib")
        .join(DISCOVERY_LIBRARY);
    debug!(path = %discovery_path.display(), "loading runtime discovery library");

    // SAFETY: loading a shared library runs its initializers; the discovery
    // library ships with the bridge and only exposes path lookup.
    let discovery = unsafe { Library::new(&discovery_path) }.map_err(|e| {
        BridgeError::EnvironmentNotFound(format!(
            "discovery library '{}' could not be loaded: {}",
            discovery_path.display(),
            e
        ))
    })?;

    let get_hostfxr_path: GetHostPathFn = {
        // SAFETY: the export name and shape come from the published
        // discovery header.
        let symbol: Symbol<GetHostPathFn> =
            unsafe { discovery.get(b"get_hostfxr_path\0") }.map_err(|e| {
                BridgeError::EnvironmentNotFound(format!(
                    "discovery export 'get_hostfxr_path' missing in '{}': {}",
                    discovery_path.display(),
                    e
                ))
            })?;
        *symbol
    };

    let mut buffer = [0 as CharT; DISCOVERY_PATH_CAPACITY];
    let mut buffer_len = buffer.len();
    // SAFETY: buffer and length describe a live writable allocation; a null
    // parameters pointer selects default discovery.
    let rc = unsafe { get_hostfxr_path(buffer.as_mut_ptr(), &mut buffer_len, std::ptr::null()) };
    if rc != 0 {
        return Err(BridgeError::EnvironmentNotFound(format!(
            "hosting library discovery failed with status 0x{:08x}",
            rc
        )));
    }

    let hosting_path = exports::buffer_to_string(&buffer);
    info!(path = %hosting_path, "loading runtime hosting library");

    // SAFETY: the discovery protocol returned this as the installed hosting
    // library.
    let hosting = unsafe { Library::new(&hosting_path) }.map_err(|e| {
        BridgeError::EnvironmentNotFound(format!(
            "hosting library '{}' could not be loaded: {}",
            hosting_path, e
        ))
    })?;

    // The discovery library stays mapped for the process lifetime as well.
    std::mem::forget(discovery);

    Ok(hosting)
}
