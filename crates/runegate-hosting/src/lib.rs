//! # runegate-hosting
//!
//! Managed-runtime hosting for the Runegate bridge.
//!
//! This crate provides:
//! - The [`RuntimeHost`] contract every backend implements
//! - The external CLR backend (feature `clr-host`, default): locates an
//!   installed .NET runtime through its discovery library and drives it via
//!   the hostfxr hosting contract
//! - The embedded backend (feature `embedded-vm`): a statically-linked Wyrm
//!   interpreter with the same surface
//!
//! Exactly one backend is active per build; [`ActiveRuntime`] and
//! [`initialize_runtime`] select it. When both features are enabled (so
//! both backends compile) the external backend wins.
//!
//! No backend has a shutdown path. A hosted runtime stays initialized, and
//! its native libraries stay loaded, until the process exits.

pub mod host;

#[cfg(feature = "clr-host")]
pub mod clr;
#[cfg(feature = "clr-host")]
pub mod locator;

#[cfg(feature = "embedded-vm")]
pub mod vm;

pub use host::{InvokeOutcome, RuntimeHost};

#[cfg(any(feature = "clr-host", feature = "embedded-vm"))]
use runegate_interop_core::BridgeResult;
use std::path::PathBuf;

/// Filesystem inputs for bringing up the runtime.
#[derive(Debug, Clone)]
pub struct HostPaths {
    /// The bridge's installation root inside the host application directory.
    pub install_root: PathBuf,

    /// The runtime configuration artifact, consumed opaquely by the backend.
    pub runtime_config: PathBuf,
}

/// The backend selected at build time.
#[cfg(feature = "clr-host")]
pub type ActiveRuntime = clr::ClrRuntime;

/// The backend selected at build time.
#[cfg(all(feature = "embedded-vm", not(feature = "clr-host")))]
pub type ActiveRuntime = vm::EmbeddedRuntime;

/// Initializes the build-time-selected runtime backend.
#[cfg(feature = "clr-host")]
pub fn initialize_runtime(paths: &HostPaths) -> BridgeResult<ActiveRuntime> {
    clr::ClrRuntime::initialize(&paths.install_root, &paths.runtime_config)
}

/// Initializes the build-time-selected runtime backend.
#[cfg(all(feature = "embedded-vm", not(feature = "clr-host")))]
pub fn initialize_runtime(paths: &HostPaths) -> BridgeResult<ActiveRuntime> {
    vm::EmbeddedRuntime::initialize(&paths.runtime_config)
}

/// File name of a module artifact, as reported in load errors.
#[cfg(any(feature = "clr-host", feature = "embedded-vm"))]
fn artifact_name(path: &std::path::Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}
