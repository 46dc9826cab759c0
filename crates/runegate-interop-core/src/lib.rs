//! # runegate-interop-core
//!
//! Shared vocabulary for the Runegate bridge.
//!
//! This crate defines the types every layer of the bridge speaks:
//! - [`DynValue`] - the dynamically-typed values crossing the native/managed
//!   boundary
//! - [`CallTarget`] - a selected (module, type, function) call destination
//! - [`BridgeError`] - the bridge-wide failure taxonomy
//! - [`InitStatus`] - classification of native runtime status codes
//!
//! Nothing here touches a runtime; backends and the dispatcher build on top.

pub mod error;
pub mod status;
pub mod target;
pub mod value;

pub use error::{BridgeError, BridgeResult, ManagedError};
pub use status::{InitStatus, STATUS_ALREADY_INITIALIZED, STATUS_RUNTIME_MISSING, STATUS_SUCCESS};
pub use target::CallTarget;
pub use value::{DynValue, ValueKind};
