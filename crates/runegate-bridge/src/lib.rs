//! # runegate-bridge
//!
//! Module loading and call dispatch for the Runegate bridge.
//!
//! This crate provides:
//! - Module discovery from the mods directory (`mods/<X>/<X>.<ext>`)
//! - Optional `mod.toml` manifest parsing
//! - Typed dispatch of one call into the hosted runtime
//! - The fixed host-facing call surface (select target, invoke)
//!
//! ## Failure Model
//!
//! Bootstrap failures disable the surface permanently; per-module and
//! per-call failures stay local. The host only ever sees a value: any
//! failed call collapses to the distinguished `"INTEROP ERROR"` string.

pub mod dispatch;
pub mod manifest;
pub mod registry;
pub mod surface;

pub use dispatch::Bridge;
pub use manifest::{ManifestError, ModManifest, ModMetadata};
pub use registry::{LoadFailure, ModuleRecord, ModuleRegistry};
pub use surface::{CallSurface, INTEROP_ERROR};
