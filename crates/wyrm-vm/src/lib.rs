//! # wyrm-vm
//!
//! Wyrm bytecode interpreter for statically-linked module execution.
//!
//! This crate provides:
//! - Module image loading and validation (.wyb files)
//! - A stack-based interpreter with per-call frames
//! - Structured faults with captured call frames
//!
//! ## Module Structure
//!
//! A module image contains metadata, a constant pool, and a set of named
//! types, each holding named functions. Functions are resolved by
//! `<type name>` + `<function name>` and invoked with positional arguments.
//!
//! ## Fault Model
//!
//! A `Raise` instruction (or an interpreter-detected error such as division
//! by zero) unwinds the call stack and surfaces as a [`VmFault`] carrying
//! the message and the frames that were live when it was raised.

pub mod error;
pub mod interp;
pub mod module;
pub mod value;

pub use error::{VmError, VmFault, VmResult};
pub use interp::{CallOutcome, FunctionRef, Vm, MAX_CALL_DEPTH};
pub use module::{Constant, Function, Instruction, ModuleImage, ModuleLoader, ModuleMetadata, TypeDef};
pub use value::VmValue;
