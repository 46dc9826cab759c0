//! Error types for the Wyrm interpreter.

use thiserror::Error;

/// Errors that can occur while loading and executing modules.
#[derive(Error, Debug)]
pub enum VmError {
    /// Failed to load or parse a module image.
    #[error("Module image error: {0}")]
    ImageError(String),

    /// A module with the same ID is already loaded.
    #[error("Module already loaded: {0}")]
    DuplicateModule(String),

    /// The requested module is not loaded.
    #[error("Module not loaded: {0}")]
    ModuleNotFound(String),

    /// The requested type does not exist in the module.
    #[error("Type not found: {0}")]
    TypeNotFound(String),

    /// The requested function does not exist on the type.
    #[error("Function not found: {0}")]
    FunctionNotFound(String),

    /// The interpreter hit an internal limit or inconsistency.
    #[error("Execution error: {0}")]
    ExecutionError(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for interpreter operations.
pub type VmResult<T> = std::result::Result<T, VmError>;

/// A fault raised by executing module code.
///
/// Produced by the `Raise` instruction or by runtime errors such as
/// division by zero. Carries the frames that were live when the fault was
/// raised, innermost first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VmFault {
    /// Fault message.
    pub message: String,

    /// Call frames live at the raise site, innermost first, as
    /// `<type>.<function>` strings.
    pub frames: Vec<String>,
}

impl VmFault {
    /// Creates a fault with a message and no frames.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            frames: Vec::new(),
        }
    }
}

impl std::fmt::Display for VmFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)?;
        for frame in &self.frames {
            write!(f, "\n  at {}", frame)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fault_display_includes_frames() {
        let mut fault = VmFault::new("something failed");
        fault.frames.push("SampleMod.Greeter.Greet".to_string());
        let text = fault.to_string();
        assert!(text.contains("something failed"));
        assert!(text.contains("at SampleMod.Greeter.Greet"));
    }
}
