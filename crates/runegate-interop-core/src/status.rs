//! Native status codes returned by runtime hosting entry points.
//!
//! Hosting APIs report success and failure through unsigned 32-bit codes
//! rather than errors. The constants and the [`InitStatus`] classifier here
//! keep the interpretation of those codes in one place.

/// The call completed successfully.
pub const STATUS_SUCCESS: u32 = 0;

/// The runtime was already initialized by an earlier call. Treated as
/// success: the existing runtime instance is reused.
pub const STATUS_ALREADY_INITIALIZED: u32 = 1;

/// No compatible runtime installation could be found for the requested
/// configuration.
pub const STATUS_RUNTIME_MISSING: u32 = 0x8000_8096;

/// Classification of a hosting-layer initialization status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InitStatus {
    /// Initialization succeeded, or an already-running runtime was reused.
    Ok,
    /// The execution environment is not installed on this machine.
    EnvironmentMissing,
    /// Initialization failed for another reason; the raw code is preserved.
    Failed(u32),
}

impl InitStatus {
    /// Classifies a raw status code from a runtime initialization call.
    pub fn classify(code: u32) -> Self {
        match code {
            STATUS_SUCCESS | STATUS_ALREADY_INITIALIZED => InitStatus::Ok,
            STATUS_RUNTIME_MISSING => InitStatus::EnvironmentMissing,
            other => InitStatus::Failed(other),
        }
    }

    /// Whether this status represents a usable runtime.
    pub fn is_ok(&self) -> bool {
        matches!(self, InitStatus::Ok)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_codes_classify_ok() {
        assert_eq!(InitStatus::classify(STATUS_SUCCESS), InitStatus::Ok);
        assert_eq!(
            InitStatus::classify(STATUS_ALREADY_INITIALIZED),
            InitStatus::Ok
        );
        assert!(InitStatus::classify(0).is_ok());
    }

    #[test]
    fn test_missing_runtime_classifies_environment_missing() {
        assert_eq!(
            InitStatus::classify(STATUS_RUNTIME_MISSING),
            InitStatus::EnvironmentMissing
        );
        assert!(!InitStatus::classify(STATUS_RUNTIME_MISSING).is_ok());
    }

    #[test]
    fn test_other_codes_preserve_raw_value() {
        assert_eq!(InitStatus::classify(0x8000_8081), InitStatus::Failed(0x8000_8081));
        assert_eq!(InitStatus::classify(2), InitStatus::Failed(2));
    }
}
