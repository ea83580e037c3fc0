//! Exit codes for the ql-core CLI.
//!
//! Exit code ranges:
//! - 0: success
//! - 10-19: input errors (fixable by the caller)
//! - 20-29: internal errors

/// Exit codes for ql-core commands. Stable for scripting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    /// Payload written to stdout.
    Clean = 0,

    /// Invalid arguments
    ArgsError = 10,

    /// Model configuration missing, unreadable or invalid
    ConfigError = 11,

    /// Dataset unreadable or invalid
    DataError = 12,

    /// A parameter vector has the wrong length or lies outside the support
    InvalidDraw = 13,

    /// Internal error (bug - please report)
    InternalError = 20,

    /// Failed to write output
    IoError = 21,
}

impl ExitCode {
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    pub fn is_success(self) -> bool {
        self == ExitCode::Clean
    }

    /// Codes 10-19.
    pub fn is_user_error(self) -> bool {
        (10..20).contains(&(self as i32))
    }

    /// Codes 20-29.
    pub fn is_internal_error(self) -> bool {
        (self as i32) >= 20
    }

    pub fn is_error(self) -> bool {
        (self as i32) >= 10
    }

    /// Stable name for JSON error output.
    pub fn code_name(&self) -> &'static str {
        match self {
            ExitCode::Clean => "OK",
            ExitCode::ArgsError => "ERR_ARGS",
            ExitCode::ConfigError => "ERR_CONFIG",
            ExitCode::DataError => "ERR_DATA",
            ExitCode::InvalidDraw => "ERR_INVALID_DRAW",
            ExitCode::InternalError => "ERR_INTERNAL",
            ExitCode::IoError => "ERR_IO",
        }
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code as i32
    }
}

impl std::fmt::Display for ExitCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.code_name(), self.as_i32())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ranges() {
        assert!(ExitCode::Clean.is_success());
        assert!(!ExitCode::Clean.is_error());
        assert!(ExitCode::DataError.is_user_error());
        assert!(ExitCode::InvalidDraw.is_user_error());
        assert!(!ExitCode::InternalError.is_user_error());
        assert!(ExitCode::IoError.is_internal_error());
    }

    #[test]
    fn test_display() {
        assert_eq!(ExitCode::ConfigError.to_string(), "ERR_CONFIG (11)");
        assert_eq!(i32::from(ExitCode::InvalidDraw), 13);
    }
}
