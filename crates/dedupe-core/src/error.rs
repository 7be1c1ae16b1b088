use std::path::PathBuf;
use thiserror::Error;

/// Stable error codes, surfaced in JSON output.
pub mod codes {
    pub const DEDUPE_IO_ERROR: &str = "DEDUPE_IO_ERROR";
    pub const DEDUPE_MANIFEST_NOT_FOUND: &str = "DEDUPE_MANIFEST_NOT_FOUND";
    pub const DEDUPE_MANIFEST_INVALID: &str = "DEDUPE_MANIFEST_INVALID";
    pub const DEDUPE_INCONSISTENT_INSTALL: &str = "DEDUPE_INCONSISTENT_INSTALL";

    // Recoverable, reported per path rather than raised.
    pub const DEDUPE_REMOVE_FAILED: &str = "DEDUPE_REMOVE_FAILED";
}

/// Core error type for dedupe runs.
///
/// Every variant is fatal: the traversal stops and nothing is removed.
#[derive(Error, Debug)]
pub enum Error {
    #[error("Failed to read {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("package.json not found: {path}")]
    ManifestNotFound { path: PathBuf },

    #[error("Invalid package.json at {path}: {message}")]
    ManifestInvalid { path: PathBuf, message: String },

    #[error("Inconsistent install at {path}: {reason}")]
    InconsistentInstall { path: PathBuf, reason: String },
}

impl Error {
    /// Get the stable error code.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::ManifestRead { .. } => codes::DEDUPE_IO_ERROR,
            Self::ManifestNotFound { .. } => codes::DEDUPE_MANIFEST_NOT_FOUND,
            Self::ManifestInvalid { .. } => codes::DEDUPE_MANIFEST_INVALID,
            Self::InconsistentInstall { .. } => codes::DEDUPE_INCONSISTENT_INSTALL,
        }
    }

    #[must_use]
    pub fn manifest_invalid(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::ManifestInvalid {
            path: path.into(),
            message: message.into(),
        }
    }

    #[must_use]
    pub fn inconsistent_install(path: impl Into<PathBuf>, reason: impl Into<String>) -> Self {
        Self::InconsistentInstall {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_codes() {
        let err = Error::inconsistent_install("/p/node_modules/a", "package.json missing");
        assert_eq!(err.code(), codes::DEDUPE_INCONSISTENT_INSTALL);
        assert!(err.to_string().contains("/p/node_modules/a"));

        let err = Error::ManifestNotFound {
            path: PathBuf::from("/p/package.json"),
        };
        assert_eq!(err.code(), codes::DEDUPE_MANIFEST_NOT_FOUND);

        let err = Error::ManifestRead {
            path: PathBuf::from("/p/node_modules/a/package.json"),
            source: std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied"),
        };
        assert_eq!(err.code(), codes::DEDUPE_IO_ERROR);
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_error_codes_uppercase() {
        let all_codes = [
            codes::DEDUPE_IO_ERROR,
            codes::DEDUPE_MANIFEST_NOT_FOUND,
            codes::DEDUPE_MANIFEST_INVALID,
            codes::DEDUPE_INCONSISTENT_INSTALL,
            codes::DEDUPE_REMOVE_FAILED,
        ];

        for code in all_codes {
            assert!(
                code.chars().all(|c| c.is_uppercase() || c == '_'),
                "Error code '{code}' should be SCREAMING_SNAKE_CASE"
            );
        }
    }
}
