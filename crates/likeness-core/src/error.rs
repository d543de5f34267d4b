//! Error types and handling for equivalency comparisons

use thiserror::Error;

use crate::report::Report;

/// Main error type for equivalency comparisons
///
/// The taxonomy separates genuine value mismatches (which are
/// aggregated across the whole walk and reported together) from defects in
/// configuration or data shape (which abort the walk immediately):
///
/// - [`LikenessError::Mismatch`] carries the full report of every
///   discrepancy found below the top-level call, never just the first.
/// - [`LikenessError::Configuration`] is raised while building options,
///   before any walk begins, and names the offending parameter.
/// - [`LikenessError::Structural`] is raised mid-walk when the comparison
///   itself is unsatisfiable (zero comparable members, no applicable step).
/// - [`LikenessError::Recursion`] is raised when a cyclic reference or the
///   recursion depth limit is hit without an infinite-recursion allowance.
#[derive(Debug, Error)]
pub enum LikenessError {
    /// One or more discrepancies between subject and expectation
    #[error("{report}")]
    Mismatch {
        report: Box<Report>,
    },

    /// Invalid builder input, detected at configuration time
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// The comparison is unsatisfiable for structural reasons
    #[error("Structural error at {path}: {message}")]
    Structural { path: String, message: String },

    /// Cyclic reference or recursion depth exceeded
    #[error("Recursion error at {path}: {message}")]
    Recursion { path: String, message: String },
}

/// Error kind enumeration for categorizing errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Mismatch,
    Configuration,
    Structural,
    Recursion,
}

impl LikenessError {
    /// Get the error kind for this error
    pub fn kind(&self) -> ErrorKind {
        match self {
            LikenessError::Mismatch { .. } => ErrorKind::Mismatch,
            LikenessError::Configuration { .. } => ErrorKind::Configuration,
            LikenessError::Structural { .. } => ErrorKind::Structural,
            LikenessError::Recursion { .. } => ErrorKind::Recursion,
        }
    }

    /// Whether this error is a genuine value mismatch rather than a defect
    /// in configuration or data shape
    pub fn is_mismatch(&self) -> bool {
        matches!(self.kind(), ErrorKind::Mismatch)
    }

    /// Access the aggregated report, if this is a mismatch
    pub fn report(&self) -> Option<&Report> {
        match self {
            LikenessError::Mismatch { report } => Some(report),
            _ => None,
        }
    }

    /// Create a mismatch error from an aggregated report
    pub fn mismatch(report: Report) -> Self {
        Self::Mismatch {
            report: Box::new(report),
        }
    }

    /// Create a configuration error
    pub fn configuration_error(message: impl Into<String>) -> Self {
        Self::Configuration {
            message: message.into(),
        }
    }

    /// Create a structural error at the given path
    pub fn structural_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Structural {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a recursion error at the given path
    pub fn recursion_error(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Recursion {
            path: path.into(),
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_are_distinguishable() {
        let config = LikenessError::configuration_error("comparer type name must not be empty");
        let structural = LikenessError::structural_error("subject", "no comparable members");
        let recursion = LikenessError::recursion_error("Friends[0]", "cyclic reference detected");

        assert_eq!(config.kind(), ErrorKind::Configuration);
        assert_eq!(structural.kind(), ErrorKind::Structural);
        assert_eq!(recursion.kind(), ErrorKind::Recursion);
        assert!(!config.is_mismatch());
    }

    #[test]
    fn messages_name_the_context() {
        let err = LikenessError::structural_error("Address", "no comparable members");
        let text = err.to_string();
        assert!(text.contains("Address"));
        assert!(text.contains("no comparable members"));
    }
}
