//! Error kinds for confgraph operations

use strum_macros::{Display, IntoStaticStr};

/// The kind of error that occurred.
///
/// Every per-source failure in a batch run is classified into one of these
/// kinds, so the report can tell an environment problem apart from a data
/// problem in the source file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, IntoStaticStr, Display)]
#[non_exhaustive]
pub enum ErrorKind {
    // =========================================================================
    // Source errors
    // =========================================================================
    /// The source file does not exist (any more)
    NotFound,

    /// The parser for this format was not compiled in
    MissingDependency,

    /// The source content is not valid for its format
    Malformed,

    // =========================================================================
    // Artifact errors
    // =========================================================================
    /// Writing an artifact failed
    IoFailure,

    /// The output directory could not be created
    OutputDirFailed,

    // =========================================================================
    // Renderer errors
    // =========================================================================
    /// The renderer binary could not be launched because it is gone
    BinaryMissing,

    /// The renderer ran and exited with a non-zero status
    NonZeroExit,

    /// The renderer exceeded its wall-clock bound
    Timeout,

    // =========================================================================
    // General errors
    // =========================================================================
    /// An unexpected error occurred - catch-all for unhandled cases
    Unexpected,
}

impl ErrorKind {
    /// Returns the error kind as a static string
    pub fn as_str(&self) -> &'static str {
        (*self).into()
    }

    /// A short remedy hint shown next to the failure in the console report.
    pub fn remedy(&self) -> Option<&'static str> {
        match self {
            ErrorKind::MissingDependency => {
                Some("rebuild confgraph with the format's cargo feature enabled")
            }
            ErrorKind::Malformed => Some("fix the syntax of the source file"),
            ErrorKind::BinaryMissing => Some("install Graphviz and make sure `dot` is on PATH"),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_kind_display() {
        assert_eq!(ErrorKind::Malformed.to_string(), "Malformed");
        assert_eq!(ErrorKind::NonZeroExit.to_string(), "NonZeroExit");
        assert_eq!(ErrorKind::Timeout.as_str(), "Timeout");
    }

    #[test]
    fn test_remedies_differ() {
        let dep = ErrorKind::MissingDependency.remedy().unwrap();
        let bad = ErrorKind::Malformed.remedy().unwrap();
        assert_ne!(dep, bad);
        assert!(ErrorKind::Timeout.remedy().is_none());
    }
}
