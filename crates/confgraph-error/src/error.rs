//! The main Error type for confgraph.

use crate::ErrorKind;
use std::fmt;

/// Unified error type for all confgraph operations.
pub struct Error {
    kind: ErrorKind,
    message: String,
    operation: &'static str,
    context: Vec<(&'static str, String)>,
    source: Option<Box<dyn std::error::Error + Send + Sync + 'static>>,
}

impl Error {
    /// Create a new error with the given kind and message.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            operation: "",
            context: Vec::new(),
            source: None,
        }
    }

    /// Get the error kind.
    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    /// Get the error message
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Get the operation that caused this error
    pub fn operation(&self) -> &'static str {
        self.operation
    }

    /// Get the context key-value pairs
    pub fn context(&self) -> &[(&'static str, String)] {
        &self.context
    }

    /// Look up a context value by key.
    pub fn context_value(&self, key: &str) -> Option<&str> {
        self.context
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Get the source error (if any).
    pub fn source_ref(&self) -> Option<&(dyn std::error::Error + Send + Sync + 'static)> {
        self.source.as_ref().map(|e| e.as_ref())
    }

    /// Set the operation that caused this error.
    ///
    /// If an operation was already set, the previous one is moved to context
    /// as "called" to preserve the call chain.
    pub fn with_operation(mut self, operation: &'static str) -> Self {
        if !self.operation.is_empty() {
            self.context.push(("called", self.operation.to_string()));
        }
        self.operation = operation;
        self
    }

    /// Add context to the error
    pub fn with_context(mut self, key: &'static str, value: impl Into<String>) -> Self {
        self.context.push((key, value.into()));
        self
    }

    /// Set the source error.
    ///
    /// # Panics (debug only)
    /// Panics in debug mode if source was already set.
    pub fn set_source<E>(mut self, source: E) -> Self
    where
        E: std::error::Error + Send + Sync + 'static,
    {
        debug_assert!(self.source.is_none(), "source error already set");
        self.source = Some(Box::new(source));
        self
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.kind)?;
        if !self.operation.is_empty() {
            write!(f, " at {}", self.operation)?;
        }

        if !self.context.is_empty() {
            write!(f, ", context {{ ")?;
            for (i, (key, value)) in self.context.iter().enumerate() {
                if i > 0 {
                    write!(f, ", ")?;
                }
                write!(f, "{}: {}", key, value)?;
            }
            write!(f, " }}")?;
        }

        if !self.message.is_empty() {
            write!(f, " => {}", self.message)?;
        }

        Ok(())
    }
}

impl fmt::Debug for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{} at {}", self.kind, self.operation)?;

        if !self.message.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Message: {}", self.message)?;
        }

        if !self.context.is_empty() {
            writeln!(f)?;
            writeln!(f, "    Context:")?;
            for (key, value) in &self.context {
                writeln!(f, "        {}: {}", key, value)?;
            }
        }

        if let Some(source) = &self.source {
            writeln!(f)?;
            writeln!(f, "    Source: {:?}", source)?;
        }

        Ok(())
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        let kind = match err.kind() {
            std::io::ErrorKind::NotFound => ErrorKind::NotFound,
            _ => ErrorKind::IoFailure,
        };
        Error::new(kind, err.to_string())
            .with_operation("io")
            .set_source(err)
    }
}

impl Error {
    /// Create an Unexpected error.
    pub fn unexpected(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Unexpected, message)
    }

    /// Create a NotFound error for a path
    pub fn not_found(path: impl Into<String>) -> Self {
        let path = path.into();
        Self::new(ErrorKind::NotFound, format!("file '{}' not found", path))
            .with_context("path", path)
    }

    /// Create a MissingDependency error naming the cargo feature that provides it
    pub fn missing_dependency(format: &str, feature: &'static str) -> Self {
        Self::new(
            ErrorKind::MissingDependency,
            format!("{format} support is not compiled in (enable the `{feature}` feature)"),
        )
        .with_context("feature", feature)
    }

    /// Create a Malformed error
    pub fn malformed(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Malformed, message)
    }

    /// Create an IoFailure error
    pub fn io_failure(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::IoFailure, message)
    }

    /// Create a BinaryMissing error
    pub fn binary_missing(binary: impl Into<String>) -> Self {
        let binary = binary.into();
        Self::new(
            ErrorKind::BinaryMissing,
            format!("'{}' command not found during execution", binary),
        )
        .with_context("binary", binary)
    }

    /// Create a NonZeroExit error carrying the exit code and captured stderr
    pub fn non_zero_exit(code: i32, stderr: impl Into<String>) -> Self {
        Self::new(ErrorKind::NonZeroExit, stderr)
            .with_context("code", code.to_string())
    }

    /// Create a Timeout error
    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Timeout, message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = Error::new(ErrorKind::Malformed, "unexpected token");
        assert_eq!(err.kind(), ErrorKind::Malformed);
        assert_eq!(err.message(), "unexpected token");
        assert_eq!(err.operation(), "");
    }

    #[test]
    fn test_error_with_context() {
        let err = Error::new(ErrorKind::Malformed, "bad line")
            .with_operation("ini::parse")
            .with_context("path", "a.ini")
            .with_context("line", "3");

        assert_eq!(err.operation(), "ini::parse");
        assert_eq!(err.context().len(), 2);
        assert_eq!(err.context()[0], ("path", "a.ini".to_string()));
        assert_eq!(err.context_value("line"), Some("3"));
        assert_eq!(err.context_value("column"), None);
    }

    #[test]
    fn test_operation_chaining() {
        let err = Error::new(ErrorKind::Unexpected, "failed")
            .with_operation("yaml::parse")
            .with_operation("parse::parse_config");

        assert_eq!(err.operation(), "parse::parse_config");
        assert_eq!(err.context().len(), 1);
        assert_eq!(err.context()[0], ("called", "yaml::parse".to_string()));
    }

    #[test]
    fn test_display() {
        let err = Error::new(ErrorKind::Malformed, "unexpected EOF")
            .with_operation("toml::parse")
            .with_context("path", "Cargo.toml");

        let display = format!("{}", err);
        assert!(display.contains("Malformed"));
        assert!(display.contains("toml::parse"));
        assert!(display.contains("path: Cargo.toml"));
        assert!(display.ends_with("=> unexpected EOF"));
    }

    #[test]
    fn test_io_conversion() {
        let io_err = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err = Error::from(io_err);
        assert_eq!(err.kind(), ErrorKind::NotFound);
        assert!(err.source_ref().is_some());

        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "denied");
        assert_eq!(Error::from(io_err).kind(), ErrorKind::IoFailure);
    }

    #[test]
    fn test_convenience_constructors() {
        let err = Error::missing_dependency("YAML", "yaml");
        assert_eq!(err.kind(), ErrorKind::MissingDependency);
        assert!(err.message().contains("`yaml` feature"));

        let err = Error::non_zero_exit(2, "syntax error in line 1");
        assert_eq!(err.kind(), ErrorKind::NonZeroExit);
        assert_eq!(err.context_value("code"), Some("2"));

        let err = Error::binary_missing("dot");
        assert_eq!(err.kind(), ErrorKind::BinaryMissing);
        assert!(err.message().contains("'dot'"));
    }
}
