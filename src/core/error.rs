//! Error types for the logger system

pub type Result<T> = std::result::Result<T, LoggerError>;

#[derive(Debug, thiserror::Error)]
pub enum LoggerError {
    /// The manager no longer accepts records or destinations
    #[error("log manager is closed")]
    ManagerClosed,

    /// Returned by a destination to ask the manager to drop it.
    ///
    /// The manager evicts the destination without calling its close routine.
    #[error("destination closed")]
    DestinationClosed,

    /// IO error with context
    #[error("IO error while {operation}: {message}")]
    IoOperation {
        operation: String,
        message: String,
        #[source]
        source: std::io::Error,
    },

    /// Generic IO error
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    /// JSON serialization error
    #[error("JSON error: {0}")]
    JsonError(#[from] serde_json::Error),

    /// One or more destinations failed to close
    #[error("{} destination(s) failed to close: {}", .0.len(), join_errors(.0))]
    CloseFailed(Vec<LoggerError>),

    /// Invalid configuration with details
    #[error("Invalid configuration for {component}: {message}")]
    InvalidConfiguration { component: String, message: String },

    /// File destination error with path
    #[error("File destination error for '{path}': {message}")]
    FileDestinationError { path: String, message: String },

    /// File lock error
    #[error("Failed to acquire file lock on '{path}'")]
    FileLockError { path: String },

    /// Writer error (generic)
    #[error("Writer error: {0}")]
    WriterError(String),

    /// Generic error
    #[error("{0}")]
    Other(String),
}

fn join_errors(errors: &[LoggerError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl LoggerError {
    /// Create an IO operation error with context
    pub fn io_operation(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: std::io::Error,
    ) -> Self {
        LoggerError::IoOperation {
            operation: operation.into(),
            message: message.into(),
            source,
        }
    }

    /// Create an invalid configuration error
    pub fn config(component: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::InvalidConfiguration {
            component: component.into(),
            message: message.into(),
        }
    }

    /// Create a file destination error
    pub fn file_destination(path: impl Into<String>, message: impl Into<String>) -> Self {
        LoggerError::FileDestinationError {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Create a file lock error
    pub fn file_lock(path: impl Into<String>) -> Self {
        LoggerError::FileLockError { path: path.into() }
    }

    /// Create a writer error (generic)
    pub fn writer<S: Into<String>>(msg: S) -> Self {
        LoggerError::WriterError(msg.into())
    }

    /// Create a generic error
    pub fn other<S: Into<String>>(msg: S) -> Self {
        LoggerError::Other(msg.into())
    }

    /// Fold a list of close failures into a single result
    pub fn aggregate(errors: Vec<LoggerError>) -> Result<()> {
        if errors.is_empty() {
            Ok(())
        } else {
            Err(LoggerError::CloseFailed(errors))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_creation() {
        let err = LoggerError::config("FileDestination", "Invalid path");
        assert!(matches!(err, LoggerError::InvalidConfiguration { .. }));

        let err = LoggerError::file_destination("/var/log/app.log", "Permission denied");
        assert!(matches!(err, LoggerError::FileDestinationError { .. }));
    }

    #[test]
    fn test_error_display() {
        assert_eq!(LoggerError::ManagerClosed.to_string(), "log manager is closed");

        let err = LoggerError::file_lock("/var/log/app.log");
        assert_eq!(
            err.to_string(),
            "Failed to acquire file lock on '/var/log/app.log'"
        );
    }

    #[test]
    fn test_aggregate() {
        assert!(LoggerError::aggregate(Vec::new()).is_ok());

        let err = LoggerError::aggregate(vec![
            LoggerError::writer("first"),
            LoggerError::other("second"),
        ])
        .unwrap_err();
        assert_eq!(
            err.to_string(),
            "2 destination(s) failed to close: Writer error: first; second"
        );
    }

    #[test]
    fn test_io_operation_error() {
        let io_err = std::io::Error::new(std::io::ErrorKind::PermissionDenied, "access denied");
        let err = LoggerError::io_operation("writing log file", "cannot write to file", io_err);

        assert!(matches!(err, LoggerError::IoOperation { .. }));
        assert!(err.to_string().contains("writing log file"));
        assert!(err.to_string().contains("cannot write to file"));
    }
}
