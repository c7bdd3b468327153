use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DbError {
    #[error("Database path error: {0}")]
    InvalidPath(String),

    #[error("Invalid name: {0}")]
    InvalidName(String),

    #[error("Table '{0}' already exists")]
    TableExists(String),

    #[error("Table '{0}' not found")]
    TableNotFound(String),

    #[error("Invalid row: {0}")]
    InvalidRow(String),

    #[error("Column '{0}' not found in table '{1}'")]
    ColumnNotFound(String, String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("I/O error on '{}': {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Decode error in '{}' at line {line}: {message}", path.display())]
    Decode {
        path: PathBuf,
        line: usize,
        message: String,
    },
}

pub type Result<T> = std::result::Result<T, DbError>;

impl DbError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn decode(path: impl Into<PathBuf>, line: usize, message: impl Into<String>) -> Self {
        Self::Decode {
            path: path.into(),
            line,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_messages_carry_context() {
        let err = DbError::ColumnNotFound("email".into(), "users".into());
        assert_eq!(err.to_string(), "Column 'email' not found in table 'users'");

        let err = DbError::decode("/tmp/users", 3, "expected 3 fields, found 2");
        assert_eq!(
            err.to_string(),
            "Decode error in '/tmp/users' at line 3: expected 3 fields, found 2"
        );
    }

    #[test]
    fn test_io_error_exposes_source() {
        use std::error::Error as _;

        let err = DbError::io(
            "/tmp/missing",
            std::io::Error::new(std::io::ErrorKind::NotFound, "gone"),
        );
        assert!(err.source().is_some());
        assert!(err.to_string().starts_with("I/O error on '/tmp/missing'"));
    }
}
