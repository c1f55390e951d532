//! Error types shared by the resolver, invoker and installer

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by the `with` core
#[derive(Error, Debug)]
pub enum WithError {
    #[error("Unknown command: {0}")]
    NotFound(String),

    #[error("Invalid command name: {0:?}")]
    InvalidName(String),

    #[error("Failed to launch {}: {source}", .program.display())]
    Launch {
        program: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("You need root privileges to install tab completion")]
    Privilege,

    #[error("No tab completion directory found (tried {0})")]
    NoCompletionDir(String),

    #[error("Invalid config file {}: {source}", .path.display())]
    Config {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

pub type Result<T> = std::result::Result<T, WithError>;

impl WithError {
    /// Process exit code reported for this error
    ///
    /// Launch failures follow the shell convention: 127 when the
    /// interpreter cannot be found, 126 when it cannot be executed.
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Launch { source, .. } if source.kind() == io::ErrorKind::NotFound => 127,
            Self::Launch { .. } => 126,
            _ => 1,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_launch_exit_codes() {
        let missing = WithError::Launch {
            program: PathBuf::from("/nonexistent/bash"),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert_eq!(missing.exit_code(), 127);

        let denied = WithError::Launch {
            program: PathBuf::from("/etc/passwd"),
            source: io::Error::from(io::ErrorKind::PermissionDenied),
        };
        assert_eq!(denied.exit_code(), 126);
    }

    #[test]
    fn test_other_errors_exit_one() {
        assert_eq!(WithError::Privilege.exit_code(), 1);
        assert_eq!(WithError::NotFound("nope".into()).exit_code(), 1);
    }
}
