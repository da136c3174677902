use prep_util::CommandError;

/// Everything that can stop a stage. No stage recovers from these; the whole run aborts.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("{path} doesn't exist")]
    FileNotFound { path: String },
    #[error("feature {feature} in {path} has no {field:?} property")]
    MissingField {
        path: String,
        feature: usize,
        field: String,
    },
    #[error("{path} has no {column:?} column")]
    MissingColumn { path: String, column: String },
    #[error("{cmd}: {reason}")]
    SubprocessFailure { cmd: String, reason: String },
    #[error("{path} isn't valid: {reason}")]
    MalformedInput { path: String, reason: String },
    #[error("{path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

impl Error {
    /// Classifies an IO failure on `path`, singling out missing files.
    pub fn io<I: Into<String>>(path: I, source: std::io::Error) -> Error {
        let path = path.into();
        if source.kind() == std::io::ErrorKind::NotFound {
            Error::FileNotFound { path }
        } else {
            Error::Io { path, source }
        }
    }

    pub fn malformed<I: Into<String>, R: ToString>(path: I, reason: R) -> Error {
        Error::MalformedInput {
            path: path.into(),
            reason: reason.to_string(),
        }
    }
}

impl From<CommandError> for Error {
    fn from(err: CommandError) -> Error {
        let cmd = match &err {
            CommandError::NotInstalled { program } => program.clone(),
            CommandError::Spawn { cmd, .. } | CommandError::Failed { cmd, .. } => cmd.clone(),
        };
        Error::SubprocessFailure {
            cmd,
            reason: err.to_string(),
        }
    }
}

/// Fails with `FileNotFound` before a stage touches anything.
pub fn require_file(path: &str) -> Result<(), Error> {
    if prep_io::file_exists(path) {
        Ok(())
    } else {
        Err(Error::FileNotFound {
            path: path.to_string(),
        })
    }
}
