use crate::external::RunResult;
use std::path::PathBuf;
use thiserror::Error;

/// Process exit status reported by `runc`.
///
/// Every failure category maps to its own code so that scripts can branch on
/// the cause. `InternalError` is the catch-all for anything unanticipated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Status {
    Ok = 0,
    ArgumentError = 1,
    LanguageError = 2,
    EditorError = 3,
    FileError = 4,
    RunnerError = 5,
    CodeError = 6,
    InternalError = 255,
}

impl From<Status> for std::process::ExitCode {
    fn from(status: Status) -> Self {
        std::process::ExitCode::from(status as u8)
    }
}

#[derive(Debug, Error)]
pub enum RuncError {
    #[error("{0}")]
    Argument(String),

    #[error("unsupported language: {name}")]
    Language { name: String },

    #[error("missing required tools: {}", .missing.join(", "))]
    MissingTools { missing: Vec<&'static str> },

    #[error("failed to start `{program}`: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{0}")]
    Editor(String),

    #[error("{action} {}: {source}", .path.display())]
    File {
        action: &'static str,
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("command `{}` failed with {}", .result.command, .result.code)]
    Code { result: RunResult },

    #[error("internal error: {0:#}")]
    Internal(#[from] anyhow::Error),
}

impl RuncError {
    pub fn status(&self) -> Status {
        match self {
            RuncError::Argument(_) => Status::ArgumentError,
            RuncError::Language { .. } => Status::LanguageError,
            RuncError::MissingTools { .. } | RuncError::Spawn { .. } => Status::RunnerError,
            RuncError::Editor(_) => Status::EditorError,
            RuncError::File { .. } => Status::FileError,
            RuncError::Code { .. } => Status::CodeError,
            RuncError::Internal(_) => Status::InternalError,
        }
    }

    /// Adapter for `map_err` on file operations.
    pub(crate) fn file(
        action: &'static str,
        path: impl Into<PathBuf>,
    ) -> impl FnOnce(std::io::Error) -> Self {
        let path = path.into();
        move |source| RuncError::File {
            action,
            path,
            source,
        }
    }
}
