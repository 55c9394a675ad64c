use mongodb::error::{Error as MongoError, ErrorKind as MongoErrorKind, WriteFailure};
use serde::Serialize;
use thiserror::Error;

const DUPLICATE_KEY_CODE: i32 = 11000;
const DOCUMENT_VALIDATION_FAILURE_CODE: i32 = 121;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub(crate) enum ErrorKind {
    MissingField,
    NotFound,
    DuplicateKey,
    ValidationRejected,
    Conflict,
    Unexpected,
}

impl ErrorKind {
    pub(crate) fn as_str(self) -> &'static str {
        match self {
            Self::MissingField => "missing_field",
            Self::NotFound => "not_found",
            Self::DuplicateKey => "duplicate_key",
            Self::ValidationRejected => "validation_rejected",
            Self::Conflict => "conflict",
            Self::Unexpected => "unexpected",
        }
    }
}

/// Anticipated failure of a workflow operation. Callers branch on [`WorkflowError::kind`].
#[derive(Debug, Clone, Error, PartialEq)]
pub(crate) enum WorkflowError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    NotFound(String),
    #[error("{0}")]
    DuplicateKey(String),
    #[error("Validation error: {0}")]
    ValidationRejected(String),
    #[error("{0}")]
    Conflict(String),
    #[error("Unexpected error: {0}")]
    Unexpected(String),
}

impl WorkflowError {
    pub(crate) fn kind(&self) -> ErrorKind {
        match self {
            Self::MissingField(_) => ErrorKind::MissingField,
            Self::NotFound(_) => ErrorKind::NotFound,
            Self::DuplicateKey(_) => ErrorKind::DuplicateKey,
            Self::ValidationRejected(_) => ErrorKind::ValidationRejected,
            Self::Conflict(_) => ErrorKind::Conflict,
            Self::Unexpected(_) => ErrorKind::Unexpected,
        }
    }

    /// Log the underlying store error with context and return an `Unexpected` variant.
    pub(crate) fn unexpected(err: impl std::fmt::Display, context: &str) -> Self {
        tracing::error!(error = %err, "{context}");
        Self::Unexpected(format!("{context}: {err}"))
    }

    /// Classifies a failed write. `duplicate` supplies the message used for unique-key conflicts.
    pub(crate) fn from_write(
        err: MongoError,
        context: &str,
        duplicate: impl FnOnce() -> Self,
    ) -> Self {
        match write_failure_code(&err) {
            Some(DUPLICATE_KEY_CODE) => {
                let classified = duplicate();
                tracing::warn!(error = %classified, "{context}");
                classified
            }
            Some(DOCUMENT_VALIDATION_FAILURE_CODE) => {
                tracing::error!(error = %err, "{context}");
                let message = write_failure_message(&err).unwrap_or_else(|| err.to_string());
                Self::ValidationRejected(message)
            }
            _ => Self::unexpected(err, context),
        }
    }
}

impl From<validator::ValidationErrors> for WorkflowError {
    fn from(errors: validator::ValidationErrors) -> Self {
        Self::ValidationRejected(errors.to_string())
    }
}

fn write_failure_code(err: &MongoError) -> Option<i32> {
    match err.kind.as_ref() {
        MongoErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.code),
        MongoErrorKind::BulkWrite(bulk) => {
            bulk.write_errors.as_ref().and_then(|errors| errors.first()).map(|write| write.code)
        }
        MongoErrorKind::Command(command) => Some(command.code),
        _ => None,
    }
}

fn write_failure_message(err: &MongoError) -> Option<String> {
    match err.kind.as_ref() {
        MongoErrorKind::Write(WriteFailure::WriteError(write)) => Some(write.message.clone()),
        MongoErrorKind::BulkWrite(bulk) => bulk
            .write_errors
            .as_ref()
            .and_then(|errors| errors.first())
            .map(|write| write.message.clone()),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_serialize_as_snake_case() {
        assert_eq!(serde_json::to_value(ErrorKind::DuplicateKey).unwrap(), "duplicate_key");
        assert_eq!(ErrorKind::ValidationRejected.as_str(), "validation_rejected");
    }

    #[test]
    fn messages_match_operation_contract() {
        assert_eq!(
            WorkflowError::MissingField("email").to_string(),
            "Missing required field: email"
        );
        assert_eq!(
            WorkflowError::NotFound("Instructor not found".into()).to_string(),
            "Instructor not found"
        );
        assert_eq!(WorkflowError::Conflict("x".into()).kind(), ErrorKind::Conflict);
    }

    #[test]
    fn unexpected_carries_context() {
        let err = WorkflowError::unexpected("socket closed", "Error enrolling student");
        assert_eq!(err.kind(), ErrorKind::Unexpected);
        assert_eq!(err.to_string(), "Unexpected error: Error enrolling student: socket closed");
    }
}
