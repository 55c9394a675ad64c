use serde::Serialize;
use serde_json::Value;

use crate::services::errors::{ErrorKind, WorkflowError};

pub(crate) mod analytics;
pub(crate) mod course;
pub(crate) mod enrollment;
pub(crate) mod user;

/// Uniform outcome printed for every workflow: `success` plus either `id`/`data` or
/// `error` with its `kind`.
#[derive(Debug, Serialize, PartialEq)]
pub(crate) struct OperationOutcome {
    pub(crate) success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) data: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) error: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) kind: Option<ErrorKind>,
}

impl OperationOutcome {
    pub(crate) fn with_id(id: impl Into<String>) -> Self {
        Self { success: true, id: Some(id.into()), data: None, error: None, kind: None }
    }

    pub(crate) fn with_data(data: Value) -> Self {
        Self { success: true, id: None, data: Some(data), error: None, kind: None }
    }

    pub(crate) fn failure(err: &WorkflowError) -> Self {
        Self {
            success: false,
            id: None,
            data: None,
            error: Some(err.to_string()),
            kind: Some(err.kind()),
        }
    }

    pub(crate) fn from_id_result(result: Result<String, WorkflowError>) -> Self {
        match result {
            Ok(id) => Self::with_id(id),
            Err(err) => Self::failure(&err),
        }
    }
}
