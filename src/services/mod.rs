pub(crate) mod analytics;
pub(crate) mod courses;
pub(crate) mod demo;
pub(crate) mod enrollments;
pub(crate) mod errors;
pub(crate) mod export;
pub(crate) mod population;
pub(crate) mod reports;
pub(crate) mod users;

use crate::core::metrics::record_operation;
use errors::WorkflowError;

/// Counts the outcome of a workflow and hands the result back unchanged.
pub(crate) fn observed<T>(
    operation: &'static str,
    result: Result<T, WorkflowError>,
) -> Result<T, WorkflowError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(err) => err.kind().as_str(),
    };
    record_operation(operation, outcome);
    result
}

/// Unwraps a required input field or names the first missing one.
pub(crate) fn require<T>(value: Option<T>, field: &'static str) -> Result<T, WorkflowError> {
    value.ok_or(WorkflowError::MissingField(field))
}

/// Read-side degradation: a failed query is logged, counted, and reported as no rows.
pub(crate) fn rows_or_empty<T>(
    operation: &'static str,
    context: &str,
    result: Result<Vec<T>, mongodb::error::Error>,
) -> Vec<T> {
    match result {
        Ok(rows) => {
            record_operation(operation, "ok");
            rows
        }
        Err(err) => {
            let err = WorkflowError::unexpected(err, context);
            record_operation(operation, err.kind().as_str());
            Vec::new()
        }
    }
}
