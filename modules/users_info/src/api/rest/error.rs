use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use modkit::api::problem::{Problem, ProblemResponse};

use crate::domain::error::DomainError;

/// Helper to create a ProblemResponse with less boilerplate
pub fn from_parts(
    status: StatusCode,
    code: &str,
    title: &str,
    message: impl Into<String>,
    instance: &str,
    request_id: Option<&str>,
) -> ProblemResponse {
    let problem = Problem::new(status, title, message)
        .with_type(format!("https://errors.example.com/{code}"))
        .with_code(code)
        .with_instance(instance);

    let problem = match request_id {
        Some(id) => problem.with_request_id(id),
        None => problem,
    };

    ProblemResponse(problem)
}

/// Map domain error to a ProblemResponse
pub fn map_domain_error(
    e: &DomainError,
    instance: &str,
    request_id: Option<&str>,
) -> ProblemResponse {
    match e {
        DomainError::UserNotFound { .. } => from_parts(
            StatusCode::NOT_FOUND,
            "USERS_NOT_FOUND",
            "User not found",
            "user not found",
            instance,
            request_id,
        ),
        DomainError::Validation { field, message } => from_parts(
            StatusCode::NOT_ACCEPTABLE,
            "USERS_VALIDATION",
            "Validation error",
            format!("{field}: {message}"),
            instance,
            request_id,
        ),
        DomainError::IdGeneration { .. } => {
            tracing::error!(error = ?e, "Id generation failed");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "USERS_ID_GENERATION",
                "Internal error",
                "unable to generate an id for the user",
                instance,
                request_id,
            )
        }
        DomainError::UpdateRejected { .. } => {
            tracing::warn!(error = ?e, "Update rejected");
            from_parts(
                StatusCode::NOT_FOUND,
                "USERS_UPDATE_REJECTED",
                "Update rejected",
                "user could not be updated",
                instance,
                request_id,
            )
        }
        DomainError::Database { .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = ?e, "Database error occurred");
            from_parts(
                StatusCode::INTERNAL_SERVER_ERROR,
                "INTERNAL_DB",
                "Internal error",
                "An internal database error occurred",
                instance,
                request_id,
            )
        }
    }
}

/// Map a body that failed to parse. Create and update use different statuses.
pub fn invalid_json(
    status: StatusCode,
    rejection: &JsonRejection,
    instance: &str,
    request_id: Option<&str>,
) -> ProblemResponse {
    from_parts(
        status,
        "USERS_INVALID_JSON",
        "Invalid request body",
        format!("invalid request body: {}", rejection.body_text()),
        instance,
        request_id,
    )
}
