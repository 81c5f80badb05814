use krydd_http::{catalog, ErrDef, ProblemResponse, ValidationError};

use crate::domain::error::DomainError;

fn from_def(def: ErrDef, detail: impl Into<String>, instance: &str) -> ProblemResponse {
    ProblemResponse(def.to_problem(detail).with_instance(instance))
}

/// Map domain error to RFC9457 ProblemResponse
pub fn map_domain_error(e: &DomainError, instance: &str) -> ProblemResponse {
    match e {
        DomainError::NotFound { .. } => from_def(catalog::NOT_FOUND, e.to_string(), instance),
        DomainError::AlreadyExists { .. } => from_def(catalog::CONFLICT, e.to_string(), instance),
        DomainError::Validation(v) => {
            let errors = v
                .violations
                .iter()
                .map(|violation| ValidationError {
                    detail: violation.message.clone(),
                    pointer: violation.path.clone(),
                })
                .collect();
            let ProblemResponse(problem) = from_def(catalog::VALIDATION_FAILED, v.to_string(), instance);
            ProblemResponse(problem.with_errors(errors))
        }
        DomainError::InvalidCursor(c) => {
            let ProblemResponse(problem) = from_def(catalog::INVALID_CURSOR, c.to_string(), instance);
            ProblemResponse(problem.with_code(c.code()))
        }
        DomainError::BadRequest { message } => from_def(catalog::BAD_REQUEST, message, instance),
        DomainError::Dependency { dependency, .. } => {
            // Log the internal error details but don't expose them to the client
            tracing::error!(error = %e, dependency, "Dependency failure");
            from_def(catalog::INTERNAL, "An internal error occurred", instance)
        }
    }
}
