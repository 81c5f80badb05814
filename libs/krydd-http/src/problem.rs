use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::{HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;

/// Content type for Problem Details as per RFC 9457.
pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// RFC 9457 Problem Details, extended with `success: false` so clients can
/// branch on the same field for every response.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[schema(title = "Problem")]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    pub status: u16,
    pub detail: String,
    #[serde(default, skip_serializing_if = "String::is_empty")]
    pub instance: String,
    pub code: String,
    /// One entry per failed field for validation problems.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<Vec<ValidationError>>,
    #[serde(default)]
    pub success: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[schema(title = "ValidationError")]
pub struct ValidationError {
    pub detail: String,
    /// JSON Pointer to the invalid location (e.g. "/ingredients/0/name").
    pub pointer: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_string(),
            title: title.into(),
            status: status.as_u16(),
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            errors: None,
            success: false,
        }
    }

    pub fn with_type(mut self, type_url: impl Into<String>) -> Self {
        self.type_url = type_url.into();
        self
    }

    pub fn with_instance(mut self, uri: impl Into<String>) -> Self {
        self.instance = uri.into();
        self
    }

    pub fn with_code(mut self, code: impl Into<String>) -> Self {
        self.code = code.into();
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationError>) -> Self {
        self.errors = Some(errors);
        self
    }
}

/// Axum response wrapper that renders `Problem` with correct status & content type.
#[derive(Debug, Clone)]
pub struct ProblemResponse(pub Problem);

impl From<Problem> for ProblemResponse {
    fn from(p: Problem) -> Self {
        Self(p)
    }
}

macro_rules! rejection_problem {
    ($($rejection:ty),+) => {
        $(
            impl From<$rejection> for ProblemResponse {
                fn from(rejection: $rejection) -> Self {
                    Self(crate::catalog::BAD_REQUEST.to_problem(rejection.body_text()))
                }
            }
        )+
    };
}

// Extractor failures render as problems instead of axum's plain-text bodies.
rejection_problem!(JsonRejection, QueryRejection, PathRejection);

impl IntoResponse for ProblemResponse {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.0.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut resp = axum::Json(self.0).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            axum::http::header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http_body_util::BodyExt;

    #[tokio::test]
    async fn problem_into_response_sets_status_and_content_type() {
        let p = Problem::new(StatusCode::BAD_REQUEST, "Bad Request", "invalid payload")
            .with_code("VALIDATION_ERROR");
        let resp = ProblemResponse(p).into_response();
        assert_eq!(resp.status(), StatusCode::BAD_REQUEST);
        let ct = resp
            .headers()
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or("");
        assert_eq!(ct, APPLICATION_PROBLEM_JSON);

        let bytes = resp.into_body().collect().await.unwrap().to_bytes();
        let body: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body["success"], false);
        assert_eq!(body["status"], 400);
        assert_eq!(body["type"], "about:blank");
        assert!(body.get("errors").is_none());
        assert!(body.get("instance").is_none());
    }

    #[test]
    fn query_rejection_is_a_bad_request_problem() {
        let uri: axum::http::Uri = "/api/recipes?limit=abc".parse().unwrap();
        let rejection =
            axum::extract::Query::<std::collections::HashMap<String, u64>>::try_from_uri(&uri)
                .unwrap_err();
        let ProblemResponse(p) = rejection.into();
        assert_eq!(p.status, 400);
        assert_eq!(p.code, "BAD_REQUEST");
        assert!(!p.detail.is_empty());
    }

    #[test]
    fn problem_builder_pattern() {
        let p = Problem::new(
            StatusCode::BAD_REQUEST,
            "Validation Failed",
            "Input validation errors",
        )
        .with_code("VALIDATION_ERROR")
        .with_instance("/api/recipes")
        .with_errors(vec![ValidationError {
            detail: "must not be empty".to_string(),
            pointer: "/ingredients".to_string(),
        }]);

        assert_eq!(p.status, 400);
        assert_eq!(p.code, "VALIDATION_ERROR");
        assert_eq!(p.instance, "/api/recipes");
        assert_eq!(p.errors.as_ref().map(Vec::len), Some(1));
    }
}
