use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

/// Success body: `{"success": true, "data": ..., "nextCursor": ...}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiEnvelope<T> {
    pub success: bool,
    pub data: T,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next_cursor: Option<String>,
}

impl<T> ApiEnvelope<T> {
    pub fn new(data: T) -> Self {
        Self {
            success: true,
            data,
            next_cursor: None,
        }
    }

    pub fn with_cursor(mut self, cursor: Option<String>) -> Self {
        self.next_cursor = cursor;
        self
    }
}

/// 200 OK + envelope
pub fn ok<T: Serialize>(data: T) -> Response {
    (StatusCode::OK, Json(ApiEnvelope::new(data))).into_response()
}

/// 200 OK + envelope carrying the continuation cursor of a list
pub fn ok_page<T: Serialize>(data: T, next_cursor: Option<String>) -> Response {
    (
        StatusCode::OK,
        Json(ApiEnvelope::new(data).with_cursor(next_cursor)),
    )
        .into_response()
}

/// 201 Created + envelope
pub fn created<T: Serialize>(data: T) -> Response {
    (StatusCode::CREATED, Json(ApiEnvelope::new(data))).into_response()
}

/// 200 OK + `{"success": true, "message": ...}` for operations without a body
pub fn ok_message(message: &str) -> Response {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "success": true, "message": message })),
    )
        .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cursor_is_omitted_when_absent() {
        let body = serde_json::to_value(ApiEnvelope::new(vec![1, 2])).unwrap();
        assert_eq!(body, serde_json::json!({"success": true, "data": [1, 2]}));

        let body =
            serde_json::to_value(ApiEnvelope::new(1).with_cursor(Some("abc".into()))).unwrap();
        assert_eq!(body["nextCursor"], "abc");
    }

    #[test]
    fn created_sets_status() {
        assert_eq!(created("x").status(), StatusCode::CREATED);
        assert_eq!(ok_page("x", None).status(), StatusCode::OK);
    }
}
