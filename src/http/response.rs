//! Response mapping.
//!
//! # Design Decisions
//! - Found: 200 with `application/json`, body is the file bytes verbatim
//! - Not found: bare 404, same as the framework's default fallback
//! - Server error: 500 with `{"error": <message>}`

use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Json;

use crate::http::dispatch::Dispatch;

impl Dispatch {
    /// Status code this outcome maps to.
    pub fn status(&self) -> StatusCode {
        match self {
            Dispatch::Found(_) => StatusCode::OK,
            Dispatch::NotFound => StatusCode::NOT_FOUND,
            Dispatch::ServerError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for Dispatch {
    fn into_response(self) -> Response {
        match self {
            Dispatch::Found(bytes) => (
                StatusCode::OK,
                [(header::CONTENT_TYPE, "application/json")],
                bytes,
            )
                .into_response(),
            Dispatch::NotFound => StatusCode::NOT_FOUND.into_response(),
            Dispatch::ServerError(message) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({ "error": message })),
            )
                .into_response(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Bytes};

    #[tokio::test]
    async fn test_found_is_json() {
        let res = Dispatch::Found(Bytes::from_static(b"[1,2]")).into_response();
        assert_eq!(res.status(), StatusCode::OK);
        assert_eq!(res.headers()[header::CONTENT_TYPE], "application/json");
        assert_eq!(to_bytes(res.into_body(), 1024).await.unwrap(), "[1,2]");
    }

    #[tokio::test]
    async fn test_server_error_body() {
        let res = Dispatch::ServerError("gone".into()).into_response();
        assert_eq!(res.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = to_bytes(res.into_body(), 1024).await.unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json, serde_json::json!({ "error": "gone" }));
    }

    #[tokio::test]
    async fn test_not_found_is_bare() {
        let res = Dispatch::NotFound.into_response();
        assert_eq!(res.status(), StatusCode::NOT_FOUND);
        assert!(to_bytes(res.into_body(), 1024).await.unwrap().is_empty());
    }
}
