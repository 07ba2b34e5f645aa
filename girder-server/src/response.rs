use axum::Json;
use axum::response::{IntoResponse, Response};
use http::StatusCode;
use serde::{Deserialize, Serialize};

const PROBLEM_TYPE: &str = "https://www.w3.org/Protocols/rfc2616/rfc2616-sec10.html";

/// Standard error body: status, type, title (standard status text), detail.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Problem {
    pub status: u16,
    #[serde(rename = "type")]
    pub kind: String,
    pub title: String,
    pub detail: String,
}

impl Problem {
    pub fn new(status: StatusCode, detail: impl Into<String>) -> Self {
        Self {
            status: status.as_u16(),
            kind: PROBLEM_TYPE.into(),
            title: status.canonical_reason().unwrap_or("").into(),
            detail: detail.into(),
        }
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status =
            StatusCode::from_u16(self.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        (status, Json(self)).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn title_is_standard_status_text() {
        let problem = Problem::new(StatusCode::NOT_FOUND, "ROUTE_NOT_FOUND");
        assert_eq!(problem.status, 404);
        assert_eq!(problem.title, "Not Found");
        assert_eq!(problem.detail, "ROUTE_NOT_FOUND");
    }

    #[test]
    fn serializes_with_type_key() {
        let problem = Problem::new(StatusCode::METHOD_NOT_ALLOWED, "METHOD_NOT_ALLOWED");
        let json = serde_json::to_value(&problem).unwrap();
        assert_eq!(json["status"], 405);
        assert_eq!(json["type"], PROBLEM_TYPE);
        assert_eq!(json["title"], "Method Not Allowed");
    }

    #[tokio::test]
    async fn into_response_sets_status() {
        let response = Problem::new(StatusCode::NOT_FOUND, "missing").into_response();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert_eq!(
            response.headers()["content-type"],
            "application/json"
        );
    }
}
