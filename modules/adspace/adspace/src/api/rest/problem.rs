//! RFC 9457 Problem Details returned by every failing adspace endpoint.

use axum::http::{HeaderValue, StatusCode, header};
use axum::response::{IntoResponse, Response};
use serde::{Serialize, Serializer};
use utoipa::ToSchema;

use super::dto::StatusSnapshotDto;

pub const APPLICATION_PROBLEM_JSON: &str = "application/problem+json";

/// Prefix of every `type` URI; the error code completes it.
pub const ERROR_TYPE_BASE: &str = "https://errors.adspace.dev/";

#[must_use]
pub fn error_type(code: &str) -> String {
    format!("{ERROR_TYPE_BASE}{code}")
}

pub type ApiResult<T> = Result<T, Problem>;

#[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
fn serialize_status_code<S>(status: &StatusCode, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_u16(status.as_u16())
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(title = "Problem", description = "RFC 9457 Problem Details for HTTP APIs")]
#[must_use]
pub struct Problem {
    #[serde(rename = "type")]
    pub type_url: String,
    pub title: String,
    #[serde(serialize_with = "serialize_status_code")]
    #[schema(value_type = u16)]
    pub status: StatusCode,
    pub detail: String,
    pub instance: String,
    pub code: String,
    pub trace_id: Option<String>,
    pub errors: Option<Vec<ValidationViolation>>,
    /// Present on 402 responses so the caller can offer renewal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscription: Option<StatusSnapshotDto>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[schema(title = "ValidationViolation")]
pub struct ValidationViolation {
    pub field: String,
    pub message: String,
}

impl Problem {
    pub fn new(status: StatusCode, title: impl Into<String>, detail: impl Into<String>) -> Self {
        Self {
            type_url: "about:blank".to_owned(),
            title: title.into(),
            status,
            detail: detail.into(),
            instance: String::new(),
            code: String::new(),
            trace_id: None,
            errors: None,
            subscription: None,
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

    pub fn with_trace_id(mut self, id: impl Into<String>) -> Self {
        self.trace_id = Some(id.into());
        self
    }

    pub fn with_errors(mut self, errors: Vec<ValidationViolation>) -> Self {
        self.errors = Some(errors);
        self
    }

    pub fn with_subscription(mut self, snapshot: StatusSnapshotDto) -> Self {
        self.subscription = Some(snapshot);
        self
    }

    /// 400 for requests that cannot be decoded at all.
    pub fn bad_request(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::BAD_REQUEST, "Bad Request", detail)
            .with_type(error_type("ADSPACE_BAD_REQUEST"))
            .with_code("ADSPACE_BAD_REQUEST")
    }

    pub fn unauthorized(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::UNAUTHORIZED, "Unauthorized", detail)
            .with_type(error_type("ADSPACE_UNAUTHORIZED"))
            .with_code("ADSPACE_UNAUTHORIZED")
    }

    pub fn forbidden_role(detail: impl Into<String>) -> Self {
        Self::new(StatusCode::FORBIDDEN, "Forbidden", detail)
            .with_type(error_type("ADSPACE_FORBIDDEN_ROLE"))
            .with_code("ADSPACE_FORBIDDEN_ROLE")
    }
}

impl IntoResponse for Problem {
    fn into_response(self) -> Response {
        let status = self.status;
        let mut resp = axum::Json(self).into_response();
        *resp.status_mut() = status;
        resp.headers_mut().insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static(APPLICATION_PROBLEM_JSON),
        );
        resp
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn problem_serializes_status_as_u16_and_type_key() {
        let p = Problem::new(StatusCode::NOT_FOUND, "Not Found", "Listing x not found")
            .with_type(error_type("ADSPACE_NOT_FOUND"));
        let json = serde_json::to_value(&p).unwrap();
        assert_eq!(json["status"], 404);
        assert_eq!(json["type"], "https://errors.adspace.dev/ADSPACE_NOT_FOUND");
        assert!(json.get("subscription").is_none());
    }

    #[test]
    fn problem_response_uses_problem_content_type() {
        let resp = Problem::unauthorized("missing bearer token").into_response();
        assert_eq!(resp.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            resp.headers().get(header::CONTENT_TYPE).unwrap(),
            APPLICATION_PROBLEM_JSON
        );
    }
}
