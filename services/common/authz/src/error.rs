use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use thiserror::Error;

pub type AuthzResult<T> = Result<T, AuthzError>;

/// Request rejections produced by the authorization gate.
///
/// The `Display` text is the response body, minus the trailing newline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AuthzError {
    #[error("ERROR - There is no role assigned")]
    NoRoleAsserted,
    #[error("ERROR - The current role ({role}) is not supported")]
    UnknownRole { role: String },
    #[error("ERROR - The current role ({role}) is not allowed to execute {resource} [{method}]")]
    RoleNotPermitted {
        role: String,
        resource: String,
        method: String,
    },
}

impl AuthzError {
    pub fn code(&self) -> &'static str {
        match self {
            AuthzError::NoRoleAsserted => "no_role",
            AuthzError::UnknownRole { .. } => "unknown_role",
            AuthzError::RoleNotPermitted { .. } => "role_not_permitted",
        }
    }
}

impl IntoResponse for AuthzError {
    fn into_response(self) -> Response {
        let mut resp = (StatusCode::FORBIDDEN, format!("{self}\n")).into_response();
        let headers = resp.headers_mut();
        headers.insert(
            header::CONTENT_TYPE,
            HeaderValue::from_static("text/plain; charset=utf-8"),
        );
        headers.insert("X-Error-Code", HeaderValue::from_static(self.code()));
        resp
    }
}

/// Configuration-time errors raised while declaring roles and policies.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PolicyError {
    #[error("role name must not be empty")]
    EmptyRole,
    #[error("explicit route policy must list at least one role")]
    EmptyPolicy,
    #[error("role universe must contain at least one role")]
    EmptyUniverse,
}
