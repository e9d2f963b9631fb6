use std::sync::Arc;

use axum::extract::State;
use axum::http::{HeaderMap, StatusCode};
use axum::response::{Html, IntoResponse, Response};
use common_authz::role_claim;
use tracing::warn;

use crate::metrics::GatewayMetrics;

pub async fn health() -> &'static str {
    "ok"
}

pub async fn metrics(State(metrics): State<Arc<GatewayMetrics>>) -> Response {
    match metrics.render() {
        Ok(resp) => resp,
        Err(err) => {
            warn!(error = %err, "Failed to render metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

pub async fn hello(headers: HeaderMap) -> Html<String> {
    let role = role_claim(&headers).unwrap_or_default();
    Html(format!("<h1>Hello World! - {role}</h1>\n"))
}

pub async fn create_root() -> Html<&'static str> {
    Html("<h1>CREATED! </h1>\n")
}

pub async fn read_foo_bar(headers: HeaderMap) -> Html<String> {
    let role = role_claim(&headers).unwrap_or_default();
    Html(format!("<h1>IT WORKS! - Using this as role {role}</h1>\n"))
}

pub async fn create_foo_bar() -> Html<&'static str> {
    Html("<h1>CREATED!</h1>\n")
}

pub async fn update_foo_bar() -> Html<&'static str> {
    Html("<h1>UPDATED!</h1>\n")
}

pub async fn patch_foo_bar() -> Html<&'static str> {
    Html("<h1>PATCHED!</h1>\n")
}

pub async fn free_resource() -> Html<&'static str> {
    Html("<h1>No need of roles here!!</h1>\n")
}
