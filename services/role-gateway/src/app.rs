use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::header::{ACCEPT, CONTENT_TYPE};
use axum::http::{HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::{self, Next};
use axum::response::Response;
use axum::routing::{get, patch, post, put, MethodRouter};
use axum::Router;
use common_authz::{
    PolicyError, ProtectExt, RoleUniverse, RoutePolicy, ROLE_ADMIN, ROLE_LAWYER, ROLE_TREASURY,
};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{debug, warn};

use crate::app_state::AppState;
use crate::handlers::{
    create_foo_bar, create_root, free_resource, health, hello, metrics, patch_foo_bar,
    read_foo_bar, update_foo_bar,
};
use crate::metrics::GatewayMetrics;

/// Builds the full gateway router: protected routes behind the role gate, plus the
/// unprotected health, metrics and free-resource endpoints.
pub fn build_router(state: AppState) -> Result<Router, PolicyError> {
    let universe = state.role_universe();

    let protected = Router::new()
        .route("/", guard(get(hello), "/", RoutePolicy::open(), &universe))
        .route(
            "/",
            guard(post(create_root), "/", RoutePolicy::allow([ROLE_ADMIN])?, &universe),
        )
        .route(
            "/foo/bar",
            guard(
                get(read_foo_bar),
                "/foo/bar",
                RoutePolicy::allow([ROLE_ADMIN, ROLE_TREASURY, ROLE_LAWYER])?,
                &universe,
            ),
        )
        .route(
            "/foo/bar",
            guard(
                post(create_foo_bar),
                "/foo/bar",
                RoutePolicy::allow([ROLE_ADMIN, ROLE_LAWYER])?,
                &universe,
            ),
        )
        .route(
            "/foo/bar",
            guard(
                put(update_foo_bar),
                "/foo/bar",
                RoutePolicy::allow([ROLE_ADMIN, ROLE_TREASURY])?,
                &universe,
            ),
        )
        .route(
            "/foo/bar",
            guard(
                patch(patch_foo_bar),
                "/foo/bar",
                RoutePolicy::allow([ROLE_ADMIN, ROLE_TREASURY])?,
                &universe,
            ),
        );

    let cors = cors_layer(&state.config.allowed_origins);
    let app = Router::new()
        .route("/healthz", get(health))
        .route("/metrics", get(metrics))
        .route("/free-resource", get(free_resource))
        .merge(protected)
        .layer(middleware::from_fn_with_state(
            state.metrics.clone(),
            track_responses,
        ))
        .layer(cors)
        .with_state(state);
    Ok(app)
}

fn guard(
    route: MethodRouter<AppState>,
    path: &str,
    policy: RoutePolicy,
    universe: &Arc<RoleUniverse>,
) -> MethodRouter<AppState> {
    let unknown = policy.unknown_roles(universe);
    if !unknown.is_empty() {
        warn!(
            path,
            %policy,
            unknown = ?unknown,
            "Route policy lists roles outside the role universe"
        );
    }
    debug!(path, %policy, "Registered protected route");
    route.protect(policy, universe.clone())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    CorsLayer::new()
        .allow_origin(AllowOrigin::list(
            origins
                .iter()
                .filter_map(|origin| origin.parse::<HeaderValue>().ok())
                .collect::<Vec<_>>(),
        ))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::OPTIONS,
        ])
        .allow_headers([ACCEPT, CONTENT_TYPE, HeaderName::from_static("role")])
}

async fn track_responses(
    State(metrics): State<Arc<GatewayMetrics>>,
    request: Request,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let resp = next.run(request).await;
    metrics.record_response(method.as_str(), resp.status());
    if resp.status() == StatusCode::FORBIDDEN {
        if let Some(reason) = resp
            .headers()
            .get("X-Error-Code")
            .and_then(|value| value.to_str().ok())
        {
            metrics.record_rejection(reason);
        }
    }
    resp
}
