use std::sync::Arc;

use axum::extract::{Request, State};
use axum::http::StatusCode;
use axum::middleware::{self, Next};
use axum::response::{IntoResponse, Response};
use axum::routing::MethodRouter;
use tracing::{debug, error};

use crate::guards::{authorize, role_claim};
use crate::policy::RoutePolicy;
use crate::roles::RoleUniverse;

/// Route policy attached to a request by [`annotate_policy`].
#[derive(Debug, Clone)]
pub struct AnnotatedPolicy(pub Arc<RoutePolicy>);

/// Stores `policy` in the request extensions and hands the request on. Never rejects.
pub async fn annotate_policy(policy: Arc<RoutePolicy>, mut request: Request, next: Next) -> Response {
    request.extensions_mut().insert(AnnotatedPolicy(policy));
    next.run(request).await
}

/// Enforces the annotated policy against the caller's role claim.
///
/// Must run inside [`annotate_policy`]. A request that reaches this gate without an
/// annotation is a wiring bug and gets a bare 500.
pub async fn authorize_roles(
    State(universe): State<Arc<RoleUniverse>>,
    request: Request,
    next: Next,
) -> Response {
    let Some(AnnotatedPolicy(policy)) = request.extensions().get::<AnnotatedPolicy>().cloned()
    else {
        error!(
            path = %request.uri().path(),
            method = %request.method(),
            "authorization gate reached without an annotated route policy"
        );
        return StatusCode::INTERNAL_SERVER_ERROR.into_response();
    };

    let decision = {
        let uri = request.uri();
        let resource = uri
            .path_and_query()
            .map(|value| value.as_str())
            .unwrap_or_else(|| uri.path());
        let claim = role_claim(request.headers());
        authorize(claim, &policy, &universe, resource, request.method()).inspect_err(|err| {
            debug!(
                role = claim.unwrap_or_default(),
                resource,
                method = %request.method(),
                reason = err.code(),
                "request rejected by role gate"
            );
        })
    };

    match decision {
        Ok(()) => next.run(request).await,
        Err(err) => err.into_response(),
    }
}

/// Registers a route policy on the methods already added to a method router:
/// annotator first, then the gate.
pub trait ProtectExt {
    fn protect(self, policy: RoutePolicy, universe: Arc<RoleUniverse>) -> Self;
}

impl<S> ProtectExt for MethodRouter<S>
where
    S: Clone + Send + Sync + 'static,
{
    fn protect(self, policy: RoutePolicy, universe: Arc<RoleUniverse>) -> Self {
        let policy = Arc::new(policy);
        // Layers added last run first. Unmatched methods keep the plain 405 fallback.
        self.route_layer(middleware::from_fn_with_state(universe, authorize_roles))
            .route_layer(middleware::from_fn(move |request: Request, next: Next| {
                let policy = policy.clone();
                async move { annotate_policy(policy, request, next).await }
            }))
    }
}
