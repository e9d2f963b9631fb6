use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use axum::body::Body;
use axum::http::{HeaderValue, Request, StatusCode};
use axum::middleware;
use axum::routing::{get, post};
use axum::Router;
use common_authz::{authorize_roles, ProtectExt, RoleUniverse, RoutePolicy};
use http_body_util::BodyExt;
use tower::util::ServiceExt;

fn universe() -> Arc<RoleUniverse> {
    RoleUniverse::standard()
}

fn policy(raw: &str) -> RoutePolicy {
    raw.parse().expect("policy")
}

fn request(method: &str, uri: &str, role: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(role) = role {
        builder = builder.header("Role", role);
    }
    builder.body(Body::empty()).unwrap()
}

async fn body_text(resp: axum::response::Response) -> String {
    let bytes = resp.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn counting_router(path: &str, route_policy: RoutePolicy, hits: Arc<AtomicUsize>) -> Router {
    let handler = move || {
        let hits = hits.clone();
        async move {
            hits.fetch_add(1, Ordering::SeqCst);
            "ok"
        }
    };
    Router::new().route(
        path,
        get(handler.clone())
            .post(handler.clone())
            .put(handler)
            .protect(route_policy, universe()),
    )
}

#[tokio::test]
async fn open_policy_allows_known_role() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counting_router("/", policy("all"), hits.clone());

    let resp = app.oneshot(request("GET", "/", Some("treasury"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "ok");
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn open_policy_rejects_empty_claim() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counting_router("/", policy("all"), hits.clone());

    for role in [None, Some("")] {
        let resp = app.clone().oneshot(request("GET", "/", role)).await.unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
        assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "no_role");
        assert_eq!(body_text(resp).await, "ERROR - There is no role assigned\n");
    }
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn open_policy_rejects_unknown_role() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counting_router("/", policy("all"), hits.clone());

    let resp = app.oneshot(request("GET", "/", Some("guest"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(
        body_text(resp).await,
        "ERROR - The current role (guest) is not supported\n"
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn explicit_policy_rejects_role_outside_set() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counting_router("/foo/bar", policy("admin,lawyer"), hits.clone());

    let resp = app
        .oneshot(request("POST", "/foo/bar", Some("treasury")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "role_not_permitted");
    assert_eq!(
        body_text(resp).await,
        "ERROR - The current role (treasury) is not allowed to execute /foo/bar [POST]\n"
    );
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn explicit_policy_invokes_handler_exactly_once() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counting_router("/foo/bar", policy("admin,treasury"), hits.clone());

    let resp = app
        .oneshot(request("PUT", "/foo/bar", Some("admin")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn rejection_reports_query_string() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counting_router("/foo/bar", policy("admin"), hits);

    let resp = app
        .oneshot(request("GET", "/foo/bar?page=2", Some("secretary")))
        .await
        .unwrap();
    assert_eq!(
        body_text(resp).await,
        "ERROR - The current role (secretary) is not allowed to execute /foo/bar?page=2 [GET]\n"
    );
}

#[tokio::test]
async fn same_request_twice_yields_same_decision() {
    let hits = Arc::new(AtomicUsize::new(0));
    let app = counting_router("/foo/bar", policy("admin,lawyer"), hits.clone());

    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(request("POST", "/foo/bar", Some("lawyer")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::OK);
    }
    for _ in 0..2 {
        let resp = app
            .clone()
            .oneshot(request("POST", "/foo/bar", Some("secretary")))
            .await
            .unwrap();
        assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    }
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn policies_are_scoped_per_method() {
    let app = Router::new().route(
        "/foo/bar",
        get(|| async { "read" })
            .protect(policy("admin,treasury,lawyer"), universe())
            .merge(post(|| async { "write" }).protect(policy("admin,lawyer"), universe())),
    );

    let resp = app
        .clone()
        .oneshot(request("GET", "/foo/bar", Some("treasury")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let resp = app
        .oneshot(request("POST", "/foo/bar", Some("treasury")))
        .await
        .unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
}

#[tokio::test]
async fn gate_without_annotation_never_runs_handler() {
    let hits = Arc::new(AtomicUsize::new(0));
    let counter = hits.clone();
    let app = Router::new().route(
        "/",
        get(move || {
            let counter = counter.clone();
            async move {
                counter.fetch_add(1, Ordering::SeqCst);
                "ok"
            }
        })
        .layer(middleware::from_fn_with_state(universe(), authorize_roles)),
    );

    let resp = app.oneshot(request("GET", "/", Some("admin"))).await.unwrap();
    assert_eq!(resp.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(hits.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn open_policy_reads_non_ascii_role_claims() {
    let universe: Arc<RoleUniverse> = Arc::new("secrétaire,admin".parse().expect("universe"));
    let app = Router::new().route(
        "/",
        get(|| async { "ok" }).protect(policy("all"), universe),
    );

    let claim = |role: &str| {
        Request::builder()
            .method("GET")
            .uri("/")
            .header("Role", HeaderValue::from_bytes(role.as_bytes()).unwrap())
            .body(Body::empty())
            .unwrap()
    };

    let resp = app.clone().oneshot(claim("secrétaire")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    assert_eq!(body_text(resp).await, "ok");

    let resp = app.oneshot(claim("trésorier")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::FORBIDDEN);
    assert_eq!(resp.headers().get("X-Error-Code").unwrap(), "unknown_role");
    assert_eq!(
        body_text(resp).await,
        "ERROR - The current role (trésorier) is not supported\n"
    );
}
