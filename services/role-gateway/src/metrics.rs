use anyhow::Result;
use axum::body::Body;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use prometheus::{Encoder, IntCounterVec, Opts, Registry, TextEncoder};

#[derive(Clone)]
pub struct GatewayMetrics {
    registry: Registry,
    responses: IntCounterVec,
    authz_rejections: IntCounterVec,
}

impl GatewayMetrics {
    pub fn new() -> Result<Self> {
        let registry = Registry::new();
        let responses = IntCounterVec::new(
            Opts::new(
                "gateway_http_responses_total",
                "HTTP responses grouped by method and status",
            ),
            &["method", "status"],
        )?;
        let authz_rejections = IntCounterVec::new(
            Opts::new(
                "gateway_authz_rejections_total",
                "Requests rejected by the role gate grouped by reason",
            ),
            &["reason"],
        )?;
        registry.register(Box::new(responses.clone()))?;
        registry.register(Box::new(authz_rejections.clone()))?;
        Ok(Self {
            registry,
            responses,
            authz_rejections,
        })
    }

    pub fn record_response(&self, method: &str, status: StatusCode) {
        self.responses
            .with_label_values(&[method, status.as_str()])
            .inc();
    }

    pub fn record_rejection(&self, reason: &str) {
        self.authz_rejections.with_label_values(&[reason]).inc();
    }

    pub fn render(&self) -> Result<Response> {
        let encoder = TextEncoder::new();
        let metric_families = self.registry.gather();
        let mut buffer = Vec::new();
        encoder.encode(&metric_families, &mut buffer)?;
        let response = Response::builder()
            .status(StatusCode::OK)
            .header(
                header::CONTENT_TYPE,
                HeaderValue::from_static("text/plain; version=0.0.4"),
            )
            .body(Body::from(buffer))?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::to_bytes;

    #[tokio::test]
    async fn render_exposes_recorded_counters() {
        let metrics = GatewayMetrics::new().expect("metrics");
        metrics.record_response("GET", StatusCode::FORBIDDEN);
        metrics.record_rejection("unknown_role");

        let resp = metrics.render().expect("render");
        let bytes = to_bytes(resp.into_body(), 64 * 1024).await.expect("body");
        let text = String::from_utf8(bytes.to_vec()).expect("utf8");
        assert!(text.contains("gateway_http_responses_total{method=\"GET\",status=\"403\"} 1"));
        assert!(text.contains("gateway_authz_rejections_total{reason=\"unknown_role\"} 1"));
    }
}
