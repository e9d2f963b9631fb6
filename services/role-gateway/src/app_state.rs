use std::sync::Arc;

use axum::extract::FromRef;
use common_authz::RoleUniverse;

use crate::config::GatewayConfig;
use crate::metrics::GatewayMetrics;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<GatewayConfig>,
    pub metrics: Arc<GatewayMetrics>,
}

impl AppState {
    pub fn new(config: GatewayConfig) -> anyhow::Result<Self> {
        Ok(Self {
            config: Arc::new(config),
            metrics: Arc::new(GatewayMetrics::new()?),
        })
    }

    pub fn role_universe(&self) -> Arc<RoleUniverse> {
        self.config.role_universe.clone()
    }
}

impl FromRef<AppState> for Arc<GatewayMetrics> {
    fn from_ref(state: &AppState) -> Self {
        state.metrics.clone()
    }
}
