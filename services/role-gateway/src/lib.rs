pub mod app;
pub mod app_state;
pub mod config;
pub mod handlers;
pub mod metrics;

pub use crate::app::build_router;
pub use crate::app_state::AppState;
pub use crate::config::GatewayConfig;
pub use crate::metrics::GatewayMetrics;
