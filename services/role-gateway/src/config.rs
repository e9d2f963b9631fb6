use anyhow::{Context, Result};
use common_authz::RoleUniverse;
use std::env;
use std::net::{IpAddr, SocketAddr};
use std::sync::Arc;

#[derive(Debug, Clone)]
pub struct GatewayConfig {
    pub host: IpAddr,
    pub port: u16,
    pub role_universe: Arc<RoleUniverse>,
    pub allowed_origins: Vec<String>,
}

impl GatewayConfig {
    pub fn from_env() -> Result<Self> {
        let host = env::var("HOST")
            .unwrap_or_else(|_| "0.0.0.0".to_string())
            .parse::<IpAddr>()
            .context("HOST must be an IP address")?;
        let port = match env::var("PORT") {
            Ok(value) => value.parse::<u16>().context("PORT must be a port number")?,
            Err(_) => 8080,
        };
        let role_universe = match env::var("GATEWAY_ROLE_UNIVERSE") {
            Ok(value) => Arc::new(
                value
                    .parse::<RoleUniverse>()
                    .context("GATEWAY_ROLE_UNIVERSE must be a comma separated role list")?,
            ),
            Err(_) => RoleUniverse::standard(),
        };
        let allowed_origins = env::var("GATEWAY_ALLOWED_ORIGINS")
            .map(|value| parse_origins(&value))
            .unwrap_or_else(|_| vec!["http://localhost:3000".to_string()]);

        Ok(Self {
            host,
            port,
            role_universe,
            allowed_origins,
        })
    }

    pub fn bind_addr(&self) -> SocketAddr {
        SocketAddr::from((self.host, self.port))
    }
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: IpAddr::from([0, 0, 0, 0]),
            port: 8080,
            role_universe: RoleUniverse::standard(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
        }
    }
}

fn parse_origins(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|origin| !origin.is_empty())
        .map(str::to_string)
        .collect()
}
