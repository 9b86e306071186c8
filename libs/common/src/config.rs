//! HTTP server configuration

use anyhow::Result;
use serde::Deserialize;

/// Bind address for a service, read from `<PREFIX>_HOST` / `<PREFIX>_PORT`
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl ServerConfig {
    /// Load the server configuration for the service owning `prefix`
    pub fn load(prefix: &str, default_port: u16) -> Result<Self> {
        let settings = config::Config::builder()
            .set_default("host", "0.0.0.0")?
            .set_default("port", i64::from(default_port))?
            .add_source(config::Environment::with_prefix(prefix).try_parsing(true))
            .build()?;

        Ok(settings.try_deserialize()?)
    }

    /// `host:port` string suitable for a TCP listener
    pub fn bind_address(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
