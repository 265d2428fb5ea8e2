//! Gateway configuration.

use std::time::Duration;

use ratefeed_fx::FxConfig;

/// Main gateway configuration. Built once at startup.
#[derive(Debug, Clone)]
pub struct GatewayConfig {
    /// Listen address.
    pub listen_addr: String,
    /// Listen port.
    pub listen_port: u16,
    /// Provider chain configuration.
    pub fx: FxConfig,
    /// Max-age advertised on cached responses.
    pub cache_ttl: Duration,
    /// Capacity of the in-process cache store.
    pub cache_max_entries: usize,
    /// Log level.
    pub log_level: String,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            listen_addr: "0.0.0.0".to_string(),
            listen_port: 8080,
            fx: FxConfig::default(),
            cache_ttl: Duration::from_secs(90),
            cache_max_entries: 10_000,
            log_level: "info".to_string(),
        }
    }
}

impl GatewayConfig {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self, String> {
        let mut config = Self::default();

        if let Ok(addr) = std::env::var("GATEWAY_LISTEN_ADDR") {
            config.listen_addr = addr;
        }

        if let Ok(port) = std::env::var("GATEWAY_LISTEN_PORT") {
            if let Ok(port) = port.parse() {
                config.listen_port = port;
            }
        }

        if let Ok(secs) = std::env::var("RATEFEED_CACHE_TTL_SECS") {
            if let Ok(secs) = secs.parse() {
                config.cache_ttl = Duration::from_secs(secs);
            }
        }

        if let Ok(level) = std::env::var("LOG_LEVEL") {
            config.log_level = level;
        }

        config.fx = FxConfig::from_env().map_err(|e| e.to_string())?;

        Ok(config)
    }

    /// Socket address to bind.
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.listen_addr, self.listen_port)
    }

    /// Validate configuration.
    pub fn validate(&self) -> Result<(), String> {
        if self.listen_port == 0 {
            return Err("Listen port cannot be 0".to_string());
        }

        if self.cache_ttl.is_zero() {
            return Err("Cache TTL cannot be 0".to_string());
        }

        if self.cache_max_entries == 0 {
            return Err("Cache capacity cannot be 0".to_string());
        }

        self.fx.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = GatewayConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.cache_ttl, Duration::from_secs(90));
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
    }

    #[test]
    fn test_invalid_config() {
        let mut config = GatewayConfig::default();
        config.listen_port = 0;
        assert!(config.validate().is_err());

        let mut config = GatewayConfig::default();
        config.fx.providers.clear();
        assert!(config.validate().is_err());
    }
}
