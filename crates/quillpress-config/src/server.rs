use std::env;
use std::net::SocketAddr;

use crate::env_or;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Environment {
    Development,
    Production,
    Test,
}

impl Environment {
    pub fn parse(value: &str) -> Self {
        match value.trim().to_ascii_lowercase().as_str() {
            "production" | "prod" => Environment::Production,
            "test" => Environment::Test,
            _ => Environment::Development,
        }
    }

    pub fn is_production(self) -> bool {
        self == Environment::Production
    }
}

#[derive(Clone, Debug)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
}

impl ServerConfig {
    pub fn from_env() -> Self {
        Self {
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env_or("PORT", 8080),
            environment: Environment::parse(&env::var("APP_ENV").unwrap_or_default()),
        }
    }

    /// Falls back to all interfaces when `host` is not an IP address.
    pub fn bind_addr(&self) -> SocketAddr {
        let ip = self
            .host
            .parse()
            .unwrap_or_else(|_| [0, 0, 0, 0].into());
        SocketAddr::new(ip, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_environment_parse() {
        assert_eq!(Environment::parse("production"), Environment::Production);
        assert_eq!(Environment::parse("PROD"), Environment::Production);
        assert_eq!(Environment::parse("test"), Environment::Test);
        assert_eq!(Environment::parse(""), Environment::Development);
        assert_eq!(Environment::parse("staging"), Environment::Development);
    }

    #[test]
    fn test_bind_addr() {
        let config = ServerConfig {
            host: "127.0.0.1".to_string(),
            port: 3000,
            environment: Environment::Development,
        };
        assert_eq!(config.bind_addr().to_string(), "127.0.0.1:3000");

        let config = ServerConfig {
            host: "localhost".to_string(),
            ..config
        };
        assert_eq!(config.bind_addr().to_string(), "0.0.0.0:3000");
    }
}
