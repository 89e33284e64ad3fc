//! Runtime settings for the HTTP server.

use std::path::PathBuf;

use title_index::DEFAULT_SEARCH_LIMIT;

pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
/// `*` allows any origin
pub const DEFAULT_ALLOWED_ORIGIN: &str = "*";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub allowed_origin: String,
    /// Search ranks at most this many movies before paginating
    pub search_cap: usize,
    /// Directory served for paths outside `/api`, none when unset
    pub static_dir: Option<PathBuf>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
            allowed_origin: DEFAULT_ALLOWED_ORIGIN.to_string(),
            search_cap: DEFAULT_SEARCH_LIMIT,
            static_dir: None,
        }
    }
}

impl ServerConfig {
    pub fn with_host(mut self, host: impl Into<String>) -> Self {
        self.host = host.into();
        self
    }

    pub fn with_port(mut self, port: u16) -> Self {
        self.port = port;
        self
    }

    pub fn with_allowed_origin(mut self, origin: impl Into<String>) -> Self {
        self.allowed_origin = origin.into();
        self
    }

    pub fn with_search_cap(mut self, cap: usize) -> Self {
        self.search_cap = cap;
        self
    }

    pub fn with_static_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.static_dir = Some(dir.into());
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ServerConfig::default();
        assert_eq!(config.bind_addr(), "0.0.0.0:8080");
        assert_eq!(config.allowed_origin, "*");
        assert_eq!(config.search_cap, 50);
        assert!(config.static_dir.is_none());
    }

    #[test]
    fn test_builder() {
        let config = ServerConfig::default()
            .with_host("127.0.0.1")
            .with_port(3000)
            .with_allowed_origin("http://localhost:5173")
            .with_search_cap(10)
            .with_static_dir("public");
        assert_eq!(config.bind_addr(), "127.0.0.1:3000");
        assert_eq!(config.allowed_origin, "http://localhost:5173");
        assert_eq!(config.search_cap, 10);
        assert_eq!(config.static_dir, Some(PathBuf::from("public")));
    }
}
