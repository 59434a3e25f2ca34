//! Server configuration

use std::net::SocketAddr;
use std::time::Duration;

use crate::hub::DEFAULT_RELEASE_INTERVAL;

/// Server configuration options
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address to bind to
    pub bind_addr: SocketAddr,

    /// Maximum concurrent connections (0 = unlimited)
    pub max_connections: usize,

    /// Pause between message releases
    pub release_interval: Duration,

    /// The request line must arrive within this time
    pub request_timeout: Duration,

    /// Maximum request line length in bytes
    pub max_request_line: usize,

    /// Enable TCP_NODELAY (disable Nagle's algorithm)
    pub tcp_nodelay: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0:4040".parse().unwrap(),
            max_connections: 0, // Unlimited
            release_interval: DEFAULT_RELEASE_INTERVAL,
            request_timeout: Duration::from_secs(10),
            max_request_line: 16 * 1024,
            tcp_nodelay: true,
        }
    }
}

impl ServerConfig {
    /// Create a new config with custom bind address
    pub fn with_addr(addr: SocketAddr) -> Self {
        Self {
            bind_addr: addr,
            ..Default::default()
        }
    }

    /// Set the bind address
    pub fn bind(mut self, addr: SocketAddr) -> Self {
        self.bind_addr = addr;
        self
    }

    /// Set maximum connections
    pub fn max_connections(mut self, max: usize) -> Self {
        self.max_connections = max;
        self
    }

    /// Set the pause between message releases
    pub fn release_interval(mut self, interval: Duration) -> Self {
        self.release_interval = interval;
        self
    }

    /// Set the request timeout
    pub fn request_timeout(mut self, timeout: Duration) -> Self {
        self.request_timeout = timeout;
        self
    }

    /// Set the maximum request line length
    pub fn max_request_line(mut self, bytes: usize) -> Self {
        self.max_request_line = bytes;
        self
    }

    /// Enable or disable TCP_NODELAY
    pub fn tcp_nodelay(mut self, enabled: bool) -> Self {
        self.tcp_nodelay = enabled;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = ServerConfig::default();

        assert_eq!(config.bind_addr.port(), 4040);
        assert_eq!(config.max_connections, 0);
        assert_eq!(config.release_interval, Duration::from_millis(1500));
        assert_eq!(config.request_timeout, Duration::from_secs(10));
        assert_eq!(config.max_request_line, 16 * 1024);
        assert!(config.tcp_nodelay);
    }

    #[test]
    fn test_with_addr() {
        let addr: SocketAddr = "127.0.0.1:4041".parse().unwrap();
        let config = ServerConfig::with_addr(addr);

        assert_eq!(config.bind_addr, addr);
    }

    #[test]
    fn test_builder_chaining() {
        let addr: SocketAddr = "127.0.0.1:4040".parse().unwrap();
        let config = ServerConfig::default()
            .bind(addr)
            .max_connections(50)
            .release_interval(Duration::from_millis(500))
            .request_timeout(Duration::from_secs(5))
            .max_request_line(1024)
            .tcp_nodelay(false);

        assert_eq!(config.bind_addr, addr);
        assert_eq!(config.max_connections, 50);
        assert_eq!(config.release_interval, Duration::from_millis(500));
        assert_eq!(config.request_timeout, Duration::from_secs(5));
        assert_eq!(config.max_request_line, 1024);
        assert!(!config.tcp_nodelay);
    }
}
