use std::time::Duration;

use async_trait::async_trait;
use stagehand_core::ConfigError;
use tokio::net::TcpStream;

use super::check::{HealthCheck, HealthCheckResult};

const DEFAULT_PORT: u16 = 1433;
const SERVER_KEYS: [&str; 5] = ["server", "data source", "address", "addr", "network address"];

/// Checks that the SQL Server named in an ADO-style connection string accepts TCP connections
#[derive(Debug, Clone)]
pub struct SqlServerHealthCheck {
    host: String,
    port: u16,
    timeout: Duration,
}

impl SqlServerHealthCheck {
    /// Parse `Server=host[\instance][,port];...`
    pub fn new(connection_string: &str) -> Result<Self, ConfigError> {
        let server = connection_string
            .split(';')
            .filter_map(|pair| pair.split_once('='))
            .find(|(key, _)| SERVER_KEYS.contains(&key.trim().to_lowercase().as_str()))
            .map(|(_, value)| value.trim())
            .filter(|value| !value.is_empty())
            .ok_or_else(|| {
                ConfigError::invalid_value(
                    "connection_string",
                    connection_string,
                    "an ADO connection string with a Server entry",
                )
            })?;

        let server = server.strip_prefix("tcp:").unwrap_or(server);
        let (host, port) = match server.split_once(',') {
            Some((host, port)) => {
                let port = port.trim().parse::<u16>().map_err(|_| {
                    ConfigError::invalid_value("connection_string", port, "a TCP port number")
                })?;
                (host, port)
            }
            None => (server, DEFAULT_PORT),
        };
        let host = host.split('\\').next().unwrap_or(host).trim();
        let host = if host == "." || host.eq_ignore_ascii_case("(local)") {
            "localhost"
        } else {
            host
        };

        Ok(Self {
            host: host.to_string(),
            port,
            timeout: Duration::from_secs(5),
        })
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }
}

#[async_trait]
impl HealthCheck for SqlServerHealthCheck {
    async fn check_health(&self) -> HealthCheckResult {
        let address = (self.host.as_str(), self.port);
        match tokio::time::timeout(self.timeout, TcpStream::connect(address)).await {
            Ok(Ok(_)) => HealthCheckResult::healthy(),
            Ok(Err(e)) => HealthCheckResult::unhealthy(format!(
                "sql server {}:{} unreachable: {}",
                self.host, self.port, e
            )),
            Err(_) => HealthCheckResult::unhealthy(format!(
                "sql server {}:{} did not answer within {:?}",
                self.host, self.port, self.timeout
            )),
        }
    }
}
