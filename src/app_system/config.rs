use std::net::SocketAddr;
use std::time::Duration;

/// Runtime configuration, read from the environment (and `.env`).
#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub http_port: u16,
    /// Pause between two offers of the same job.
    pub broadcast_interval_ms: u64,
    pub actor_buffer_size: usize,
    /// Seed the default shelters at startup when the directory is empty.
    pub seed_shelters: bool,
    pub shutdown_timeout_ms: u64,
}

impl Config {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_addr: std::env::var("BIND_ADDR").unwrap_or(defaults.bind_addr),
            http_port: env_parse("HTTP_PORT").unwrap_or(defaults.http_port),
            broadcast_interval_ms: env_parse("BROADCAST_INTERVAL_MS").unwrap_or(defaults.broadcast_interval_ms),
            actor_buffer_size: env_parse("ACTOR_BUFFER_SIZE")
                .filter(|size| *size > 0)
                .unwrap_or(defaults.actor_buffer_size),
            seed_shelters: env_parse("SEED_SHELTERS").unwrap_or(defaults.seed_shelters),
            shutdown_timeout_ms: env_parse("SHUTDOWN_TIMEOUT_MS").unwrap_or(defaults.shutdown_timeout_ms),
        }
    }

    pub fn broadcast_interval(&self) -> Duration {
        Duration::from_millis(self.broadcast_interval_ms)
    }

    pub fn shutdown_timeout(&self) -> Duration {
        Duration::from_millis(self.shutdown_timeout_ms)
    }

    pub fn socket_addr(&self) -> Result<SocketAddr, std::net::AddrParseError> {
        format!("{}:{}", self.bind_addr, self.http_port).parse()
    }
}

/// Built-in defaults, without consulting the environment.
impl Default for Config {
    fn default() -> Self {
        Self {
            bind_addr: "0.0.0.0".into(),
            http_port: 4000,
            broadcast_interval_ms: 5000,
            actor_buffer_size: 32,
            seed_shelters: true,
            shutdown_timeout_ms: 5000,
        }
    }
}

fn env_parse<T: std::str::FromStr>(key: &str) -> Option<T> {
    std::env::var(key).ok().and_then(|v| v.parse().ok())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.broadcast_interval(), Duration::from_secs(5));
        assert_eq!(config.socket_addr().unwrap(), "0.0.0.0:4000".parse().unwrap());
        assert!(config.seed_shelters);
    }

    #[test]
    fn test_env_file_values_override_defaults() {
        let path = std::env::temp_dir().join(format!("redistribution-{}.env", std::process::id()));
        std::fs::write(&path, "BROADCAST_INTERVAL_MS=250\nSEED_SHELTERS=false\nACTOR_BUFFER_SIZE=0\n").unwrap();
        dotenvy::from_filename(&path).unwrap();
        std::fs::remove_file(&path).unwrap();

        let config = Config::from_env();
        assert_eq!(config.broadcast_interval(), Duration::from_millis(250));
        assert!(!config.seed_shelters);
        assert_eq!(config.actor_buffer_size, 32);
    }
}
