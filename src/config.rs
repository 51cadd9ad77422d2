use std::env;
use std::net::SocketAddr;
use std::time::Duration;

use crate::error::ConfigError;
use crate::store::GitHubConfig;

pub const DEFAULT_COURSES_ROOT: &str = "courses";
pub const DEFAULT_REVALIDATE_SECS: u64 = 300;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub github: GitHubConfig,
    pub courses_root: String,
    pub bind_addr: SocketAddr,
    pub revalidate: Duration,
}

impl AppConfig {
    pub fn new_from_env() -> Result<Self, ConfigError> {
        let github = GitHubConfig::new_from_env()?;

        let courses_root = env::var("COURSES_ROOT")
            .map(|root| root.trim_matches('/').to_string())
            .ok()
            .filter(|root| !root.is_empty())
            .unwrap_or_else(|| DEFAULT_COURSES_ROOT.to_string());

        let bind_addr = env::var("BIND_ADDR")
            .unwrap_or_else(|_| "127.0.0.1:3000".to_string())
            .parse()
            .map_err(|e: std::net::AddrParseError| ConfigError::Invalid {
                name: "BIND_ADDR",
                reason: e.to_string(),
            })?;

        let revalidate_secs = match env::var("REVALIDATE_SECS") {
            Ok(raw) => raw.parse::<u64>().map_err(|e| ConfigError::Invalid {
                name: "REVALIDATE_SECS",
                reason: e.to_string(),
            })?,
            Err(_) => DEFAULT_REVALIDATE_SECS,
        };

        Ok(Self {
            github,
            courses_root,
            bind_addr,
            revalidate: Duration::from_secs(revalidate_secs),
        })
    }
}
