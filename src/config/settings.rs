use serde::{Deserialize, Serialize};
use config::{Config, ConfigError, File};
use std::path::Path;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    pub app: AppSettings,
    pub server: ServerSettings,
    pub ens: EnsSettings,
    pub badge: BadgeSettings,
    pub etherscan: EtherscanSettings,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppSettings {
    pub name: String,
    pub version: String,
    pub log_level: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerSettings {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EnsSettings {
    pub rpc_url: String,
    pub chain_id: u64,
    pub timeout_seconds: u64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BadgeSettings {
    pub font_path: String,
    pub font_family: String,
    pub avatar_timeout_seconds: u64,
    pub max_avatar_bytes: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EtherscanSettings {
    pub api_url: String,
    pub api_key: Option<String>,
    pub timeout_seconds: u64,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            app: AppSettings {
                name: "ENS Badge".to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
                log_level: "info".to_string(),
            },
            server: ServerSettings {
                host: "0.0.0.0".to_string(),
                port: 8080,
            },
            ens: EnsSettings {
                rpc_url: "https://ethereum.publicnode.com".to_string(),
                chain_id: 1, // mainnet
                timeout_seconds: 15,
            },
            badge: BadgeSettings {
                font_path: "public/satoshi.ttf".to_string(),
                font_family: "satoshi".to_string(),
                avatar_timeout_seconds: 10,
                max_avatar_bytes: 5_000_000,
            },
            etherscan: EtherscanSettings {
                api_url: "https://api.etherscan.io".to_string(),
                api_key: None,
                timeout_seconds: 15,
            },
        }
    }
}

impl Settings {
    pub fn new() -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::with_name("config/default").required(false))
            .add_source(File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("ENS_BADGE")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        Ok(settings.with_env_api_key())
    }

    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let s = Config::builder()
            .add_source(Config::try_from(&Settings::default())?)
            .add_source(File::from(path.as_ref()))
            .build()?;

        let settings: Settings = s.try_deserialize()?;
        Ok(settings.with_env_api_key())
    }

    /// Falls back to the conventional `ETHERSCAN_API_KEY` variable when the
    /// key was not provided through the layered config.
    fn with_env_api_key(mut self) -> Self {
        if self.etherscan.api_key.as_deref().map_or(true, str::is_empty) {
            self.etherscan.api_key = std::env::var("ETHERSCAN_API_KEY")
                .ok()
                .filter(|k| !k.is_empty());
        }
        self
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.server.host, self.server.port)
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.ens.rpc_url.trim().is_empty() {
            return Err("ENS RPC URL must not be empty".to_string());
        }

        if self.server.port == 0 {
            return Err("Server port must be non-zero".to_string());
        }

        if self.ens.timeout_seconds == 0
            || self.badge.avatar_timeout_seconds == 0
            || self.etherscan.timeout_seconds == 0
        {
            return Err("Timeouts must be at least one second".to_string());
        }

        if self.badge.max_avatar_bytes == 0 {
            return Err("Maximum avatar size must be non-zero".to_string());
        }

        Ok(())
    }
}
