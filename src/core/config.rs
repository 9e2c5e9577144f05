use crate::core::resolver::{
    DEFAULT_FALLBACK_RATE, DEFAULT_SOURCE, DEFAULT_TTL_SECS, ResolverPolicy,
};
use anyhow::{Context, Result, bail};
use chrono::Duration;
use directories::ProjectDirs;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::{fs, path::PathBuf};
use tracing::debug;

const BROWSER_USER_AGENT: &str =
    "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36";

fn default_sell_field() -> String {
    "venta".to_string()
}

fn default_buy_field() -> String {
    "compra".to_string()
}

#[derive(Debug, Deserialize, Serialize, Clone, PartialEq)]
pub struct ProviderConfig {
    pub name: String,
    pub url: String,
    #[serde(default)]
    pub user_agent: Option<String>,
    #[serde(default = "default_sell_field")]
    pub sell_field: String,
    #[serde(default = "default_buy_field")]
    pub buy_field: String,
}

impl ProviderConfig {
    pub fn new(name: &str, url: &str) -> Self {
        Self {
            name: name.to_string(),
            url: url.to_string(),
            user_agent: None,
            sell_field: default_sell_field(),
            buy_field: default_buy_field(),
        }
    }
}

/// The two blue-dollar quote sources, primary first.
pub fn default_providers() -> Vec<ProviderConfig> {
    vec![
        ProviderConfig {
            user_agent: Some(BROWSER_USER_AGENT.to_string()),
            ..ProviderConfig::new(
                "dolarhoy",
                "https://api.dolarhoy.com/v1/cotizaciones/dolar-blue",
            )
        },
        ProviderConfig::new("dolarapi", "https://dolarapi.com/v1/dolares/blue"),
    ]
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct CacheConfig {
    pub ttl_secs: i64,
    pub fallback_rate: Decimal,
    pub source: String,
    pub persist: bool,
    pub data_path: Option<String>,
}

impl Default for CacheConfig {
    fn default() -> Self {
        CacheConfig {
            ttl_secs: DEFAULT_TTL_SECS,
            fallback_rate: DEFAULT_FALLBACK_RATE,
            source: DEFAULT_SOURCE.to_string(),
            persist: true,
            data_path: None,
        }
    }
}

impl CacheConfig {
    /// Resolver policy for these settings. Rejects a negative or
    /// unrepresentable TTL and a fallback rate that is not positive.
    pub fn policy(&self) -> Result<ResolverPolicy> {
        if self.ttl_secs < 0 {
            bail!("cache.ttl_secs must not be negative: {}", self.ttl_secs);
        }
        let ttl = Duration::try_seconds(self.ttl_secs)
            .with_context(|| format!("cache.ttl_secs is out of range: {}", self.ttl_secs))?;
        if self.fallback_rate <= Decimal::ZERO {
            bail!(
                "cache.fallback_rate must be positive: {}",
                self.fallback_rate
            );
        }

        Ok(ResolverPolicy {
            ttl,
            fallback_rate: self.fallback_rate,
            source: self.source.clone(),
        })
    }

    pub fn data_path(&self) -> Result<PathBuf> {
        if let Some(custom_path) = &self.data_path {
            return Ok(PathBuf::from(custom_path));
        }
        let proj_dirs = ProjectDirs::from("ar", "bluerate", "bluerate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.data_dir().to_path_buf())
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
#[serde(default)]
pub struct ServerConfig {
    pub bind: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            bind: "127.0.0.1:8080".to_string(),
        }
    }
}

#[derive(Debug, Deserialize, Serialize, Clone)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub cache: CacheConfig,
    #[serde(default = "default_providers")]
    pub providers: Vec<ProviderConfig>,
}

impl Default for AppConfig {
    fn default() -> Self {
        AppConfig {
            server: ServerConfig::default(),
            cache: CacheConfig::default(),
            providers: default_providers(),
        }
    }
}

impl AppConfig {
    /// Loads the default config file, or built-in defaults when there is none.
    pub fn load() -> Result<Self> {
        debug!("Loading default config");
        let config_path = Self::default_config_path()?;
        if !config_path.exists() {
            debug!(
                "No config at {}, using built-in defaults",
                config_path.display()
            );
            return Ok(Self::default());
        }
        Self::load_from_path(&config_path)
    }

    pub fn default_config_path() -> Result<PathBuf> {
        let proj_dirs = ProjectDirs::from("ar", "bluerate", "bluerate")
            .context("Could not determine project directories")?;
        Ok(proj_dirs.config_dir().join("config.yaml"))
    }

    pub fn load_from_path<P: AsRef<std::path::Path>>(path: P) -> Result<Self> {
        let config_str = fs::read_to_string(path.as_ref())
            .with_context(|| format!("Failed to read config file: {}", path.as_ref().display()))?;

        let config: Self = serde_yaml::from_str(&config_str)
            .with_context(|| format!("Failed to parse config file: {}", path.as_ref().display()))?;
        config
            .cache
            .policy()
            .with_context(|| format!("Invalid config file: {}", path.as_ref().display()))?;
        debug!("Successfully loaded config");
        Ok(config)
    }
}
