use std::fs;
use std::time::Duration;

use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};

use crate::account::DEFAULT_CURRENCIES;
use crate::transfer::EngineConfig;

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AppConfig {
    pub log_level: String,
    pub log_dir: String,
    pub log_file: String,
    pub use_json: bool,
    pub rotation: String,
    pub gateway: GatewayConfig,
    /// PostgreSQL connection URL; `DATABASE_URL` overrides
    #[serde(default)]
    pub postgres_url: Option<String>,
    #[serde(default = "default_max_connections")]
    pub postgres_max_connections: u32,
    #[serde(default)]
    pub ledger: LedgerConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct GatewayConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct LedgerConfig {
    /// Bound on one transfer's transaction; unset = no bound
    #[serde(default)]
    pub tx_timeout_ms: Option<u64>,
    /// `SELECT ... FOR UPDATE` both rows before writing
    #[serde(default)]
    pub lock_rows: bool,
    #[serde(default = "default_currencies")]
    pub supported_currencies: Vec<String>,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self {
            tx_timeout_ms: None,
            lock_rows: false,
            supported_currencies: default_currencies(),
        }
    }
}

#[derive(Debug, Serialize, Deserialize, Clone)]
pub struct AuthConfig {
    /// HS256 signing key; `JWT_SECRET` overrides
    #[serde(default)]
    pub jwt_secret: String,
    #[serde(default = "default_token_ttl_secs")]
    pub token_ttl_secs: u64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            jwt_secret: String::new(),
            token_ttl_secs: default_token_ttl_secs(),
        }
    }
}

const MAX_TOKEN_TTL_SECS: u64 = 30 * 24 * 3600;

fn default_max_connections() -> u32 {
    10
}

fn default_currencies() -> Vec<String> {
    DEFAULT_CURRENCIES.iter().map(|c| c.to_string()).collect()
}

fn default_token_ttl_secs() -> u64 {
    15 * 60
}

impl AppConfig {
    /// Load `config/{env}.yaml` and apply environment overrides
    pub fn load(env: &str) -> Result<Self> {
        let config_path = format!("config/{}.yaml", env);
        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path))?;

        let mut config = Self::from_yaml(&content)
            .with_context(|| format!("Failed to parse config file: {}", config_path))?;
        config.apply_overrides(
            std::env::var("DATABASE_URL").ok(),
            std::env::var("JWT_SECRET").ok(),
        );
        config.validate()?;
        Ok(config)
    }

    pub fn from_yaml(content: &str) -> Result<Self> {
        Ok(serde_yaml::from_str(content)?)
    }

    /// Non-empty values replace what the file says
    pub fn apply_overrides(&mut self, database_url: Option<String>, jwt_secret: Option<String>) {
        if let Some(url) = database_url.filter(|u| !u.is_empty()) {
            self.postgres_url = Some(url);
        }
        if let Some(secret) = jwt_secret.filter(|s| !s.is_empty()) {
            self.auth.jwt_secret = secret;
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.auth.jwt_secret.is_empty() {
            bail!("auth.jwt_secret is empty (set it in the config file or JWT_SECRET)");
        }
        if self.auth.token_ttl_secs == 0 || self.auth.token_ttl_secs > MAX_TOKEN_TTL_SECS {
            bail!("auth.token_ttl_secs must be in 1..={}", MAX_TOKEN_TTL_SECS);
        }
        if self.ledger.tx_timeout_ms == Some(0) {
            bail!("ledger.tx_timeout_ms must be > 0 when set");
        }
        Ok(())
    }

    pub fn engine_config(&self) -> EngineConfig {
        EngineConfig {
            tx_timeout: self.ledger.tx_timeout_ms.map(Duration::from_millis),
            lock_rows: self.ledger.lock_rows,
        }
    }

    pub fn token_ttl(&self) -> chrono::Duration {
        let secs = self.auth.token_ttl_secs.min(MAX_TOKEN_TTL_SECS) as i64;
        chrono::Duration::seconds(secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MINIMAL: &str = r#"
log_level: info
log_dir: ./logs
log_file: bank.log
use_json: false
rotation: daily
gateway:
  host: 0.0.0.0
  port: 8080
auth:
  jwt_secret: dev-secret
"#;

    #[test]
    fn test_minimal_config_defaults() {
        let config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.gateway.port, 8080);
        assert_eq!(config.postgres_url, None);
        assert_eq!(config.postgres_max_connections, 10);
        assert_eq!(config.ledger.supported_currencies, vec!["USD", "EUR", "CNY"]);
        assert!(!config.ledger.lock_rows);
        assert_eq!(config.auth.token_ttl_secs, 900);
        assert!(config.validate().is_ok());

        let engine = config.engine_config();
        assert_eq!(engine.tx_timeout, None);
        assert!(!engine.lock_rows);
    }

    #[test]
    fn test_ledger_section() {
        let yaml = format!(
            "{MINIMAL}ledger:\n  tx_timeout_ms: 2500\n  lock_rows: true\n  supported_currencies: [GBP]\n"
        );
        let config = AppConfig::from_yaml(&yaml).unwrap();
        let engine = config.engine_config();
        assert_eq!(engine.tx_timeout, Some(Duration::from_millis(2500)));
        assert!(engine.lock_rows);
        assert_eq!(config.ledger.supported_currencies, vec!["GBP"]);
    }

    #[test]
    fn test_env_overrides() {
        let mut config = AppConfig::from_yaml(MINIMAL).unwrap();
        config.apply_overrides(
            Some("postgresql://u:p@db:5432/bank".to_string()),
            Some("from-env".to_string()),
        );
        assert_eq!(
            config.postgres_url.as_deref(),
            Some("postgresql://u:p@db:5432/bank")
        );
        assert_eq!(config.auth.jwt_secret, "from-env");

        // Empty values are ignored
        config.apply_overrides(Some(String::new()), Some(String::new()));
        assert_eq!(config.auth.jwt_secret, "from-env");
    }

    #[test]
    fn test_validate_rejects_missing_secret() {
        let mut config = AppConfig::from_yaml(MINIMAL).unwrap();
        config.auth.jwt_secret.clear();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_token_ttl() {
        let mut config = AppConfig::from_yaml(MINIMAL).unwrap();
        assert_eq!(config.token_ttl(), chrono::Duration::minutes(15));

        config.auth.token_ttl_secs = u64::MAX;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_malformed_yaml() {
        assert!(AppConfig::from_yaml("gateway: [").is_err());
    }
}
