use anyhow::Result;
use serde::Deserialize;
use anyhow::anyhow;

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub listing: ListingConfig,
    #[serde(default)]
    pub media: MediaConfig,
    #[serde(default)]
    pub auth: AuthConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    #[serde(default)]
    pub worker_threads: Option<usize>,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "127.0.0.1".into(), port: 8080, worker_threads: Some(4) }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    #[serde(default = "default_min_connections")]
    pub min_connections: u32,
    #[serde(default = "default_connect_timeout")]
    pub connect_timeout_secs: u64,
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,
    #[serde(default = "default_max_lifetime")]
    pub max_lifetime_secs: u64,
    #[serde(default = "default_acquire_timeout")]
    pub acquire_timeout_secs: u64,
    #[serde(default)]
    pub sqlx_logging: bool,
}

/// Listing lifecycle knobs. The TTL is the validity window granted at
/// creation and on every renewal.
#[derive(Debug, Clone, Deserialize)]
pub struct ListingConfig {
    #[serde(default = "default_ttl_minutes")]
    pub ttl_minutes: i64,
}

impl Default for ListingConfig {
    fn default() -> Self {
        Self { ttl_minutes: default_ttl_minutes() }
    }
}

/// Where uploaded media lands on disk and under which URL prefix it is
/// served back.
#[derive(Debug, Clone, Deserialize)]
pub struct MediaConfig {
    pub upload_dir: String,
    pub url_prefix: String,
}

impl Default for MediaConfig {
    fn default() -> Self {
        Self { upload_dir: "data/uploads".into(), url_prefix: "/uploads".into() }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
pub struct AuthConfig {
    #[serde(default)]
    pub jwt_secret: String,
}

fn default_max_connections() -> u32 { 10 }
fn default_min_connections() -> u32 { 2 }
fn default_connect_timeout() -> u64 { 30 }
fn default_idle_timeout() -> u64 { 600 }
fn default_max_lifetime() -> u64 { 3600 }
fn default_acquire_timeout() -> u64 { 30 }
fn default_ttl_minutes() -> i64 { 10 }

pub fn load_default() -> Result<AppConfig> {
    let path = std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.toml".to_string());
    load_from_file(&path)
}

pub fn load_from_file(path: &str) -> Result<AppConfig> {
    let content = std::fs::read_to_string(path)?;
    let cfg: AppConfig = toml::from_str(&content)?;
    Ok(cfg)
}

impl AppConfig {
    pub fn load_and_validate() -> Result<Self> {
        let mut cfg = load_default()?;
        cfg.normalize_and_validate()?;
        Ok(cfg)
    }

    pub fn normalize_and_validate(&mut self) -> Result<()> {
        self.server.normalize()?;
        // Database URL may come from the environment instead of the file.
        self.database.normalize_from_env();
        self.database.validate()?;
        self.listing.validate()?;
        self.media.normalize()?;
        self.auth.normalize_from_env();
        Ok(())
    }
}

impl ServerConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.host.trim().is_empty() {
            self.host = "127.0.0.1".to_string();
        }
        if self.port == 0 {
            return Err(anyhow!("server.port must be in 1..=65535"));
        }
        if let Some(w) = self.worker_threads {
            if w == 0 { self.worker_threads = Some(4); }
        } else {
            self.worker_threads = Some(4);
        }
        Ok(())
    }
}

impl DatabaseConfig {
    pub fn normalize_from_env(&mut self) {
        if self.url.trim().is_empty() {
            if let Ok(url) = std::env::var("DATABASE_URL") {
                self.url = url;
            }
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.url.trim().is_empty() {
            return Err(anyhow!("database.url is empty; set it in config.toml or via DATABASE_URL"));
        }
        let lower = self.url.to_lowercase();
        if !(lower.starts_with("postgresql://") || lower.starts_with("postgres://")) {
            return Err(anyhow!("database.url must start with postgresql:// or postgres://"));
        }
        if self.min_connections == 0 {
            return Err(anyhow!("database.min_connections must be >= 1"));
        }
        if self.max_connections < self.min_connections {
            return Err(anyhow!("database.max_connections must be >= min_connections"));
        }
        if self.connect_timeout_secs == 0 || self.acquire_timeout_secs == 0 {
            return Err(anyhow!("database timeouts must be positive seconds"));
        }
        Ok(())
    }
}

impl ListingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.ttl_minutes <= 0 {
            return Err(anyhow!("listing.ttl_minutes must be >= 1"));
        }
        Ok(())
    }
}

impl MediaConfig {
    fn normalize(&mut self) -> Result<()> {
        if self.upload_dir.trim().is_empty() {
            self.upload_dir = "data/uploads".into();
        }
        if self.url_prefix.trim().is_empty() {
            self.url_prefix = "/uploads".into();
        }
        if !self.url_prefix.starts_with('/') {
            return Err(anyhow!("media.url_prefix must start with '/'"));
        }
        // Generated media URLs are prefix + "/" + relative path; a trailing
        // slash here would double the separator.
        while self.url_prefix.len() > 1 && self.url_prefix.ends_with('/') {
            self.url_prefix.pop();
        }
        Ok(())
    }
}

impl AuthConfig {
    pub fn normalize_from_env(&mut self) {
        if self.jwt_secret.trim().is_empty() {
            if let Ok(secret) = std::env::var("JWT_SECRET") {
                self.jwt_secret = secret;
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn listing_defaults_to_ten_minutes() {
        let cfg = AppConfig::default();
        assert_eq!(cfg.listing.ttl_minutes, 10);
    }

    fn valid_base() -> AppConfig {
        let mut cfg = AppConfig::default();
        cfg.database.url = "postgres://localhost/market".into();
        cfg.database.max_connections = 5;
        cfg.database.min_connections = 1;
        cfg.database.connect_timeout_secs = 5;
        cfg.database.acquire_timeout_secs = 5;
        cfg
    }

    #[test]
    fn media_prefix_must_be_rooted() {
        let mut cfg = valid_base();
        cfg.media.url_prefix = "uploads".into();
        assert!(cfg.normalize_and_validate().is_err());
    }

    #[test]
    fn media_prefix_trailing_slash_is_trimmed() {
        let mut cfg = valid_base();
        cfg.media.url_prefix = "/uploads/".into();
        cfg.normalize_and_validate().unwrap();
        assert_eq!(cfg.media.url_prefix, "/uploads");
    }

    #[test]
    fn listing_ttl_zero_rejected() {
        let cfg = ListingConfig { ttl_minutes: 0 };
        assert!(cfg.validate().is_err());
    }
}
