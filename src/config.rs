use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::info;

/// Groups created on first start when `auth.default_groups` is not set.
pub const DEFAULT_GROUPS: [(&str, &str); 2] = [("users", "User Group"), ("admin", "Admin Group")];

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub general: GeneralConfig,

    pub auth: AuthConfig,

    pub security: SecurityConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneralConfig {
    pub database_url: String,

    pub log_level: String,

    /// "pretty" or "json"
    pub log_format: String,

    /// Maximum database connections (default: 5)
    pub max_db_connections: u32,

    /// Minimum database connections (default: 1)
    pub min_db_connections: u32,
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            database_url: "sqlite:data/gatekeep.db".to_string(),
            log_level: "info".to_string(),
            log_format: "pretty".to_string(),
            max_db_connections: 5,
            min_db_connections: 1,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// Comma-separated group names created at provisioning time.
    /// When unset, `users` and `admin` are created.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_groups: Option<String>,

    /// Registry key of the profile record kind returned by `get_profile`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub auth_profile: Option<String>,

    /// Registry key of the fallback authenticator consulted after a failed
    /// hash comparison.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fallback_auth: Option<String>,
}

impl AuthConfig {
    /// Resolves the `(name, description)` pairs provisioning should create.
    ///
    /// Configured names carry an empty description; blank entries are skipped.
    #[must_use]
    pub fn group_seeds(&self) -> Vec<(String, String)> {
        match &self.default_groups {
            Some(list) => list
                .split(',')
                .map(str::trim)
                .filter(|name| !name.is_empty())
                .map(|name| (name.to_string(), String::new()))
                .collect(),
            None => DEFAULT_GROUPS
                .iter()
                .map(|(name, description)| ((*name).to_string(), (*description).to_string()))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SecurityConfig {
    /// bcrypt work factor (4..=31). Changing it only affects newly written hashes.
    pub bcrypt_cost: u32,

    /// Whether the legacy fallback rewrites verified hashes with the current scheme.
    pub upgrade_legacy_hashes: bool,

    /// Minimum length enforced on new passwords.
    pub min_password_length: usize,
}

impl Default for SecurityConfig {
    fn default() -> Self {
        Self {
            bcrypt_cost: 13,
            upgrade_legacy_hashes: true,
            min_password_length: 1,
        }
    }
}

impl Config {
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let mut config = Self::default();
        for path in &Self::config_paths() {
            if path.exists() {
                info!("Loading config from: {}", path.display());
                config = Self::load_from_path(path)?;
                break;
            }
        }

        if let Ok(url) = std::env::var("DATABASE_URL") {
            config.general.database_url = url;
        }

        Ok(config)
    }

    pub fn load_from_path(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;

        let config: Self = toml::from_str(&content)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;

        Ok(config)
    }

    pub fn save_to_path(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        info!("Config saved to: {}", path.display());
        Ok(())
    }

    fn config_paths() -> Vec<PathBuf> {
        let mut paths = vec![];

        if let Ok(explicit) = std::env::var("GATEKEEP_CONFIG") {
            paths.push(PathBuf::from(explicit));
        }

        paths.push(Self::default_config_path());

        if let Some(config_dir) = dirs::config_dir() {
            paths.push(config_dir.join("gatekeep").join("config.toml"));
        }

        if let Some(home) = dirs::home_dir() {
            paths.push(home.join(".gatekeep").join("config.toml"));
        }

        paths
    }

    fn default_config_path() -> PathBuf {
        PathBuf::from("gatekeep.toml")
    }

    pub fn create_default_if_missing() -> Result<bool> {
        let path = Self::default_config_path();
        if path.exists() {
            Ok(false)
        } else {
            let config = Self::default();
            config.save_to_path(&path)?;
            info!("Created default config file: {}", path.display());
            Ok(true)
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.general.database_url.trim().is_empty() {
            anyhow::bail!("general.database_url cannot be empty");
        }

        if self.general.min_db_connections > self.general.max_db_connections {
            anyhow::bail!(
                "general.min_db_connections ({}) exceeds max_db_connections ({})",
                self.general.min_db_connections,
                self.general.max_db_connections
            );
        }

        if !(4..=31).contains(&self.security.bcrypt_cost) {
            anyhow::bail!(
                "security.bcrypt_cost must be between 4 and 31, got {}",
                self.security.bcrypt_cost
            );
        }

        if self.security.min_password_length == 0 {
            anyhow::bail!("security.min_password_length must be at least 1");
        }

        Ok(())
    }
}
