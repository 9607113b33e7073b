use color_eyre::eyre::{eyre, WrapErr};
use color_eyre::Result;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const WORKFLOW_API_ENV: &str = "WORKFLOW_API_BASE_URL";
pub const LOGIN_API_ENV: &str = "LOGIN_API_BASE_URL";
pub const LOGIN_URL_ENV: &str = "LOGIN_URL";

const APP_DIR: &str = "workflow-console";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub server: ServerConfig,
    pub client: ClientConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    /// Base URL of the workflow service
    pub workflow_api_url: String,
    /// Base URL of the login service (projects and roles)
    pub login_api_url: String,
    /// Where users sign in when the console has no valid token
    pub login_url: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            workflow_api_url: "http://localhost:8080".to_string(),
            login_api_url: "http://localhost:8080".to_string(),
            login_url: "http://localhost:3000/dashboard".to_string(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    pub workflow_timeout_secs: u64,
    pub login_timeout_secs: u64,
    /// Delay before handing off to the login page
    pub redirect_grace_secs: u64,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            workflow_timeout_secs: 60,
            login_timeout_secs: 30,
            redirect_grace_secs: 3,
        }
    }
}

/// URL overrides given on the command line
#[derive(Debug, Clone, Default)]
pub struct UrlOverrides {
    pub workflow_api_url: Option<String>,
    pub login_api_url: Option<String>,
    pub login_url: Option<String>,
}

impl Config {
    /// `~/.config/workflow-console`, created if missing
    pub fn config_dir() -> Result<PathBuf> {
        // Use ~/.config instead of platform-specific directory
        let home_dir = dirs::home_dir().ok_or_else(|| eyre!("Could not find home directory"))?;
        let app_dir = home_dir.join(".config").join(APP_DIR);

        if !app_dir.exists() {
            fs::create_dir_all(&app_dir)?;
        }

        Ok(app_dir)
    }

    pub fn config_path() -> Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load config from file, or return default if file doesn't exist
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let contents = fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .wrap_err_with(|| format!("Invalid config file {}", path.display()))?;

        Ok(config)
    }

    /// Resolve the final config: file, then environment, then command line
    pub fn resolve(path: &Path, overrides: &UrlOverrides) -> Result<Self> {
        let mut config = Self::load_from(path)?;
        config.apply_env(|key| std::env::var(key).ok());
        config.apply_overrides(overrides);
        config.validate()?;
        Ok(config)
    }

    /// Apply environment overrides; `lookup` is `std::env::var` outside tests
    pub fn apply_env<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(url) = lookup(WORKFLOW_API_ENV) {
            self.server.workflow_api_url = url;
        }
        if let Some(url) = lookup(LOGIN_API_ENV) {
            self.server.login_api_url = url;
        }
        if let Some(url) = lookup(LOGIN_URL_ENV) {
            self.server.login_url = url;
        }
    }

    pub fn apply_overrides(&mut self, overrides: &UrlOverrides) {
        if let Some(url) = &overrides.workflow_api_url {
            self.server.workflow_api_url = url.clone();
        }
        if let Some(url) = &overrides.login_api_url {
            self.server.login_api_url = url.clone();
        }
        if let Some(url) = &overrides.login_url {
            self.server.login_url = url.clone();
        }
    }

    pub fn validate(&self) -> Result<()> {
        let urls = [
            ("server.workflow_api_url", &self.server.workflow_api_url),
            ("server.login_api_url", &self.server.login_api_url),
            ("server.login_url", &self.server.login_url),
        ];
        for (name, url) in urls {
            validate_url(url).map_err(|e| eyre!("{name}: {e}"))?;
        }
        Ok(())
    }

    /// Save config to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        let toml_string = toml::to_string_pretty(self)?;
        fs::write(path, toml_string)?;
        Ok(())
    }

    pub fn workflow_timeout(&self) -> Duration {
        Duration::from_secs(self.client.workflow_timeout_secs)
    }

    pub fn login_timeout(&self) -> Duration {
        Duration::from_secs(self.client.login_timeout_secs)
    }

    pub fn redirect_grace(&self) -> Duration {
        Duration::from_secs(self.client.redirect_grace_secs)
    }
}

/// Simple URL validation
pub fn validate_url(url: &str) -> Result<(), String> {
    if url.is_empty() {
        return Err("URL cannot be empty".to_string());
    }

    if !url.starts_with("http://") && !url.starts_with("https://") {
        return Err("URL must start with http:// or https://".to_string());
    }

    url::Url::parse(url).map_err(|e| format!("Invalid URL format: {e}"))?;

    Ok(())
}
