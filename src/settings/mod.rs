use anyhow::{bail, Context, Result};
use config::{Config, Environment};
use serde::Deserialize;
use std::path::PathBuf;
use url::Url;

/// Prefix for environment variables that override configuration values,
/// e.g. `SCREENSHOT_RENAMER_SEARCH_DIR`.
pub const ENV_PREFIX: &str = "SCREENSHOT_RENAMER";

pub const DEFAULT_SEARCH_DIR: &str = "~/Downloads/";
pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "google/gemma-3-27b-it:free";
pub const DEFAULT_API_KEY_ENV: &str = "OPENROUTER_API_KEY";
pub const DEFAULT_QUALITY: u8 = 80;

pub const DEFAULT_PROMPT: &str = r#"
You are an AI tasked with generating a concise, meaningful filename for a screenshot. Analyze the content of the screenshot and create a filename that:
- Reflects the main subject or purpose of the screenshot.
- Uses all lowercase letters.
- Separates words with hyphens ("-").
- Is brief (aim for 3-5 words, max 30 characters).
- Avoids special characters unless essential.
- Output at least two options but no more than four options.
- Output format is json, nothing but json. Do NOT put reasonings in the output.
Example: For a screenshot of a login page, the filename might be "login-page" or "login-new-user". The output looks like:
{
    "filenames": ["login-page", "login-new-user"]
}
Based on the provided screenshot, generate filenames that meet these criteria.
"#;

/// Runtime configuration shared by every pipeline step
#[derive(Debug, Clone, Deserialize)]
pub struct RenamerConfig {
    /// Directory scanned for screenshots, `~` is expanded
    pub search_dir: String,

    /// Filename prefix a screenshot must start with
    pub file_prefix: String,

    /// Extension (without dot) a screenshot must end with
    pub file_extension: String,

    /// Media type placed in the data URL header
    pub media_type: String,

    /// Chat-completion endpoint
    pub endpoint: String,

    /// Hosted model identifier sent with each request
    pub model: String,

    /// Instruction sent alongside the image
    pub prompt: String,

    /// Name of the environment variable holding the bearer token
    pub api_key_env: String,

    /// Compressor executable, looked up on `PATH`
    pub compressor: String,

    /// Quality passed to the compressor via `-q`
    pub quality: u8,

    /// Extension (without dot) of the compressed output
    pub output_extension: String,

    /// Write logs to a timestamped file in this directory instead of stderr
    #[serde(default)]
    pub log_dir: Option<PathBuf>,
}

impl Default for RenamerConfig {
    fn default() -> Self {
        Self {
            search_dir: DEFAULT_SEARCH_DIR.to_string(),
            file_prefix: "SCR-".to_string(),
            file_extension: "png".to_string(),
            media_type: "image/png".to_string(),
            endpoint: DEFAULT_ENDPOINT.to_string(),
            model: DEFAULT_MODEL.to_string(),
            prompt: DEFAULT_PROMPT.to_string(),
            api_key_env: DEFAULT_API_KEY_ENV.to_string(),
            compressor: "cwebp".to_string(),
            quality: DEFAULT_QUALITY,
            output_extension: "webp".to_string(),
            log_dir: None,
        }
    }
}

impl RenamerConfig {
    /// Loads defaults overlaid with `SCREENSHOT_RENAMER_*` environment variables.
    pub fn load() -> Result<Self> {
        Self::load_from(Environment::with_prefix(ENV_PREFIX))
    }

    /// Loads defaults overlaid with the given environment source.
    pub fn load_from(environment: Environment) -> Result<Self> {
        let defaults = Self::default();
        let settings = Config::builder()
            .set_default("search_dir", defaults.search_dir)?
            .set_default("file_prefix", defaults.file_prefix)?
            .set_default("file_extension", defaults.file_extension)?
            .set_default("media_type", defaults.media_type)?
            .set_default("endpoint", defaults.endpoint)?
            .set_default("model", defaults.model)?
            .set_default("prompt", defaults.prompt)?
            .set_default("api_key_env", defaults.api_key_env)?
            .set_default("compressor", defaults.compressor)?
            .set_default("quality", i64::from(defaults.quality))?
            .set_default("output_extension", defaults.output_extension)?
            .add_source(environment.try_parsing(true))
            .build()
            .context("Failed to build configuration")?;

        let config: Self = settings
            .try_deserialize()
            .context("Failed to deserialize configuration")?;
        config.validate()?;
        Ok(config)
    }

    /// Checks values that serde cannot constrain on its own
    pub fn validate(&self) -> Result<()> {
        if self.quality > 100 {
            bail!("quality must be between 0 and 100, got {}", self.quality);
        }

        let endpoint = Url::parse(&self.endpoint)
            .with_context(|| format!("Invalid endpoint URL: {}", self.endpoint))?;
        if endpoint.scheme() != "http" && endpoint.scheme() != "https" {
            bail!("endpoint must use http or https, got {}", endpoint.scheme());
        }

        if self.file_extension.is_empty() || self.output_extension.is_empty() {
            bail!("file and output extensions must not be empty");
        }
        if self.compressor.is_empty() {
            bail!("compressor must not be empty");
        }

        Ok(())
    }

    /// Search directory with `~` expanded
    pub fn search_path(&self) -> PathBuf {
        crate::utils::expand_home(&self.search_dir)
    }

    /// Bearer token from the configured environment variable, if set
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.api_key_env).ok().filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn env_source(vars: &[(&str, &str)]) -> Environment {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        Environment::with_prefix(ENV_PREFIX).source(Some(map))
    }

    #[test]
    fn test_defaults() {
        let config = RenamerConfig::load_from(env_source(&[])).unwrap();
        assert_eq!(config.search_dir, "~/Downloads/");
        assert_eq!(config.file_prefix, "SCR-");
        assert_eq!(config.file_extension, "png");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(config.compressor, "cwebp");
        assert_eq!(config.quality, 80);
        assert_eq!(config.output_extension, "webp");
        assert!(config.log_dir.is_none());
    }

    #[test]
    fn test_environment_overrides() {
        let config = RenamerConfig::load_from(env_source(&[
            ("SCREENSHOT_RENAMER_SEARCH_DIR", "/tmp/shots"),
            ("SCREENSHOT_RENAMER_MODEL", "some/other-model"),
            ("SCREENSHOT_RENAMER_QUALITY", "65"),
        ]))
        .unwrap();

        assert_eq!(config.search_dir, "/tmp/shots");
        assert_eq!(config.model, "some/other-model");
        assert_eq!(config.quality, 65);
        assert_eq!(config.file_prefix, "SCR-");
    }

    #[test]
    fn test_rejects_invalid_quality() {
        let result = RenamerConfig::load_from(env_source(&[("SCREENSHOT_RENAMER_QUALITY", "150")]));
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_invalid_endpoint() {
        let mut config = RenamerConfig::default();
        config.endpoint = "not a url".to_string();
        assert!(config.validate().is_err());

        config.endpoint = "ftp://example.com/chat".to_string();
        assert!(config.validate().is_err());

        config.endpoint = "http://127.0.0.1:8080/v1/chat/completions".to_string();
        assert!(config.validate().is_ok());
    }
}
