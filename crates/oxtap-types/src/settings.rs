//! Tap configuration: layered loading and validation.

use std::collections::HashMap;
use std::fs;
use std::path::PathBuf;

use chrono::NaiveDate;
use config::{Config, Environment, File, FileFormat};
use serde::Deserialize;

use crate::ConfigError;

/// Base URL of the Open Exchange Rates API.
pub const DEFAULT_API_URL: &str = "https://openexchangerates.org/api";

/// Prefix for configuration environment variables, e.g. `TAP_OPENEXCHANGERATES_APP_ID`.
pub const ENV_PREFIX: &str = "TAP_OPENEXCHANGERATES";

/// Where a layer of configuration comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    /// A JSON config file.
    File(PathBuf),
    /// Environment variables only (the `--config ENV` form).
    Env,
}

impl From<&str> for ConfigSource {
    fn from(value: &str) -> Self {
        if value == "ENV" {
            Self::Env
        } else {
            Self::File(PathBuf::from(value))
        }
    }
}

/// Settings for one extraction run.
#[derive(Clone, PartialEq, Eq, Deserialize)]
pub struct TapConfig {
    /// API key, sent as the `app_id` query parameter.
    pub app_id: String,
    /// First day to request when no bookmark exists.
    #[serde(alias = "date")]
    pub start_date: NaiveDate,
    /// Restrict results to these currency codes.
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
    /// Base currency override (the API defaults to USD).
    #[serde(default)]
    pub base: Option<String>,
    /// Value for the `User-Agent` header.
    #[serde(default)]
    pub user_agent: Option<String>,
    /// API root; only overridden for proxies and tests.
    #[serde(default = "default_api_url")]
    pub api_url: String,
}

fn default_api_url() -> String {
    DEFAULT_API_URL.to_string()
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("app_id", &"<redacted>")
            .field("start_date", &self.start_date)
            .field("symbols", &self.symbols)
            .field("base", &self.base)
            .field("user_agent", &self.user_agent)
            .field("api_url", &self.api_url)
            .finish()
    }
}

impl TapConfig {
    /// Creates a config with only the required settings.
    #[must_use]
    pub fn new(app_id: impl Into<String>, start_date: NaiveDate) -> Self {
        Self {
            app_id: app_id.into(),
            start_date,
            symbols: None,
            base: None,
            user_agent: None,
            api_url: default_api_url(),
        }
    }

    /// Loads config files in order, overlays the process environment, and validates.
    ///
    /// # Errors
    ///
    /// Returns an error if a file cannot be read, a required setting is
    /// missing, or validation fails.
    pub fn load(sources: &[ConfigSource]) -> Result<Self, ConfigError> {
        Self::load_with_env(sources, None)
    }

    /// Like [`TapConfig::load`], but reads environment variables from `env`
    /// instead of the process environment when given.
    ///
    /// # Errors
    ///
    /// See [`TapConfig::load`].
    pub fn load_with_env(
        sources: &[ConfigSource],
        env: Option<HashMap<String, String>>,
    ) -> Result<Self, ConfigError> {
        let mut builder = Config::builder();

        for source in sources {
            if let ConfigSource::File(path) = source {
                let content = fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
                    path: path.clone(),
                    source: e,
                })?;
                builder = builder.add_source(File::from_str(&content, FileFormat::Json));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix(ENV_PREFIX)
                .try_parsing(true)
                .list_separator(",")
                .with_list_parse_key("symbols")
                .source(env),
        );

        let config: Self = builder.build()?.try_deserialize()?;
        config.validate()?;
        Ok(config)
    }

    /// Checks the settings before any request is issued.
    ///
    /// # Errors
    ///
    /// Returns the first problem found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.app_id.trim().is_empty() {
            return Err(ConfigError::EmptyAppId);
        }

        if let Some(base) = &self.base {
            check_currency("base", base)?;
        }

        if let Some(symbols) = &self.symbols {
            if symbols.is_empty() {
                return Err(ConfigError::EmptySymbols);
            }
            for symbol in symbols {
                check_currency("symbols", symbol)?;
            }
        }

        if !(self.api_url.starts_with("http://") || self.api_url.starts_with("https://")) {
            return Err(ConfigError::InvalidApiUrl(self.api_url.clone()));
        }

        Ok(())
    }
}

fn check_currency(field: &'static str, code: &str) -> Result<(), ConfigError> {
    if code.len() == 3 && code.bytes().all(|b| b.is_ascii_uppercase()) {
        Ok(())
    } else {
        Err(ConfigError::InvalidCurrency {
            field,
            value: code.to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(json: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(json.as_bytes()).unwrap();
        file
    }

    fn empty_env() -> Option<HashMap<String, String>> {
        Some(HashMap::new())
    }

    #[test]
    fn test_load_file() {
        let file = write_config(
            r#"{
                "start_date": "2023-04-23",
                "app_id": "1234567890",
                "base": "USD",
                "user_agent": "tap-openexchangerates/0.0.1",
                "symbols": ["ZWL"]
            }"#,
        );
        let config =
            TapConfig::load_with_env(&[ConfigSource::File(file.path().into())], empty_env())
                .unwrap();

        assert_eq!(config.app_id, "1234567890");
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2023, 4, 23).unwrap());
        assert_eq!(config.base.as_deref(), Some("USD"));
        assert_eq!(config.symbols, Some(vec!["ZWL".to_string()]));
        assert_eq!(
            config.user_agent.as_deref(),
            Some("tap-openexchangerates/0.0.1")
        );
        assert_eq!(config.api_url, DEFAULT_API_URL);
    }

    #[test]
    fn test_date_alias() {
        let file = write_config(r#"{"app_id": "abc", "date": "2023-01-02"}"#);
        let config =
            TapConfig::load_with_env(&[ConfigSource::File(file.path().into())], empty_env())
                .unwrap();
        assert_eq!(config.start_date, NaiveDate::from_ymd_opt(2023, 1, 2).unwrap());
    }

    #[test]
    fn test_later_file_overrides_earlier() {
        let first = write_config(r#"{"app_id": "abc", "start_date": "2023-01-02", "base": "USD"}"#);
        let second = write_config(r#"{"base": "EUR"}"#);
        let sources = [
            ConfigSource::File(first.path().into()),
            ConfigSource::File(second.path().into()),
        ];
        let config = TapConfig::load_with_env(&sources, empty_env()).unwrap();
        assert_eq!(config.base.as_deref(), Some("EUR"));
    }

    #[test]
    fn test_env_only() {
        let env = HashMap::from([
            ("TAP_OPENEXCHANGERATES_APP_ID".to_string(), "secret".to_string()),
            (
                "TAP_OPENEXCHANGERATES_START_DATE".to_string(),
                "2023-04-23".to_string(),
            ),
            (
                "TAP_OPENEXCHANGERATES_SYMBOLS".to_string(),
                "ZWL,GBP".to_string(),
            ),
        ]);
        let config = TapConfig::load_with_env(&[ConfigSource::Env], Some(env)).unwrap();

        assert_eq!(config.app_id, "secret");
        assert_eq!(
            config.symbols,
            Some(vec!["ZWL".to_string(), "GBP".to_string()])
        );
    }

    #[test]
    fn test_missing_required() {
        let file = write_config(r#"{"start_date": "2023-04-23"}"#);
        let err = TapConfig::load_with_env(&[ConfigSource::File(file.path().into())], empty_env())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Load(_)));

        let file = write_config(r#"{"app_id": "abc"}"#);
        assert!(
            TapConfig::load_with_env(&[ConfigSource::File(file.path().into())], empty_env())
                .is_err()
        );
    }

    #[test]
    fn test_missing_file() {
        let err = TapConfig::load_with_env(
            &[ConfigSource::File("/nonexistent/oxtap.json".into())],
            empty_env(),
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ReadFile { .. }));
    }

    #[test]
    fn test_validate() {
        let date = NaiveDate::from_ymd_opt(2023, 4, 23).unwrap();
        assert!(TapConfig::new("abc", date).validate().is_ok());
        assert!(matches!(
            TapConfig::new("  ", date).validate(),
            Err(ConfigError::EmptyAppId)
        ));

        let mut config = TapConfig::new("abc", date);
        config.base = Some("eur".into());
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidCurrency { field: "base", .. })
        ));

        let mut config = TapConfig::new("abc", date);
        config.symbols = Some(vec![]);
        assert!(matches!(config.validate(), Err(ConfigError::EmptySymbols)));

        let mut config = TapConfig::new("abc", date);
        config.symbols = Some(vec!["GBP".into(), "ZW".into()]);
        assert!(config.validate().is_err());

        let mut config = TapConfig::new("abc", date);
        config.api_url = "ftp://example.com".into();
        assert!(matches!(config.validate(), Err(ConfigError::InvalidApiUrl(_))));
    }

    #[test]
    fn test_debug_redacts_app_id() {
        let config = TapConfig::new("very-secret", NaiveDate::from_ymd_opt(2023, 4, 23).unwrap());
        let debug = format!("{config:?}");
        assert!(!debug.contains("very-secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_config_source_from_str() {
        assert_eq!(ConfigSource::from("ENV"), ConfigSource::Env);
        assert_eq!(
            ConfigSource::from("config.json"),
            ConfigSource::File("config.json".into())
        );
    }
}
