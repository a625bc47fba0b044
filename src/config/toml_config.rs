use crate::adapters::fixtures::{default_services, services_from_records};
use crate::domain::{Service, ServiceRecord};
use crate::utils::error::{CatalogError, Result};
use crate::utils::validation::{
    validate_non_empty_string, validate_one_of, validate_range, validate_url, Validate,
};
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Config file picked up from the working directory when no `--config` is given.
pub const DEFAULT_CONFIG_FILE: &str = "thundermonit.toml";

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Top-level configuration, loaded from TOML.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct CatalogConfig {
    pub server: ServerConfig,
    pub logging: LoggingConfig,
    /// Seed population. Empty means the built-in fixtures.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub services: Vec<ServiceRecord>,
}

/// Listen address and endpoint path of the query server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    pub graphql_path: String,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 3030,
            graphql_path: "/graphql".to_string(),
        }
    }
}

/// Output format of the fmt layer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Compact,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::Compact,
        }
    }
}

impl CatalogConfig {
    /// Loads the configuration from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path).map_err(CatalogError::IoError)?;
        Self::from_toml_str(&content)
    }

    /// Loads `path` when given (it must exist), otherwise the default config
    /// file if present, otherwise built-in defaults.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None if Path::new(DEFAULT_CONFIG_FILE).exists() => Self::from_file(DEFAULT_CONFIG_FILE),
            None => Ok(Self::default()),
        }
    }

    /// Parses a TOML string, expanding `${VAR}` references first.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content)?;
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the value of the environment variable `VAR`.
    /// Unset variables are left untouched.
    fn substitute_env_vars(content: &str) -> Result<String> {
        let re = Regex::new(r"\$\{([^}]+)\}").map_err(|e| CatalogError::ConfigError {
            message: format!("invalid substitution pattern: {}", e),
        })?;

        let result = re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        });

        Ok(result.to_string())
    }

    /// Checks the configuration for values that would fail at start-up.
    pub fn validate_config(&self) -> Result<()> {
        // server
        validate_non_empty_string("server.host", &self.server.host)?;
        validate_range("server.port", self.server.port, 1, u16::MAX)?;
        if !self.server.graphql_path.starts_with('/') {
            return Err(CatalogError::InvalidConfigValueError {
                field: "server.graphql_path".to_string(),
                value: self.server.graphql_path.clone(),
                reason: "Path must start with '/'".to_string(),
            });
        }

        // logging
        validate_one_of("logging.level", &self.logging.level, &LOG_LEVELS)?;

        // seed records; id, name and url emptiness are checked by Service itself
        for (index, record) in self.services.iter().enumerate() {
            validate_url(&format!("services[{}].url", index), &record.url)?;
            validate_url(&format!("services[{}].ci.api", index), &record.ci.api)?;
            validate_url(&format!("services[{}].ci.url", index), &record.ci.url)?;
            validate_non_empty_string(&format!("services[{}].repo.type", index), &record.repo.kind)?;
            if let Some(url) = &record.repo.url {
                validate_url(&format!("services[{}].repo.url", index), url)?;
            }
        }

        Ok(())
    }

    /// Services to seed the store with: the `[[services]]` table when present,
    /// otherwise the built-in fixtures.
    pub fn seed_services(&self) -> Result<Vec<Service>> {
        if self.services.is_empty() {
            default_services()
        } else {
            services_from_records(self.services.clone())
        }
    }
}

impl Validate for CatalogConfig {
    fn validate(&self) -> Result<()> {
        self.validate_config()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    #[test]
    fn test_defaults_when_empty() {
        let config = CatalogConfig::from_toml_str("").unwrap();

        assert_eq!(config.server.host, "127.0.0.1");
        assert_eq!(config.server.port, 3030);
        assert_eq!(config.server.graphql_path, "/graphql");
        assert_eq!(config.logging.format, LogFormat::Compact);
        assert!(config.validate().is_ok());

        let names: Vec<String> = config
            .seed_services()
            .unwrap()
            .iter()
            .map(|s| s.name().to_string())
            .collect();
        assert_eq!(names, vec!["goploader", "gomonit"]);
    }

    #[test]
    fn test_parse_full_config() {
        let toml_content = r#"
[server]
host = "0.0.0.0"
port = 8080

[logging]
level = "debug"
format = "json"

[[services]]
id = 4
name = "hugo-site"
url = "https://blog.example.com"
repo = { type = "gitlab", url = "https://gitlab.com/me/blog" }
ci = { api = "https://ci.example.com", url = "https://ci.example.com/me/blog" }
"#;

        let config = CatalogConfig::from_toml_str(toml_content).unwrap();
        assert!(config.validate().is_ok());
        assert_eq!(config.server.port, 8080);
        assert_eq!(config.logging.format, LogFormat::Json);

        let services = config.seed_services().unwrap();
        assert_eq!(services.len(), 1);
        assert_eq!(services[0].id(), 4);
        assert_eq!(services[0].repo().kind, "gitlab");
    }

    #[test]
    fn test_env_var_substitution() {
        std::env::set_var("THUNDERMONIT_TEST_HOST", "10.0.0.7");

        let config = CatalogConfig::from_toml_str(
            r#"
[server]
host = "${THUNDERMONIT_TEST_HOST}"
"#,
        )
        .unwrap();
        assert_eq!(config.server.host, "10.0.0.7");

        std::env::remove_var("THUNDERMONIT_TEST_HOST");
    }

    #[test]
    fn test_config_validation() {
        let bad_path = CatalogConfig::from_toml_str("[server]\ngraphql_path = \"graphql\"").unwrap();
        assert!(bad_path.validate().is_err());

        let bad_level = CatalogConfig::from_toml_str("[logging]\nlevel = \"loud\"").unwrap();
        assert!(bad_level.validate().is_err());

        let bad_port = CatalogConfig::from_toml_str("[server]\nport = 0").unwrap();
        assert!(bad_port.validate().is_err());

        let bad_service_url = CatalogConfig::from_toml_str(
            r#"
[[services]]
id = 0
name = "x"
url = "not a url"
repo = { type = "github" }
ci = { api = "https://ci.example.com", url = "https://ci.example.com/x" }
"#,
        )
        .unwrap();
        assert!(bad_service_url.validate().is_err());
    }

    #[test]
    fn test_invalid_format_rejected() {
        assert!(CatalogConfig::from_toml_str("[logging]\nformat = \"xml\"").is_err());
    }

    #[test]
    fn test_config_from_file() {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file
            .write_all(b"[server]\nport = 4040\n")
            .unwrap();

        let config = CatalogConfig::load(Some(temp_file.path())).unwrap();
        assert_eq!(config.server.port, 4040);
    }

    #[test]
    fn test_missing_explicit_file_is_error() {
        let result = CatalogConfig::load(Some(Path::new("/nonexistent/thundermonit.toml")));
        assert!(matches!(result, Err(CatalogError::IoError(_))));
    }
}
