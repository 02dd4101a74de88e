use anyhow::{bail, Context, Result};
use dao_db::{DataSourceConfig, DataSources, DEFAULT_DATA_SOURCE};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::{Path, PathBuf};

/// Application configuration: named data sources plus logging.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct AppConfig {
    /// Base directory for relative log file paths. Empty means the working directory.
    #[serde(default)]
    pub home_dir: String,
    /// Data source used when a command does not name one.
    #[serde(default = "default_data_source")]
    pub data_source: String,
    /// Data-source bundles keyed by name.
    #[serde(default)]
    pub datasources: HashMap<String, DataSourceConfig>,
    /// Logging configuration (optional, uses defaults if None).
    pub logging: Option<LoggingConfig>,
}

/// Logging configuration - maps subsystem names to their logging settings.
/// Key "default" is the catch-all for logs that don't match explicit subsystems.
pub type LoggingConfig = HashMap<String, Section>;

#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct Section {
    pub console_level: String, // "info", "debug", "error", "off"
    #[serde(default)]
    pub file: String, // "logs/accounts.log"; empty disables file output
    #[serde(default)]
    pub file_level: String,
    #[serde(default)]
    pub max_backups: Option<usize>, // How many rotated files to keep
    #[serde(default)]
    pub max_size_mb: Option<u64>, // Max size of the file in MB
}

fn default_data_source() -> String {
    DEFAULT_DATA_SOURCE.to_string()
}

/// Create a default logging configuration.
pub fn default_logging_config() -> LoggingConfig {
    let mut logging = HashMap::new();
    logging.insert(
        "default".to_string(),
        Section {
            console_level: "info".to_string(),
            file: "logs/accounts.log".to_string(),
            file_level: "debug".to_string(),
            max_backups: Some(3),
            max_size_mb: Some(100),
        },
    );
    logging
}

impl Default for AppConfig {
    fn default() -> Self {
        let mut datasources = HashMap::new();
        datasources.insert(
            DEFAULT_DATA_SOURCE.to_string(),
            DataSourceConfig::new("sqlite://data/accounts.db", "sa", "", "sqlite"),
        );
        Self {
            home_dir: String::new(),
            data_source: default_data_source(),
            datasources,
            logging: Some(default_logging_config()),
        }
    }
}

impl AppConfig {
    /// Load configuration with layered loading: defaults → YAML file → environment variables.
    pub fn load_layered<P: AsRef<Path>>(config_path: P) -> Result<Self> {
        use figment::{
            providers::{Env, Format, Serialized, Yaml},
            Figment,
        };

        let config_path = config_path.as_ref();
        if !config_path.is_file() {
            bail!("config file not found: {}", config_path.display());
        }

        // Optional sections stay empty unless YAML/ENV provide them.
        let base = AppConfig {
            home_dir: String::new(),
            data_source: default_data_source(),
            datasources: HashMap::new(),
            logging: None,
        };

        let figment = Figment::new()
            .merge(Serialized::defaults(base))
            .merge(Yaml::file(config_path))
            // Example: APP__DATASOURCES__H2__JDBC__URL maps to datasources.h2.jdbc.url
            .merge(Env::prefixed("APP__").split("__"));

        figment
            .extract()
            .with_context(|| format!("Failed to extract config from {}", config_path.display()))
    }

    /// Load configuration from file or create with default values.
    pub fn load_or_default<P: AsRef<Path>>(config_path: Option<P>) -> Result<Self> {
        match config_path {
            Some(path) => Self::load_layered(path),
            None => Ok(Self::default()),
        }
    }

    /// Serialize configuration to YAML.
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self).context("Failed to serialize config to YAML")
    }

    /// Base directory for relative paths.
    pub fn home_dir(&self) -> PathBuf {
        if self.home_dir.trim().is_empty() {
            PathBuf::from(".")
        } else {
            PathBuf::from(&self.home_dir)
        }
    }

    /// Registry over the configured data sources.
    pub fn data_sources(&self) -> DataSources {
        DataSources::from_configs(self.datasources.clone())
    }

    /// Apply overrides from command line arguments.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if let Some(name) = &args.data_source {
            self.data_source = name.clone();
        }

        // Set logging level based on verbose flags for "default" section.
        let logging = self.logging.get_or_insert_with(default_logging_config);
        if let Some(default_section) = logging.get_mut("default") {
            default_section.console_level = match args.verbose {
                0 => default_section.console_level.clone(), // keep
                1 => "debug".to_string(),
                _ => "trace".to_string(),
            };
        }
    }
}

/// Command line settings that override the loaded configuration.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub data_source: Option<String>,
    pub verbose: u8,
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_default_config_structure() {
        let config = AppConfig::default();

        assert_eq!(config.data_source, "h2");
        let h2 = &config.datasources["h2"];
        assert_eq!(h2.jdbc.url.as_deref(), Some("sqlite://data/accounts.db"));
        assert_eq!(h2.jdbc.driver.as_deref(), Some("sqlite"));

        let logging = config.logging.as_ref().unwrap();
        let default_section = &logging["default"];
        assert_eq!(default_section.console_level, "info");
        assert_eq!(default_section.file, "logs/accounts.log");
    }

    #[test]
    fn test_load_layered_reads_datasources() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");

        let yaml = r#"
data_source: test
datasources:
  h2:
    jdbc:
      url: "sqlite://data/accounts.db"
      username: "sa"
      password: ""
      driver: "sqlite"
  test:
    jdbc:
      url: "sqlite::memory:"
      username: "sa"
      password: "${TEST_DB_PASSWORD}"
      driver: "sqlite"
    pool:
      max_conns: 1

logging:
  default:
    console_level: debug
    file: "logs/default.log"
"#;
        fs::write(&cfg_path, yaml).unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();

        assert_eq!(config.data_source, "test");
        assert_eq!(config.datasources.len(), 2);
        let test = &config.datasources["test"];
        // ${VAR} references are kept verbatim until a connection is acquired.
        assert_eq!(test.jdbc.password.as_deref(), Some("${TEST_DB_PASSWORD}"));
        assert_eq!(test.pool.as_ref().unwrap().max_conns, Some(1));

        let def = &config.logging.as_ref().unwrap()["default"];
        assert_eq!(def.console_level, "debug");
        assert_eq!(def.file, "logs/default.log");
        assert_eq!(def.file_level, "");
    }

    #[test]
    fn test_minimal_yaml_config() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(&cfg_path, "home_dir: \"/srv/accounts\"\n").unwrap();

        let config = AppConfig::load_layered(&cfg_path).unwrap();

        assert_eq!(config.home_dir(), PathBuf::from("/srv/accounts"));
        assert_eq!(config.data_source, "h2");
        assert!(config.datasources.is_empty());
        assert!(config.logging.is_none());
    }

    #[test]
    fn test_missing_file_is_an_error() {
        let err = AppConfig::load_layered("/nonexistent/accounts.yaml").unwrap_err();
        assert!(err.to_string().contains("config file not found"));
    }

    #[test]
    fn test_unknown_top_level_key_is_rejected() {
        let tmp = tempdir().unwrap();
        let cfg_path = tmp.path().join("cfg.yaml");
        fs::write(&cfg_path, "server:\n  port: 8087\n").unwrap();

        assert!(AppConfig::load_layered(&cfg_path).is_err());
    }

    #[test]
    fn test_cli_overrides() {
        let mut config = AppConfig::default();

        let args = CliArgs {
            data_source: Some("test".to_string()),
            verbose: 2, // trace
            ..Default::default()
        };

        config.apply_cli_overrides(&args);

        assert_eq!(config.data_source, "test");
        let logging = config.logging.as_ref().unwrap();
        assert_eq!(logging["default"].console_level, "trace");
    }

    #[test]
    fn test_cli_verbose_once_selects_debug() {
        let mut config = AppConfig::default();
        config.logging = None;
        config.apply_cli_overrides(&CliArgs {
            verbose: 1,
            ..Default::default()
        });

        assert_eq!(config.data_source, "h2");
        assert_eq!(config.logging.unwrap()["default"].console_level, "debug");
    }

    #[test]
    fn test_cli_overrides_keep_level_without_verbose() {
        let mut config = AppConfig::default();
        config.apply_cli_overrides(&CliArgs::default());

        assert_eq!(config.data_source, "h2");
        assert_eq!(config.logging.unwrap()["default"].console_level, "info");
    }

    #[test]
    fn test_yaml_roundtrip_keeps_datasources() {
        let config = AppConfig::default();
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("datasources:"));
        assert!(yaml.contains("sqlite://data/accounts.db"));

        let back: AppConfig = serde_yaml::from_str(&yaml).unwrap();
        assert_eq!(back.datasources, config.datasources);
    }

    #[test]
    fn test_data_sources_registry_from_config() {
        let config = AppConfig::default();
        let sources = config.data_sources();
        assert_eq!(sources.names(), vec!["h2".to_string()]);
        assert_eq!(sources.default_provider().unwrap().name(), "h2");
    }
}
