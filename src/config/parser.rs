use super::ConfigError;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Deserialize, Serialize, Default)]
pub struct Config {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            bind_address: default_bind_address(),
            port: default_port(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
    #[serde(default = "default_log_format")]
    pub format: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatabaseConfig {
    #[serde(default)]
    pub url: Option<String>,
    #[serde(default)]
    pub conn_string: Option<String>,
    #[serde(default = "default_database_filename")]
    pub filename: Option<String>,
    #[serde(default)]
    pub max_connections: Option<u32>,
    #[serde(default)]
    pub min_connections: Option<u32>,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: None,
            conn_string: None,
            filename: default_database_filename(),
            max_connections: None,
            min_connections: None,
        }
    }
}

impl DatabaseConfig {
    pub fn db_type(&self) -> DbType {
        let url = self.connection_string();
        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            DbType::Postgres
        } else {
            DbType::Sqlite
        }
    }

    pub fn connection_string(&self) -> String {
        if let Some(ref url) = self.url {
            url.clone()
        } else if let Some(ref conn) = self.conn_string {
            conn.clone()
        } else if let Some(ref file) = self.filename {
            format!("sqlite://{}", file)
        } else {
            String::new()
        }
    }

    pub fn sqlite_path(&self) -> Option<String> {
        if let DbType::Sqlite = self.db_type() {
            let url = self.connection_string();
            Some(url.strip_prefix("sqlite://").unwrap_or(&url).to_string())
        } else {
            None
        }
    }

    pub fn max_connections(&self) -> Option<u32> {
        match self.db_type() {
            DbType::Postgres => self.max_connections,
            DbType::Sqlite => Some(1),
        }
    }

    pub fn min_connections(&self) -> Option<u32> {
        match self.db_type() {
            DbType::Postgres => self.min_connections,
            DbType::Sqlite => Some(1),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DbType {
    Postgres,
    Sqlite,
}

impl Config {
    pub fn load() -> Result<Self, ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config.yaml".to_string());

        if Path::new(&config_path).exists() {
            Self::load_from_file(&config_path)
        } else {
            let mut config = Self::default();
            config.apply_env_overrides();
            config.validate()?;
            Ok(config)
        }
    }

    pub fn load_from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        let mut config: Config = serde_yaml::from_str(&content)?;
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.bind_address.is_empty() {
            return Err(ConfigError::InvalidConfig(
                "server.bind_address cannot be empty".to_string(),
            ));
        }

        if self.server.port == 0 {
            return Err(ConfigError::InvalidConfig(
                "server.port must be between 1 and 65535".to_string(),
            ));
        }

        if self.database.connection_string().is_empty() {
            return Err(ConfigError::InvalidConfig(
                "database connection string cannot be empty".to_string(),
            ));
        }

        Ok(())
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(value) = std::env::var("BOOKSHELF_DATABASE_URL") {
            self.database.url = Some(value);
        }
        if let Ok(value) = std::env::var("BOOKSHELF_PORT") {
            if let Ok(port) = value.parse() {
                self.server.port = port;
            }
        }
    }
}

fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "pretty".to_string()
}

fn default_database_filename() -> Option<String> {
    Some("books.db".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    #[test_case("sqlite://books.db", DbType::Sqlite ; "sqlite url")]
    #[test_case("postgres://localhost/bookshelf", DbType::Postgres ; "postgres url")]
    #[test_case("postgresql://localhost/bookshelf", DbType::Postgres ; "postgresql url")]
    fn detects_db_type_from_url(url: &str, expected: DbType) {
        let config = DatabaseConfig {
            url: Some(url.to_string()),
            ..Default::default()
        };
        assert_eq!(config.db_type(), expected);
    }

    #[test]
    fn default_database_is_a_sqlite_file() {
        let config = DatabaseConfig::default();
        assert_eq!(config.db_type(), DbType::Sqlite);
        assert_eq!(config.sqlite_path().as_deref(), Some("books.db"));
    }

    #[test]
    fn sqlite_path_strips_url_prefix() {
        let config = DatabaseConfig {
            url: Some("sqlite:///var/lib/bookshelf/books.db".to_string()),
            ..Default::default()
        };
        assert_eq!(
            config.sqlite_path().as_deref(),
            Some("/var/lib/bookshelf/books.db")
        );
    }

    #[test]
    fn sqlite_pool_sizes_are_pinned_to_one() {
        let config = DatabaseConfig {
            max_connections: Some(20),
            min_connections: Some(5),
            ..Default::default()
        };
        assert_eq!(config.max_connections(), Some(1));
        assert_eq!(config.min_connections(), Some(1));
    }

    #[test]
    fn default_config_passes_validation() {
        let config = Config::default();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn zero_port_is_rejected() {
        let mut config = Config::default();
        config.server.port = 0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn empty_connection_string_is_rejected() {
        let mut config = Config::default();
        config.database.filename = None;
        assert!(config.validate().is_err());
    }

    #[test]
    fn parses_minimal_yaml_with_defaults() {
        let yaml = r#"
server:
  port: 9090
database:
  filename: catalog.db
"#;
        let config: Config = serde_yaml::from_str(yaml).expect("parse config");
        assert_eq!(config.server.port, 9090);
        assert_eq!(config.server.bind_address, "0.0.0.0");
        assert_eq!(config.logging.level, "info");
        assert_eq!(config.database.sqlite_path().as_deref(), Some("catalog.db"));
    }
}
