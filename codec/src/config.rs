//! Session configuration.
//!
//! A session is selected, in order of precedence, by an explicit URL (the
//! `--db` flag), a `.json_codec.json` file in the current directory or the
//! home directory, the `DATABASE_URL` environment variable, and finally an
//! in-memory Cozo store.

use std::error::Error;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::backend::Session;
use crate::error::DbError;

/// Name of the configuration file looked up in the current and home directories.
pub const CONFIG_FILE_NAME: &str = ".json_codec.json";

const DEFAULT_POSTGRES_PORT: u16 = 5432;

/// Top-level configuration file structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConfigFile {
    pub database: SessionConfig,
}

/// Backend selection.
///
/// JSON format uses a "type" field with lowercase variant names.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum SessionConfig {
    /// CozoDB with SQLite storage at `path`
    Sqlite { path: PathBuf },
    /// In-memory CozoDB
    Memory,
    /// PostgreSQL server
    Postgres(PostgresConfig),
}

/// PostgreSQL connection settings.
///
/// Either a full `connection_string` or the individual components.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PostgresConfig {
    #[serde(default)]
    pub connection_string: Option<String>,
    #[serde(default)]
    pub host: Option<String>,
    /// 0 means the default port
    #[serde(default)]
    pub port: u16,
    #[serde(default)]
    pub user: Option<String>,
    #[serde(default)]
    pub password: Option<String>,
    #[serde(default)]
    pub database: Option<String>,
    #[serde(default)]
    pub ssl: bool,
}

impl PostgresConfig {
    /// Build a `postgres://` URL from the configured components.
    ///
    /// An explicit `connection_string` is returned unchanged.
    pub fn build_connection_string(&self) -> Result<String, Box<dyn Error>> {
        if let Some(conn) = &self.connection_string {
            return Ok(conn.clone());
        }

        let host = self.host.as_deref().ok_or("PostgreSQL config is missing 'host'")?;
        let user = self.user.as_deref().ok_or("PostgreSQL config is missing 'user'")?;
        let database = self
            .database
            .as_deref()
            .ok_or("PostgreSQL config is missing 'database'")?;
        let port = if self.port == 0 {
            DEFAULT_POSTGRES_PORT
        } else {
            self.port
        };

        let credentials = match &self.password {
            Some(password) => format!("{user}:{password}"),
            None => user.to_string(),
        };
        let mut url = format!("postgres://{credentials}@{host}:{port}/{database}");
        if self.ssl {
            url.push_str("?sslmode=require");
        }
        Ok(url)
    }
}

impl ConfigFile {
    /// Load and parse a configuration file.
    pub fn load_from(path: &Path) -> Result<Self, Box<dyn Error>> {
        let content = fs::read_to_string(path)
            .map_err(|e| format!("Failed to read {}: {}", path.display(), e))?;
        let config: ConfigFile = serde_json::from_str(&content)
            .map_err(|e| format!("Invalid JSON in {}: {}", path.display(), e))?;
        Ok(config)
    }

    /// Find the configuration file in the current directory, then in the
    /// home directory.
    ///
    /// Returns `Ok(None)` when neither exists; a file that exists but cannot
    /// be parsed is an error.
    pub fn discover() -> Result<Option<Self>, Box<dyn Error>> {
        let mut candidates = vec![PathBuf::from(CONFIG_FILE_NAME)];
        if let Some(home) = home::home_dir() {
            candidates.push(home.join(CONFIG_FILE_NAME));
        }

        for path in candidates {
            if path.is_file() {
                debug!(path = %path.display(), "loading config file");
                return Self::load_from(&path).map(Some);
            }
        }
        Ok(None)
    }
}

impl SessionConfig {
    /// Open a session for this configuration.
    pub fn connect(&self) -> Result<Box<dyn Session>, DbError> {
        match self {
            #[cfg(feature = "backend-cozo")]
            Self::Sqlite { path } => Ok(Box::new(crate::backend::cozo::CozoSession::open(path)?)),
            #[cfg(feature = "backend-cozo")]
            Self::Memory => Ok(Box::new(crate::backend::cozo::CozoSession::open_mem()?)),
            #[cfg(not(feature = "backend-cozo"))]
            Self::Sqlite { .. } | Self::Memory => Err(DbError::BackendUnavailable { backend: "cozo" }),

            #[cfg(feature = "backend-postgres")]
            Self::Postgres(pg) => {
                let conn = pg
                    .build_connection_string()
                    .map_err(|e| DbError::ConnectFailed {
                        backend: "postgres",
                        message: e.to_string(),
                    })?;
                Ok(Box::new(crate::backend::postgres::PostgresSession::connect(&conn)?))
            }
            #[cfg(not(feature = "backend-postgres"))]
            Self::Postgres(_) => Err(DbError::BackendUnavailable {
                backend: "postgres",
            }),
        }
    }

    /// Parse from a connection URL or file path.
    ///
    /// Supported formats:
    /// - `:memory:` → Memory
    /// - `sqlite:///path/to/db` or a plain path → Sqlite
    /// - `postgres://...` or `postgresql://...` → Postgres
    pub fn from_url(url: &str) -> Result<Self, Box<dyn Error>> {
        if url == ":memory:" {
            return Ok(Self::Memory);
        }

        if let Some(path) = url.strip_prefix("sqlite://") {
            return Ok(Self::Sqlite {
                path: PathBuf::from(path),
            });
        }

        if url.starts_with("postgres://") || url.starts_with("postgresql://") {
            return Ok(Self::Postgres(PostgresConfig {
                connection_string: Some(url.to_string()),
                ..PostgresConfig::default()
            }));
        }

        if let Some((scheme, _)) = url.split_once("://") {
            return Err(format!("Unsupported database URL scheme '{}'", scheme).into());
        }

        Ok(Self::Sqlite {
            path: PathBuf::from(url),
        })
    }

    /// Read `DATABASE_URL`.
    pub fn from_env() -> Result<Option<Self>, Box<dyn Error>> {
        match std::env::var("DATABASE_URL") {
            Ok(url) => Ok(Some(Self::from_url(&url)?)),
            Err(_) => Ok(None),
        }
    }

    /// Resolve the session configuration.
    ///
    /// Priority: explicit URL > config file > environment > in-memory.
    pub fn resolve(explicit: Option<&str>) -> Result<Self, Box<dyn Error>> {
        if let Some(url) = explicit {
            return Self::from_url(url);
        }

        if let Some(file) = ConfigFile::discover()? {
            return Ok(file.database);
        }

        if let Some(config) = Self::from_env()? {
            debug!("using DATABASE_URL");
            return Ok(config);
        }

        Ok(Self::Memory)
    }
}
