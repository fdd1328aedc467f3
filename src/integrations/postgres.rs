//! PostgreSQL integration - statistics source and capability resolution

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::Mutex;
use tokio_postgres::error::SqlState;
use tokio_postgres::{Client, NoTls, SimpleQueryMessage};

/// Errors raised by a statistics source
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SourceError {
    /// The server cannot be reached or the session is gone.
    #[error("connection error: {0}")]
    Connection(String),

    /// The relation or function a query relies on does not exist.
    #[error("not available: {0}")]
    Unavailable(String),

    #[error("query failed: {0}")]
    Query(String),
}

impl From<tokio_postgres::Error> for SourceError {
    fn from(err: tokio_postgres::Error) -> Self {
        if err.is_closed() {
            return Self::Connection(err.to_string());
        }
        match err.code() {
            Some(code)
                if *code == SqlState::UNDEFINED_TABLE
                    || *code == SqlState::UNDEFINED_FUNCTION
                    || *code == SqlState::UNDEFINED_COLUMN
                    || *code == SqlState::INVALID_SCHEMA_NAME =>
            {
                Self::Unavailable(
                    err.as_db_error()
                        .map(|db| db.message().to_string())
                        .unwrap_or_else(|| err.to_string()),
                )
            }
            Some(_) => Self::Query(
                err.as_db_error()
                    .map(|db| db.message().to_string())
                    .unwrap_or_else(|| err.to_string()),
            ),
            None => Self::Connection(err.to_string()),
        }
    }
}

/// Result of one query: column names plus every value rendered as text.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RowSet {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<String>>,
}

/// Optional server features that change which queries are used
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Features {
    pub track_commit_timestamp: bool,
    /// Server-side system views (`<schema>.sys_proc_*`) are installed.
    pub system_views: bool,
}

/// Facts about the server that pick query variants.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CapabilityProfile {
    /// `server_version_num`, e.g. 150004.
    pub version: u32,
    pub in_recovery: bool,
    pub features: Features,
    pub application_name: String,
}

impl CapabilityProfile {
    /// Human readable version, e.g. "15.4" or "9.6.24".
    pub fn version_string(&self) -> String {
        let major = self.version / 10000;
        if major >= 10 {
            format!("{}.{}", major, self.version % 10000)
        } else {
            format!("{}.{}.{}", major, (self.version / 100) % 100, self.version % 100)
        }
    }
}

/// Anything the collection loop can run statistics queries against.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait StatSource: Send + Sync {
    /// Run a query and return all rows as text.
    async fn query(&self, sql: &str) -> Result<RowSet, SourceError>;

    /// Resolve the server's capability profile.
    async fn resolve_profile(&self) -> Result<CapabilityProfile, SourceError>;

    /// Whether the server runs on this host, so local `/proc` files describe it.
    fn is_local(&self) -> bool;
}

/// Connection parameters
#[derive(Debug, Clone)]
pub struct ConnectionSettings {
    pub host: String,
    pub port: u16,
    pub user: String,
    pub dbname: String,
    pub password: Option<String>,
    pub application_name: String,
    /// Schema holding the server-side system views.
    pub system_schema: String,
}

impl ConnectionSettings {
    fn to_config(&self) -> tokio_postgres::Config {
        let mut config = tokio_postgres::Config::new();
        config
            .host(&self.host)
            .port(self.port)
            .user(&self.user)
            .dbname(&self.dbname)
            .application_name(&self.application_name)
            .connect_timeout(std::time::Duration::from_secs(5));
        if let Some(password) = &self.password {
            config.password(password);
        }
        config
    }

    /// Unix socket directories and loopback names count as local.
    pub fn is_local(&self) -> bool {
        self.host.starts_with('/')
            || matches!(self.host.as_str(), "localhost" | "127.0.0.1" | "::1")
    }
}

/// PostgreSQL client wrapper
pub struct PgSource {
    settings: ConnectionSettings,
    client: Mutex<Client>,
}

impl PgSource {
    /// Connect to the server
    pub async fn connect(settings: ConnectionSettings) -> Result<Self, SourceError> {
        let client = Self::open(&settings).await?;
        Ok(Self {
            settings,
            client: Mutex::new(client),
        })
    }

    async fn open(settings: &ConnectionSettings) -> Result<Client, SourceError> {
        let (client, connection) = settings
            .to_config()
            .connect(NoTls)
            .await
            .map_err(|e| SourceError::Connection(e.to_string()))?;

        tokio::spawn(async move {
            if let Err(e) = connection.await {
                tracing::warn!(error = %e, "postgres connection closed");
            }
        });

        tracing::info!(
            host = %settings.host,
            port = settings.port,
            dbname = %settings.dbname,
            "connected to postgres"
        );
        Ok(client)
    }

    async fn single_value(&self, sql: &str) -> Result<Option<String>, SourceError> {
        let set = self.query(sql).await?;
        Ok(set.rows.into_iter().next().and_then(|r| r.into_iter().next()))
    }
}

#[async_trait]
impl StatSource for PgSource {
    async fn query(&self, sql: &str) -> Result<RowSet, SourceError> {
        let mut client = self.client.lock().await;

        // Reconnect lazily; the caller reports this cycle's failure if it doesn't work.
        if client.is_closed() {
            tracing::info!("postgres session closed, reconnecting");
            *client = Self::open(&self.settings).await?;
        }

        let messages = client.simple_query(sql).await?;
        let mut set = RowSet::default();
        for message in messages {
            match message {
                SimpleQueryMessage::RowDescription(columns) => {
                    set.columns = columns.iter().map(|c| c.name().to_string()).collect();
                }
                SimpleQueryMessage::Row(row) => {
                    if set.columns.is_empty() {
                        set.columns = row.columns().iter().map(|c| c.name().to_string()).collect();
                    }
                    let values = (0..row.len())
                        .map(|i| row.get(i).unwrap_or("").to_string())
                        .collect();
                    set.rows.push(values);
                }
                _ => {}
            }
        }
        Ok(set)
    }

    async fn resolve_profile(&self) -> Result<CapabilityProfile, SourceError> {
        let version = self
            .single_value("SELECT current_setting('server_version_num')")
            .await?
            .and_then(|v| v.trim().parse::<u32>().ok())
            .ok_or_else(|| SourceError::Connection("cannot read server_version_num".into()))?;

        let in_recovery = self
            .single_value("SELECT pg_is_in_recovery()")
            .await?
            .is_some_and(|v| v == "t");

        // Absent before 9.5: no row at all.
        let track_commit_timestamp = self
            .single_value("SELECT setting FROM pg_settings WHERE name = 'track_commit_timestamp'")
            .await?
            .is_some_and(|v| v == "on");

        let system_views = self
            .single_value(&format!(
                "SELECT count(*) FROM pg_namespace WHERE nspname = '{}'",
                self.settings.system_schema.replace('\'', "''")
            ))
            .await?
            .is_some_and(|v| v != "0");

        let profile = CapabilityProfile {
            version,
            in_recovery,
            features: Features {
                track_commit_timestamp,
                system_views,
            },
            application_name: self.settings.application_name.clone(),
        };
        tracing::info!(?profile, "resolved capability profile");
        Ok(profile)
    }

    fn is_local(&self) -> bool {
        self.settings.is_local()
    }
}
