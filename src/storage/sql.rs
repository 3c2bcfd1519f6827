use std::env;
use std::path::Path;

use libsql::{Builder, Connection, Database, params};

use super::error::PersistenceError;
use crate::results::DnsProbeResult;

const DEFAULT_DATABASE: &str = "data/netmon.db";

const CREATE_DNS_RESULTS: &str = "CREATE TABLE IF NOT EXISTS dns_results (
    id INTEGER PRIMARY KEY AUTOINCREMENT,
    server TEXT NOT NULL,
    hostname TEXT NOT NULL,
    response_time_ms INTEGER NOT NULL,
    timestamp TEXT NOT NULL
)";

const INSERT_DNS_RESULT: &str =
    "INSERT INTO dns_results (server, hostname, response_time_ms, timestamp) VALUES (?, ?, ?, ?)";

/// SQL sink for DNS results, one row per record.
pub struct SqlSink {
    _database: Database,
    conn: Connection,
}

impl SqlSink {
    /// Open the database named by `NETMON_DB_URL`.
    ///
    /// `libsql://` and `http(s)://` URLs are opened remotely using
    /// `NETMON_DB_AUTH_TOKEN`, anything else is treated as a local file.
    pub async fn from_env() -> Result<Self, PersistenceError> {
        let url = env::var("NETMON_DB_URL").unwrap_or_else(|_| DEFAULT_DATABASE.to_string());
        let token = env::var("NETMON_DB_AUTH_TOKEN").unwrap_or_default();
        Self::connect(&url, token).await
    }

    pub async fn connect(url: &str, auth_token: String) -> Result<Self, PersistenceError> {
        let database = if is_remote(url) {
            Builder::new_remote(url.to_string(), auth_token).build().await?
        } else {
            if let Some(parent) = Path::new(url).parent().filter(|p| !p.as_os_str().is_empty()) {
                std::fs::create_dir_all(parent).map_err(|source| PersistenceError::Io {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
            Builder::new_local(url).build().await?
        };

        let conn = database.connect()?;
        conn.execute(CREATE_DNS_RESULTS, ()).await?;

        Ok(Self {
            _database: database,
            conn,
        })
    }

    /// Insert every record. A row that fails to insert is logged and skipped.
    /// Returns the number of rows written.
    pub async fn insert_dns_results(&self, results: &[DnsProbeResult]) -> usize {
        log::debug!("ℹ️ [SQL] Storing {} result(s)", results.len());

        let mut inserted = 0;
        for result in results {
            let response_time_ms = i64::try_from(result.response_time.as_millis()).unwrap_or(i64::MAX);
            let outcome = self
                .conn
                .execute(
                    INSERT_DNS_RESULT,
                    params![
                        result.server.clone(),
                        result.hostname.clone(),
                        response_time_ms,
                        result.timestamp.to_rfc3339()
                    ],
                )
                .await;

            match outcome {
                Ok(_) => inserted += 1,
                Err(e) => log::warn!(
                    "⚠️ [SQL] Failed to insert result for {} / {}: {e}",
                    result.server,
                    result.hostname
                ),
            }
        }
        inserted
    }
}

fn is_remote(url: &str) -> bool {
    ["libsql://", "http://", "https://"]
        .iter()
        .any(|scheme| url.starts_with(scheme))
}
