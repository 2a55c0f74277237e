use std::{
    fmt::{Debug, Formatter},
    path::{Path, PathBuf},
    sync::Arc,
};

use async_trait::async_trait;
use rusqlite::{
    params,
    types::{Type, ValueRef},
    Connection, OptionalExtension,
};
use snafu::{OptionExt, ResultExt};
use tokio::sync::Mutex;
use tracing::{debug, warn};

use super::CacheBackend;
use crate::{
    err::{CorruptedRecordSnafu, Result, StorageClosedSnafu, StorageSnafu, TokioJoinSnafu},
    record::{decode, encode, Record},
};

const CREATE_TABLE: &str = "CREATE TABLE IF NOT EXISTS cache (key TEXT PRIMARY KEY, value TEXT);";
const SELECT_VALUE: &str = "SELECT value FROM cache WHERE key = ?1";
// One statement, so two writers racing on the same key can neither lose an
// update nor trip the primary key.
const UPSERT_VALUE: &str = "INSERT INTO cache (key, value) VALUES (?1, ?2) \
                            ON CONFLICT(key) DO UPDATE SET value = excluded.value";
const DELETE_VALUE: &str = "DELETE FROM cache WHERE key = ?1";

/// A `value` cell as read from the table. Anything but TEXT was not written
/// by this backend.
enum StoredValue {
    Text(Vec<u8>),
    Foreign(Type),
}

/// Builds a [SqliteBackend]. Without a path the database lives in memory and
/// disappears with the backend.
#[derive(Debug, Default)]
pub struct Builder {
    path: Option<PathBuf>,
}

impl Builder {
    pub fn with_path<P: AsRef<Path>>(&mut self, path: P) -> &mut Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    pub fn build(self) -> Result<SqliteBackend> {
        let conn = match &self.path {
            Some(path) => Connection::open(path).context(StorageSnafu)?,
            None => Connection::open_in_memory().context(StorageSnafu)?,
        };
        conn.execute_batch(CREATE_TABLE).context(StorageSnafu)?;
        debug!("sqlite cache opened at {:?}", self.path);
        Ok(SqliteBackend {
            path: self.path,
            conn: Arc::new(Mutex::new(Some(conn))),
        })
    }
}

/// SqliteBackend stores each record as JSON text in a single
/// `cache (key TEXT PRIMARY KEY, value TEXT)` table.
pub struct SqliteBackend {
    path: Option<PathBuf>,
    // None once the owner has closed the backend.
    conn: Arc<Mutex<Option<Connection>>>,
}

impl Debug for SqliteBackend {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let mut ds = f.debug_struct("SqliteBackend");
        match &self.path {
            Some(path) => ds.field("path", path),
            None => ds.field("path", &kura_common::SQLITE_IN_MEMORY),
        };
        ds.finish()
    }
}

impl SqliteBackend {
    pub fn in_memory() -> Result<Self> { Builder::default().build() }

    pub fn path(&self) -> Option<&Path> { self.path.as_deref() }

    /// Close the underlying connection. Every later operation fails with
    /// [crate::err::Error::StorageClosed]. Closing twice is a no-op.
    pub async fn close(&self) -> Result<()> {
        let conn = self.conn.clone();
        let closed = tokio::task::spawn_blocking(move || match conn.blocking_lock().take() {
            Some(conn) => conn
                .close()
                .map(|_| true)
                .map_err(|(_, e)| e)
                .context(StorageSnafu),
            None => Ok(false),
        })
        .await
        .context(TokioJoinSnafu)??;
        if closed {
            debug!("sqlite cache at {:?} closed", self.path);
        }
        Ok(())
    }

    /// Run `f` against the connection on the blocking pool.
    async fn with_conn<T, F>(&self, f: F) -> Result<T>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let guard = conn.blocking_lock();
            let conn = guard.as_ref().context(StorageClosedSnafu)?;
            f(conn)
        })
        .await
        .context(TokioJoinSnafu)?
    }
}

#[async_trait]
impl CacheBackend for SqliteBackend {
    async fn get(&self, key: &str) -> Result<Option<Record>> {
        let k = key.to_string();
        let stored: Option<StoredValue> = self
            .with_conn(move |conn| {
                conn.query_row(SELECT_VALUE, params![k], |row| {
                    Ok(match row.get_ref(0)? {
                        ValueRef::Text(text) => StoredValue::Text(text.to_vec()),
                        other => StoredValue::Foreign(other.data_type()),
                    })
                })
                .optional()
                .context(StorageSnafu)
            })
            .await?;

        let record = match stored {
            None => return Ok(None),
            Some(StoredValue::Text(text)) => decode(key, &text),
            Some(StoredValue::Foreign(typ)) => CorruptedRecordSnafu {
                key,
                reason: format!("value column holds {typ}, not text"),
            }
            .fail(),
        };
        match record {
            Ok(record) => Ok(Some(record)),
            Err(e) => {
                warn!("sqlite cache holds an undecodable row for {:?}: {}", key, e);
                Err(e)
            }
        }
    }

    async fn set(&self, key: &str, value: Record) -> Result<()> {
        let text = encode(key, &value)?;
        let k = key.to_string();
        self.with_conn(move |conn| {
            conn.execute(UPSERT_VALUE, params![k, text])
                .context(StorageSnafu)
        })
        .await?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<bool> {
        let k = key.to_string();
        let affected = self
            .with_conn(move |conn| conn.execute(DELETE_VALUE, params![k]).context(StorageSnafu))
            .await?;
        Ok(affected > 0)
    }
}
