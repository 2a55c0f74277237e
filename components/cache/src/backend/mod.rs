use std::{fmt::Debug, str::FromStr, sync::Arc};

use async_trait::async_trait;
use kura_common::{DSN_SEPARATOR, SQLITE_IN_MEMORY};
use snafu::{ensure, OptionExt};
use strum_macros::EnumString;
use tracing::debug;

use crate::{
    err::{Result, UnsupportedCacheDSNSnafu},
    record::Record,
};

pub mod memory;
pub mod sqlite;

pub type BackendRef = Arc<dyn CacheBackend>;

/// The contract every cache storage implementation satisfies.
///
/// A missing key is a normal outcome: `get` answers `Ok(None)` and `delete`
/// answers `Ok(false)`. Errors are reserved for encoding problems and for
/// storage that refuses to do its job.
#[async_trait]
pub trait CacheBackend: Send + Sync + Debug + 'static {
    /// Look up the record stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Record>>;

    /// Store `value` under `key`, replacing whatever was there. Records are
    /// never merged.
    async fn set(&self, key: &str, value: Record) -> Result<()>;

    /// Remove `key`. Returns whether an entry was actually removed.
    async fn delete(&self, key: &str) -> Result<bool>;
}

/// Build a backend from a dsn such as `memory://:` or
/// `sqlite://:/tmp/kura.cache.db`.
///
/// A sqlite dsn with an empty path or `:memory:` opens a private in-memory
/// database that lives as long as the backend. The memory kind takes no path.
pub fn open_backend(dsn: &str) -> Result<BackendRef> {
    let x = dsn.splitn(2, DSN_SEPARATOR).collect::<Vec<_>>();
    ensure!(x.len() == 2, UnsupportedCacheDSNSnafu { dsn });
    let kind = BackendKinds::from_str(x[0])
        .ok()
        .context(UnsupportedCacheDSNSnafu { dsn })?;
    kind.build(dsn, x[1])
}

#[derive(Debug, EnumString)]
enum BackendKinds {
    #[strum(serialize = "memory", serialize = "Memory", serialize = "mem")]
    Memory,
    #[strum(serialize = "sqlite", serialize = "Sqlite", serialize = "sqlite3")]
    Sqlite,
}

impl BackendKinds {
    fn build(&self, dsn: &str, path: &str) -> Result<BackendRef> {
        match self {
            BackendKinds::Memory => {
                ensure!(path.is_empty(), UnsupportedCacheDSNSnafu { dsn });
                debug!("backend [memory] is built");
                Ok(Arc::new(memory::MemoryBackend::default()))
            }
            BackendKinds::Sqlite => {
                let mut builder = sqlite::Builder::default();
                if !path.is_empty() && path != SQLITE_IN_MEMORY {
                    builder.with_path(path);
                }
                debug!("backend [sqlite] is built with path: {:?}", path);
                Ok(Arc::new(builder.build()?))
            }
        }
    }
}
