//! Behaviour every cache backend has to share, run against each of them.

use kura_cache::{err::Result, record::into_record, BackendRef, CacheBackend, Record};
use serde_json::json;
use tracing::debug;

pub fn user(id: u64, name: &str) -> Record {
    into_record("user", json!({"id": id, "name": name})).expect("object literal")
}

/// One step of a scripted session against a cache.
#[derive(Debug, Clone)]
pub enum Op {
    Get(&'static str),
    Set(&'static str, Record),
    Delete(&'static str),
}

/// What a step produced, comparable across backends.
#[derive(Debug, Clone, PartialEq)]
pub enum Outcome {
    Got(Option<Record>),
    Stored,
    Deleted(bool),
}

pub async fn replay(cache: &dyn CacheBackend, ops: &[Op]) -> Result<Vec<Outcome>> {
    let mut outcomes = Vec::with_capacity(ops.len());
    for op in ops {
        let outcome = match op {
            Op::Get(key) => Outcome::Got(cache.get(key).await?),
            Op::Set(key, value) => {
                cache.set(key, value.clone()).await?;
                Outcome::Stored
            }
            Op::Delete(key) => Outcome::Deleted(cache.delete(key).await?),
        };
        debug!("{:?} -> {:?}", op, outcome);
        outcomes.push(outcome);
    }
    Ok(outcomes)
}

/// A session touching misses, overwrites and deletes of present and absent
/// keys.
pub fn session() -> Vec<Op> {
    vec![
        Op::Get("1"),
        Op::Delete("nope"),
        Op::Set("1", user(1, "A")),
        Op::Set("2", user(2, "B")),
        Op::Get("1"),
        Op::Get("2"),
        Op::Get("3"),
        Op::Set("1", into_record("1", json!({"replaced": true})).expect("object")),
        Op::Get("1"),
        Op::Delete("2"),
        Op::Delete("2"),
        Op::Get("2"),
        Op::Set("2", user(22, "again")),
        Op::Get("2"),
    ]
}

/// Assert the contract on a fresh, empty backend.
pub async fn check_contract(backend: BackendRef) {
    let outcomes = replay(backend.as_ref(), &session())
        .await
        .expect("session must not fail");
    let expected = vec![
        Outcome::Got(None),
        Outcome::Deleted(false),
        Outcome::Stored,
        Outcome::Stored,
        Outcome::Got(Some(user(1, "A"))),
        Outcome::Got(Some(user(2, "B"))),
        Outcome::Got(None),
        Outcome::Stored,
        Outcome::Got(Some(
            into_record("1", json!({"replaced": true})).expect("object"),
        )),
        Outcome::Deleted(true),
        Outcome::Deleted(false),
        Outcome::Got(None),
        Outcome::Stored,
        Outcome::Got(Some(user(22, "again"))),
    ];
    assert_eq!(outcomes, expected, "backend {:?}", backend);
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use kura_cache::{
        backend::sqlite::Builder, err::Error, open_backend, CacheExt, CacheManager,
        MemoryBackend, SqliteBackend,
    };
    use kura_utils::logger::install_fmt_log;
    use serde::{Deserialize, Serialize};

    use super::*;

    fn sqlite_file(dir: &tempfile::TempDir) -> SqliteBackend {
        let mut builder = Builder::default();
        builder.with_path(dir.path().join("kura.db"));
        builder.build().unwrap()
    }

    #[tokio::test]
    async fn memory_contract() {
        install_fmt_log();
        check_contract(Arc::new(MemoryBackend::new())).await;
    }

    #[tokio::test]
    async fn sqlite_contract() {
        install_fmt_log();
        check_contract(Arc::new(SqliteBackend::in_memory().unwrap())).await;

        let dir = tempfile::tempdir().unwrap();
        check_contract(Arc::new(sqlite_file(&dir))).await;
    }

    #[tokio::test]
    async fn manager_contract() {
        check_contract(Arc::new(CacheManager::default())).await;

        let manager = CacheManager::default();
        manager
            .set_strategy(Arc::new(SqliteBackend::in_memory().unwrap()))
            .await;
        check_contract(Arc::new(manager)).await;
    }

    #[tokio::test]
    async fn dsn_contract() {
        for dsn in [
            kura_common::KURA_MEMORY_CACHE_DSN,
            kura_common::KURA_SQLITE_MEMORY_DSN,
        ] {
            check_contract(open_backend(dsn).unwrap()).await;
        }
    }

    #[tokio::test]
    async fn manager_is_transparent() {
        fn memory() -> BackendRef { Arc::new(MemoryBackend::new()) }
        fn sqlite() -> BackendRef { Arc::new(SqliteBackend::in_memory().unwrap()) }

        for build in [memory as fn() -> BackendRef, sqlite] {
            let direct = build();
            let manager = CacheManager::default();
            manager.set_strategy(build()).await;

            let through_manager = replay(&manager, &session()).await.unwrap();
            let straight = replay(direct.as_ref(), &session()).await.unwrap();
            assert_eq!(through_manager, straight);
        }
    }

    #[tokio::test]
    async fn memory_and_sqlite_agree() {
        let memory = replay(&MemoryBackend::new(), &session()).await.unwrap();
        let sqlite = replay(&SqliteBackend::in_memory().unwrap(), &session())
            .await
            .unwrap();
        assert_eq!(memory, sqlite);
    }

    #[tokio::test]
    async fn swap_starts_empty() {
        let manager = CacheManager::default();
        manager.set("1", user(1, "A")).await.unwrap();
        manager
            .set_strategy(Arc::new(SqliteBackend::in_memory().unwrap()))
            .await;
        assert_eq!(manager.get("1").await.unwrap(), None);
    }

    #[tokio::test]
    async fn rich_records_round_trip() {
        let record = into_record(
            "doc",
            json!({
                "title": "ünïcödé ✓",
                "n": -12,
                "big": u64::MAX,
                "pi": 3.5,
                "flags": [true, false, null],
                "nested": {"deeper": {"list": [{"a": 1}, [], {}]}},
            }),
        )
        .unwrap();

        let dir = tempfile::tempdir().unwrap();
        let backends: Vec<BackendRef> = vec![
            Arc::new(MemoryBackend::new()),
            Arc::new(SqliteBackend::in_memory().unwrap()),
            Arc::new(sqlite_file(&dir)),
        ];
        for backend in backends {
            backend.set("doc", record.clone()).await.unwrap();
            assert_eq!(backend.get("doc").await.unwrap(), Some(record.clone()));
        }
    }

    #[tokio::test]
    async fn random_floats_round_trip() {
        // xorshift64 over raw bit patterns, keeping the finite ones
        let mut state = 0x2545_F491_4F6C_DD1Du64;
        let mut floats = Vec::new();
        while floats.len() < 2_000 {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            let f = f64::from_bits(state);
            if f.is_finite() {
                floats.push(f);
            }
        }
        let record = into_record("floats", json!({ "floats": &floats })).unwrap();

        let memory = MemoryBackend::new();
        let sqlite = SqliteBackend::in_memory().unwrap();
        memory.set("floats", record.clone()).await.unwrap();
        sqlite.set("floats", record.clone()).await.unwrap();

        let from_sqlite = sqlite.get("floats").await.unwrap().unwrap();
        for (got, want) in from_sqlite["floats"].as_array().unwrap().iter().zip(&floats) {
            assert_eq!(got.as_f64().map(f64::to_bits), Some(want.to_bits()), "{want:e}");
        }
        assert_eq!(memory.get("floats").await.unwrap(), Some(from_sqlite));
    }

    #[tokio::test]
    async fn rejected_set_keeps_stored_value() {
        let bad_map = std::collections::HashMap::from([(vec![1u8], "x")]);
        let backends: Vec<BackendRef> = vec![
            Arc::new(MemoryBackend::new()),
            Arc::new(SqliteBackend::in_memory().unwrap()),
        ];
        for backend in backends {
            backend.set("k", user(1, "A")).await.unwrap();

            let err = backend.set_as("k", &42).await.unwrap_err();
            assert!(matches!(err, Error::InvalidRecord { .. }), "{err}");
            let err = backend.set_as("k", &bad_map).await.unwrap_err();
            assert!(matches!(err, Error::Serialization { .. }), "{err}");
            assert!(err.is_serialization());

            assert_eq!(backend.get("k").await.unwrap(), Some(user(1, "A")));
        }
    }

    #[tokio::test]
    async fn foreign_row_is_an_error_not_a_miss() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(sqlite_file(&dir));
        backend.set("ok", user(1, "A")).await.unwrap();

        let conn = rusqlite::Connection::open(dir.path().join("kura.db")).unwrap();
        conn.execute(
            "INSERT INTO cache (key, value) VALUES ('foreign', 'not json at all')",
            [],
        )
        .unwrap();
        drop(conn);

        let manager = CacheManager::new(backend);
        let err = manager.get("foreign").await.unwrap_err();
        assert!(err.is_deserialization(), "{err}");
        assert_eq!(manager.get("ok").await.unwrap(), Some(user(1, "A")));
        assert_eq!(manager.get("missing").await.unwrap(), None);
    }

    #[tokio::test]
    async fn closed_storage_reaches_the_caller() {
        let sqlite = Arc::new(SqliteBackend::in_memory().unwrap());
        let manager = CacheManager::default();
        manager.set_strategy(sqlite.clone()).await;
        sqlite.close().await.unwrap();

        assert!(matches!(
            manager.set("k", user(1, "A")).await.unwrap_err(),
            Error::StorageClosed { .. }
        ));
        assert!(manager.delete("k").await.unwrap_err().is_storage());
    }

    #[tokio::test]
    async fn typed_access_through_manager() {
        #[derive(Debug, PartialEq, Serialize, Deserialize)]
        struct Session {
            user:   String,
            scopes: Vec<String>,
        }

        let manager = CacheManager::default();
        manager
            .set_strategy(Arc::new(SqliteBackend::in_memory().unwrap()))
            .await;

        let session = Session {
            user:   "LUNA".to_string(),
            scopes: vec!["read".to_string(), "write".to_string()],
        };
        manager.set_as("s", &session).await.unwrap();
        assert_eq!(manager.get_as::<Session>("s").await.unwrap(), Some(session));
        assert_eq!(manager.get_as::<Session>("none").await.unwrap(), None);

        let err = manager.set_as("s", &vec![1, 2, 3]).await.unwrap_err();
        assert!(err.is_serialization());

        // a record of the wrong shape decodes as an error, not a miss
        manager.set("wrong", user(1, "A")).await.unwrap();
        assert!(manager
            .get_as::<Session>("wrong")
            .await
            .unwrap_err()
            .is_deserialization());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_writers_on_one_key() {
        let dir = tempfile::tempdir().unwrap();
        let backends: Vec<BackendRef> = vec![
            Arc::new(MemoryBackend::new()),
            Arc::new(SqliteBackend::in_memory().unwrap()),
            Arc::new(sqlite_file(&dir)),
        ];
        for backend in backends {
            let manager = Arc::new(CacheManager::new(backend));
            let handles = (0..24u64)
                .map(|i| {
                    let manager = manager.clone();
                    tokio::spawn(async move { manager.set("hot", user(i, "w")).await })
                })
                .collect::<Vec<_>>();
            for r in futures::future::join_all(handles).await {
                r.unwrap().unwrap();
            }

            let got = manager.get("hot").await.unwrap().unwrap();
            let id = got["id"].as_u64().unwrap();
            assert!(id < 24);
            assert_eq!(got, user(id, "w"));
        }
    }
}
