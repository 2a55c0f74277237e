use std::sync::Arc;

use clap::Args;
use kura_cache::{BackendRef, CacheBackend, CacheManager, MemoryBackend, SqliteBackend};
use serde_json::json;
use snafu::{ResultExt, Whatever};

#[derive(Debug, Clone, Args)]
#[command(long_about = r"

Walk through a strategy swap: write two users to an in-memory backend, read
them back, then switch to a SQLite backend and do the same. The second
backend starts empty; nothing is migrated.
")]
pub struct DemoArgs {}

impl DemoArgs {
    pub async fn run(&self) -> Result<(), Whatever> {
        let manager = CacheManager::default();

        manager.set_strategy(Arc::new(MemoryBackend::new())).await;
        round(&manager, "memory").await?;

        println!("{}", "-".repeat(30));

        let sqlite: BackendRef =
            Arc::new(SqliteBackend::in_memory().whatever_context("could not open sqlite")?);
        manager.set_strategy(sqlite).await;
        round(&manager, "sqlite").await?;
        Ok(())
    }
}

async fn round(manager: &CacheManager, medium: &str) -> Result<(), Whatever> {
    for (key, id, name) in [("1", 1, "STACiA"), ("2", 2, "LUNA")] {
        let record = kura_cache::record::into_record(
            key,
            json!({"id": id, "name": format!("{name} - {medium}")}),
        )
        .whatever_context("demo record")?;
        manager
            .set(key, record)
            .await
            .with_whatever_context(|_| format!("could not write {key}"))?;
    }
    for key in ["1", "2", "3"] {
        let got = manager
            .get(key)
            .await
            .with_whatever_context(|_| format!("could not read {key}"))?;
        match got {
            Some(record) => println!("{key}: {}", serde_json::Value::Object(record)),
            None => println!("{key}: (miss)"),
        }
    }
    Ok(())
}
