use clap::Args;
use kura_cache::{record::into_record, CacheBackend, CacheConfig};
use snafu::{ResultExt, Whatever};
use tracing::info;

#[derive(Debug, Clone, Args)]
#[command(long_about = r"

Store a JSON object under KEY, replacing any previous record.
")]
pub struct SetArgs {
    #[arg(help = "Key to write", value_name = "KEY")]
    pub key:   String,
    #[arg(
        help = r#"Record as a JSON object, like '{"id": 1, "name": "LUNA"}'"#,
        value_name = "JSON",
        value_parser = parse_json
    )]
    pub value: serde_json::Value,
}

impl SetArgs {
    pub async fn run(&self, config: &CacheConfig) -> Result<(), Whatever> {
        let record = into_record(&self.key, self.value.clone())
            .with_whatever_context(|_| format!("{} is not a JSON object", self.value))?;
        let manager = super::open_manager(config)?;
        manager
            .set(&self.key, record)
            .await
            .with_whatever_context(|_| format!("could not write {}", self.key))?;
        info!("stored {:?} in {}", self.key, config.dsn);
        Ok(())
    }
}

fn parse_json(s: &str) -> Result<serde_json::Value, String> {
    serde_json::from_str(s).map_err(|e| format!("invalid JSON: {e}"))
}
