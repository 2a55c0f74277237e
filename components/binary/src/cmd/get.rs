use clap::Args;
use kura_cache::{CacheBackend, CacheConfig};
use snafu::{ResultExt, Whatever};

#[derive(Debug, Clone, Args)]
#[command(long_about = r"

Print the record stored under KEY as JSON, or (miss) when there is none.
")]
pub struct GetArgs {
    #[arg(help = "Key to look up", value_name = "KEY")]
    pub key: String,
}

impl GetArgs {
    pub async fn run(&self, config: &CacheConfig) -> Result<(), Whatever> {
        let manager = super::open_manager(config)?;
        let record = manager
            .get(&self.key)
            .await
            .with_whatever_context(|_| format!("could not read {}", self.key))?;
        match record {
            Some(record) => {
                let text = serde_json::to_string_pretty(&record)
                    .whatever_context("could not render record")?;
                println!("{text}");
            }
            None => println!("(miss)"),
        }
        Ok(())
    }
}
