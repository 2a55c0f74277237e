use clap::Args;
use kura_cache::{CacheBackend, CacheConfig};
use snafu::{ResultExt, Whatever};

#[derive(Debug, Clone, Args)]
#[command(long_about = r"

Remove KEY. Prints whether anything was removed.
")]
pub struct DelArgs {
    #[arg(help = "Key to remove", value_name = "KEY")]
    pub key: String,
}

impl DelArgs {
    pub async fn run(&self, config: &CacheConfig) -> Result<(), Whatever> {
        let manager = super::open_manager(config)?;
        let removed = manager
            .delete(&self.key)
            .await
            .with_whatever_context(|_| format!("could not delete {}", self.key))?;
        println!("{removed}");
        Ok(())
    }
}
