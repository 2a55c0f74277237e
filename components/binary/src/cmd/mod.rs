pub mod del;
pub mod demo;
pub mod get;
pub mod set;

use kura_cache::{CacheConfig, CacheManager};
use snafu::{ResultExt, Whatever};

fn open_manager(config: &CacheConfig) -> Result<CacheManager, Whatever> {
    CacheManager::from_config(config)
        .with_whatever_context(|_| format!("could not open cache at {}", config.dsn))
}
