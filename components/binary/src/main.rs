// Copyright 2024 kura
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//      http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

mod cmd;

use clap::{Parser, Subcommand};
use kura_cache::CacheConfig;
use snafu::{ResultExt, Whatever};

use crate::cmd::{del::DelArgs, demo::DemoArgs, get::GetArgs, set::SetArgs};

#[derive(Debug, Parser)]
#[clap(
name = "kura",
about = "kura cache client",
author = env!("CARGO_PKG_AUTHORS"),
version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[arg(
        long,
        global = true,
        help = "Where the cache lives, e.g. memory://: or sqlite://:/tmp/kura.cache.db \
                [env: KURA_CACHE_DSN]"
    )]
    dsn: Option<String>,

    #[arg(
        long,
        global = true,
        help = "Log filter used when RUST_LOG is not set",
        default_value = kura_common::DEFAULT_LOG_LEVEL,
    )]
    log_level: String,

    #[command(subcommand)]
    commands: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    Get(GetArgs),
    Set(SetArgs),
    Del(DelArgs),
    Demo(DemoArgs),
}

fn main() -> Result<(), Whatever> {
    let cli = Cli::parse();
    kura_utils::logger::init_logging(&cli.log_level)?;

    let mut config = CacheConfig::from_env()?;
    if let Some(dsn) = &cli.dsn {
        config.with_dsn(dsn);
    }

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .whatever_context("failed to start tokio runtime")?;

    runtime.block_on(async move {
        match cli.commands {
            Commands::Get(args) => args.run(&config).await,
            Commands::Set(args) => args.run(&config).await,
            Commands::Del(args) => args.run(&config).await,
            Commands::Demo(args) => args.run().await,
        }
    })
}
