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

use serde::{Deserialize, Serialize};
use snafu::Whatever;

#[derive(Debug, Deserialize, Serialize, Clone, Eq, PartialEq)]
#[serde(default)]
pub struct CacheConfig {
    /// Where the active backend lives, e.g. `memory://:` or
    /// `sqlite://:/tmp/kura.cache.db`.
    pub dsn: String,
}

impl CacheConfig {
    pub fn with_dsn(&mut self, dsn: &str) -> &mut Self {
        self.dsn = dsn.to_string();
        self
    }

    /// Take the dsn from `KURA_CACHE_DSN` (or a `.env` file), falling back to
    /// the volatile backend when it is unset.
    pub fn from_env() -> Result<Self, Whatever> {
        let dsn = kura_utils::env::var_or(
            kura_common::ENV_CACHE_DSN,
            kura_common::KURA_MEMORY_CACHE_DSN,
        )?;
        let mut config = Self::default();
        config.with_dsn(&dsn);
        Ok(config)
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            dsn: kura_common::KURA_MEMORY_CACHE_DSN.to_string(),
        }
    }
}
