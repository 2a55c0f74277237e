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

/// Separator between the backend kind and its path in a cache DSN,
/// e.g. `sqlite://:/tmp/kura.cache.db`.
pub const DSN_SEPARATOR: &str = "://:";

pub const KURA_MEMORY_CACHE_DSN: &str = "memory://:";
pub const KURA_SQLITE_MEMORY_DSN: &str = "sqlite://::memory:";

// SQLite's special path for a private, connection-scoped database.
pub const SQLITE_IN_MEMORY: &str = ":memory:";

pub const ENV_CACHE_DSN: &str = "KURA_CACHE_DSN";

pub const DEFAULT_LOG_LEVEL: &str = "info";
