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

//! Key-value cache with interchangeable backends.
//!
//! Callers talk to a [CacheManager] (or any [CacheBackend]) through `get`,
//! `set` and `delete`. The manager forwards to one active backend that can be
//! swapped at runtime with [CacheManager::set_strategy].

pub mod backend;
pub mod config;
pub mod err;
pub mod manager;
pub mod record;

pub use backend::{
    memory::MemoryBackend, open_backend, sqlite::SqliteBackend, BackendRef, CacheBackend,
};
pub use config::CacheConfig;
pub use manager::CacheManager;
pub use record::{CacheExt, Record};
