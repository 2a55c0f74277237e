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

use snafu::{Location, Snafu};

pub type Result<T> = std::result::Result<T, Error>;

/// Errors raised by cache backends.
///
/// A missing key is never an error: lookups return `Ok(None)`.
#[derive(Debug, Snafu)]
#[snafu(visibility(pub))]
pub enum Error {
    #[snafu(display("unsupported cache dsn: {dsn:?}, {location}"))]
    UnsupportedCacheDSN {
        #[snafu(implicit)]
        location: Location,
        dsn:      String,
    },

    #[snafu(display("failed to encode value for key {key:?}: {source}, {location}"))]
    Serialization {
        #[snafu(implicit)]
        location: Location,
        key:      String,
        source:   serde_json::Error,
    },

    #[snafu(display("value for key {key:?} is not a record, {location}"))]
    InvalidRecord {
        #[snafu(implicit)]
        location: Location,
        key:      String,
    },

    #[snafu(display("failed to decode stored value for key {key:?}: {source}, {location}"))]
    Deserialization {
        #[snafu(implicit)]
        location: Location,
        key:      String,
        source:   serde_json::Error,
    },

    #[snafu(display("stored value for key {key:?} is not a record: {reason}, {location}"))]
    CorruptedRecord {
        #[snafu(implicit)]
        location: Location,
        key:      String,
        reason:   String,
    },

    #[snafu(display("storage rejected the operation: {source}, {location}"))]
    Storage {
        #[snafu(implicit)]
        location: Location,
        source:   rusqlite::Error,
    },

    #[snafu(display("storage handle is closed, {location}"))]
    StorageClosed {
        #[snafu(implicit)]
        location: Location,
    },

    TokioJoinError {
        #[snafu(implicit)]
        location: Location,
        source:   tokio::task::JoinError,
    },
}

impl Error {
    /// The persistent medium refused or could not run the operation.
    pub fn is_storage(&self) -> bool {
        matches!(
            self,
            Error::Storage { .. } | Error::StorageClosed { .. } | Error::TokioJoinError { .. }
        )
    }

    pub fn is_serialization(&self) -> bool {
        matches!(self, Error::Serialization { .. } | Error::InvalidRecord { .. })
    }

    /// Stored data exists but cannot be turned back into a record. This is
    /// distinct from a miss.
    pub fn is_deserialization(&self) -> bool {
        matches!(
            self,
            Error::Deserialization { .. } | Error::CorruptedRecord { .. }
        )
    }
}
