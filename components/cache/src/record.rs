use async_trait::async_trait;
use serde::{de::DeserializeOwned, Serialize};
use serde_json::Value;
use snafu::ResultExt;

use crate::{
    backend::CacheBackend,
    err::{
        CorruptedRecordSnafu, DeserializationSnafu, InvalidRecordSnafu, Result,
        SerializationSnafu,
    },
};

/// A structured value stored under a cache key: string field names mapped to
/// JSON values, nested as deep as needed.
pub type Record = serde_json::Map<String, Value>;

/// Canonical text form of a record, as kept by persistent backends.
pub fn encode(key: &str, record: &Record) -> Result<String> {
    serde_json::to_string(record).context(SerializationSnafu { key })
}

/// Parse the canonical text form back into a record.
///
/// The input is raw bytes so that text which is not valid UTF-8 is reported
/// as a decode failure. JSON that is not an object is corruption, not a miss.
pub fn decode(key: &str, text: &[u8]) -> Result<Record> {
    let value: Value = serde_json::from_slice(text).context(DeserializationSnafu { key })?;
    match value {
        Value::Object(record) => Ok(record),
        other => CorruptedRecordSnafu {
            key,
            reason: format!("expected a JSON object, found {}", json_kind(&other)),
        }
        .fail(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

/// Turn any serializable value into a record. Only values that serialize to
/// a JSON object qualify.
pub fn to_record<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Record> {
    match serde_json::to_value(value).context(SerializationSnafu { key })? {
        Value::Object(record) => Ok(record),
        _ => InvalidRecordSnafu { key }.fail(),
    }
}

pub fn from_record<T: DeserializeOwned>(key: &str, record: Record) -> Result<T> {
    serde_json::from_value(Value::Object(record)).context(DeserializationSnafu { key })
}

/// Typed access on top of any [CacheBackend], the manager included.
#[async_trait]
pub trait CacheExt: CacheBackend {
    async fn get_as<T>(&self, key: &str) -> Result<Option<T>>
    where
        T: DeserializeOwned,
    {
        self.get(key)
            .await?
            .map(|record| from_record(key, record))
            .transpose()
    }

    async fn set_as<T>(&self, key: &str, value: &T) -> Result<()>
    where
        T: Serialize + Sync + ?Sized,
    {
        let record = to_record(key, value)?;
        self.set(key, record).await
    }
}

impl<B: CacheBackend + ?Sized> CacheExt for B {}

/// Accept an arbitrary JSON value as a record, rejecting anything that is not
/// an object.
pub fn into_record(key: &str, value: Value) -> Result<Record> {
    match value {
        Value::Object(record) => Ok(record),
        _ => InvalidRecordSnafu { key }.fail(),
    }
}
