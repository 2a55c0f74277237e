use snafu::{whatever, Whatever};

/// Reads an environment variable for the current process.
///
/// The `.env` file of the current or a parent directory is loaded first
/// through [dotenvy]. An unset variable is `Ok(None)`, not an error.
#[track_caller]
pub fn var(key: &str) -> Result<Option<String>, Whatever> {
    match dotenvy::var(key) {
        Ok(content) => Ok(Some(content)),
        Err(dotenvy::Error::EnvVar(std::env::VarError::NotPresent)) => Ok(None),
        Err(error) => whatever!(Err(error), "Failed to read {key} environment variable"),
    }
}

/// Like [var], but falls back to `default` when the variable is unset.
#[track_caller]
pub fn var_or(key: &str, default: &str) -> Result<String, Whatever> {
    Ok(var(key)?.unwrap_or_else(|| default.to_string()))
}
