use std::io;

use thiserror::Error;

/// Failures raised by a storage backend or by snapshot (de)serialization.
///
/// None of these escape the desktop command surface: callers log them and
/// fall back to defaults or skip the write.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("storage i/o failed for key `{key}`: {source}")]
    Io {
        key: String,
        #[source]
        source: io::Error,
    },
    #[error("malformed json under key `{key}`: {source}")]
    Json {
        key: String,
        #[source]
        source: serde_json::Error,
    },
    #[error("storage backend unavailable: {0}")]
    Unavailable(String),
}

impl StoreError {
    pub fn io(key: impl Into<String>, source: io::Error) -> Self {
        Self::Io {
            key: key.into(),
            source,
        }
    }

    pub fn json(key: impl Into<String>, source: serde_json::Error) -> Self {
        Self::Json {
            key: key.into(),
            source,
        }
    }
}

pub type StoreResult<T> = Result<T, StoreError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_names_the_key() {
        let err = StoreError::io("windows", io::Error::other("disk gone"));
        let text = err.to_string();
        assert!(text.contains("`windows`"));
        assert!(text.contains("disk gone"));
    }

    #[test]
    fn json_error_keeps_source() {
        let source = serde_json::from_str::<u32>("nope").unwrap_err();
        let err = StoreError::json("folders", source);
        assert!(std::error::Error::source(&err).is_some());
    }
}
