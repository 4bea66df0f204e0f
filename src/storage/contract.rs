use crate::error::RecordError;
use crate::types::Record;
use serde::{Deserialize, Serialize};

/// How `create_record` treats a key that already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WriteMode {
    /// Create and update are the same full overwrite.
    #[default]
    Overwrite,
    /// Create fails with `AlreadyExists` if the key is present; update still overwrites.
    Exclusive,
}

/// Backend-agnostic record storage.
///
/// Every operation is an independent, synchronous transaction on one record.
/// Operations that target a key hand it back on success so callers can
/// correlate results; on failure the key travels inside the [`RecordError`].
pub trait RecordStorage: Send + Sync {
    /// Prepare the backend. Idempotent.
    fn connect(&self) -> Result<(), RecordError>;

    fn close(&self) -> Result<(), RecordError>;

    fn create_record(&self, key: &str, record: &Record) -> Result<String, RecordError>;

    fn update_record(&self, key: &str, record: &Record) -> Result<String, RecordError>;

    fn delete_record(&self, key: &str) -> Result<String, RecordError>;

    fn read_record(&self, key: &str) -> Result<(String, Record), RecordError>;

    /// All stored keys, in no particular order.
    fn record_keys(&self) -> Result<Vec<String>, RecordError>;

    /// Create from a dynamic `{frontmatter, body}` value, validating its shape first.
    fn create_record_from_value(
        &self,
        key: &str,
        value: serde_yaml::Value,
    ) -> Result<String, RecordError> {
        let record =
            Record::from_value(value).map_err(|e| RecordError::validation(key, e.to_string()))?;
        self.create_record(key, &record)
    }

    /// Update from a dynamic `{frontmatter, body}` value, validating its shape first.
    fn update_record_from_value(
        &self,
        key: &str,
        value: serde_yaml::Value,
    ) -> Result<String, RecordError> {
        let record =
            Record::from_value(value).map_err(|e| RecordError::validation(key, e.to_string()))?;
        self.update_record(key, &record)
    }
}
