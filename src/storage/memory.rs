//! In-process record storage implementing the same contract as the filesystem backend.

use crate::error::RecordError;
use crate::storage::contract::{RecordStorage, WriteMode};
use crate::types::{validate_key, Record};
use parking_lot::RwLock;
use std::collections::HashMap;
use std::io::{Error as IoError, ErrorKind};

const MEMORY_PATH: &str = "<memory>";

#[derive(Debug, Default)]
struct Inner {
    connected: bool,
    records: HashMap<String, Record>,
}

/// Record storage kept in a map. Contents do not survive the process.
#[derive(Debug, Default)]
pub struct MemoryRecordStorage {
    inner: RwLock<Inner>,
    write_mode: WriteMode,
}

impl MemoryRecordStorage {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    pub fn len(&self) -> usize {
        self.inner.read().records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn check_key(key: &str) -> Result<(), RecordError> {
        validate_key(key).map_err(|reason| RecordError::validation(key, reason))
    }

    fn not_connected(key: Option<&str>) -> RecordError {
        RecordError::io(
            key,
            MEMORY_PATH,
            IoError::new(ErrorKind::NotConnected, "memory storage is not connected"),
        )
    }

    fn not_found(key: &str) -> RecordError {
        RecordError::NotFound {
            key: key.to_string(),
            source: IoError::new(ErrorKind::NotFound, format!("no record for key '{}'", key)),
        }
    }

    fn write_record(&self, key: &str, record: &Record, exclusive: bool) -> Result<String, RecordError> {
        Self::check_key(key)?;
        let mut inner = self.inner.write();
        if !inner.connected {
            return Err(Self::not_connected(Some(key)));
        }
        if exclusive && inner.records.contains_key(key) {
            return Err(RecordError::AlreadyExists {
                key: key.to_string(),
            });
        }
        inner.records.insert(key.to_string(), record.clone());
        tracing::debug!(key, "Stored record in memory");
        Ok(key.to_string())
    }
}

impl RecordStorage for MemoryRecordStorage {
    fn connect(&self) -> Result<(), RecordError> {
        self.inner.write().connected = true;
        Ok(())
    }

    fn close(&self) -> Result<(), RecordError> {
        self.inner.write().connected = false;
        Ok(())
    }

    fn create_record(&self, key: &str, record: &Record) -> Result<String, RecordError> {
        self.write_record(key, record, self.write_mode == WriteMode::Exclusive)
    }

    fn update_record(&self, key: &str, record: &Record) -> Result<String, RecordError> {
        self.write_record(key, record, false)
    }

    fn delete_record(&self, key: &str) -> Result<String, RecordError> {
        Self::check_key(key)?;
        let mut inner = self.inner.write();
        if !inner.connected {
            return Err(Self::not_connected(Some(key)));
        }
        match inner.records.remove(key) {
            Some(_) => Ok(key.to_string()),
            None => Err(Self::not_found(key)),
        }
    }

    fn read_record(&self, key: &str) -> Result<(String, Record), RecordError> {
        Self::check_key(key)?;
        let inner = self.inner.read();
        if !inner.connected {
            return Err(Self::not_connected(Some(key)));
        }
        inner
            .records
            .get(key)
            .map(|record| (key.to_string(), record.clone()))
            .ok_or_else(|| Self::not_found(key))
    }

    fn record_keys(&self) -> Result<Vec<String>, RecordError> {
        let inner = self.inner.read();
        if !inner.connected {
            return Err(Self::not_connected(None));
        }
        Ok(inner.records.keys().cloned().collect())
    }
}
