//! Filesystem record storage: one framed markdown file per key under `<root>/<vault_dir>`.

use crate::codec::{render_document, split_document, FrontmatterCodec, YamlCodec};
use crate::error::{CodecError, RecordError};
use crate::storage::contract::{RecordStorage, WriteMode};
use crate::types::{validate_key, Record};
use serde::{Deserialize, Serialize};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

pub const DEFAULT_VAULT_DIR: &str = "vault";
pub const DEFAULT_EXTENSION: &str = "md";

fn default_vault_dir() -> String {
    DEFAULT_VAULT_DIR.to_string()
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

/// Where record files live below the store root.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoreLayout {
    /// Subdirectory of the root holding record files
    #[serde(default = "default_vault_dir")]
    pub vault_dir: String,

    /// File extension without the leading dot; empty means bare key file names
    #[serde(default = "default_extension")]
    pub extension: String,
}

impl StoreLayout {
    pub fn new(vault_dir: impl Into<String>, extension: impl Into<String>) -> Self {
        let extension: String = extension.into();
        Self {
            vault_dir: vault_dir.into(),
            extension: extension.trim_start_matches('.').to_string(),
        }
    }

    fn file_name(&self, key: &str) -> String {
        if self.extension.is_empty() {
            key.to_string()
        } else {
            format!("{}.{}", key, self.extension)
        }
    }

    /// Recover the key from a vault file name, if the name belongs to this layout.
    fn key_from_path(&self, path: &Path) -> Option<Option<String>> {
        if self.extension.is_empty() {
            return Some(path.file_name().and_then(|s| s.to_str()).map(str::to_string));
        }
        if path.extension() != Some(std::ffi::OsStr::new(&self.extension)) {
            return None;
        }
        Some(path.file_stem().and_then(|s| s.to_str()).map(str::to_string))
    }
}

impl Default for StoreLayout {
    fn default() -> Self {
        Self {
            vault_dir: default_vault_dir(),
            extension: default_extension(),
        }
    }
}

/// Record storage backed by plain files.
///
/// Holds nothing but paths; every operation opens, writes, or removes a single
/// file and returns. Concurrent writers to one key race, last one wins.
#[derive(Debug, Clone)]
pub struct FsRecordStorage<C = YamlCodec> {
    root: PathBuf,
    layout: StoreLayout,
    write_mode: WriteMode,
    codec: C,
}

impl FsRecordStorage<YamlCodec> {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            layout: StoreLayout::default(),
            write_mode: WriteMode::default(),
            codec: YamlCodec,
        }
    }
}

impl<C: FrontmatterCodec> FsRecordStorage<C> {
    pub fn with_layout(mut self, layout: StoreLayout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_write_mode(mut self, write_mode: WriteMode) -> Self {
        self.write_mode = write_mode;
        self
    }

    /// Swap the frontmatter codec.
    pub fn with_codec<D: FrontmatterCodec>(self, codec: D) -> FsRecordStorage<D> {
        FsRecordStorage {
            root: self.root,
            layout: self.layout,
            write_mode: self.write_mode,
            codec,
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn layout(&self) -> &StoreLayout {
        &self.layout
    }

    pub fn write_mode(&self) -> WriteMode {
        self.write_mode
    }

    pub fn vault_dir(&self) -> PathBuf {
        self.root.join(&self.layout.vault_dir)
    }

    /// On-disk path of a key's file.
    pub fn path_for(&self, key: &str) -> Result<PathBuf, RecordError> {
        validate_key(key).map_err(|reason| RecordError::validation(key, reason))?;
        Ok(self.vault_dir().join(self.layout.file_name(key)))
    }

    fn write_record(&self, key: &str, record: &Record, exclusive: bool) -> Result<String, RecordError> {
        let path = self.path_for(key)?;
        let block = self
            .codec
            .encode(&record.frontmatter)
            .map_err(|source| RecordError::Serialization {
                key: key.to_string(),
                source,
            })?;
        let content = render_document(&block, &record.body);

        if exclusive {
            let file = std::fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
                .map_err(|e| match e.kind() {
                    ErrorKind::AlreadyExists => RecordError::AlreadyExists {
                        key: key.to_string(),
                    },
                    _ => RecordError::io(Some(key), &path, e),
                })?;
            write_or_discard(file, &path, content.as_bytes())
                .map_err(|e| RecordError::io(Some(key), &path, e))?;
        } else {
            std::fs::write(&path, &content).map_err(|e| RecordError::io(Some(key), &path, e))?;
        }

        tracing::debug!(key, path = %path.display(), bytes = content.len(), "Wrote record");
        Ok(key.to_string())
    }

    fn parse_error(key: &str, source: CodecError) -> RecordError {
        RecordError::Parse {
            key: key.to_string(),
            source,
        }
    }
}

/// Write a freshly created file, unlinking it if the write fails so a later
/// exclusive create for the same key is not blocked by a partial file.
fn write_or_discard<W: Write>(mut writer: W, path: &Path, content: &[u8]) -> std::io::Result<()> {
    match writer.write_all(content) {
        Ok(()) => Ok(()),
        Err(e) => {
            drop(writer);
            if let Err(cleanup) = std::fs::remove_file(path) {
                tracing::warn!("Failed to remove partial record file {}: {}", path.display(), cleanup);
            }
            Err(e)
        }
    }
}

impl<C: FrontmatterCodec> RecordStorage for FsRecordStorage<C> {
    fn connect(&self) -> Result<(), RecordError> {
        let vault_dir = self.vault_dir();
        std::fs::create_dir_all(&vault_dir).map_err(|e| RecordError::io(None, &vault_dir, e))?;
        tracing::info!(vault = %vault_dir.display(), "Record vault ready");
        Ok(())
    }

    fn close(&self) -> Result<(), RecordError> {
        Ok(())
    }

    fn create_record(&self, key: &str, record: &Record) -> Result<String, RecordError> {
        self.write_record(key, record, self.write_mode == WriteMode::Exclusive)
    }

    fn update_record(&self, key: &str, record: &Record) -> Result<String, RecordError> {
        self.write_record(key, record, false)
    }

    fn delete_record(&self, key: &str) -> Result<String, RecordError> {
        let path = self.path_for(key)?;
        std::fs::remove_file(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RecordError::NotFound {
                key: key.to_string(),
                source: e,
            },
            _ => RecordError::io(Some(key), &path, e),
        })?;
        tracing::debug!(key, path = %path.display(), "Deleted record");
        Ok(key.to_string())
    }

    fn read_record(&self, key: &str) -> Result<(String, Record), RecordError> {
        let path = self.path_for(key)?;
        let bytes = std::fs::read(&path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => RecordError::NotFound {
                key: key.to_string(),
                source: e,
            },
            _ => RecordError::io(Some(key), &path, e),
        })?;
        let content =
            String::from_utf8(bytes).map_err(|_| Self::parse_error(key, CodecError::InvalidUtf8))?;

        let (block, body) = split_document(&content).map_err(|e| Self::parse_error(key, e))?;
        let frontmatter = self
            .codec
            .decode(block)
            .map_err(|e| Self::parse_error(key, e))?;

        tracing::debug!(key, path = %path.display(), "Read record");
        Ok((key.to_string(), Record::new(frontmatter, body)))
    }

    fn record_keys(&self) -> Result<Vec<String>, RecordError> {
        let vault_dir = self.vault_dir();
        let entries =
            std::fs::read_dir(&vault_dir).map_err(|e| RecordError::io(None, &vault_dir, e))?;

        let mut keys = Vec::new();
        for entry in entries {
            let entry = match entry {
                Ok(e) => e,
                Err(e) => {
                    tracing::warn!(
                        "Failed to read directory entry in {}: {}",
                        vault_dir.display(),
                        e
                    );
                    continue;
                }
            };

            match entry.file_type() {
                Ok(file_type) if file_type.is_file() => {}
                Ok(_) => continue,
                Err(e) => {
                    tracing::warn!("Failed to stat {}: {}", entry.path().display(), e);
                    continue;
                }
            }

            let path = entry.path();
            match self.layout.key_from_path(&path) {
                None => continue,
                Some(Some(key)) => keys.push(key),
                Some(None) => {
                    tracing::warn!("Skipping record file with non UTF8 name: {:?}", path);
                }
            }
        }

        Ok(keys)
    }
}
