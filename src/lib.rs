//! Vault Records: File-Backed Frontmatter Record Storage
//!
//! Stores records (a frontmatter mapping plus a free-text body) as one
//! `---` framed markdown file per key under `<root>/vault`, behind a
//! backend-agnostic [`RecordStorage`] contract.

pub mod codec;
pub mod config;
pub mod error;
pub mod logging;
pub mod storage;
pub mod types;

pub use codec::{FrontmatterCodec, YamlCodec};
pub use error::{CodecError, RecordError, SetupError};
pub use storage::{FsRecordStorage, MemoryRecordStorage, RecordStorage, StoreLayout, WriteMode};
pub use types::{FieldValue, Frontmatter, Record};
