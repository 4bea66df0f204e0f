//! Record storage: the storage contract and its backends.

pub mod contract;
pub mod fs;
pub mod memory;

pub use contract::{RecordStorage, WriteMode};
pub use fs::{FsRecordStorage, StoreLayout};
pub use memory::MemoryRecordStorage;
