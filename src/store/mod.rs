pub mod document;
pub mod storage;

pub use document::{id_after, Document, StoreError};
pub use storage::{default_store_dir, RecordStore};
