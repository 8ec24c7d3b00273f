pub mod kv_store;

pub use kv_store::{FileKvStore, KvStore, MemoryKvStore};
