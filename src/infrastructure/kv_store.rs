//! 键值存储 - 基础设施层
//!
//! 持有存储资源，只暴露 `read(key)` / `write(key, value)` 两个能力。
//! 不认识 SavedPrompt，也不处理序列化。

use crate::error::PersistenceError;
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use tracing::debug;

/// 键值存储能力
pub trait KvStore: Send + Sync {
    /// 读取键对应的值；键不存在时返回 `Ok(None)`
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError>;

    /// 覆盖写入键对应的值
    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError>;
}

/// 基于文件的存储：每个键一个 JSON 文件
///
/// 写入先落到临时文件再 rename，读者不会看到写了一半的内容。
/// 多个写者之间不做协调，最后一次写入生效。
pub struct FileKvStore {
    dir: PathBuf,
}

impl FileKvStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let file_name: String = key
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() || c == '-' || c == '_' { c } else { '_' })
            .collect();
        self.dir.join(format!("{}.json", file_name))
    }
}

impl KvStore for FileKvStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let path = self.path_for(key);
        match fs::read_to_string(&path) {
            Ok(content) => Ok(Some(content)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(source) => Err(PersistenceError::ReadFailed {
                key: key.to_string(),
                source,
            }),
        }
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let path = self.path_for(key);
        let write_failed = |source| PersistenceError::WriteFailed {
            key: key.to_string(),
            source,
        };

        fs::create_dir_all(&self.dir).map_err(write_failed)?;
        let tmp_path = path.with_extension("json.tmp");
        fs::write(&tmp_path, value).map_err(write_failed)?;
        fs::rename(&tmp_path, &path).map_err(write_failed)?;

        debug!("已写入 {} ({} 字节)", path.display(), value.len());
        Ok(())
    }
}

/// 内存存储，进程退出即丢失
#[derive(Default)]
pub struct MemoryKvStore {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKvStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// 预置一条数据
    pub fn with_entry(self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let Ok(mut entries) = self.entries.lock() {
            entries.insert(key.into(), value.into());
        }
        self
    }
}

impl KvStore for MemoryKvStore {
    fn read(&self, key: &str) -> Result<Option<String>, PersistenceError> {
        let entries = self
            .entries
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        Ok(entries.get(key).cloned())
    }

    fn write(&self, key: &str, value: &str) -> Result<(), PersistenceError> {
        let mut entries = self
            .entries
            .lock()
            .map_err(|e| PersistenceError::Unavailable(e.to_string()))?;
        entries.insert(key.to_string(), value.to_string());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_store_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path().join("nested"));

        assert_eq!(store.read("saved-prompts").unwrap(), None);
        store.write("saved-prompts", "[]").unwrap();
        assert_eq!(store.read("saved-prompts").unwrap().as_deref(), Some("[]"));

        store.write("saved-prompts", "[1]").unwrap();
        assert_eq!(store.read("saved-prompts").unwrap().as_deref(), Some("[1]"));
    }

    #[test]
    fn test_file_store_sanitizes_keys() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileKvStore::new(dir.path());
        store.write("../escape/key", "x").unwrap();
        assert!(dir.path().join("___escape_key.json").exists());
        assert_eq!(store.read("../escape/key").unwrap().as_deref(), Some("x"));
    }

    #[test]
    fn test_memory_store() {
        let store = MemoryKvStore::new().with_entry("a", "1");
        assert_eq!(store.read("a").unwrap().as_deref(), Some("1"));
        assert_eq!(store.read("b").unwrap(), None);
        store.write("b", "2").unwrap();
        assert_eq!(store.read("b").unwrap().as_deref(), Some("2"));
    }
}
