//! 提示词存储 - 业务能力层
//!
//! 整个集合序列化为一个 JSON 数组，存放在同一个键下。
//! 每次操作都"读全量 → 修改 → 写全量"。
//!
//! 读取或解析失败时降级为空集合：调用方只能通过日志区分
//! "没有保存过"和"存储不可读"，返回值里无法区分。

use chrono::Utc;
use tracing::{debug, error, warn};
use uuid::Uuid;

use crate::error::PersistenceError;
use crate::infrastructure::KvStore;
use crate::models::{PromptDraft, PromptPatch, SavedPrompt};

/// 默认存储键
pub const DEFAULT_PROMPT_KEY: &str = "saved-prompts";

pub struct PromptStore<S: KvStore> {
    store: S,
    key: String,
}

impl<S: KvStore> PromptStore<S> {
    pub fn new(store: S) -> Self {
        Self::with_key(store, DEFAULT_PROMPT_KEY)
    }

    pub fn with_key(store: S, key: impl Into<String>) -> Self {
        Self {
            store,
            key: key.into(),
        }
    }

    /// 列出全部提示词（按保存顺序）
    pub fn list(&self) -> Vec<SavedPrompt> {
        match self.load() {
            Ok(prompts) => prompts,
            Err(e) => {
                warn!("⚠️ 读取提示词失败，按空集合处理: {}", e);
                Vec::new()
            }
        }
    }

    /// 保存新提示词，分配 id 和创建时间
    ///
    /// 写入失败只记录日志，仍然返回新记录。
    pub fn save(&self, draft: PromptDraft) -> SavedPrompt {
        let prompt = SavedPrompt {
            id: Uuid::new_v4().to_string(),
            name: draft.name,
            original_prompt: draft.original_prompt,
            optimized_prompt: draft.optimized_prompt,
            created_at: Utc::now().timestamp_millis(),
            score: draft.score,
        };

        let mut prompts = self.list();
        prompts.push(prompt.clone());
        if let Err(e) = self.persist(&prompts) {
            error!("❌ 保存提示词失败 ({}): {}", prompt.id, e);
        } else {
            debug!("保存提示词: {} ({})", prompt.name, prompt.id);
        }

        prompt
    }

    /// 按 id 删除；不存在或写入失败返回 false
    pub fn delete(&self, id: &str) -> bool {
        let mut prompts = self.list();
        let before = prompts.len();
        prompts.retain(|p| p.id != id);
        if prompts.len() == before {
            debug!("删除提示词: 未找到 {}", id);
            return false;
        }

        match self.persist(&prompts) {
            Ok(()) => true,
            Err(e) => {
                error!("❌ 删除提示词失败 ({}): {}", id, e);
                false
            }
        }
    }

    /// 按 id 部分更新；不存在或写入失败返回 false
    pub fn update(&self, id: &str, patch: PromptPatch) -> bool {
        let mut prompts = self.list();
        let Some(prompt) = prompts.iter_mut().find(|p| p.id == id) else {
            debug!("更新提示词: 未找到 {}", id);
            return false;
        };
        patch.apply(prompt);

        match self.persist(&prompts) {
            Ok(()) => true,
            Err(e) => {
                error!("❌ 更新提示词失败 ({}): {}", id, e);
                false
            }
        }
    }

    fn load(&self) -> Result<Vec<SavedPrompt>, PersistenceError> {
        match self.store.read(&self.key)? {
            Some(content) => {
                serde_json::from_str(&content).map_err(|source| PersistenceError::Corrupted {
                    key: self.key.clone(),
                    source,
                })
            }
            None => Ok(Vec::new()),
        }
    }

    fn persist(&self, prompts: &[SavedPrompt]) -> Result<(), PersistenceError> {
        let content = serde_json::to_string(prompts).map_err(|source| {
            PersistenceError::Corrupted {
                key: self.key.clone(),
                source,
            }
        })?;
        self.store.write(&self.key, &content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::MemoryKvStore;

    fn draft(name: &str) -> PromptDraft {
        PromptDraft {
            name: name.to_string(),
            original_prompt: "write about aeo".to_string(),
            optimized_prompt: "Write a 600-word article about answer engine optimization".to_string(),
            score: Some(82.0),
        }
    }

    /// 总是失败的存储
    struct BrokenStore;

    impl KvStore for BrokenStore {
        fn read(&self, _key: &str) -> Result<Option<String>, PersistenceError> {
            Err(PersistenceError::Unavailable("disk gone".to_string()))
        }

        fn write(&self, _key: &str, _value: &str) -> Result<(), PersistenceError> {
            Err(PersistenceError::Unavailable("disk gone".to_string()))
        }
    }

    #[test]
    fn test_save_assigns_id_and_timestamp() {
        let store = PromptStore::new(MemoryKvStore::new());
        let a = store.save(draft("a"));
        let b = store.save(draft("b"));

        assert_ne!(a.id, b.id);
        assert!(a.created_at > 0);
        let listed = store.list();
        assert_eq!(listed, vec![a, b]);
    }

    #[test]
    fn test_save_then_delete_restores_list() {
        let store = PromptStore::new(MemoryKvStore::new());
        store.save(draft("existing"));
        let before = store.list();

        let saved = store.save(draft("temporary"));
        assert!(store.delete(&saved.id));
        assert_eq!(store.list(), before);
    }

    #[test]
    fn test_delete_unknown_id() {
        let store = PromptStore::new(MemoryKvStore::new());
        store.save(draft("a"));
        assert!(!store.delete("no-such-id"));
        assert_eq!(store.list().len(), 1);
    }

    #[test]
    fn test_update_applies_patch() {
        let store = PromptStore::new(MemoryKvStore::new());
        let saved = store.save(draft("a"));

        let updated = store.update(
            &saved.id,
            PromptPatch {
                name: Some("renamed".to_string()),
                score: Some(None),
                ..PromptPatch::default()
            },
        );
        assert!(updated);

        let listed = store.list();
        assert_eq!(listed[0].name, "renamed");
        assert_eq!(listed[0].score, None);
        assert_eq!(listed[0].original_prompt, saved.original_prompt);
        assert!(!store.update("missing", PromptPatch::default()));
    }

    #[test]
    fn test_corrupted_store_degrades_to_empty() {
        let kv = MemoryKvStore::new().with_entry(DEFAULT_PROMPT_KEY, "{not json");
        let store = PromptStore::new(kv);
        assert!(store.list().is_empty());
        assert!(!store.delete("anything"));
    }

    #[test]
    fn test_unreadable_store_degrades() {
        let store = PromptStore::new(BrokenStore);
        assert!(store.list().is_empty());
        // 写入失败不会 panic，仍返回记录
        let saved = store.save(draft("lost"));
        assert_eq!(saved.name, "lost");
        assert!(!store.delete(&saved.id));
        assert!(!store.update(&saved.id, PromptPatch::default()));
    }

    #[test]
    fn test_persisted_schema_uses_camel_case() {
        let kv = MemoryKvStore::new();
        let store = PromptStore::with_key(kv, "custom-key");
        let saved = store.save(PromptDraft {
            score: None,
            ..draft("schema")
        });

        let raw = store.store.read("custom-key").unwrap().unwrap();
        let value: serde_json::Value = serde_json::from_str(&raw).unwrap();
        assert_eq!(value[0]["id"], saved.id.as_str());
        assert!(value[0]["originalPrompt"].is_string());
        assert!(value[0]["optimizedPrompt"].is_string());
        assert!(value[0]["createdAt"].is_i64());
        assert!(value[0]["score"].is_null());
    }
}
