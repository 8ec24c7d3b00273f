//! 建议规范化 - 业务能力层
//!
//! 纯函数，不会失败：格式不规范的文本按"尽力拆分"处理。
//!
//! 规则：
//! 1. 含 `:` 时只按第一个 `:` 拆分，左侧为标题，右侧为说明
//! 2. 不含 `:` 时，前 3 个词为标题，其余词用单个空格连接为说明

use crate::models::{NormalizedRecommendation, Recommendation};

const DELIMITER: char = ':';
const TITLE_WORDS: usize = 3;

/// 规范化一组原始建议，保持顺序
///
/// 纯空白的条目没有可用的标题，会被跳过。
pub fn normalize<S: AsRef<str>>(raw: &[S]) -> Vec<NormalizedRecommendation> {
    raw.iter()
        .filter_map(|text| normalize_one(text.as_ref()))
        .collect()
}

/// 规范化已经带标签的建议列表
pub fn normalize_all(recommendations: Vec<Recommendation>) -> Vec<NormalizedRecommendation> {
    recommendations
        .into_iter()
        .filter_map(Recommendation::into_normalized)
        .collect()
}

/// 规范化单条建议
pub fn normalize_one(text: &str) -> Option<NormalizedRecommendation> {
    if text.trim().is_empty() {
        return None;
    }

    if let Some((left, right)) = text.split_once(DELIMITER) {
        let title = left.trim();
        let description = right.trim();

        if !title.is_empty() && !description.is_empty() {
            return Some(NormalizedRecommendation::new(title, description));
        }
        // ": xxx" 或 "xxx:" 这类残缺写法，退回按词拆分非空的那一侧
        let rest = if title.is_empty() { description } else { title };
        return split_by_words(rest);
    }

    split_by_words(text)
}

fn split_by_words(text: &str) -> Option<NormalizedRecommendation> {
    let words: Vec<&str> = text.split_whitespace().collect();
    if words.is_empty() {
        return None;
    }
    let split_at = words.len().min(TITLE_WORDS);
    Some(NormalizedRecommendation::new(
        words[..split_at].join(" "),
        words[split_at..].join(" "),
    ))
}
