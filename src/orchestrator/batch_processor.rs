//! 批量分析处理器 - 编排层
//!
//! ## 职责
//!
//! 1. **清单转换**：把 `SubmissionEntry` 转成表单，非法条目计为失败
//! 2. **并发控制**：使用 Semaphore 限制同时进行的会话数量
//! 3. **会话隔离**：每条提交一个 `AnalysisOrchestrator`
//! 4. **结果日志**：每条结果写一行到批量日志文件
//! 5. **全局统计**：成功 / 失败 / 平均总分

use anyhow::{Context, Result};
use futures::future::join_all;
use std::str::FromStr;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tracing::{error, info, warn};

use crate::config::Config;
use crate::error::ValidationError;
use crate::models::{ContentType, SubmissionEntry, SubmissionManifest};
use crate::orchestrator::AnalysisOrchestrator;
use crate::services::{PdfReportExporter, ReportWriter, ScoringBackend, SubmissionForm};
use crate::utils::logging::{append_log_line, init_log_file, print_final_stats, truncate_text};

/// 批量分析统计
#[derive(Debug, Default, Clone, PartialEq)]
pub struct BatchStats {
    pub success: usize,
    pub failed: usize,
    pub total: usize,
    /// 成功条目的总分
    pub scores: Vec<u8>,
}

impl BatchStats {
    /// 成功条目的平均总分
    pub fn mean_score(&self) -> Option<f64> {
        if self.scores.is_empty() {
            return None;
        }
        let sum: u32 = self.scores.iter().map(|&s| s as u32).sum();
        Some(sum as f64 / self.scores.len() as f64)
    }
}

/// 单条结果
enum EntryOutcome {
    Success(u8),
    Failed,
}

/// 清单条目 → 表单
///
/// 同时给出 `url` 和 `text` 时以 `url` 为准；两者都没有时按空 URL 处理。
fn entry_to_form(entry: &SubmissionEntry) -> Result<SubmissionForm, ValidationError> {
    let content_type = ContentType::from_str(&entry.content_type)?;
    let form = match (&entry.url, &entry.text) {
        (Some(url), _) if !url.trim().is_empty() => SubmissionForm::url(url.clone(), content_type),
        (_, Some(text)) => SubmissionForm::text(text.clone(), content_type),
        (url, None) => SubmissionForm::url(url.clone().unwrap_or_default(), content_type),
    };
    Ok(form)
}

fn entry_label(index: usize, entry: &SubmissionEntry) -> String {
    match (&entry.label, &entry.url, &entry.text) {
        (Some(label), _, _) => label.clone(),
        (None, Some(url), _) => url.clone(),
        (None, None, Some(text)) => truncate_text(text, 30),
        _ => format!("条目 {}", index),
    }
}

/// 处理清单中的全部提交
///
/// # 参数
/// - `manifest`: 批量提交清单
/// - `backend`: 启动时选定的评分后端，所有会话共用
/// - `config`: 并发数、日志文件和报告目录
/// - `export`: 是否为每条成功结果导出报告
pub async fn process_manifest(
    manifest: &SubmissionManifest,
    backend: Arc<dyn ScoringBackend>,
    config: &Config,
    export: bool,
) -> Result<BatchStats> {
    let total = manifest.submissions.len();
    let mut stats = BatchStats {
        total,
        ..Default::default()
    };

    if total == 0 {
        warn!("⚠️ 清单中没有任何提交，程序结束");
        return Ok(stats);
    }

    init_log_file(&config.batch_log_file, "AEO 批量分析日志")
        .with_context(|| format!("无法创建批量日志文件: {}", config.batch_log_file))?;

    info!(
        "✓ 找到 {} 条待分析的提交，最大并发数 {}",
        total, config.max_concurrent_analyses
    );

    let semaphore = Arc::new(Semaphore::new(config.max_concurrent_analyses));
    let writer = ReportWriter::new(&config.report_output_dir, &config.report_file_name);
    let exporter = PdfReportExporter::new();

    let tasks = manifest
        .submissions
        .iter()
        .enumerate()
        .map(|(idx, entry)| {
            let index = idx + 1;
            let semaphore = semaphore.clone();
            let backend = backend.clone();
            let writer = &writer;
            let exporter = &exporter;

            async move {
                let label = entry_label(index, entry);
                let form = match entry_to_form(entry) {
                    Ok(form) => form,
                    Err(e) => {
                        warn!("[条目 {}] ⚠️ 跳过非法条目 ({}): {}", index, label, e);
                        return (index, label, EntryOutcome::Failed, format!("非法条目: {}", e));
                    }
                };

                let _permit = match semaphore.acquire().await {
                    Ok(permit) => permit,
                    Err(e) => {
                        error!("[条目 {}] ❌ 无法获取并发许可: {}", index, e);
                        return (index, label, EntryOutcome::Failed, e.to_string());
                    }
                };

                let orchestrator = AnalysisOrchestrator::new(backend);
                match orchestrator.submit_form(&form).await {
                    Ok(result) => {
                        let score = result.scores.final_score();
                        let mut detail =
                            format!("总分 {} ({})", score, result.scores.rating().label());
                        if export {
                            let writer =
                                writer.with_file_name(format!("{:03}-{}", index, config.report_file_name));
                            match orchestrator.export_report(exporter, &writer).await {
                                Some(path) => detail.push_str(&format!(" | 报告 {}", path.display())),
                                None => detail.push_str(" | 报告导出失败"),
                            }
                        }
                        (index, label, EntryOutcome::Success(score), detail)
                    }
                    Err(e) => {
                        error!("[条目 {}] ❌ 分析失败 ({}): {}", index, label, e);
                        (index, label, EntryOutcome::Failed, e.to_string())
                    }
                }
            }
        });

    let results = join_all(tasks).await;

    for (index, label, outcome, detail) in results {
        let status = match outcome {
            EntryOutcome::Success(score) => {
                stats.success += 1;
                stats.scores.push(score);
                "✅"
            }
            EntryOutcome::Failed => {
                stats.failed += 1;
                "❌"
            }
        };
        let line = format!("[{:03}] {} {} | {}", index, status, label, detail);
        if let Err(e) = append_log_line(&config.batch_log_file, &line) {
            warn!("⚠️ 写入批量日志失败: {}", e);
        }
    }

    let mean = stats.mean_score();
    if let Some(mean) = mean {
        let summary = format!(
            "\n成功 {}/{} | 失败 {} | 平均总分 {:.1}",
            stats.success, stats.total, stats.failed, mean
        );
        if let Err(e) = append_log_line(&config.batch_log_file, &summary) {
            warn!("⚠️ 写入批量日志失败: {}", e);
        }
    }

    print_final_stats(
        stats.success,
        stats.failed,
        stats.total,
        mean,
        &config.batch_log_file,
    );

    Ok(stats)
}
