//! 应用入口
//!
//! 持有配置和启动时选定的评分后端，把 CLI 命令分派到各层。

use anyhow::{bail, Context, Result};
use std::convert::Infallible;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::broadcast;
use tracing::{info, warn};

use crate::api::{self, AppState};
use crate::config::{BackendKind, Config};
use crate::error::{AppError, AppResult};
use crate::infrastructure::FileKvStore;
use crate::models::{load_manifest, ContentType, Notification, PromptDraft, PromptPatch};
use crate::orchestrator::{process_manifest, AnalysisOrchestrator, BatchStats};
use crate::services::{
    build_backend, PdfReportExporter, PromptStore, ReportWriter, ScoringBackend, SubmissionForm,
};
use crate::utils::logging::log_startup;

/// 单次分析的输入
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    pub url: Option<String>,
    pub text: Option<String>,
    pub file: Option<PathBuf>,
    pub content_type: ContentType,
    pub detailed: bool,
    pub export: bool,
}

/// 应用主结构
pub struct App {
    config: Config,
    backend: Arc<dyn ScoringBackend>,
}

impl App {
    /// 初始化应用：按配置选定评分后端
    pub fn initialize(config: Config) -> AppResult<Self> {
        let backend = build_backend(&config)?;
        Ok(Self { config, backend })
    }

    /// 使用指定后端（测试用）
    pub fn with_backend(config: Config, backend: Arc<dyn ScoringBackend>) -> Self {
        Self { config, backend }
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// 分析单条内容，打印摘要（可选详细视图、导出报告）
    pub async fn analyze(&self, options: AnalyzeOptions) -> Result<()> {
        log_startup("单条分析", self.backend.name());

        let form = self.build_form(&options).await?;
        let orchestrator = AnalysisOrchestrator::new(self.backend.clone());
        let mut notifications = orchestrator.subscribe();

        // Ctrl+C 只取消分析，提交本身仍然返回 Cancelled
        let watch_ctrl_c = async {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("收到 Ctrl+C，正在取消分析");
                orchestrator.cancel();
            }
            std::future::pending::<Infallible>().await
        };
        let outcome = tokio::select! {
            outcome = orchestrator.submit_form(&form) => outcome,
            never = watch_ctrl_c => match never {},
        };
        drain_notifications(&mut notifications);

        if let Err(e) = outcome {
            return Err(AppError::from(e)).context("分析未完成");
        }

        if let Some(summary) = orchestrator.summary() {
            println!("{}", summary);
        }

        if options.detailed {
            orchestrator.toggle_detailed_view();
            if let Some(detailed) = orchestrator.detailed() {
                println!("{}", detailed);
            }
        }

        if options.export {
            let writer =
                ReportWriter::new(&self.config.report_output_dir, &self.config.report_file_name);
            orchestrator
                .export_report(&PdfReportExporter::new(), &writer)
                .await;
        }
        drain_notifications(&mut notifications);

        Ok(())
    }

    /// 批量分析清单中的全部提交
    pub async fn batch(&self, manifest_path: &Path, export: bool) -> Result<BatchStats> {
        log_startup("批量分析", self.backend.name());

        let manifest = load_manifest(manifest_path).await?;
        process_manifest(&manifest, self.backend.clone(), &self.config, export).await
    }

    /// 启动评分服务
    ///
    /// HTTP 后端会把请求转发给自己，拒绝启动。
    pub async fn serve(&self, bind: Option<&str>) -> Result<()> {
        if self.config.effective_backend() == BackendKind::Http {
            bail!("评分服务不能使用 http 后端，请改用 stub 或 llm");
        }
        log_startup("评分服务", self.backend.name());

        let bind = bind.unwrap_or(self.config.server_bind.as_str());
        api::serve(bind, AppState::new(self.backend.clone())).await
    }

    /// 提示词存储
    pub fn prompt_store(&self) -> PromptStore<FileKvStore> {
        PromptStore::with_key(
            FileKvStore::new(&self.config.store_dir),
            &self.config.prompt_store_key,
        )
    }

    pub fn prompts_list(&self) {
        let prompts = self.prompt_store().list();
        if prompts.is_empty() {
            println!("还没有保存任何提示词");
            return;
        }
        for prompt in prompts {
            let score = prompt
                .score
                .map(|s| format!("{:.1}", s))
                .unwrap_or_else(|| "-".to_string());
            println!(
                "{}  {}  (score: {})\n  原始: {}\n  优化: {}",
                prompt.id, prompt.name, score, prompt.original_prompt, prompt.optimized_prompt
            );
        }
    }

    pub fn prompts_save(&self, draft: PromptDraft) {
        let saved = self.prompt_store().save(draft);
        println!("已保存提示词: {} ({})", saved.name, saved.id);
    }

    pub fn prompts_update(&self, id: &str, patch: PromptPatch) -> AppResult<()> {
        if patch.is_empty() {
            return Err(AppError::Other("没有需要更新的字段".to_string()));
        }
        if !self.prompt_store().update(id, patch) {
            return Err(AppError::Other(format!("未找到提示词或写入失败: {}", id)));
        }
        println!("已更新提示词: {}", id);
        Ok(())
    }

    pub fn prompts_delete(&self, id: &str) -> AppResult<()> {
        if !self.prompt_store().delete(id) {
            return Err(AppError::Other(format!("未找到提示词或写入失败: {}", id)));
        }
        println!("已删除提示词: {}", id);
        Ok(())
    }

    async fn build_form(&self, options: &AnalyzeOptions) -> Result<SubmissionForm> {
        let form = match (&options.url, &options.text, &options.file) {
            (Some(url), _, _) => SubmissionForm::url(url.clone(), options.content_type),
            (None, Some(text), _) => SubmissionForm::text(text.clone(), options.content_type),
            (None, None, Some(path)) => {
                let text = tokio::fs::read_to_string(path)
                    .await
                    .with_context(|| format!("无法读取内容文件: {}", path.display()))?;
                SubmissionForm::text(text, options.content_type)
            }
            (None, None, None) => bail!("请通过 --url、--text 或 --file 提供要分析的内容"),
        };
        Ok(form)
    }
}

fn drain_notifications(rx: &mut broadcast::Receiver<Notification>) {
    loop {
        match rx.try_recv() {
            Ok(notification) => info!("🔔 {}", notification),
            Err(broadcast::error::TryRecvError::Lagged(n)) => {
                warn!("⚠️ 丢失了 {} 条通知", n);
            }
            Err(_) => break,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{AnalysisError, ConfigError};
    use crate::services::StubScoringBackend;

    fn app(dir: &Path) -> App {
        let config = Config {
            store_dir: dir.join("store").display().to_string(),
            report_output_dir: dir.join("reports").display().to_string(),
            ..Config::default()
        };
        App::with_backend(config, Arc::new(StubScoringBackend::default()))
    }

    #[tokio::test]
    async fn test_analyze_with_export_writes_report() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        app.analyze(AnalyzeOptions {
            url: Some("https://example.com/guide".to_string()),
            detailed: true,
            export: true,
            ..Default::default()
        })
        .await
        .unwrap();

        assert!(dir
            .path()
            .join("reports")
            .join("aeo-analysis-report.pdf")
            .exists());
    }

    #[tokio::test]
    async fn test_analyze_reads_content_file() {
        let dir = tempfile::tempdir().unwrap();
        let file = dir.path().join("post.md");
        std::fs::write(&file, "# FAQ\nWhat is answer engine optimization?").unwrap();

        let result = app(dir.path())
            .analyze(AnalyzeOptions {
                file: Some(file),
                content_type: ContentType::Faq,
                ..Default::default()
            })
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_analyze_without_input_fails() {
        let dir = tempfile::tempdir().unwrap();
        assert!(app(dir.path())
            .analyze(AnalyzeOptions::default())
            .await
            .is_err());
    }

    #[tokio::test]
    async fn test_serve_refuses_http_backend() {
        let config = Config {
            use_stub_backend: false,
            scoring_backend: BackendKind::Http,
            ..Config::default()
        };
        let app = App::with_backend(config, Arc::new(StubScoringBackend::default()));
        assert!(app.serve(Some("127.0.0.1:0")).await.is_err());
    }

    #[test]
    fn test_prompt_commands_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let app = app(dir.path());

        app.prompts_save(PromptDraft {
            name: "faq intro".to_string(),
            original_prompt: "write faq".to_string(),
            optimized_prompt: "write a concise faq".to_string(),
            score: Some(81.0),
        });
        let saved = app.prompt_store().list();
        assert_eq!(saved.len(), 1);

        let patch = PromptPatch {
            name: Some("faq opener".to_string()),
            ..Default::default()
        };
        app.prompts_update(&saved[0].id, patch).unwrap();
        assert_eq!(app.prompt_store().list()[0].name, "faq opener");

        assert!(matches!(
            app.prompts_update(&saved[0].id, PromptPatch::default()),
            Err(AppError::Other(_))
        ));
        app.prompts_delete(&saved[0].id).unwrap();
        assert!(app.prompt_store().list().is_empty());
        assert!(matches!(
            app.prompts_delete(&saved[0].id),
            Err(AppError::Other(_))
        ));
    }

    #[test]
    fn test_initialize_rejects_invalid_stub_range() {
        let config = Config {
            stub_score_min: 95,
            stub_score_max: 80,
            ..Config::default()
        };
        assert!(matches!(
            App::initialize(config),
            Err(AppError::Config(ConfigError::Invalid { .. }))
        ));
        assert!(App::initialize(Config::default()).is_ok());
    }

    #[tokio::test]
    async fn test_analyze_failure_keeps_analysis_error() {
        let dir = tempfile::tempdir().unwrap();
        let err = app(dir.path())
            .analyze(AnalyzeOptions {
                text: Some("   ".to_string()),
                ..Default::default()
            })
            .await
            .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<AppError>(),
            Some(AppError::Analysis(AnalysisError::Validation(_)))
        ));
    }
}
