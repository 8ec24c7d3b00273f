//! # AEO Analyzer
//!
//! 对网页或文本做 AEO（Answer Engine Optimization）评分，给出改进建议并导出报告
//!
//! ## 架构设计
//!
//! 本系统采用四层架构：
//!
//! ### ① 基础设施层（Infrastructure）
//! - `infrastructure/` - 只暴露能力，不含业务
//! - `KvStore` - 键值存储（文件 / 内存）
//!
//! ### ② 业务能力层（Services）
//! - `services/` - 描述"我能做什么"
//! - `SubmissionCollector` - 校验输入，构造分析请求
//! - `ScoringBackend` - 评分能力（stub / http / llm）
//! - `normalizer` - 建议规范化
//! - `PdfReportExporter` / `ReportWriter` - 报告导出
//! - `PromptStore` - 提示词存储
//!
//! ### ③ 流程层（Workflow）
//! - `workflow/` - 定义"一次分析"的完整流程
//! - `SessionCtx` - 上下文封装（会话编号 + 内容预览）
//! - `AnalysisFlow` - 评分 → 计算总分 → 规范化建议
//!
//! ### ④ 编排层（Orchestration）
//! - `orchestrator/analysis_orchestrator` - 会话状态机
//! - `orchestrator/batch_processor` - 批量分析，管理并发
//!
//! 对外入口：`app`（CLI 命令）和 `api`（评分服务）。

pub mod api;
pub mod app;
pub mod config;
pub mod error;
pub mod infrastructure;
pub mod models;
pub mod orchestrator;
pub mod services;
pub mod utils;
pub mod workflow;

// 重新导出常用类型
pub use config::Config;
pub use error::{AnalysisError, AppError, AppResult};
pub use models::{AnalysisRequest, AnalysisState, ContentType, Notification};
pub use orchestrator::{AnalysisOrchestrator, DetailedView, SummaryView};
pub use services::{build_backend, ScoringBackend, SubmissionCollector, SubmissionForm};
pub use workflow::{AnalysisFlow, AnalysisResult};
