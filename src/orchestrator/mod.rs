//! 编排层（Orchestration Layer）
//!
//! ## 职责
//!
//! 本层持有会话状态，负责状态转换和批量调度。
//!
//! ## 模块划分
//!
//! ### `analysis_orchestrator` - 单个分析会话
//! - 状态机：Idle / Analyzing / Complete / Failed
//! - 保证同一时间最多一个评分调用
//! - 取消、重置、详细视图切换
//! - 发布通知（broadcast）
//! - 导出报告（失败不影响状态）
//!
//! ### `batch_processor` - 批量分析
//! - 读取清单中的多条提交
//! - 每条提交使用独立的编排器，会话之间不共享状态
//! - 使用 Semaphore 限制并发数量
//! - 输出全局统计信息
//!
//! ### `views` - 结果视图
//! - `SummaryView` / `DetailedView`
//!
//! ## 层次关系
//!
//! ```text
//! batch_processor (处理 Vec<SubmissionEntry>)
//!     ↓
//! analysis_orchestrator (处理单个会话)
//!     ↓
//! workflow::AnalysisFlow (处理一次评分)
//!     ↓
//! services (能力层：submission / scoring / normalizer / report)
//! ```

pub mod analysis_orchestrator;
pub mod batch_processor;
pub mod views;

// 重新导出主要类型
pub use analysis_orchestrator::AnalysisOrchestrator;
pub use batch_processor::{process_manifest, BatchStats};
pub use views::{DetailedView, SummaryView};
