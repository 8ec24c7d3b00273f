//! 分析编排器 - 编排层
//!
//! ## 状态机
//!
//! ```text
//! Idle ──submit──▶ Analyzing ──成功──▶ Complete ──reset──▶ Idle
//!                      │
//!                      ├──失败──▶ Failed ──(自动)──▶ Idle
//!                      └──cancel──▶ Idle
//! ```
//!
//! - 每个编排器同一时间最多一个评分调用；`Analyzing` 时的提交直接拒绝（`Busy`）
//! - 失败或取消不会覆盖上一次成功的结果
//! - `detailed_view` 只在 `Complete` 时可切换，切换会发出通知
//! - 导出失败只记录日志和通知，状态保持 `Complete`
//! - 每次状态变化都发布到 `subscribe_states`，`Failed` 只能从这里观察到

use std::path::PathBuf;
use std::sync::{Arc, Mutex, MutexGuard};
use tokio::sync::broadcast;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::error::{AnalysisError, ExportError};
use crate::models::{AnalysisRequest, AnalysisState, Notification};
use crate::orchestrator::views::{DetailedView, SummaryView};
use crate::services::{ReportExporter, ReportWriter, ScoringBackend, SubmissionCollector, SubmissionForm};
use crate::workflow::{AnalysisFlow, AnalysisResult, SessionCtx};

const NOTIFICATION_CAPACITY: usize = 32;
const TRANSITION_CAPACITY: usize = 32;

struct Inner {
    state: AnalysisState,
    detailed_view: bool,
    result: Option<AnalysisResult>,
    last_error: Option<String>,
    cancel: Option<CancellationToken>,
    sessions: u64,
}

/// 分析编排器
///
/// 职责：
/// - 持有会话状态（请求、分数、建议）
/// - 驱动评分调用并应用状态转换
/// - 向订阅者发布瞬时通知
pub struct AnalysisOrchestrator {
    flow: AnalysisFlow,
    inner: Mutex<Inner>,
    notifications: broadcast::Sender<Notification>,
    transitions: broadcast::Sender<AnalysisState>,
}

/// `Analyzing` 期间的守卫
///
/// 提交的 future 被中途丢弃时，把状态还原为 Idle，避免卡在 Analyzing。
struct AnalyzingGuard<'a> {
    inner: &'a Mutex<Inner>,
    transitions: &'a broadcast::Sender<AnalysisState>,
    armed: bool,
}

impl AnalyzingGuard<'_> {
    fn disarm(&mut self) {
        self.armed = false;
    }
}

impl Drop for AnalyzingGuard<'_> {
    fn drop(&mut self) {
        if self.armed {
            let mut inner = lock(self.inner);
            if inner.state == AnalysisState::Analyzing {
                warn!("分析在完成前被放弃，状态回到 Idle");
                set_state(&mut inner, self.transitions, AnalysisState::Idle);
                inner.cancel = None;
            }
        }
    }
}

fn lock(inner: &Mutex<Inner>) -> MutexGuard<'_, Inner> {
    inner.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
}

/// 修改状态并发布；状态未变化时不发布
fn set_state(
    inner: &mut Inner,
    transitions: &broadcast::Sender<AnalysisState>,
    state: AnalysisState,
) {
    if inner.state == state {
        return;
    }
    inner.state = state;
    // 没有订阅者时发送失败，属于正常情况
    let _ = transitions.send(state);
}

impl AnalysisOrchestrator {
    pub fn new(backend: Arc<dyn ScoringBackend>) -> Self {
        let (notifications, _) = broadcast::channel(NOTIFICATION_CAPACITY);
        let (transitions, _) = broadcast::channel(TRANSITION_CAPACITY);
        Self {
            flow: AnalysisFlow::new(backend),
            inner: Mutex::new(Inner {
                state: AnalysisState::Idle,
                detailed_view: false,
                result: None,
                last_error: None,
                cancel: None,
                sessions: 0,
            }),
            notifications,
            transitions,
        }
    }

    /// 订阅通知
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.notifications.subscribe()
    }

    /// 订阅状态变化（包括短暂的 `Failed`）
    pub fn subscribe_states(&self) -> broadcast::Receiver<AnalysisState> {
        self.transitions.subscribe()
    }

    pub fn state(&self) -> AnalysisState {
        lock(&self.inner).state
    }

    pub fn is_detailed_view(&self) -> bool {
        let inner = lock(&self.inner);
        inner.state == AnalysisState::Complete && inner.detailed_view
    }

    /// 最近一次成功的结果（失败和取消不会覆盖它）
    pub fn result(&self) -> Option<AnalysisResult> {
        lock(&self.inner).result.clone()
    }

    /// 最近一次失败的原因，下一次提交时清空
    pub fn last_error(&self) -> Option<String> {
        lock(&self.inner).last_error.clone()
    }

    /// 校验表单后开始分析
    ///
    /// 校验失败时直接返回，不改变状态，也不会调用评分后端。
    pub async fn submit_form(&self, form: &SubmissionForm) -> Result<AnalysisResult, AnalysisError> {
        let request = SubmissionCollector::collect(form).map_err(|e| {
            debug!("提交被拒绝: {}", e);
            e
        })?;
        self.submit(request).await
    }

    /// 开始分析
    ///
    /// 允许从 Idle 或 Complete 开始；Analyzing 时返回 `Busy`。
    pub async fn submit(&self, request: AnalysisRequest) -> Result<AnalysisResult, AnalysisError> {
        let (ctx, token) = {
            let mut inner = lock(&self.inner);
            if inner.state == AnalysisState::Analyzing {
                warn!("已有分析正在进行，拒绝新的提交");
                return Err(AnalysisError::Busy);
            }
            set_state(&mut inner, &self.transitions, AnalysisState::Analyzing);
            inner.detailed_view = false;
            inner.last_error = None;
            inner.sessions += 1;
            let token = CancellationToken::new();
            inner.cancel = Some(token.clone());
            (SessionCtx::new(inner.sessions, &request), token)
        };

        let mut guard = AnalyzingGuard {
            inner: &self.inner,
            transitions: &self.transitions,
            armed: true,
        };

        let outcome = tokio::select! {
            result = self.flow.run(&request, &ctx) => Some(result),
            _ = token.cancelled() => None,
        };

        let mut inner = lock(&self.inner);
        inner.cancel = None;
        guard.disarm();

        match outcome {
            Some(Ok(result)) => {
                set_state(&mut inner, &self.transitions, AnalysisState::Complete);
                inner.result = Some(result.clone());
                drop(inner);

                self.notify(Notification::success(
                    "分析完成",
                    format!(
                        "总分 {} / 100，共 {} 条建议",
                        result.scores.final_score(),
                        result.recommendations.len()
                    ),
                ));
                Ok(result)
            }
            Some(Err(e)) => {
                error!("{} ❌ 分析失败: {}", ctx, e);
                set_state(&mut inner, &self.transitions, AnalysisState::Failed);
                inner.last_error = Some(e.to_string());
                set_state(&mut inner, &self.transitions, AnalysisState::Idle);
                drop(inner);

                self.notify(Notification::error("分析失败", e.to_string()));
                Err(AnalysisError::Scoring(e))
            }
            None => {
                set_state(&mut inner, &self.transitions, AnalysisState::Idle);
                drop(inner);

                info!("{} 分析已取消", ctx);
                self.notify(Notification::info("分析已取消", "可以重新提交"));
                Err(AnalysisError::Cancelled)
            }
        }
    }

    /// 取消进行中的分析；没有进行中的分析时返回 false
    pub fn cancel(&self) -> bool {
        let inner = lock(&self.inner);
        match (&inner.state, &inner.cancel) {
            (AnalysisState::Analyzing, Some(token)) => {
                token.cancel();
                true
            }
            _ => false,
        }
    }

    /// 切换详细视图；不在 Complete 时返回 None
    pub fn toggle_detailed_view(&self) -> Option<bool> {
        let visible = {
            let mut inner = lock(&self.inner);
            if inner.state != AnalysisState::Complete {
                debug!("当前状态 {} 不支持切换详细视图", inner.state);
                return None;
            }
            inner.detailed_view = !inner.detailed_view;
            inner.detailed_view
        };

        let message = if visible {
            "已显示详细分析"
        } else {
            "已隐藏详细分析"
        };
        self.notify(Notification::info("详细视图", message));
        Some(visible)
    }

    /// 清空结果回到 Idle；Analyzing 时返回 false（请使用 `cancel`）
    pub fn reset(&self) -> bool {
        let mut inner = lock(&self.inner);
        if inner.state == AnalysisState::Analyzing {
            return false;
        }
        set_state(&mut inner, &self.transitions, AnalysisState::Idle);
        inner.detailed_view = false;
        inner.result = None;
        inner.last_error = None;
        true
    }

    /// 摘要视图，仅在 Complete 时可用
    pub fn summary(&self) -> Option<SummaryView> {
        let inner = lock(&self.inner);
        if inner.state != AnalysisState::Complete {
            return None;
        }
        inner.result.as_ref().map(SummaryView::from_result)
    }

    /// 详细视图，仅在 Complete 且打开详细视图时可用
    pub fn detailed(&self) -> Option<DetailedView> {
        let inner = lock(&self.inner);
        if inner.state != AnalysisState::Complete || !inner.detailed_view {
            return None;
        }
        inner.result.as_ref().map(DetailedView::from_result)
    }

    /// 导出当前结果
    ///
    /// 失败时记录日志并发出通知，返回 None；无论成败都不改变状态。
    pub async fn export_report(
        &self,
        exporter: &dyn ReportExporter,
        writer: &ReportWriter,
    ) -> Option<PathBuf> {
        match self.try_export(exporter, writer).await {
            Ok(path) => {
                self.notify(Notification::success(
                    "报告已下载",
                    path.display().to_string(),
                ));
                Some(path)
            }
            Err(e) => {
                error!("❌ 导出报告失败: {}", e);
                self.notify(Notification::error("导出失败", e.to_string()));
                None
            }
        }
    }

    async fn try_export(
        &self,
        exporter: &dyn ReportExporter,
        writer: &ReportWriter,
    ) -> Result<PathBuf, ExportError> {
        let result = {
            let inner = lock(&self.inner);
            match (&inner.state, &inner.result) {
                (AnalysisState::Complete, Some(result)) => result.clone(),
                _ => return Err(ExportError::NothingToExport),
            }
        };

        let bytes = exporter
            .export(&result.scores, result.request.content_source())
            .await?;
        writer.save(&bytes).await
    }

    fn notify(&self, notification: Notification) {
        debug!("通知: {}", notification);
        // 没有订阅者时发送失败，属于正常情况
        let _ = self.notifications.send(notification);
    }
}
