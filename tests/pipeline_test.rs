use aeo_analyzer::error::{AnalysisError, ScoringError};
use aeo_analyzer::infrastructure::FileKvStore;
use aeo_analyzer::models::{
    final_score_of, AnalysisState, ContentType, NotificationLevel, PromptDraft, SubScores,
};
use aeo_analyzer::services::{
    PdfReportExporter, PromptStore, ReportWriter, ScoreRequest, ScoreResponse, ScoringBackend,
    SubmissionForm,
};
use aeo_analyzer::AnalysisOrchestrator;
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use tokio_test::{assert_err, assert_ok};

/// 记录调用次数和最后一次请求的后端
struct RecordingBackend {
    calls: AtomicUsize,
    last_request: Mutex<Option<ScoreRequest>>,
    fail_after: usize,
}

impl RecordingBackend {
    fn new(fail_after: usize) -> Arc<Self> {
        Arc::new(Self {
            calls: AtomicUsize::new(0),
            last_request: Mutex::new(None),
            fail_after,
        })
    }
}

#[async_trait]
impl ScoringBackend for RecordingBackend {
    async fn score(&self, request: &ScoreRequest) -> Result<ScoreResponse, ScoringError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        *self.last_request.lock().unwrap() = Some(request.clone());
        if call >= self.fail_after {
            return Err(ScoringError::BadStatus {
                status: 500,
                message: "Failed to analyze content".to_string(),
            });
        }
        Ok(ScoreResponse::new(
            SubScores::new(80, 75, 90, 70),
            vec![
                "Improve snippet optimization: include clear answers".to_string(),
                "Enhance structured data signals clearly".to_string(),
                "   ".to_string(),
            ],
        ))
    }

    fn name(&self) -> &str {
        "recording"
    }
}

#[tokio::test]
async fn test_text_submission_end_to_end() {
    let backend = RecordingBackend::new(usize::MAX);
    let orchestrator = AnalysisOrchestrator::new(backend.clone());
    let text = "a".repeat(150);

    let result = assert_ok!(
        orchestrator
            .submit_form(&SubmissionForm::text(text.clone(), ContentType::LandingPage))
            .await
    );

    let sent = backend.last_request.lock().unwrap().clone().unwrap();
    assert_eq!(sent.content, text);
    assert_eq!(sent.content_type, "landing-page");

    assert_eq!(result.scores.final_score(), 78);
    assert_eq!(result.request.content_source(), format!("{}...", "a".repeat(100)));

    let titles: Vec<_> = result
        .recommendations
        .iter()
        .map(|r| (r.title.as_str(), r.description.as_str()))
        .collect();
    assert_eq!(
        titles,
        vec![
            ("Improve snippet optimization", "include clear answers"),
            ("Enhance structured data", "signals clearly"),
        ]
    );

    let summary = orchestrator.summary().unwrap();
    assert_eq!(summary.top_recommendations.len(), 2);
    assert_eq!(summary.rating.label(), "Good");
}

#[tokio::test]
async fn test_failed_rescore_keeps_previous_result() {
    let backend = RecordingBackend::new(1);
    let orchestrator = AnalysisOrchestrator::new(backend.clone());
    let form = SubmissionForm::url("https://example.com/pricing", ContentType::Product);

    let first = assert_ok!(orchestrator.submit_form(&form).await);
    let mut rx = orchestrator.subscribe();

    let err = assert_err!(orchestrator.submit_form(&form).await);
    assert!(matches!(err, AnalysisError::Scoring(ScoringError::BadStatus { status: 500, .. })));
    assert_eq!(orchestrator.state(), AnalysisState::Idle);
    assert_eq!(orchestrator.result(), Some(first));

    let note = rx.recv().await.unwrap();
    assert_eq!(note.level, NotificationLevel::Error);
    assert!(note.message.contains("Failed to analyze content"));
}

#[tokio::test]
async fn test_invalid_submission_never_reaches_backend() {
    let backend = RecordingBackend::new(usize::MAX);
    let orchestrator = AnalysisOrchestrator::new(backend.clone());

    // URL 模式下只看 URL 输入框
    let form = SubmissionForm {
        text: "plenty of text here".to_string(),
        ..SubmissionForm::url("", ContentType::Blog)
    };
    assert_err!(orchestrator.submit_form(&form).await);
    assert_eq!(backend.calls.load(Ordering::SeqCst), 0);
    assert_eq!(orchestrator.state(), AnalysisState::Idle);
}

#[tokio::test]
async fn test_export_after_completion_writes_pdf() {
    let dir = tempfile::tempdir().unwrap();
    let orchestrator = AnalysisOrchestrator::new(RecordingBackend::new(usize::MAX));
    assert_ok!(
        orchestrator
            .submit_form(&SubmissionForm::url("https://example.com/docs", ContentType::Article))
            .await
    );
    let mut rx = orchestrator.subscribe();

    let writer = ReportWriter::new(dir.path(), "aeo-analysis-report.pdf");
    let path = orchestrator
        .export_report(&PdfReportExporter::new(), &writer)
        .await
        .unwrap();

    let bytes = std::fs::read(&path).unwrap();
    assert!(bytes.starts_with(b"%PDF"));
    assert_eq!(rx.recv().await.unwrap().level, NotificationLevel::Success);
    assert_eq!(orchestrator.state(), AnalysisState::Complete);
}

#[test]
fn test_final_score_is_floor_of_mean() {
    for (tuple, expected) in [
        ((0, 0, 0, 0), 0),
        ((100, 100, 100, 100), 100),
        ((80, 75, 90, 70), 78),
        ((99, 100, 100, 100), 99),
        ((1, 0, 0, 0), 0),
    ] {
        let scores = SubScores::new(tuple.0, tuple.1, tuple.2, tuple.3);
        assert_eq!(final_score_of(&scores), expected, "{tuple:?}");
    }
}

#[test]
fn test_prompt_store_survives_reopen() {
    let dir = tempfile::tempdir().unwrap();

    let saved = PromptStore::new(FileKvStore::new(dir.path())).save(PromptDraft {
        name: "product intro".to_string(),
        original_prompt: "describe the product".to_string(),
        optimized_prompt: "describe the product in two sentences".to_string(),
        score: None,
    });

    let reopened = PromptStore::new(FileKvStore::new(dir.path()));
    assert_eq!(reopened.list(), vec![saved.clone()]);
    assert!(reopened.delete(&saved.id));
    assert!(reopened.list().is_empty());
}
