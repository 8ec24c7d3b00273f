pub mod normalizer;
pub mod prompt_store;
pub mod report;
pub mod scoring;
pub mod submission;

pub use normalizer::normalize;
pub use prompt_store::PromptStore;
pub use report::{PdfReportExporter, ReportExporter, ReportWriter};
pub use scoring::{
    build_backend, HttpScoringBackend, LlmScoringBackend, ScoreRequest, ScoreResponse,
    ScoringBackend, StubScoringBackend,
};
pub use submission::{SubmissionCollector, SubmissionForm};
