pub mod loaders;
pub mod manifest;
pub mod prompt;
pub mod recommendation;
pub mod request;
pub mod scores;
pub mod state;

pub use loaders::load_manifest;
pub use manifest::{SubmissionEntry, SubmissionManifest};
pub use prompt::{PromptDraft, PromptPatch, SavedPrompt};
pub use recommendation::{NormalizedRecommendation, Recommendation};
pub use request::{AnalysisRequest, ContentType, SubmissionMode};
pub use scores::{final_score_of, AnalysisScores, Rating, SubScores};
pub use state::{AnalysisState, Notification, NotificationLevel};
