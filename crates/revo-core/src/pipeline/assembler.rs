//! Payload and preview assembly

use crate::types::{AnalysisPayload, FileSample, RepoMetadata, RepositoryIdentifier};

/// Aggregate one run's results into the payload handed to the LLM proxy
pub fn assemble(
    repo: &RepositoryIdentifier,
    metadata: RepoMetadata,
    samples: Vec<FileSample>,
) -> AnalysisPayload {
    AnalysisPayload {
        repo: repo.full_name(),
        metadata,
        files_analyzed: samples.len(),
        samples,
    }
}

/// Human-readable summary shown before the handoff
pub fn render_preview(payload: &AnalysisPayload) -> String {
    let meta = &payload.metadata;
    let language = meta.language.as_deref().filter(|l| !l.is_empty()).unwrap_or("—");

    format!(
        "📦 Repository: {}\n\
         🧠 Type: {}\n\
         ⭐ Stars: {} | 🍴 Forks: {}\n\
         🗂️ Files analyzed: {}\n\
         Branch: {}\n\
         \n\
         ✅ Ready for AI Handoff",
        payload.repo, language, meta.stars, meta.forks, payload.files_analyzed, meta.branch
    )
}
