use anyhow::{Context, Result};
use serde::Serialize;

use crate::classifier::{FeatureVector, QualityLabel, QualityModel};
use crate::corpus::Corpus;
use crate::fetcher::Fetcher;
use crate::metrics;
use crate::parser;
use crate::similarity::{self, SimilarityMatch, VectorSpace};
use crate::text;

/// Pages under this many words are flagged as thin content.
pub const THIN_CONTENT_WORDS: usize = 500;

/// The complete verdict for one analyzed URL.
#[derive(Debug, Clone, Serialize)]
pub struct AnalysisResult {
    pub url: String,
    pub title: String,
    pub word_count: usize,
    pub sentence_count: usize,
    pub readability: f64,
    pub quality_label: QualityLabel,
    pub is_thin: bool,
    pub similar_to: Vec<SimilarityMatch>,
}

/// Run the full pipeline for one URL: fetch → parse → normalize →
/// {metrics, duplicate match} → classify → assemble.
///
/// Fetch and parse failures degrade to an empty document, so the result is
/// always well-formed; the one hard failure is the classifier call.
pub async fn analyze(
    url: &str,
    fetcher: &Fetcher,
    corpus: &Corpus,
    space: Option<&VectorSpace>,
    model: &dyn QualityModel,
    threshold: f64,
) -> Result<AnalysisResult> {
    let markup = fetcher.fetch(url).await;
    let (title, body) = parser::parse(&markup);
    let body = text::normalize(&body);

    let (word_count, sentence_count) = metrics::basic_metrics(&body);
    let readability = metrics::readability(&body);

    let features = FeatureVector {
        word_count,
        sentence_count,
        flesch_reading_ease: readability,
    };
    let quality_label = model
        .predict(&features)
        .context("quality model prediction failed")?;

    let similar_to = similarity::find_similar(&body, corpus, space, threshold);

    Ok(AnalysisResult {
        url: url.to_string(),
        title,
        word_count,
        sentence_count,
        readability,
        quality_label,
        is_thin: word_count < THIN_CONTENT_WORDS,
        similar_to,
    })
}

// ── Tests ──
