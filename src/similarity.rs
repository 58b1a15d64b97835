use std::cmp::Ordering;
use std::collections::{HashMap, HashSet};
use std::sync::LazyLock;

use rayon::prelude::*;
use serde::Serialize;

use crate::corpus::Corpus;
use crate::text;

/// Vocabulary cap; only the most frequent corpus terms are kept.
const MAX_FEATURES: usize = 5000;

/// Tokens shorter than this are skipped.
const MIN_TOKEN_LEN: usize = 2;

/// Common English stop words excluded from the vector space.
const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "am", "an", "and",
    "any", "are", "as", "at", "be", "because", "been", "before", "being", "below",
    "between", "both", "but", "by", "can", "could", "did", "do", "does", "doing",
    "down", "during", "each", "few", "for", "from", "further", "had", "has",
    "have", "having", "he", "her", "here", "hers", "herself", "him", "himself",
    "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just",
    "me", "more", "most", "my", "myself", "no", "nor", "not", "now", "of", "off",
    "on", "once", "only", "or", "other", "our", "ours", "ourselves", "out",
    "over", "own", "same", "she", "should", "so", "some", "such", "than", "that",
    "the", "their", "theirs", "them", "themselves", "then", "there", "these",
    "they", "this", "those", "through", "to", "too", "under", "until", "up",
    "very", "was", "we", "were", "what", "when", "where", "which", "while",
    "who", "whom", "why", "will", "with", "would", "you", "your", "yours",
    "yourself", "yourselves",
];

static STOP_SET: LazyLock<HashSet<&'static str>> =
    LazyLock::new(|| STOP_WORDS.iter().copied().collect());

/// Sparse vector over the fitted vocabulary: (term index, weight), index-sorted.
pub type SparseVec = Vec<(u32, f64)>;

/// A corpus page whose similarity to the query meets the threshold.
#[derive(Debug, Clone, Serialize)]
pub struct SimilarityMatch {
    pub url: String,
    pub similarity: f64,
}

/// TF-IDF weighting fitted once on the reference corpus.
///
/// The vocabulary is fixed at fit time and never refit per request; queries
/// are projected into the same space the corpus matrix lives in.
#[derive(Debug)]
pub struct TfidfVectorizer {
    vocabulary: HashMap<String, u32>,
    idf: Vec<f64>,
}

impl TfidfVectorizer {
    /// Fit vocabulary and IDF weights on normalized documents.
    ///
    /// Vocabulary keeps the [`MAX_FEATURES`] terms with the highest total
    /// count (ties broken lexically), indexed in sorted term order. IDF uses
    /// the smoothed form ln((1 + n) / (1 + df)) + 1.
    pub fn fit(docs: &[String]) -> Self {
        let tokenized: Vec<Vec<&str>> = docs.iter().map(|d| tokenize(d)).collect();

        let mut totals: HashMap<&str, u64> = HashMap::new();
        for tokens in &tokenized {
            for &t in tokens {
                *totals.entry(t).or_insert(0) += 1;
            }
        }
        let mut ranked: Vec<(&str, u64)> = totals.into_iter().collect();
        ranked.sort_unstable_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(b.0)));
        ranked.truncate(MAX_FEATURES);

        let mut terms: Vec<&str> = ranked.into_iter().map(|(t, _)| t).collect();
        terms.sort_unstable();
        let vocabulary: HashMap<String, u32> = terms
            .iter()
            .enumerate()
            .map(|(i, &t)| (t.to_string(), i as u32))
            .collect();

        let n = docs.len() as f64;
        let mut df = vec![0u64; terms.len()];
        for tokens in &tokenized {
            let unique: HashSet<&str> = tokens.iter().copied().collect();
            for t in unique {
                if let Some(&i) = vocabulary.get(t) {
                    df[i as usize] += 1;
                }
            }
        }
        let idf = df
            .iter()
            .map(|&d| ((1.0 + n) / (1.0 + d as f64)).ln() + 1.0)
            .collect();

        TfidfVectorizer { vocabulary, idf }
    }

    /// Project normalized text into the fitted space as an L2-normalized
    /// sparse vector. Text sharing no vocabulary terms yields the zero
    /// vector, represented as an empty sparse vec.
    pub fn transform(&self, text: &str) -> SparseVec {
        let mut counts: HashMap<u32, f64> = HashMap::new();
        for token in tokenize(text) {
            if let Some(&i) = self.vocabulary.get(token) {
                *counts.entry(i).or_insert(0.0) += 1.0;
            }
        }

        let mut vector: SparseVec = counts
            .into_iter()
            .map(|(i, c)| (i, c * self.idf[i as usize]))
            .collect();
        vector.sort_unstable_by_key(|&(i, _)| i);

        let norm = vector.iter().map(|(_, w)| w * w).sum::<f64>().sqrt();
        if norm == 0.0 {
            return Vec::new();
        }
        for (_, w) in &mut vector {
            *w /= norm;
        }
        vector
    }
}

/// The fitted vector space: TF-IDF weighting plus the precomputed embedding
/// matrix, one row per corpus entry, aligned by index.
#[derive(Debug)]
pub struct VectorSpace {
    vectorizer: TfidfVectorizer,
    matrix: Vec<SparseVec>,
}

impl VectorSpace {
    /// Fit on the corpus bodies (normalized the same way queries are) and
    /// precompute the row matrix, in entry order.
    pub fn fit(corpus: &Corpus) -> Self {
        let normalized: Vec<String> = corpus
            .entries
            .iter()
            .map(|e| text::normalize(&e.body_text))
            .collect();
        let vectorizer = TfidfVectorizer::fit(&normalized);
        let matrix: Vec<SparseVec> = normalized
            .par_iter()
            .map(|d| vectorizer.transform(d))
            .collect();
        VectorSpace { vectorizer, matrix }
    }

    pub fn rows(&self) -> usize {
        self.matrix.len()
    }
}

/// Find corpus entries whose cosine similarity to `text` meets `threshold`
/// (inclusive). Matches are emitted in corpus-index order, not sorted by
/// descending score; the display layer relies on this ordering.
///
/// An absent vector space, an empty corpus, or a corpus/matrix row mismatch
/// yields no matches.
pub fn find_similar(
    text: &str,
    corpus: &Corpus,
    space: Option<&VectorSpace>,
    threshold: f64,
) -> Vec<SimilarityMatch> {
    let Some(space) = space else {
        return Vec::new();
    };
    if corpus.is_empty() || space.matrix.len() != corpus.len() {
        return Vec::new();
    }

    let query = space.vectorizer.transform(text);
    corpus
        .entries
        .iter()
        .zip(&space.matrix)
        .filter_map(|(entry, row)| {
            let similarity = dot(&query, row).min(1.0);
            (similarity >= threshold).then(|| SimilarityMatch {
                url: entry.url.clone(),
                similarity,
            })
        })
        .collect()
}

fn tokenize(text: &str) -> Vec<&str> {
    text.split_whitespace()
        .filter(|t| t.chars().count() >= MIN_TOKEN_LEN && !STOP_SET.contains(t))
        .collect()
}

/// Dot product of index-sorted sparse vectors. Rows are L2-normalized, so
/// this is cosine similarity; the zero vector scores 0 against everything.
fn dot(a: &SparseVec, b: &SparseVec) -> f64 {
    let (mut i, mut j) = (0, 0);
    let mut sum = 0.0;
    while i < a.len() && j < b.len() {
        match a[i].0.cmp(&b[j].0) {
            Ordering::Less => i += 1,
            Ordering::Greater => j += 1,
            Ordering::Equal => {
                sum += a[i].1 * b[j].1;
                i += 1;
                j += 1;
            }
        }
    }
    sum
}

// ── Tests ──
