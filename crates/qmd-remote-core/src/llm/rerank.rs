//! Rerank result normalization
//!
//! Rerank servers report scores against positions in the submitted document list.
//! These helpers map them back onto the caller's document identities.

use super::{RerankDocument, RerankDocumentResult, RerankResult, RerankSource};
use std::collections::HashSet;

/// Model label for fallback orderings when no rerank endpoint is configured
pub const NOT_CONFIGURED_MODEL: &str = "none";

/// Model label for fallback orderings after a failed rerank call
pub const FAILED_MODEL: &str = "fallback";

/// Model label for fallback orderings from a cancelled session
pub const CANCELLED_MODEL: &str = "cancelled";

const PLACEHOLDER_STEP: f64 = 0.1;

/// A single scored position as reported by a rerank server
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRerankScore {
    pub index: usize,
    pub score: f64,
}

/// Input order with decreasing placeholder scores (`1 - i * 0.1`)
pub fn fallback_ranking(documents: &[RerankDocument], source: RerankSource) -> RerankResult {
    let model = match source {
        RerankSource::NotConfigured => NOT_CONFIGURED_MODEL,
        RerankSource::Cancelled => CANCELLED_MODEL,
        RerankSource::Failed | RerankSource::Model => FAILED_MODEL,
    };

    let results = documents
        .iter()
        .enumerate()
        .map(|(index, doc)| RerankDocumentResult {
            file: doc.file.clone(),
            score: 1.0 - index as f64 * PLACEHOLDER_STEP,
            index,
        })
        .collect();

    RerankResult {
        results,
        model: model.to_string(),
        source,
    }
}

/// Map server scores back onto `documents`, sorted by descending score
///
/// Indices outside the input are skipped, and only the first score for an index
/// counts. Documents the server left unscored follow in input order with score 0.
pub fn normalize_scores(
    documents: &[RerankDocument],
    scores: &[RawRerankScore],
    model: impl Into<String>,
) -> RerankResult {
    let mut seen = HashSet::with_capacity(scores.len());
    let mut results = Vec::with_capacity(documents.len());

    for raw in scores {
        let Some(doc) = documents.get(raw.index) else {
            tracing::warn!(
                "Rerank response index {} out of range for {} documents, skipping",
                raw.index,
                documents.len()
            );
            continue;
        };
        if !seen.insert(raw.index) {
            tracing::debug!("Duplicate rerank index {}, keeping first score", raw.index);
            continue;
        }
        results.push(RerankDocumentResult {
            file: doc.file.clone(),
            score: raw.score,
            index: raw.index,
        });
    }

    results.sort_by(|a, b| b.score.total_cmp(&a.score));

    if results.len() < documents.len() {
        tracing::debug!(
            "Rerank scored {}/{} documents, appending the rest",
            results.len(),
            documents.len()
        );
        results.extend(
            documents
                .iter()
                .enumerate()
                .filter(|(index, _)| !seen.contains(index))
                .map(|(index, doc)| RerankDocumentResult {
                    file: doc.file.clone(),
                    score: 0.0,
                    index,
                }),
        );
    }

    RerankResult {
        results,
        model: model.into(),
        source: RerankSource::Model,
    }
}
