use crate::index::{split_terms, InvertedIndex};
use std::collections::HashMap;

/// Scores every matching document for a query, best first
///
/// # Scoring
///
/// For each query term with postings:
/// - `idf = ln((N + 1) / (df + 1)) + 1`
/// - `tf = 1 + ln(freq)`
/// - `score[doc] += tf * idf`
///
/// A term repeated in the query contributes once per occurrence. Ties are
/// broken by document id ascending.
///
/// # Returns
///
/// `(document, score)` pairs; empty for an empty query or index
pub fn rank_scored(query: &str, index: &InvertedIndex) -> Vec<(String, f64)> {
    if query.trim().is_empty() || index.is_empty() {
        return Vec::new();
    }

    let n = index.total_documents() as f64;
    let mut scores: HashMap<&str, f64> = HashMap::new();

    for term in split_terms(query) {
        let postings = index.postings_for(&term);
        if postings.is_empty() {
            continue;
        }

        let df = postings.document_frequency() as f64;
        let idf = ((n + 1.0) / (df + 1.0)).ln() + 1.0;

        for (doc, freq) in postings.iter() {
            let tf = 1.0 + (freq as f64).ln();
            *scores.entry(doc).or_insert(0.0) += tf * idf;
        }
    }

    let mut ranked: Vec<(String, f64)> = scores
        .into_iter()
        .map(|(doc, score)| (doc.to_string(), score))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked
}

/// Ranks documents for a query, best first
///
/// # Example
///
/// ```
/// use site_sift::index::InvertedIndex;
/// use site_sift::search::rank;
///
/// let mut index = InvertedIndex::new();
/// index.add_document("docA", "cat dog dog");
/// index.add_document("docB", "cat cat cat");
///
/// assert_eq!(rank("dog", &index), vec!["docA"]);
/// assert_eq!(rank("cat", &index), vec!["docB", "docA"]);
/// ```
pub fn rank(query: &str, index: &InvertedIndex) -> Vec<String> {
    rank_scored(query, index)
        .into_iter()
        .map(|(doc, _)| doc)
        .collect()
}
