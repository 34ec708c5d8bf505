use crate::index::posting::PostingList;
use crate::index::tokenizer::tokenize;
use std::collections::{HashMap, HashSet};

/// Term to posting list mapping plus the set of indexed documents
#[derive(Debug, Clone, Default)]
pub struct InvertedIndex {
    postings: HashMap<String, PostingList>,
    documents: HashSet<String>,
    empty: PostingList,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `term` in `doc`
    ///
    /// Empty terms are ignored.
    pub fn add(&mut self, doc: &str, term: &str) {
        if term.is_empty() {
            return;
        }

        self.postings.entry(term.to_string()).or_default().add(doc);
        if !self.documents.contains(doc) {
            self.documents.insert(doc.to_string());
        }
    }

    /// Tokenizes `text` and records every term occurrence under `doc`
    ///
    /// Adding the same document twice counts its terms twice.
    pub fn add_document(&mut self, doc: &str, text: &str) {
        for term in tokenize(text) {
            self.add(doc, &term);
        }
    }

    /// Number of distinct documents ever added (N)
    pub fn total_documents(&self) -> usize {
        self.documents.len()
    }

    /// Postings for `term`; unknown terms share one empty list
    pub fn postings_for(&self, term: &str) -> &PostingList {
        self.postings.get(term).unwrap_or(&self.empty)
    }

    /// Returns true if the term occurs in at least one document
    pub fn contains_term(&self, term: &str) -> bool {
        self.postings.contains_key(term)
    }

    /// Iterates the indexed terms in no particular order
    pub fn terms(&self) -> impl Iterator<Item = &str> {
        self.postings.keys().map(String::as_str)
    }

    /// Iterates the indexed document ids in no particular order
    pub fn documents(&self) -> impl Iterator<Item = &str> {
        self.documents.iter().map(String::as_str)
    }

    /// Number of distinct terms
    pub fn len(&self) -> usize {
        self.postings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.postings.is_empty()
    }
}
