use std::collections::HashMap;

/// Documents containing one term, with the term's frequency in each
///
/// Documents keep the order in which they were first added. A document is
/// present only with a frequency of at least one.
#[derive(Debug, Clone, Default)]
pub struct PostingList {
    entries: Vec<(String, u32)>,
    slots: HashMap<String, usize>,
}

impl PostingList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one more occurrence of the term in `doc`
    pub fn add(&mut self, doc: &str) {
        match self.slots.get(doc) {
            Some(&slot) => self.entries[slot].1 += 1,
            None => {
                self.slots.insert(doc.to_string(), self.entries.len());
                self.entries.push((doc.to_string(), 1));
            }
        }
    }

    /// Term frequency in `doc`, zero if absent
    pub fn frequency(&self, doc: &str) -> u32 {
        self.slots
            .get(doc)
            .map(|&slot| self.entries[slot].1)
            .unwrap_or(0)
    }

    /// Number of distinct documents containing the term
    pub fn document_frequency(&self) -> usize {
        self.entries.len()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterates `(doc, frequency)` pairs in insertion order
    pub fn iter(&self) -> impl Iterator<Item = (&str, u32)> {
        self.entries.iter().map(|(doc, freq)| (doc.as_str(), *freq))
    }
}

impl PartialEq for PostingList {
    fn eq(&self, other: &Self) -> bool {
        self.entries == other.entries
    }
}

impl Eq for PostingList {}
