//! Inverted index module
//!
//! Pages are tokenized into lowercase terms and recorded in an inverted
//! index mapping each term to the documents containing it and how often.
//!
//! # Example
//!
//! ```
//! use site_sift::index::InvertedIndex;
//!
//! let mut index = InvertedIndex::new();
//! index.add_document("about.html", "<h1>About us</h1>");
//! assert_eq!(index.postings_for("about").frequency("about.html"), 1);
//! ```

mod inverted;
mod posting;
mod tokenizer;

pub use inverted::InvertedIndex;
pub use posting::PostingList;
pub use tokenizer::{decode_entities, split_terms, strip_markup, tokenize};
