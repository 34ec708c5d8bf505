//! TF-IDF search over the inverted index

mod ranker;

pub use ranker::{rank, rank_scored};
