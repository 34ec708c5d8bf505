//! Filesystem persistence for pages, discovered hosts and the index
//!
//! Every file is written to a temporary sibling first and then renamed into
//! place, so readers never observe a half-written file. Existing host and
//! index exports are copied to a timestamped backup before being replaced.

use crate::index::{InvertedIndex, PostingList};
use crate::output::traits::{MemoryPageSink, OutputError, OutputResult, PageSink};
use lazy_static::lazy_static;
use parking_lot::Mutex;
use regex::Regex;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::fmt::Write as _;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Stems longer than this are truncated and disambiguated with a hash
const MAX_STEM_LEN: usize = 200;

/// Timestamp format used in backup file names and run ids
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

lazy_static! {
    static ref SCHEME_PREFIX: Regex = Regex::new(r"^(?i)https?://(www\.)?").unwrap();
    static ref UNSAFE_CHARS: Regex = Regex::new(r"[^a-zA-Z0-9.-]").unwrap();
}

/// Derives the file stem for a page URL
///
/// The scheme and a leading `www.` are removed, and every character outside
/// `[A-Za-z0-9.-]` becomes `_`.
///
/// # Examples
///
/// ```
/// use site_sift::output::page_file_stem;
///
/// assert_eq!(page_file_stem("https://www.example.com/a/b?x=1"), "example.com_a_b_x_1");
/// ```
pub fn page_file_stem(url: &str) -> String {
    let stripped = SCHEME_PREFIX.replace(url, "");
    UNSAFE_CHARS.replace_all(&stripped, "_").into_owned()
}

/// First 8 hex characters of the SHA-256 of `input`
fn short_hash(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    let digest = hex::encode(hasher.finalize());
    digest[..8].to_string()
}

/// Writes `content` to `path` via a temporary file and rename
pub fn write_atomic(path: &Path, content: &[u8]) -> OutputResult<()> {
    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .ok_or_else(|| OutputError::Write(format!("invalid path {}", path.display())))?;
    let tmp = path.with_file_name(format!("{}.tmp", file_name));

    fs::write(&tmp, content)?;
    if let Err(e) = fs::rename(&tmp, path) {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

/// Copies an existing file to `<prefix>_backup_<timestamp>.txt` next to it
///
/// # Returns
///
/// * `Ok(Some(PathBuf))` - Path of the backup that was created
/// * `Ok(None)` - There was nothing to back up
pub fn backup_existing(path: &Path, prefix: &str) -> OutputResult<Option<PathBuf>> {
    if !path.exists() {
        return Ok(None);
    }

    let stamp = chrono::Local::now().format(TIMESTAMP_FORMAT);
    let backup = path.with_file_name(format!("{}_backup_{}.txt", prefix, stamp));
    fs::copy(path, &backup)?;
    tracing::info!("Backed up {} to {}", path.display(), backup.display());
    Ok(Some(backup))
}

/// Page sink writing one HTML file per page into a directory
#[derive(Debug)]
pub struct FsPageSink {
    dir: PathBuf,
    names: Mutex<HashSet<String>>,
}

impl FsPageSink {
    /// Creates the sink, creating `dir` if needed
    pub fn new(dir: impl Into<PathBuf>) -> OutputResult<Self> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self {
            dir,
            names: Mutex::new(HashSet::new()),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Claims a unique file name for `url`
    fn claim_name(&self, url: &str) -> String {
        let stem = page_file_stem(url);
        let mut names = self.names.lock();

        let name = if stem.len() > MAX_STEM_LEN {
            let cut = floor_char_boundary(&stem, MAX_STEM_LEN);
            format!("{}_{}.html", &stem[..cut], short_hash(url))
        } else {
            let plain = format!("{}.html", stem);
            if names.contains(&plain) || self.dir.join(&plain).exists() {
                format!("{}_{}.html", stem, short_hash(url))
            } else {
                plain
            }
        };

        names.insert(name.clone());
        name
    }
}

/// Largest index `<= max` that lies on a char boundary
fn floor_char_boundary(s: &str, max: usize) -> usize {
    let mut idx = max.min(s.len());
    while !s.is_char_boundary(idx) {
        idx -= 1;
    }
    idx
}

impl PageSink for FsPageSink {
    fn store(&self, url: &str, content: &str) -> OutputResult<String> {
        let name = self.claim_name(url);
        write_atomic(&self.dir.join(&name), content.as_bytes())?;
        tracing::debug!("Saved {} as {}", url, name);
        Ok(name)
    }
}

/// Page storage for one run
///
/// Pages go to disk when the pages directory can be created. Otherwise they
/// are kept in memory so the crawl, indexing and reporting still run.
pub enum PageStore {
    Disk(Arc<FsPageSink>),
    Memory(Arc<MemoryPageSink>),
}

impl PageStore {
    /// Opens a filesystem sink in `dir`, falling back to memory on failure
    pub fn open(dir: &Path) -> Self {
        match FsPageSink::new(dir) {
            Ok(sink) => Self::Disk(Arc::new(sink)),
            Err(e) => {
                tracing::error!(
                    "Cannot store pages in {}: {}; keeping pages in memory",
                    dir.display(),
                    e
                );
                Self::Memory(Arc::new(MemoryPageSink::new()))
            }
        }
    }

    pub fn is_on_disk(&self) -> bool {
        matches!(self, Self::Disk(_))
    }

    /// Sink handed to the crawler
    pub fn sink(&self) -> Arc<dyn PageSink> {
        match self {
            Self::Disk(sink) => Arc::clone(sink) as Arc<dyn PageSink>,
            Self::Memory(sink) => Arc::clone(sink) as Arc<dyn PageSink>,
        }
    }

    /// Stored pages as `(document name, content)` pairs
    pub fn pages(&self) -> OutputResult<Vec<(String, String)>> {
        match self {
            Self::Disk(sink) => load_pages(sink.dir()),
            Self::Memory(sink) => Ok(sink.pages()),
        }
    }
}

/// Writes the discovered hosts, one per line
pub fn save_hosts(path: &Path, hosts: &[String]) -> OutputResult<()> {
    backup_existing(path, "hosts")?;

    let mut content = String::new();
    for host in hosts {
        content.push_str(host);
        content.push('\n');
    }

    write_atomic(path, content.as_bytes())?;
    tracing::info!("Saved {} hosts to {}", hosts.len(), path.display());
    Ok(())
}

/// Formats one index line: `term:doc(freq),doc(freq),`
pub fn format_index_line(term: &str, postings: &PostingList) -> String {
    let mut line = format!("{}:", term);
    for (doc, freq) in postings.iter() {
        // Writing to a String cannot fail
        let _ = write!(line, "{}({}),", doc, freq);
    }
    line
}

/// Exports the inverted index, one term per line in term order
pub fn save_index(path: &Path, index: &InvertedIndex) -> OutputResult<()> {
    backup_existing(path, "index")?;

    let mut terms: Vec<&str> = index.terms().collect();
    terms.sort_unstable();

    let mut content = String::new();
    for term in &terms {
        content.push_str(&format_index_line(term, index.postings_for(term)));
        content.push('\n');
    }

    write_atomic(path, content.as_bytes())?;
    tracing::info!("Saved index with {} terms to {}", terms.len(), path.display());
    Ok(())
}

/// Reads every stored page in `dir` in file name order
///
/// Only `*.html` and `*.htm` files are read. Content is decoded as UTF-8,
/// replacing invalid sequences. Unreadable files are logged and skipped.
///
/// # Returns
///
/// `(file name, content)` pairs
pub fn load_pages(dir: &Path) -> OutputResult<Vec<(String, String)>> {
    let mut paths: Vec<PathBuf> = fs::read_dir(dir)?
        .filter_map(|entry| entry.ok().map(|e| e.path()))
        .filter(|path| path.is_file() && is_page_file(path))
        .collect();
    paths.sort();

    let mut pages = Vec::with_capacity(paths.len());
    for path in paths {
        let name = match path.file_name().and_then(|n| n.to_str()) {
            Some(name) => name.to_string(),
            None => continue,
        };

        match fs::read(&path) {
            Ok(bytes) => pages.push((name, String::from_utf8_lossy(&bytes).into_owned())),
            Err(e) => tracing::warn!("Skipping unreadable page {}: {}", path.display(), e),
        }
    }

    Ok(pages)
}

fn is_page_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.eq_ignore_ascii_case("html") || e.eq_ignore_ascii_case("htm"))
        .unwrap_or(false)
}
