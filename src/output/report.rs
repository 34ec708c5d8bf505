//! Last-query report

use crate::output::files::write_atomic;
use crate::output::traits::OutputResult;
use std::path::{Path, PathBuf};

/// File name of the query report inside the index run directory
pub const SEARCH_REPORT_FILE: &str = "last_search.txt";

/// Renders the report: `Query: <q>` followed by numbered documents
pub fn format_search_report(query: &str, ranked: &[String], limit: usize) -> String {
    let mut report = format!("Query: {}\n", query);
    for (i, doc) in ranked.iter().take(limit).enumerate() {
        report.push_str(&format!("{}. {}\n", i + 1, doc));
    }
    report
}

/// Writes the top `limit` results of a query to `last_search.txt` in `dir`
///
/// # Returns
///
/// The path of the written report
pub fn write_search_report(
    dir: &Path,
    query: &str,
    ranked: &[String],
    limit: usize,
) -> OutputResult<PathBuf> {
    let path = dir.join(SEARCH_REPORT_FILE);
    write_atomic(&path, format_search_report(query, ranked, limit).as_bytes())?;
    tracing::info!("Search results written to {}", path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_format_limits_results() {
        let ranked: Vec<String> = (0..15).map(|i| format!("doc{}.html", i)).collect();
        let report = format_search_report("rust crawler", &ranked, 10);

        let lines: Vec<&str> = report.lines().collect();
        assert_eq!(lines.len(), 11);
        assert_eq!(lines[0], "Query: rust crawler");
        assert_eq!(lines[1], "1. doc0.html");
        assert_eq!(lines[10], "10. doc9.html");
    }

    #[test]
    fn test_format_no_results() {
        assert_eq!(format_search_report("nothing", &[], 10), "Query: nothing\n");
    }

    #[test]
    fn test_write_search_report() {
        let dir = TempDir::new().unwrap();
        let ranked = vec!["a.html".to_string(), "b.html".to_string()];

        let path = write_search_report(dir.path(), "cat", &ranked, 10).unwrap();
        assert_eq!(path, dir.path().join("last_search.txt"));
        assert_eq!(
            std::fs::read_to_string(path).unwrap(),
            "Query: cat\n1. a.html\n2. b.html\n"
        );
    }
}
