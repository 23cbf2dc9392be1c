//! Keyword search over a written corpus.
//!
//! Scoring is the number of distinct query terms that appear as
//! case-insensitive substrings of an entry's title and content.

use std::path::Path;

use tracing::{debug, instrument};

use doclib_shared::{CorpusEntry, DocLibError, Result};

pub const DEFAULT_LIMIT: usize = 5;

/// Characters kept in a result preview.
pub const PREVIEW_CHARS: usize = 240;

/// A matching entry and its score.
#[derive(Debug, Clone, Copy)]
pub struct SearchHit<'a> {
    pub entry: &'a CorpusEntry,
    pub score: usize,
}

/// Return up to `limit` entries with the most matching terms.
///
/// Entries scoring zero are dropped; ties keep corpus order.
#[instrument(skip(corpus), fields(entries = corpus.len()))]
pub fn search<'a>(corpus: &'a [CorpusEntry], query: &str, limit: usize) -> Vec<SearchHit<'a>> {
    let terms = query_terms(query);
    if terms.is_empty() {
        return Vec::new();
    }

    let mut hits: Vec<SearchHit<'a>> = corpus
        .iter()
        .filter_map(|entry| {
            let haystack = format!("{}\n{}", entry.title, entry.content).to_lowercase();
            let score = terms.iter().filter(|t| haystack.contains(t.as_str())).count();
            (score > 0).then_some(SearchHit { entry, score })
        })
        .collect();

    hits.sort_by(|a, b| b.score.cmp(&a.score));
    hits.truncate(limit);

    debug!(terms = terms.len(), hits = hits.len(), "search complete");
    hits
}

/// Lowercased, de-duplicated whitespace-separated terms, in query order.
pub fn query_terms(query: &str) -> Vec<String> {
    let mut terms: Vec<String> = Vec::new();
    for term in query.to_lowercase().split_whitespace() {
        if !terms.iter().any(|t| t == term) {
            terms.push(term.to_string());
        }
    }
    terms
}

/// First [`PREVIEW_CHARS`] characters of `content`, whitespace collapsed.
pub fn preview(content: &str) -> String {
    let head: String = content.chars().take(PREVIEW_CHARS).collect();
    head.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Read a `corpus.json` written by a library build.
pub fn load_corpus(path: &Path) -> Result<Vec<CorpusEntry>> {
    if !path.exists() {
        return Err(DocLibError::config(format!(
            "corpus file not found at {}. Run `doclib build` first.",
            path.display()
        )));
    }

    let content = std::fs::read_to_string(path).map_err(|e| DocLibError::io(path, e))?;
    serde_json::from_str(&content)
        .map_err(|e| DocLibError::parse(format!("invalid corpus file {}: {e}", path.display())))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(id: &str, title: &str, content: &str) -> CorpusEntry {
        CorpusEntry {
            id: id.into(),
            title: title.into(),
            path: format!("{id}.md"),
            source_url: format!("https://docs.example.com/{id}"),
            order: None,
            content: content.into(),
            category: None,
        }
    }

    fn corpus() -> Vec<CorpusEntry> {
        vec![
            entry("1-a", "Playback", "Stream video to viewers."),
            entry("2-b", "Signed Playback", "Secure playback with signed tokens."),
            entry("3-c", "Billing", "Invoices."),
            entry("4-d", "Tokens", "Signed JWTs."),
        ]
    }

    fn ids(hits: &[SearchHit<'_>]) -> Vec<String> {
        hits.iter().map(|h| h.entry.id.clone()).collect()
    }

    #[test]
    fn ranks_by_distinct_terms() {
        let corpus = corpus();
        let hits = search(&corpus, "Signed playback", DEFAULT_LIMIT);
        assert_eq!(ids(&hits), vec!["2-b", "1-a", "4-d"]);
        assert_eq!(hits[0].score, 2);
        assert_eq!(hits[1].score, 1);
    }

    #[test]
    fn ties_keep_corpus_order() {
        let corpus = corpus();
        let hits = search(&corpus, "signed", DEFAULT_LIMIT);
        assert_eq!(ids(&hits), vec!["2-b", "4-d"]);
    }

    #[test]
    fn duplicate_terms_count_once() {
        let corpus = corpus();
        let hits = search(&corpus, "tokens TOKENS tokens", DEFAULT_LIMIT);
        assert!(hits.iter().all(|h| h.score == 1));
    }

    #[test]
    fn limit_and_empty_query() {
        let corpus = corpus();
        assert_eq!(search(&corpus, "signed playback", 1).len(), 1);
        assert!(search(&corpus, "   ", DEFAULT_LIMIT).is_empty());
        assert!(search(&corpus, "nothing-matches", DEFAULT_LIMIT).is_empty());
    }

    #[test]
    fn query_terms_dedup_in_order() {
        assert_eq!(query_terms(" B a  b "), vec!["b", "a"]);
    }

    #[test]
    fn preview_truncates_and_collapses() {
        assert_eq!(preview("a\n\n  b\tc"), "a b c");
        let long = "word ".repeat(100);
        assert!(preview(&long).chars().count() <= PREVIEW_CHARS);
    }

    #[test]
    fn missing_corpus_is_config_error() {
        let err = load_corpus(Path::new("/definitely/not/here/corpus.json")).unwrap_err();
        assert!(matches!(err, DocLibError::Config { .. }));
        assert!(err.to_string().contains("doclib build"));
    }

    #[test]
    fn load_corpus_reads_json() {
        let path = std::env::temp_dir().join(format!("doclib-search-test-{}.json", uuid::Uuid::now_v7()));
        std::fs::write(&path, serde_json::to_string(&corpus()).unwrap()).unwrap();

        let loaded = load_corpus(&path).unwrap();
        assert_eq!(loaded, corpus());

        std::fs::write(&path, "not json").unwrap();
        assert!(matches!(load_corpus(&path), Err(DocLibError::Parse { .. })));

        let _ = std::fs::remove_file(&path);
    }
}
