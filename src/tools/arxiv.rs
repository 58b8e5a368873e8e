//! arXiv export API client.
//!
//! Queries `http://export.arxiv.org/api/query` and parses the Atom feed it
//! returns. arXiv is the primary literature source: it is free, needs no API
//! key, and its relevance ranking is good enough that the paid web fallback
//! is rarely consulted.

use crate::types::{AppError, PaperRecord, Result};
use async_trait::async_trait;
use serde::Deserialize;

/// Provider of ranked academic paper metadata for a text query.
#[async_trait]
pub trait AcademicSearchProvider: Send + Sync {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PaperRecord>>;
}

/// HTTP client for the arXiv export API.
pub struct ArxivClient {
    http: reqwest::Client,
    base_url: String,
}

impl ArxivClient {
    /// `base_url` is the API root, e.g. `http://export.arxiv.org`.
    pub fn new(base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }
}

#[async_trait]
impl AcademicSearchProvider for ArxivClient {
    async fn search(&self, query: &str, limit: usize) -> Result<Vec<PaperRecord>> {
        let url = format!("{}/api/query", self.base_url);
        let body = self
            .http
            .get(&url)
            .query(&[
                ("search_query", format!("all:{query}")),
                ("max_results", limit.to_string()),
                ("sortBy", "relevance".to_string()),
                ("sortOrder", "descending".to_string()),
            ])
            .send()
            .await
            .map_err(|e| AppError::Search(format!("arXiv request failed: {e}")))?
            .error_for_status()
            .map_err(|e| AppError::Search(format!("arXiv returned an error status: {e}")))?
            .text()
            .await
            .map_err(|e| AppError::Search(format!("arXiv response unreadable: {e}")))?;

        let feed: Feed = quick_xml::de::from_str(&body)
            .map_err(|e| AppError::Search(format!("arXiv feed parse error: {e}")))?;

        Ok(feed.entries.into_iter().map(PaperRecord::from).collect())
    }
}

// ============= Atom Feed Types =============

#[derive(Debug, Deserialize)]
struct Feed {
    #[serde(default, rename = "entry")]
    entries: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    #[serde(default)]
    title: String,
    #[serde(default)]
    summary: String,
    #[serde(default)]
    published: Option<String>,
    #[serde(default, rename = "author")]
    authors: Vec<Author>,
    #[serde(default, rename = "link")]
    links: Vec<Link>,
}

#[derive(Debug, Deserialize)]
struct Author {
    name: String,
}

#[derive(Debug, Deserialize)]
struct Link {
    #[serde(rename = "@href")]
    href: String,
    #[serde(default, rename = "@title")]
    title: Option<String>,
    #[serde(default, rename = "@type")]
    content_type: Option<String>,
}

impl From<Entry> for PaperRecord {
    fn from(entry: Entry) -> Self {
        let pdf_url = entry
            .links
            .iter()
            .find(|link| {
                link.title.as_deref() == Some("pdf")
                    || link.content_type.as_deref() == Some("application/pdf")
            })
            .map(|link| link.href.clone());

        PaperRecord {
            title: collapse_whitespace(&entry.title),
            authors: entry.authors.into_iter().map(|a| a.name).collect(),
            summary: collapse_whitespace(&entry.summary),
            pdf_url,
            // Atom publishes RFC 3339 timestamps; keep the date part only.
            published: entry.published.map(|p| p.chars().take(10).collect()),
        }
    }
}

/// arXiv feeds hard-wrap titles and abstracts; fold runs of whitespace.
fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

#[cfg(test)]
mod tests {
    use super::*;

    const FEED: &str = r#"<?xml version="1.0" encoding="UTF-8"?>
<feed xmlns="http://www.w3.org/2005/Atom">
  <title>ArXiv Query Results</title>
  <entry>
    <id>http://arxiv.org/abs/2401.00001v1</id>
    <title>Quantum Error
  Correction Revisited</title>
    <summary>  A study of
  stabilizer codes.  </summary>
    <published>2024-01-05T12:00:00Z</published>
    <author><name>Alice Example</name></author>
    <author><name>Bob Example</name></author>
    <link href="http://arxiv.org/abs/2401.00001v1" rel="alternate" type="text/html"/>
    <link href="http://arxiv.org/pdf/2401.00001v1" rel="related" title="pdf" type="application/pdf"/>
  </entry>
  <entry>
    <id>http://arxiv.org/abs/2401.00002v1</id>
    <title>Undated Preprint</title>
    <summary>No published element.</summary>
    <author><name>Carol Example</name></author>
    <link href="http://arxiv.org/abs/2401.00002v1" rel="alternate" type="text/html"/>
  </entry>
</feed>"#;

    #[test]
    fn test_feed_parses_into_paper_records() {
        let feed: Feed = quick_xml::de::from_str(FEED).unwrap();
        let papers: Vec<PaperRecord> = feed.entries.into_iter().map(PaperRecord::from).collect();

        assert_eq!(papers.len(), 2);
        assert_eq!(papers[0].title, "Quantum Error Correction Revisited");
        assert_eq!(papers[0].summary, "A study of stabilizer codes.");
        assert_eq!(
            papers[0].authors,
            vec!["Alice Example".to_string(), "Bob Example".to_string()]
        );
        assert_eq!(
            papers[0].pdf_url.as_deref(),
            Some("http://arxiv.org/pdf/2401.00001v1")
        );
        assert_eq!(papers[0].published.as_deref(), Some("2024-01-05"));
    }

    #[test]
    fn test_missing_published_and_pdf_are_none() {
        let feed: Feed = quick_xml::de::from_str(FEED).unwrap();
        let papers: Vec<PaperRecord> = feed.entries.into_iter().map(PaperRecord::from).collect();

        assert!(papers[1].published.is_none());
        assert!(papers[1].pdf_url.is_none());
    }

    #[test]
    fn test_empty_feed_yields_no_records() {
        let feed: Feed = quick_xml::de::from_str(
            r#"<feed xmlns="http://www.w3.org/2005/Atom"><title>empty</title></feed>"#,
        )
        .unwrap();
        assert!(feed.entries.is_empty());
    }

    #[test]
    fn test_garbage_is_a_parse_error() {
        let parsed: std::result::Result<Feed, _> = quick_xml::de::from_str("not xml at all");
        assert!(parsed.is_err());
    }
}
