//! DuckDuckGo Instant Answer client (no API key).

use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;

use super::SearchBackend;
use crate::error::{check_status, http_client, Result};
use crate::model::SearchHit;

const DUCKDUCKGO_API: &str = "https://api.duckduckgo.com/";
const SERVICE: &str = "DuckDuckGo";

pub struct DuckDuckGoClient {
    http: reqwest::Client,
    base_url: String,
}

impl DuckDuckGoClient {
    pub fn new() -> Result<Self> {
        Ok(Self {
            http: http_client(Duration::from_secs(10))?,
            base_url: DUCKDUCKGO_API.into(),
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct InstantAnswer {
    heading: String,
    abstract_text: String,
    #[serde(rename = "AbstractURL")]
    abstract_url: String,
    results: Vec<Topic>,
    related_topics: Vec<Topic>,
}

/// Either a plain topic or a named category with nested topics
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "PascalCase", default)]
pub(crate) struct Topic {
    text: String,
    #[serde(rename = "FirstURL")]
    first_url: String,
    topics: Vec<Topic>,
}

impl Topic {
    fn collect_into(&self, hits: &mut Vec<SearchHit>) {
        if !self.text.is_empty() && !self.first_url.is_empty() {
            hits.push(topic_hit(&self.text, &self.first_url));
        }
        for nested in &self.topics {
            nested.collect_into(hits);
        }
    }
}

/// Topic text reads "Title - description"; the title is the part before the dash
fn topic_hit(text: &str, url: &str) -> SearchHit {
    let title = text.split_once(" - ").map_or(text, |(title, _)| title);
    SearchHit::new(title.trim(), url, text.trim())
}

impl InstantAnswer {
    /// Direct results, then the abstract, then related topics
    pub(crate) fn into_hits(self, max_results: usize) -> Vec<SearchHit> {
        let mut hits = Vec::new();

        for result in &self.results {
            result.collect_into(&mut hits);
        }

        if !self.abstract_text.is_empty() && !self.abstract_url.is_empty() {
            hits.push(SearchHit::new(&self.heading, &self.abstract_url, &self.abstract_text));
        }

        for topic in &self.related_topics {
            topic.collect_into(&mut hits);
        }

        hits.truncate(max_results);
        hits
    }
}

#[async_trait]
impl SearchBackend for DuckDuckGoClient {
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        tracing::debug!(query, max_results, "DuckDuckGo search");

        let response = self
            .http
            .get(&self.base_url)
            .query(&[
                ("q", query),
                ("format", "json"),
                ("no_html", "1"),
                ("skip_disambig", "1"),
            ])
            .send()
            .await?;

        let answer: InstantAnswer = check_status(SERVICE, response).await?.json().await?;
        Ok(answer.into_hits(max_results))
    }

    fn name(&self) -> &str {
        SERVICE
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const RESPONSE: &str = r#"{
        "Heading": "Rust (programming language)",
        "AbstractText": "Rust is a general-purpose programming language.",
        "AbstractURL": "https://en.wikipedia.org/wiki/Rust_(programming_language)",
        "Results": [
            {"Text": "Official site", "FirstURL": "https://www.rust-lang.org/"}
        ],
        "RelatedTopics": [
            {"Text": "Cargo - Rust package manager", "FirstURL": "https://duckduckgo.com/Cargo"},
            {"Name": "Tools", "Topics": [
                {"Text": "Clippy - A collection of lints", "FirstURL": "https://duckduckgo.com/Clippy"}
            ]}
        ]
    }"#;

    #[test]
    fn test_rank_order() {
        let answer: InstantAnswer = serde_json::from_str(RESPONSE).unwrap();
        let hits = answer.into_hits(10);

        let urls: Vec<&str> = hits.iter().map(|h| h.url.as_str()).collect();
        assert_eq!(
            urls,
            [
                "https://www.rust-lang.org/",
                "https://en.wikipedia.org/wiki/Rust_(programming_language)",
                "https://duckduckgo.com/Cargo",
                "https://duckduckgo.com/Clippy",
            ]
        );
        assert_eq!(hits[2].title, "Cargo");
        assert_eq!(hits[2].snippet, "Cargo - Rust package manager");
    }

    #[test]
    fn test_truncation() {
        let answer: InstantAnswer = serde_json::from_str(RESPONSE).unwrap();
        assert_eq!(answer.into_hits(2).len(), 2);
    }

    #[test]
    fn test_empty_answer() {
        let answer: InstantAnswer = serde_json::from_str(r#"{"Heading": "", "RelatedTopics": []}"#).unwrap();
        assert!(answer.into_hits(3).is_empty());
    }
}
