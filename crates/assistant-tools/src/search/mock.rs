//! Mock Search Backend
//!
//! For testing and demo purposes. Serves canned hits without network access.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use super::SearchBackend;
use crate::error::{Result, ServiceError};
use crate::model::SearchHit;

/// Mock search backend with fixed hits
#[derive(Default)]
pub struct MockSearchBackend {
    hits: Vec<SearchHit>,
    failure: Option<String>,
    calls: AtomicUsize,
}

impl MockSearchBackend {
    pub fn new(hits: Vec<SearchHit>) -> Self {
        Self {
            hits,
            ..Self::default()
        }
    }

    /// Backend whose every search fails with `message`
    pub fn failing(message: impl Into<String>) -> Self {
        Self {
            failure: Some(message.into()),
            ..Self::default()
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl SearchBackend for MockSearchBackend {
    async fn search(&self, _query: &str, max_results: usize) -> Result<Vec<SearchHit>> {
        self.calls.fetch_add(1, Ordering::SeqCst);

        if let Some(message) = &self.failure {
            return Err(ServiceError::payload("MockSearch", message.clone()));
        }
        Ok(self.hits.iter().take(max_results).cloned().collect())
    }

    fn name(&self) -> &str {
        "MockSearch"
    }
}
