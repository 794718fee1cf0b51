//! Web Search Backends
//!
//! Abstraction over search engines, with a DuckDuckGo implementation.

mod duckduckgo;
pub mod mock;

pub use duckduckgo::DuckDuckGoClient;
pub use mock::MockSearchBackend;

use async_trait::async_trait;

use crate::error::Result;
use crate::model::SearchHit;

/// Search backend trait (Strategy pattern)
#[async_trait]
pub trait SearchBackend: Send + Sync {
    /// Hits in upstream rank order, at most `max_results` of them
    async fn search(&self, query: &str, max_results: usize) -> Result<Vec<SearchHit>>;

    /// Backend name
    fn name(&self) -> &str;
}
