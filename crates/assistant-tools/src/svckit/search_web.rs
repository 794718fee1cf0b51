//! Web Search Tool

use std::sync::Arc;

use agent_core::tool::{string_arg, Arguments, ParamType, ParameterSchema, Tool, ToolError, ToolSpec};
use async_trait::async_trait;
use serde_json::{json, Value};

use crate::model::render_hits;
use crate::search::SearchBackend;

pub const DEFAULT_MAX_RESULTS: usize = 3;

/// Tool for searching the web
pub struct SearchWebTool {
    backend: Arc<dyn SearchBackend>,
}

impl SearchWebTool {
    pub fn new(backend: Arc<dyn SearchBackend>) -> Self {
        Self { backend }
    }
}

#[async_trait]
impl Tool for SearchWebTool {
    fn spec(&self) -> ToolSpec {
        ToolSpec::new(
            "search_web",
            "Search the web for current information. Returns titles, URLs and snippets of the top results.",
        )
        .parameter(ParameterSchema::required("query", ParamType::String, "The search query"))
        .parameter(
            ParameterSchema::optional("max_results", ParamType::Integer, "Maximum number of results to return")
                .with_default(json!(DEFAULT_MAX_RESULTS))
                .with_minimum(1.0),
        )
    }

    fn validate(&self, arguments: &Arguments) -> Result<(), ToolError> {
        if string_arg(arguments, "query")?.trim().is_empty() {
            return Err(ToolError::InvalidArguments("query must not be empty".into()));
        }
        Ok(())
    }

    async fn execute(&self, arguments: &Arguments) -> Result<String, ToolError> {
        let query = string_arg(arguments, "query")?.trim();
        let max_results = arguments
            .get("max_results")
            .and_then(Value::as_u64)
            .and_then(|n| usize::try_from(n).ok())
            .unwrap_or(DEFAULT_MAX_RESULTS);

        let mut hits = self.backend.search(query, max_results).await?;
        hits.truncate(max_results);

        tracing::debug!(backend = self.backend.name(), hits = hits.len(), "Search complete");
        Ok(render_hits(&hits))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::SearchHit;
    use crate::search::MockSearchBackend;
    use agent_core::ErrorKind;

    fn args(value: Value) -> Arguments {
        serde_json::from_value(value).unwrap()
    }

    fn hits(n: usize) -> Vec<SearchHit> {
        (1..=n)
            .map(|i| SearchHit::new(format!("Result {i}"), format!("https://example.com/{i}"), "snippet"))
            .collect()
    }

    #[tokio::test]
    async fn test_default_max_results() {
        let tool = SearchWebTool::new(Arc::new(MockSearchBackend::new(hits(5))));
        let result = tool.invoke(&args(json!({"query": "rust"}))).await;

        assert!(result.success);
        assert!(result.text.starts_with("1. Result 1\n   URL: https://example.com/1\n"));
        assert!(result.text.contains("3. Result 3"));
        assert!(!result.text.contains("4. Result 4"));
    }

    #[tokio::test]
    async fn test_no_results() {
        let tool = SearchWebTool::new(Arc::new(MockSearchBackend::new(Vec::new())));
        let result = tool.invoke(&args(json!({"query": "zzqx", "max_results": 1}))).await;

        assert!(result.success);
        assert_eq!(result.text, "No results found.");
    }

    #[tokio::test]
    async fn test_rejects_bad_arguments() {
        let backend = Arc::new(MockSearchBackend::new(hits(1)));
        let tool = SearchWebTool::new(backend.clone());

        let zero = tool.invoke(&args(json!({"query": "rust", "max_results": 0}))).await;
        assert_eq!(zero.error_kind, Some(ErrorKind::InvalidArguments));

        let blank = tool.invoke(&args(json!({"query": "  "}))).await;
        assert_eq!(blank.error_kind, Some(ErrorKind::InvalidArguments));

        assert_eq!(backend.calls(), 0);
    }

    #[tokio::test]
    async fn test_upstream_failure() {
        let tool = SearchWebTool::new(Arc::new(MockSearchBackend::failing("service unavailable")));
        let result = tool.invoke(&args(json!({"query": "rust"}))).await;

        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::UpstreamFailure));
        assert!(result.text.contains("service unavailable"));
    }
}
