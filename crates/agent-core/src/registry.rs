//! Tool Registry
//!
//! Ordered collection of tools keyed by unique name. The registry is built once
//! at startup and then shared read-only between sessions.

use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, ErrorKind, Result};
use crate::tool::{Tool, ToolCallRequest, ToolResult, ToolSpec};

struct Entry {
    spec: ToolSpec,
    tool: Arc<dyn Tool>,
}

/// Registry for available tools
#[derive(Default)]
pub struct ToolRegistry {
    entries: Vec<Entry>,
    index: HashMap<String, usize>,
}

impl ToolRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a new tool
    pub fn register<T: Tool + 'static>(&mut self, tool: T) -> Result<()> {
        self.register_arc(Arc::new(tool))
    }

    /// Register a shared tool; the first registration of a name wins.
    pub fn register_arc(&mut self, tool: Arc<dyn Tool>) -> Result<()> {
        let spec = tool.spec();
        if self.index.contains_key(&spec.name) {
            return Err(AgentError::DuplicateName(spec.name));
        }

        tracing::debug!(tool = %spec.name, "Registered tool");
        self.index.insert(spec.name.clone(), self.entries.len());
        self.entries.push(Entry { spec, tool });
        Ok(())
    }

    /// Get a tool by name
    pub fn get(&self, name: &str) -> Result<Arc<dyn Tool>> {
        self.index
            .get(name)
            .map(|&i| Arc::clone(&self.entries[i].tool))
            .ok_or_else(|| AgentError::ToolNotFound(name.to_string()))
    }

    /// Tool manifest in registration order
    pub fn list_specs(&self) -> Vec<ToolSpec> {
        self.entries.iter().map(|e| e.spec.clone()).collect()
    }

    /// Look up and invoke; an unknown tool yields a `ToolNotFound` result.
    pub async fn invoke(&self, request: &ToolCallRequest) -> ToolResult {
        match self.get(&request.tool_name) {
            Ok(tool) => tool.invoke(&request.arguments).await,
            Err(e) => ToolResult::failure(
                request.tool_name.clone(),
                ErrorKind::ToolNotFound,
                format!("{e}. Available tools: {}", self.names().join(", ")),
            ),
        }
    }

    /// Get tool names
    pub fn names(&self) -> Vec<&str> {
        self.entries.iter().map(|e| e.spec.name.as_str()).collect()
    }

    /// Number of registered tools
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{Arguments, ToolError};
    use async_trait::async_trait;

    struct NamedTool {
        name: &'static str,
        reply: &'static str,
    }

    #[async_trait]
    impl Tool for NamedTool {
        fn spec(&self) -> ToolSpec {
            ToolSpec::new(self.name, format!("Replies with {}", self.reply))
        }

        async fn execute(&self, _arguments: &Arguments) -> std::result::Result<String, ToolError> {
            Ok(self.reply.to_string())
        }
    }

    fn registry() -> ToolRegistry {
        let mut registry = ToolRegistry::new();
        registry.register(NamedTool { name: "search_web", reply: "first" }).unwrap();
        registry.register(NamedTool { name: "get_weather", reply: "sunny" }).unwrap();
        registry.register(NamedTool { name: "convert_currency", reply: "1.00" }).unwrap();
        registry
    }

    #[tokio::test]
    async fn test_duplicate_name_keeps_first() {
        let mut registry = registry();
        let err = registry
            .register(NamedTool { name: "search_web", reply: "second" })
            .unwrap_err();

        assert!(matches!(err, AgentError::DuplicateName(ref name) if name == "search_web"));
        assert_eq!(registry.len(), 3);

        let result = registry.invoke(&ToolCallRequest::new("search_web", Arguments::new())).await;
        assert_eq!(result.text, "first");
    }

    #[test]
    fn test_list_specs_is_ordered_and_stable() {
        let registry = registry();
        let first = registry.list_specs();
        let second = registry.list_specs();

        assert_eq!(first, second);
        let names: Vec<_> = first.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, ["search_web", "get_weather", "convert_currency"]);
    }

    #[tokio::test]
    async fn test_unknown_tool() {
        let registry = registry();
        assert!(matches!(registry.get("teleport"), Err(AgentError::ToolNotFound(_))));

        let result = registry.invoke(&ToolCallRequest::new("teleport", Arguments::new())).await;
        assert!(!result.success);
        assert_eq!(result.error_kind, Some(ErrorKind::ToolNotFound));
        assert!(result.text.contains("get_weather"));
    }
}
