//! Text tool-call protocol
//!
//! Fallback for backends without native function calling: the tool manifest is
//! described in the system prompt and the model answers with a fenced block
//!
//! ~~~text
//! ```tool
//! {"tool": "get_weather", "arguments": {"location": "Oslo"}}
//! ```
//! ~~~
//!
//! Also holds the rendering of observation turns shared by every adapter.

use std::fmt::Write as _;

use uuid::Uuid;

use crate::error::{AgentError, Result};
use crate::message::Turn;
use crate::tool::{ToolCallRequest, ToolSpec};

const TOOL_FENCE: &str = "```tool";
const FENCE_END: &str = "```";

/// System prompt section describing the available tools
pub fn prompt_section(tools: &[ToolSpec]) -> String {
    let mut prompt = String::from("## Available Tools\n\n");
    prompt.push_str("You can use the following tools by responding with a JSON block:\n\n");
    prompt.push_str("```tool\n{\"tool\": \"tool_name\", \"arguments\": {\"arg\": \"value\"}}\n```\n\n");
    prompt.push_str("Call at most one tool per response. If you can answer directly, do so without a tool block.\n\n");

    for spec in tools {
        let _ = writeln!(prompt, "### {}", spec.name);
        let _ = writeln!(prompt, "{}", spec.description);

        if !spec.parameters.is_empty() {
            prompt.push_str("**Parameters:**\n");
            for param in &spec.parameters {
                let required = if param.required { " (required)" } else { "" };
                let _ = writeln!(
                    prompt,
                    "- `{}` ({}){}: {}",
                    param.name, param.param_type, required, param.description
                );
            }
        }
        prompt.push('\n');
    }

    prompt
}

/// Parse a tool call from free-text model output.
///
/// `Ok(None)` means the text is a final answer. A tool fence whose body is not
/// a valid call is a [`AgentError::Parse`].
pub fn parse_tool_call(content: &str) -> Result<Option<ToolCallRequest>> {
    if let Some(start_idx) = content.find(TOOL_FENCE) {
        let after_marker = &content[start_idx + TOOL_FENCE.len()..];
        let end_idx = after_marker
            .find(FENCE_END)
            .ok_or_else(|| AgentError::Parse("unterminated tool block".into()))?;

        let json_str = after_marker[..end_idx].trim();
        let call = serde_json::from_str::<ToolCallRequest>(json_str)
            .map_err(|e| AgentError::Parse(format!("invalid tool block: {e}")))?;
        return Ok(Some(with_call_id(call)));
    }

    Ok(parse_inline_tool_call(content).map(with_call_id))
}

/// Try to parse an unfenced JSON object with a "tool" field
fn parse_inline_tool_call(content: &str) -> Option<ToolCallRequest> {
    if !content.contains(r#""tool""#) {
        return None;
    }

    let start = content.find('{')?;
    let end = content.rfind('}')?;
    if end <= start {
        return None;
    }

    serde_json::from_str::<ToolCallRequest>(&content[start..=end]).ok()
}

fn with_call_id(mut call: ToolCallRequest) -> ToolCallRequest {
    if call.id.is_none() {
        call.id = Some(Uuid::new_v4().to_string());
    }
    call
}

/// Render an observation turn as context text for the model
pub fn observation_text(turn: &Turn) -> String {
    format!(
        "[Tool '{}' returned]\n{}",
        turn.tool_name().unwrap_or("unknown"),
        turn.content()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tool::{ParamType, ParameterSchema};

    #[test]
    fn test_parse_fenced_tool_call() {
        let content = r#"Let me check that for you.
```tool
{"tool": "get_weather", "arguments": {"location": "Lisbon"}}
```"#;

        let call = parse_tool_call(content).unwrap().unwrap();
        assert_eq!(call.tool_name, "get_weather");
        assert_eq!(call.arguments["location"], "Lisbon");
        assert!(call.id.is_some());
    }

    #[test]
    fn test_parse_inline_tool_call() {
        let content = r#"{"tool": "search_web", "arguments": {"query": "rust"}}"#;
        let call = parse_tool_call(content).unwrap().unwrap();
        assert_eq!(call.tool_name, "search_web");
    }

    #[test]
    fn test_plain_answer() {
        assert_eq!(parse_tool_call("It is 12°C in Lisbon.").unwrap(), None);
    }

    #[test]
    fn test_malformed_block_is_parse_error() {
        let content = "```tool\n{\"tool\": \"get_weather\", \"arguments\": \n```";
        assert!(matches!(parse_tool_call(content), Err(AgentError::Parse(_))));

        let unterminated = "```tool\n{\"tool\": \"get_weather\"}";
        assert!(matches!(parse_tool_call(unterminated), Err(AgentError::Parse(_))));
    }

    #[test]
    fn test_prompt_section_lists_parameters() {
        let spec = ToolSpec::new("get_weather", "Current weather")
            .parameter(ParameterSchema::required("location", ParamType::String, "City"));
        let prompt = prompt_section(&[spec]);

        assert!(prompt.contains("### get_weather"));
        assert!(prompt.contains("- `location` (string) (required): City"));
    }
}
