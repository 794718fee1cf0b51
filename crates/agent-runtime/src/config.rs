//! Environment-driven backend selection.

use std::{fmt, str::FromStr, sync::Arc};

use agent_core::{
    error::{AgentError, Result},
    provider::{GenerationOptions, ModelBackend},
    reasoning::DEFAULT_MAX_ITERATIONS,
};

use crate::{GeminiBackend, GeminiConfig, OpenAiBackend, OpenAiConfig};

#[cfg(feature = "ollama")]
use crate::{OllamaBackend, OllamaConfig};

/// Which hosted or local model serves the conversation
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    #[default]
    Gemini,
    Ollama,
}

impl ProviderKind {
    pub const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o-mini",
            Self::Gemini => "gemini-2.0-flash",
            Self::Ollama => "llama3.2",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = AgentError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "gemini" | "google" => Ok(Self::Gemini),
            "ollama" => Ok(Self::Ollama),
            other => Err(AgentError::Config(format!(
                "unknown provider '{other}' (expected openai, gemini or ollama)"
            ))),
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::OpenAi => "openai",
            Self::Gemini => "gemini",
            Self::Ollama => "ollama",
        })
    }
}

/// Everything needed to construct a backend and the loop around it
#[derive(Clone)]
pub struct RuntimeConfig {
    pub provider: ProviderKind,
    pub options: GenerationOptions,
    pub max_iterations: usize,

    pub openai_api_key: Option<String>,
    pub openai_base_url: Option<String>,

    pub google_api_key: Option<String>,
    pub gemini_system_instruction: bool,

    pub ollama_host: String,
    pub ollama_port: u16,
}

impl fmt::Debug for RuntimeConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let redact = |key: &Option<String>| key.as_ref().map(|_| "[REDACTED]");
        f.debug_struct("RuntimeConfig")
            .field("provider", &self.provider)
            .field("options", &self.options)
            .field("max_iterations", &self.max_iterations)
            .field("openai_api_key", &redact(&self.openai_api_key))
            .field("openai_base_url", &self.openai_base_url)
            .field("google_api_key", &redact(&self.google_api_key))
            .field("gemini_system_instruction", &self.gemini_system_instruction)
            .field("ollama_host", &self.ollama_host)
            .field("ollama_port", &self.ollama_port)
            .finish()
    }
}

impl RuntimeConfig {
    /// Read configuration from the process environment
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary variable lookup
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let provider = var("ASSISTANT_PROVIDER")
            .map(|p| p.parse::<ProviderKind>())
            .transpose()?
            .unwrap_or_default();

        let mut options = GenerationOptions::default()
            .with_model(var("ASSISTANT_MODEL").unwrap_or_else(|| provider.default_model().into()));
        if let Some(temperature) = parse_var(&var, "ASSISTANT_TEMPERATURE")? {
            options = options.with_temperature(temperature);
        }
        if let Some(max_tokens) = parse_var(&var, "ASSISTANT_MAX_TOKENS")? {
            options = options.with_max_tokens(max_tokens);
        }
        if let Some(top_p) = parse_var(&var, "ASSISTANT_TOP_P")? {
            options = options.with_top_p(top_p);
        }
        if let Some(top_k) = parse_var(&var, "ASSISTANT_TOP_K")? {
            options = options.with_top_k(Some(top_k));
        }
        if let Some(prompt) = var("ASSISTANT_SYSTEM_PROMPT") {
            options = options.with_system_prompt(prompt);
        }

        let max_iterations = parse_var(&var, "ASSISTANT_MAX_ITERATIONS")?.unwrap_or(DEFAULT_MAX_ITERATIONS);
        if max_iterations == 0 {
            return Err(AgentError::Config("ASSISTANT_MAX_ITERATIONS must be at least 1".into()));
        }

        Ok(Self {
            provider,
            options,
            max_iterations,
            openai_api_key: var("OPENAI_API_KEY"),
            openai_base_url: var("OPENAI_BASE_URL"),
            google_api_key: var("GOOGLE_API_KEY"),
            gemini_system_instruction: parse_var(&var, "GEMINI_SYSTEM_INSTRUCTION")?.unwrap_or(true),
            ollama_host: var("OLLAMA_HOST").unwrap_or_else(|| "http://localhost".into()),
            ollama_port: parse_var(&var, "OLLAMA_PORT")?.unwrap_or(11434),
        })
    }

    /// Construct the selected backend.
    ///
    /// A hosted provider without its credential is a configuration error.
    pub fn build_backend(&self) -> Result<Arc<dyn ModelBackend>> {
        match self.provider {
            ProviderKind::OpenAi => {
                let key = self
                    .openai_api_key
                    .clone()
                    .ok_or_else(|| AgentError::Config("OPENAI_API_KEY is not set".into()))?;
                let mut config = OpenAiConfig::new(key);
                if let Some(base_url) = &self.openai_base_url {
                    config = config.with_base_url(base_url.clone());
                }
                Ok(Arc::new(OpenAiBackend::new(config, self.options.clone())?))
            }
            ProviderKind::Gemini => {
                let key = self
                    .google_api_key
                    .clone()
                    .ok_or_else(|| AgentError::Config("GOOGLE_API_KEY is not set".into()))?;
                let config = GeminiConfig::new(key).with_system_instruction(self.gemini_system_instruction);
                Ok(Arc::new(GeminiBackend::new(config, self.options.clone())?))
            }
            #[cfg(feature = "ollama")]
            ProviderKind::Ollama => {
                let config = OllamaConfig {
                    host: self.ollama_host.clone(),
                    port: self.ollama_port,
                };
                Ok(Arc::new(OllamaBackend::new(&config, self.options.clone())))
            }
            #[cfg(not(feature = "ollama"))]
            ProviderKind::Ollama => Err(AgentError::Config(
                "agent-runtime was built without the `ollama` feature".into(),
            )),
        }
    }
}

fn parse_var<T, F>(var: &F, key: &str) -> Result<Option<T>>
where
    T: FromStr,
    T::Err: fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    var(key)
        .map(|raw| {
            raw.parse::<T>()
                .map_err(|e| AgentError::Config(format!("invalid {key} '{raw}': {e}")))
        })
        .transpose()
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;

    use super::*;
    use agent_core::ErrorKind;

    fn config(vars: &[(&str, &str)]) -> Result<RuntimeConfig> {
        let map: HashMap<String, String> = vars.iter().map(|(k, v)| ((*k).to_string(), (*v).to_string())).collect();
        RuntimeConfig::from_lookup(|key| map.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config(&[]).unwrap();
        assert_eq!(config.provider, ProviderKind::Gemini);
        assert_eq!(config.options.model, "gemini-2.0-flash");
        assert!((config.options.temperature - 0.0).abs() < f32::EPSILON);
        assert_eq!(config.options.max_tokens, 1024);
        assert_eq!(config.options.top_k, Some(40));
        assert_eq!(config.max_iterations, DEFAULT_MAX_ITERATIONS);
        assert!(config.gemini_system_instruction);
        assert_eq!(config.ollama_port, 11434);
    }

    #[test]
    fn test_overrides() {
        let config = config(&[
            ("ASSISTANT_PROVIDER", "OpenAI"),
            ("ASSISTANT_TEMPERATURE", "0.7"),
            ("ASSISTANT_MAX_ITERATIONS", "3"),
            ("GEMINI_SYSTEM_INSTRUCTION", "false"),
        ])
        .unwrap();

        assert_eq!(config.provider, ProviderKind::OpenAi);
        assert_eq!(config.options.model, "gpt-4o-mini");
        assert!((config.options.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(config.max_iterations, 3);
        assert!(!config.gemini_system_instruction);
    }

    #[test]
    fn test_malformed_values() {
        let err = config(&[("ASSISTANT_MAX_TOKENS", "lots")]).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);

        assert!(config(&[("ASSISTANT_PROVIDER", "anthropic")]).is_err());
        assert!(config(&[("ASSISTANT_MAX_ITERATIONS", "0")]).is_err());
    }

    #[test]
    fn test_missing_credentials() {
        let err = config(&[]).unwrap().build_backend().err().unwrap();
        assert_eq!(err.kind(), ErrorKind::ConfigurationError);

        let err = config(&[("ASSISTANT_PROVIDER", "openai")]).unwrap().build_backend().err().unwrap();
        assert!(err.to_string().contains("OPENAI_API_KEY"));
    }

    #[test]
    fn test_build_hosted_backend() {
        let backend = config(&[("GOOGLE_API_KEY", "key")]).unwrap().build_backend().unwrap();
        assert_eq!(backend.name(), "Gemini");
    }

    #[test]
    fn test_debug_redacts_keys() {
        let config = config(&[("GOOGLE_API_KEY", "super-secret")]).unwrap();
        assert!(!format!("{config:?}").contains("super-secret"));
    }
}
