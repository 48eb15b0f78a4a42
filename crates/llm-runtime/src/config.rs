//! Runtime Configuration
//!
//! Provider selection and generation settings, read once from the
//! environment at startup. Missing credentials are a fatal `Config` error.

use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use llm_core::{GenerationOptions, LlmError, LlmProvider, Result, ScriptedProvider};

use crate::openai::{OpenAiConfig, OpenAiProvider};

#[cfg(feature = "ollama")]
use crate::ollama::{OllamaConfig, OllamaProvider};

/// Which gateway backs the advisor
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ProviderKind {
    OpenAi,
    Ollama,
    Mock,
}

impl ProviderKind {
    const fn default_model(self) -> &'static str {
        match self {
            Self::OpenAi => "gpt-4o",
            Self::Ollama => "llama3.2",
            Self::Mock => "scripted",
        }
    }
}

impl FromStr for ProviderKind {
    type Err = LlmError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "openai" => Ok(Self::OpenAi),
            "ollama" => Ok(Self::Ollama),
            "mock" => Ok(Self::Mock),
            other => Err(LlmError::Config(format!("unknown LLM_PROVIDER '{other}'"))),
        }
    }
}

/// Everything needed to build a gateway
#[derive(Clone, Debug)]
pub struct RuntimeConfig {
    pub provider: ProviderKind,
    pub generation: GenerationOptions,
    /// Upper bound on a single generation (None = wait indefinitely)
    pub timeout: Option<Duration>,
    pub openai: Option<OpenAiConfig>,
    pub ollama_host: String,
    pub ollama_port: u16,
}

impl RuntimeConfig {
    /// Read configuration from process environment variables
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Read configuration through an arbitrary lookup (used by tests)
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let get = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        let provider = get("LLM_PROVIDER")
            .map(|v| v.parse::<ProviderKind>())
            .transpose()?
            .unwrap_or(ProviderKind::OpenAi);

        let generation = GenerationOptions {
            model: get("LLM_MODEL").unwrap_or_else(|| provider.default_model().into()),
            temperature: parse_var(&get, "LLM_TEMPERATURE")?.unwrap_or(0.0),
            max_tokens: parse_var(&get, "LLM_MAX_TOKENS")?.unwrap_or(2048),
        };

        let timeout_secs: u64 = parse_var(&get, "LLM_TIMEOUT_SECS")?.unwrap_or(120);
        let timeout = (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs));

        let openai = if provider == ProviderKind::OpenAi {
            let key = get("OPENAI_API_KEY")
                .ok_or_else(|| LlmError::Config("OPENAI_API_KEY is not set".into()))?;
            let mut config = OpenAiConfig::new(key)?;
            if let Some(base_url) = get("OPENAI_BASE_URL") {
                config = config.with_base_url(base_url);
            }
            Some(config)
        } else {
            None
        };

        Ok(Self {
            provider,
            generation,
            timeout,
            openai,
            ollama_host: get("OLLAMA_HOST").unwrap_or_else(|| "http://localhost".into()),
            ollama_port: parse_var(&get, "OLLAMA_PORT")?.unwrap_or(11434),
        })
    }
}

fn parse_var<T: FromStr>(get: &impl Fn(&str) -> Option<String>, key: &str) -> Result<Option<T>> {
    get(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|_| LlmError::Config(format!("{key} has invalid value '{raw}'")))
        })
        .transpose()
}

/// Construct the configured gateway
pub fn build_provider(config: &RuntimeConfig) -> Result<Arc<dyn LlmProvider>> {
    match config.provider {
        ProviderKind::OpenAi => {
            let openai = config
                .openai
                .clone()
                .ok_or_else(|| LlmError::Config("OpenAI selected without credentials".into()))?;
            Ok(Arc::new(OpenAiProvider::new(openai)))
        }
        #[cfg(feature = "ollama")]
        ProviderKind::Ollama => Ok(Arc::new(OllamaProvider::from_config(OllamaConfig {
            host: config.ollama_host.clone(),
            port: config.ollama_port,
        }))),
        #[cfg(not(feature = "ollama"))]
        ProviderKind::Ollama => Err(LlmError::Config(
            "built without the `ollama` feature".into(),
        )),
        ProviderKind::Mock => Ok(Arc::new(ScriptedProvider::canned())),
    }
}
