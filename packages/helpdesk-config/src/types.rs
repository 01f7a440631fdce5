use std::path::PathBuf;

use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
	pub service: Service,
	#[serde(default)]
	pub catalog: Catalog,
	pub cache: Cache,
	pub providers: Providers,
	#[serde(default)]
	pub dialog: Dialog,
	#[serde(default)]
	pub recommend: Recommend,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct Catalog {
	/// Optional. Replaces the bundled help-card definition when set.
	pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Cache {
	pub path: PathBuf,
	/// Embeds every card whose cached vector is missing or stale before serving starts.
	#[serde(default)]
	pub build_on_startup: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
	pub llm: LlmProviderConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct EmbeddingProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	/// An empty key keeps the service in lexical mode.
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LlmProviderConfig {
	pub provider_id: String,
	pub api_base: String,
	#[serde(default)]
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub temperature: f32,
	#[serde(default = "default_max_output_tokens")]
	pub max_output_tokens: u32,
	pub timeout_ms: u64,
	/// Requests JSON-object output for dialog plans when the provider supports it.
	#[serde(default = "default_structured_output")]
	pub structured_output: bool,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Dialog {
	pub max_history_turns: u32,
}
impl Default for Dialog {
	fn default() -> Self {
		Self { max_history_turns: 6 }
	}
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Recommend {
	pub max_limit: u32,
	/// Minimum recommendation confidence for the chat brief to present matches as strong.
	pub confidence_threshold: f32,
}
impl Default for Recommend {
	fn default() -> Self {
		Self { max_limit: 20, confidence_threshold: 0.35 }
	}
}

fn default_max_output_tokens() -> u32 {
	220
}

fn default_structured_output() -> bool {
	true
}
