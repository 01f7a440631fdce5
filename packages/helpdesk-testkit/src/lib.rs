//! Fixtures shared by the service and API test suites: configs, cards, and scripted providers.

use std::{
	path::PathBuf,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
};

use serde_json::Map;

use helpdesk_config::{
	Cache, Catalog, Config, Dialog, EmbeddingProviderConfig, LlmProviderConfig, Providers,
	Recommend, Service,
};
use helpdesk_domain::{HelpCard, Step};
use helpdesk_providers::{Error, Result, completion::CompletionParams};
use helpdesk_service::{BoxFuture, CompletionProvider, EmbeddingProvider};

pub const TEST_API_KEY: &str = "test-key";

/// Keyless config: both providers report not ready, so the service stays lexical.
pub fn test_config(cache_path: impl Into<PathBuf>) -> Config {
	Config {
		service: Service {
			http_bind: "127.0.0.1:0".to_string(),
			admin_bind: "127.0.0.1:0".to_string(),
			log_level: "info".to_string(),
		},
		catalog: Catalog { path: None },
		cache: Cache { path: cache_path.into(), build_on_startup: false },
		providers: Providers {
			embedding: EmbeddingProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: String::new(),
				path: "/embeddings".to_string(),
				model: "test-embedding".to_string(),
				timeout_ms: 1_000,
				default_headers: Map::new(),
			},
			llm: LlmProviderConfig {
				provider_id: "test".to_string(),
				api_base: "http://127.0.0.1:1".to_string(),
				api_key: String::new(),
				path: "/responses".to_string(),
				model: "test-llm".to_string(),
				temperature: 0.2,
				max_output_tokens: 220,
				timeout_ms: 1_000,
				structured_output: true,
				default_headers: Map::new(),
			},
		},
		dialog: Dialog::default(),
		recommend: Recommend::default(),
	}
}

/// [`test_config`] with credentials on both providers.
pub fn ready_config(cache_path: impl Into<PathBuf>) -> Config {
	let mut cfg = test_config(cache_path);

	cfg.providers.embedding.api_key = TEST_API_KEY.to_string();
	cfg.providers.llm.api_key = TEST_API_KEY.to_string();

	cfg
}

pub fn card(id: &str, category: &str, title: &str, symptoms: &[&str], tags: &[&str]) -> HelpCard {
	HelpCard {
		id: id.to_string(),
		category: category.to_string(),
		title: title.to_string(),
		symptoms: symptoms.iter().map(|s| s.to_string()).collect(),
		tags: tags.iter().map(|s| s.to_string()).collect(),
		quick_checks: Vec::new(),
		steps: vec![Step { label: "Check".to_string(), detail: format!("Follow {id}.") }],
	}
}

/// Maps text to the vector of the first rule whose keyword it contains, else `fallback`.
pub struct KeywordEmbedding {
	rules: Vec<(String, Vec<f32>)>,
	fallback: Vec<f32>,
	calls: AtomicUsize,
}
impl KeywordEmbedding {
	pub fn new(rules: &[(&str, &[f32])], fallback: &[f32]) -> Self {
		Self {
			rules: rules.iter().map(|(keyword, vector)| (keyword.to_string(), vector.to_vec())).collect(),
			fallback: fallback.to_vec(),
			calls: AtomicUsize::new(0),
		}
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}

	fn vector_for(&self, text: &str) -> Vec<f32> {
		self.rules
			.iter()
			.find(|(keyword, _)| text.contains(keyword.as_str()))
			.map(|(_, vector)| vector.clone())
			.unwrap_or_else(|| self.fallback.clone())
	}
}

impl EmbeddingProvider for KeywordEmbedding {
	fn embed<'a>(
		&'a self,
		_: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let vector = self.vector_for(text);

		Box::pin(async move { Ok(vector) })
	}
}

/// Fails every call with an HTTP 500, or only texts containing `poison` when one is set.
#[derive(Default)]
pub struct FailingEmbedding {
	poison: Option<String>,
	inner: Option<KeywordEmbedding>,
	calls: AtomicUsize,
}
impl FailingEmbedding {
	pub fn always() -> Self {
		Self::default()
	}

	pub fn when_contains(poison: &str, inner: KeywordEmbedding) -> Self {
		Self { poison: Some(poison.to_string()), inner: Some(inner), calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}

impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, Result<Vec<f32>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let poisoned = self.poison.as_deref().is_none_or(|poison| text.contains(poison));

		match (&self.inner, poisoned) {
			(Some(inner), false) => inner.embed(cfg, text),
			_ => Box::pin(async {
				Err(Error::Status { status: 500, body: "embedding backend down".to_string() })
			}),
		}
	}
}

/// Answers dialog-plan calls (JSON output requested) with `plan` and chat replies with `reply`.
/// A `None` slot fails the call with an HTTP 503.
#[derive(Default)]
pub struct ScriptedCompletion {
	plan: Option<String>,
	reply: Option<String>,
	inputs: Mutex<Vec<String>>,
}
impl ScriptedCompletion {
	pub fn new(plan: Option<&str>, reply: Option<&str>) -> Self {
		Self {
			plan: plan.map(str::to_string),
			reply: reply.map(str::to_string),
			inputs: Mutex::new(Vec::new()),
		}
	}

	pub fn failing() -> Self {
		Self::default()
	}

	/// Every input received so far, in call order.
	pub fn inputs(&self) -> Vec<String> {
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).clone()
	}
}

impl CompletionProvider for ScriptedCompletion {
	fn complete<'a>(
		&'a self,
		_: &'a LlmProviderConfig,
		_: &'a str,
		input: &'a str,
		params: CompletionParams,
	) -> BoxFuture<'a, Result<String>> {
		self.inputs.lock().unwrap_or_else(|err| err.into_inner()).push(input.to_string());

		let scripted = if params.json_output { self.plan.clone() } else { self.reply.clone() };

		Box::pin(async move {
			scripted.ok_or_else(|| Error::Status { status: 503, body: "llm backend down".to_string() })
		})
	}
}
