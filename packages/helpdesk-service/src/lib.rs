pub mod browse;
pub mod chat;
pub mod dialog;
pub mod index;
pub mod recommend;

mod error;

use std::{
	future::Future,
	pin::Pin,
	sync::{Arc, RwLock},
};

pub use chat::{CHAT_CARD_LIMIT, ChatContext, ChatRequest, ChatResponse, HistoryItem};
pub use dialog::PlanRequest;
pub use error::{Error, Result};
pub use index::{RebuildReport, VectorIndex};
pub use recommend::{RecommendMethod, Recommendation};

use helpdesk_config::{Config, EmbeddingProviderConfig, LlmProviderConfig};
use helpdesk_domain::CardCatalog;
use helpdesk_providers::completion::{self, CompletionParams};
use helpdesk_storage::VectorCacheFile;

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	/// Whether a call can succeed at all. A keyless provider is not ready.
	fn is_ready(&self, cfg: &EmbeddingProviderConfig) -> bool {
		!cfg.api_key.trim().is_empty()
	}

	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, helpdesk_providers::Result<Vec<f32>>>;
}

pub trait CompletionProvider
where
	Self: Send + Sync,
{
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		instructions: &'a str,
		input: &'a str,
		params: CompletionParams,
	) -> BoxFuture<'a, helpdesk_providers::Result<String>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
	pub completion: Arc<dyn CompletionProvider>,
}

pub struct HelpService {
	pub cfg: Config,
	pub providers: Providers,
	catalog: Arc<CardCatalog>,
	index: RwLock<Arc<VectorIndex>>,
	cache: VectorCacheFile,
	rebuild_lock: tokio::sync::Mutex<()>,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		text: &'a str,
	) -> BoxFuture<'a, helpdesk_providers::Result<Vec<f32>>> {
		Box::pin(helpdesk_providers::embedding::embed(cfg, text))
	}
}

impl CompletionProvider for DefaultProviders {
	fn complete<'a>(
		&'a self,
		cfg: &'a LlmProviderConfig,
		instructions: &'a str,
		input: &'a str,
		params: CompletionParams,
	) -> BoxFuture<'a, helpdesk_providers::Result<String>> {
		Box::pin(completion::send(cfg, instructions, input, params))
	}
}

impl Providers {
	pub fn new(
		embedding: Arc<dyn EmbeddingProvider>,
		completion: Arc<dyn CompletionProvider>,
	) -> Self {
		Self { embedding, completion }
	}
}

impl Default for Providers {
	fn default() -> Self {
		let provider = Arc::new(DefaultProviders);

		Self { embedding: provider.clone(), completion: provider }
	}
}

impl HelpService {
	pub fn new(cfg: Config, catalog: CardCatalog) -> Self {
		Self::with_providers(cfg, catalog, Providers::default())
	}

	/// Builds the service from the catalog and whatever valid vectors the cache file holds. No
	/// provider is called.
	pub fn with_providers(cfg: Config, catalog: CardCatalog, providers: Providers) -> Self {
		let cache = VectorCacheFile::new(cfg.cache.path.clone());
		let index = VectorIndex::from_snapshot(&catalog, &cache.load());

		tracing::info!(
			cards = catalog.len(),
			cached_vectors = index.len(),
			catalog_version = catalog.version(),
			"Help card catalog loaded."
		);

		Self {
			cfg,
			providers,
			catalog: Arc::new(catalog),
			index: RwLock::new(Arc::new(index)),
			cache,
			rebuild_lock: tokio::sync::Mutex::new(()),
		}
	}

	/// Startup path: loads the catalog named by the config, restores cached vectors, and runs the
	/// embedding rebuild once when `cache.build_on_startup` is set.
	pub async fn start(cfg: Config, providers: Providers) -> Result<Self> {
		let catalog = CardCatalog::load(cfg.catalog.path.as_deref())?;
		let build_on_startup = cfg.cache.build_on_startup;
		let service = Self::with_providers(cfg, catalog, providers);

		if build_on_startup {
			service.rebuild_embeddings().await;
		} else {
			tracing::info!(
				vectors = service.index().len(),
				"Startup embedding build disabled; serving cached vectors only."
			);
		}

		Ok(service)
	}

	pub fn catalog(&self) -> &CardCatalog {
		&self.catalog
	}

	/// Current vector index snapshot. Holding the returned `Arc` never blocks a rebuild.
	pub fn index(&self) -> Arc<VectorIndex> {
		self.index.read().unwrap_or_else(|err| err.into_inner()).clone()
	}

	pub fn embeddings_ready(&self) -> bool {
		self.providers.embedding.is_ready(&self.cfg.providers.embedding)
	}

	pub(crate) fn swap_index(&self, index: VectorIndex) {
		*self.index.write().unwrap_or_else(|err| err.into_inner()) = Arc::new(index);
	}

	pub(crate) fn cache(&self) -> &VectorCacheFile {
		&self.cache
	}
}

pub(crate) fn log_provider_failure(
	operation: &'static str,
	err: &helpdesk_providers::Error,
	card_id: Option<&str>,
) {
	if err.is_unavailable() {
		tracing::debug!(operation, card_id, "Provider not configured.");
	} else {
		tracing::warn!(operation, card_id, error = %err, "Provider call failed.");
	}
}
