use std::collections::HashMap;

use serde::Serialize;
use time::{OffsetDateTime, format_description::well_known::Rfc3339};

use crate::HelpService;
use helpdesk_domain::{
	CardCatalog,
	embedding_text::{content_hash, embedding_text},
};
use helpdesk_storage::{VectorCacheEntry, VectorSnapshot};

/// Card id to vector, restricted to catalog cards whose cached hash is current.
#[derive(Debug, Clone, Default)]
pub struct VectorIndex {
	vectors: HashMap<String, Vec<f32>>,
}
impl VectorIndex {
	pub fn new(vectors: HashMap<String, Vec<f32>>) -> Self {
		Self { vectors }
	}

	pub fn from_snapshot(catalog: &CardCatalog, snapshot: &VectorSnapshot) -> Self {
		let mut vectors = HashMap::new();

		for card in catalog.cards() {
			let Some(entry) = snapshot.vectors.get(&card.id) else { continue };

			if entry.is_valid_for(&content_hash(&embedding_text(card))) {
				vectors.insert(card.id.clone(), entry.vector.clone());
			} else {
				tracing::debug!(card_id = %card.id, "Cached vector is stale.");
			}
		}

		Self { vectors }
	}

	pub fn get(&self, card_id: &str) -> Option<&[f32]> {
		self.vectors.get(card_id).map(Vec::as_slice)
	}

	pub fn len(&self) -> usize {
		self.vectors.len()
	}

	pub fn is_empty(&self) -> bool {
		self.vectors.is_empty()
	}
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct RebuildReport {
	/// True when no embedding credential is configured and nothing was attempted.
	pub skipped: bool,
	pub reused: usize,
	pub created: usize,
	pub failed: usize,
	pub total: usize,
	pub saved: bool,
}

impl HelpService {
	/// Embeds every card whose cached vector is missing or stale, persists the snapshot, and swaps
	/// in a new index. Rebuilds are serialized; readers keep the previous index until the swap.
	pub async fn rebuild_embeddings(&self) -> RebuildReport {
		let _guard = self.rebuild_lock.lock().await;
		let cfg = &self.cfg.providers.embedding;

		if !self.providers.embedding.is_ready(cfg) {
			let total = self.index().len();

			tracing::info!(vectors = total, "Embedding provider not configured; rebuild skipped.");

			return RebuildReport { skipped: true, total, ..Default::default() };
		}

		let catalog = self.catalog();
		let mut snapshot = self.cache().load();
		let mut vectors = HashMap::with_capacity(catalog.len());
		let mut report = RebuildReport::default();

		for card in catalog.cards() {
			let text = embedding_text(card);
			let hash = content_hash(&text);

			if let Some(entry) = snapshot.vectors.get(&card.id)
				&& entry.is_valid_for(&hash)
			{
				vectors.insert(card.id.clone(), entry.vector.clone());

				report.reused += 1;

				continue;
			}

			match self.providers.embedding.embed(cfg, &text).await {
				Ok(vector) if !vector.is_empty() => {
					snapshot.vectors.insert(card.id.clone(), VectorCacheEntry {
						content_hash: hash,
						vector: vector.clone(),
					});
					vectors.insert(card.id.clone(), vector);

					report.created += 1;
				},
				Ok(_) => {
					tracing::warn!(card_id = %card.id, "Embedding provider returned an empty vector.");

					report.failed += 1;
				},
				Err(err) => {
					crate::log_provider_failure("embed_card", &err, Some(&card.id));

					report.failed += 1;
				},
			}
		}

		snapshot.version = catalog.version().to_string();
		snapshot.updated_at = catalog
			.updated_at()
			.map(str::to_string)
			.or_else(|| OffsetDateTime::now_utc().format(&Rfc3339).ok());
		snapshot.embedding_model = format!("{}:{}", cfg.provider_id, cfg.model);
		report.saved = self.cache().save(&snapshot);
		report.total = vectors.len();

		self.swap_index(VectorIndex::new(vectors));

		tracing::info!(
			reused = report.reused,
			created = report.created,
			failed = report.failed,
			total = report.total,
			saved = report.saved,
			"Embedding rebuild finished."
		);

		report
	}
}
