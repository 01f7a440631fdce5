use std::collections::HashSet;

use serde::Serialize;

use crate::{HelpService, VectorIndex};
use helpdesk_domain::{
	CardCatalog, HelpCard,
	catalog::matches_category,
	text::{self, token_hits},
};

const TITLE_WEIGHT: u32 = 2;
const SYMPTOM_WEIGHT: u32 = 6;
const TAG_WEIGHT: u32 = 3;
const QUICK_CHECK_WEIGHT: u32 = 1;
const STEP_WEIGHT: u32 = 1;

/// Hand-picked cards shown when nothing better is known, in display order.
const CURATED: [(&str, [&str; 3]); 3] = [
	("camera", ["cam-001", "cam-004", "cam-005"]),
	("call", ["call-010", "call-001", "call-007"]),
	("error", ["err-001", "err-003", "err-008"]),
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RecommendMethod {
	Embeddings,
	None,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
	pub cards: Vec<HelpCard>,
	/// Maximum cosine similarity over the scored set; zero for every non-semantic tier.
	pub confidence: f32,
	pub method: RecommendMethod,
}
impl Recommendation {
	fn unscored(cards: Vec<&HelpCard>) -> Self {
		Self {
			cards: cards.into_iter().cloned().collect(),
			confidence: 0.0,
			method: RecommendMethod::None,
		}
	}

	pub fn card_ids(&self) -> Vec<String> {
		self.cards.iter().map(|card| card.id.clone()).collect()
	}

	/// Whether semantic matching was used and cleared `threshold`.
	pub fn is_confident(&self, threshold: f32) -> bool {
		self.method == RecommendMethod::Embeddings && self.confidence >= threshold
	}
}

impl HelpService {
	/// Ranks cards for `query` with the best tier available. Never fails; at most `limit` cards.
	pub async fn recommend(&self, category: &str, query: &str, limit: usize) -> Recommendation {
		let limit = self.clamp_limit(limit);
		let category = text::normalize(category);
		let query = query.trim();
		let catalog = self.catalog();

		if query.is_empty() {
			return Recommendation::unscored(curated_fallback(catalog, &category, limit));
		}

		let index = self.index();

		if index.is_empty() || !self.embeddings_ready() {
			tracing::debug!(vectors = index.len(), "Semantic tier unavailable; using lexical.");

			return Recommendation::unscored(lexical_rank(catalog, &category, query, limit));
		}

		let embedded = self.providers.embedding.embed(&self.cfg.providers.embedding, query).await;
		let query_vector = match embedded {
			Ok(vector) if !vector.is_empty() => vector,
			Ok(_) => {
				tracing::warn!("Query embedding is empty; using lexical.");

				return Recommendation::unscored(lexical_rank(catalog, &category, query, limit));
			},
			Err(err) => {
				crate::log_provider_failure("embed_query", &err, None);

				return Recommendation::unscored(lexical_rank(catalog, &category, query, limit));
			},
		};
		let (cards, max_similarity) =
			semantic_rank(catalog, &index, &category, &query_vector, limit);

		if cards.is_empty() {
			return Recommendation::unscored(curated_fallback(catalog, &category, limit));
		}

		Recommendation {
			cards: cards.into_iter().cloned().collect(),
			confidence: max_similarity.clamp(0.0, 1.0),
			method: RecommendMethod::Embeddings,
		}
	}

	pub fn clamp_limit(&self, limit: usize) -> usize {
		limit.clamp(1, self.cfg.recommend.max_limit.max(1) as usize)
	}
}

/// Cosine similarity over the shorter of the two lengths; zero when either norm is zero.
pub fn cosine(a: &[f32], b: &[f32]) -> f32 {
	let n = a.len().min(b.len());
	let (mut dot, mut norm_a, mut norm_b) = (0.0_f64, 0.0_f64, 0.0_f64);

	for i in 0..n {
		let (x, y) = (a[i] as f64, b[i] as f64);

		dot += x * y;
		norm_a += x * x;
		norm_b += y * y;
	}

	if norm_a == 0.0 || norm_b == 0.0 {
		return 0.0;
	}

	(dot / (norm_a.sqrt() * norm_b.sqrt())) as f32
}

/// Cards with a vector, ordered by similarity to `query_vector` (stable on catalog order), plus
/// the maximum similarity seen, floored at zero.
pub fn semantic_rank<'a>(
	catalog: &'a CardCatalog,
	index: &VectorIndex,
	category: &str,
	query_vector: &[f32],
	limit: usize,
) -> (Vec<&'a HelpCard>, f32) {
	let mut scored = Vec::new();
	let mut max_similarity = 0.0_f32;

	for card in catalog.cards().iter().filter(|card| matches_category(card, category)) {
		let Some(vector) = index.get(&card.id) else { continue };
		let similarity = cosine(query_vector, vector);

		max_similarity = max_similarity.max(similarity);

		scored.push((card, similarity));
	}

	scored.sort_by(|(_, a), (_, b)| b.total_cmp(a));

	(scored.into_iter().take(limit).map(|(card, _)| card).collect(), max_similarity)
}

/// Weighted token-overlap ranking; falls through to the curated list when nothing scores.
pub fn lexical_rank<'a>(
	catalog: &'a CardCatalog,
	category: &str,
	query: &str,
	limit: usize,
) -> Vec<&'a HelpCard> {
	let normalized = text::normalize(query);
	let query_tokens = text::tokenize(&normalized);
	let mut scored: Vec<(&HelpCard, u32)> = catalog
		.cards()
		.iter()
		.filter(|card| matches_category(card, category))
		.map(|card| (card, lexical_score(card, &query_tokens)))
		.filter(|(_, score)| *score > 0)
		.collect();

	if scored.is_empty() {
		return curated_fallback(catalog, category, limit);
	}

	scored.sort_by(|(_, a), (_, b)| b.cmp(a));

	scored.into_iter().take(limit).map(|(card, _)| card).collect()
}

pub fn lexical_score(card: &HelpCard, query_tokens: &HashSet<&str>) -> u32 {
	if query_tokens.is_empty() {
		return 0;
	}

	let weighted = |fields: &[String], weight: u32| -> u32 {
		fields.iter().map(|field| token_hits(query_tokens, field) * weight).sum()
	};
	let steps: u32 = card
		.steps
		.iter()
		.map(|step| {
			(token_hits(query_tokens, &step.label) + token_hits(query_tokens, &step.detail))
				* STEP_WEIGHT
		})
		.sum();

	token_hits(query_tokens, &card.title) * TITLE_WEIGHT
		+ weighted(&card.symptoms, SYMPTOM_WEIGHT)
		+ weighted(&card.tags, TAG_WEIGHT)
		+ weighted(&card.quick_checks, QUICK_CHECK_WEIGHT)
		+ steps
}

/// Curated ids for the category (all categories when unfiltered), else the first catalog cards
/// matching the filter.
pub fn curated_fallback<'a>(
	catalog: &'a CardCatalog,
	category: &str,
	limit: usize,
) -> Vec<&'a HelpCard> {
	let curated: Vec<&HelpCard> = CURATED
		.iter()
		.filter(|(curated_category, _)| category.is_empty() || *curated_category == category)
		.flat_map(|(_, ids)| ids.iter())
		.filter_map(|id| catalog.get(id))
		.filter(|card| matches_category(card, category))
		.take(limit)
		.collect();

	if !curated.is_empty() {
		return curated;
	}

	catalog.cards().iter().filter(|card| matches_category(card, category)).take(limit).collect()
}
