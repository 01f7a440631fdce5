use std::{collections::HashMap, fs, path::Path};

use crate::{CatalogFile, Error, HelpCard, Result, text};

const BUNDLED_CATALOG_JSON: &str = include_str!("../data/help-cards.json");

pub const MAX_LIST_RESULTS: usize = 200;

/// Immutable help-card catalog with an id index. Catalog order is the definition file order.
#[derive(Debug, Clone)]
pub struct CardCatalog {
	version: String,
	updated_at: Option<String>,
	cards: Vec<HelpCard>,
	by_id: HashMap<String, usize>,
}
impl CardCatalog {
	pub fn bundled() -> Result<Self> {
		Self::from_json(BUNDLED_CATALOG_JSON)
	}

	/// Loads the catalog at `path`, or the bundled definition when no path is given.
	pub fn load(path: Option<&Path>) -> Result<Self> {
		let Some(path) = path else { return Self::bundled() };
		let raw = fs::read_to_string(path)
			.map_err(|err| Error::ReadCatalog { path: path.to_path_buf(), source: err })?;

		Self::from_json(&raw)
	}

	pub fn from_json(raw: &str) -> Result<Self> {
		let file: CatalogFile =
			serde_json::from_str(raw).map_err(|err| Error::ParseCatalog { source: err })?;

		Ok(Self::from_file(file))
	}

	pub fn from_file(file: CatalogFile) -> Self {
		let mut cards = Vec::with_capacity(file.cards.len());
		let mut by_id = HashMap::with_capacity(file.cards.len());

		for card in file.cards {
			if card.id.trim().is_empty() || by_id.contains_key(&card.id) {
				continue;
			}

			by_id.insert(card.id.clone(), cards.len());
			cards.push(card);
		}

		Self { version: file.version, updated_at: file.updated_at, cards, by_id }
	}

	pub fn from_cards(cards: Vec<HelpCard>) -> Self {
		Self::from_file(CatalogFile { version: "test".to_string(), updated_at: None, cards })
	}

	pub fn version(&self) -> &str {
		&self.version
	}

	pub fn updated_at(&self) -> Option<&str> {
		self.updated_at.as_deref()
	}

	pub fn cards(&self) -> &[HelpCard] {
		&self.cards
	}

	pub fn len(&self) -> usize {
		self.cards.len()
	}

	pub fn is_empty(&self) -> bool {
		self.cards.is_empty()
	}

	pub fn get(&self, id: &str) -> Option<&HelpCard> {
		self.by_id.get(id).map(|&index| &self.cards[index])
	}

	pub fn contains(&self, id: &str) -> bool {
		self.by_id.contains_key(id)
	}

	/// Sorted distinct categories present in the catalog.
	pub fn categories(&self) -> Vec<String> {
		let mut out: Vec<String> = self
			.cards
			.iter()
			.map(|card| card.category.clone())
			.filter(|category| !category.trim().is_empty())
			.collect();

		out.sort();
		out.dedup();

		out
	}

	/// Browsing filter: normalized category equality plus normalized substring containment of
	/// `query` in the title, a symptom, or a tag. Blank arguments do not filter.
	pub fn list(&self, category: &str, query: &str) -> Vec<&HelpCard> {
		let category = text::normalize(category);
		let query = text::normalize(query);

		self.cards
			.iter()
			.filter(|card| matches_category(card, &category))
			.filter(|card| query.is_empty() || contains_query(card, &query))
			.take(MAX_LIST_RESULTS)
			.collect()
	}
}

/// `normalized_category` must already be normalized; an empty value matches every card.
pub fn matches_category(card: &HelpCard, normalized_category: &str) -> bool {
	normalized_category.is_empty() || text::normalize(&card.category) == normalized_category
}

fn contains_query(card: &HelpCard, normalized_query: &str) -> bool {
	std::iter::once(&card.title)
		.chain(card.symptoms.iter())
		.chain(card.tags.iter())
		.any(|field| text::normalize(field).contains(normalized_query))
}
