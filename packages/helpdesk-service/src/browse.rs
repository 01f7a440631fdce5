use crate::{Error, HelpService, Result};
use helpdesk_domain::HelpCard;

impl HelpService {
	pub fn categories(&self) -> Vec<String> {
		self.catalog().categories()
	}

	pub fn list(&self, category: &str, query: &str) -> Vec<HelpCard> {
		self.catalog().list(category, query).into_iter().cloned().collect()
	}

	pub fn get(&self, id: &str) -> Result<HelpCard> {
		let id = id.trim();

		self.catalog()
			.get(id)
			.cloned()
			.ok_or_else(|| Error::NotFound { message: format!("Help card {id} not found.") })
	}
}
