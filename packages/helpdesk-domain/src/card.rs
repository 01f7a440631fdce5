use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HelpCard {
	pub id: String,
	pub category: String,
	pub title: String,
	#[serde(default)]
	pub symptoms: Vec<String>,
	#[serde(default)]
	pub tags: Vec<String>,
	#[serde(default)]
	pub quick_checks: Vec<String>,
	#[serde(default)]
	pub steps: Vec<Step>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Step {
	#[serde(default)]
	pub label: String,
	#[serde(default)]
	pub detail: String,
}

/// On-disk shape of a help-card definition file.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogFile {
	#[serde(default = "default_version")]
	pub version: String,
	#[serde(default)]
	pub updated_at: Option<String>,
	#[serde(default)]
	pub cards: Vec<HelpCard>,
}

fn default_version() -> String {
	"unknown".to_string()
}
