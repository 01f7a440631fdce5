use std::fmt::Write;

use crate::HelpCard;

/// Canonical text of a card: the exact input that is hashed and sent to the embedding provider.
pub fn embedding_text(card: &HelpCard) -> String {
	let mut out = String::new();

	// Writing to a String cannot fail.
	let _ = writeln!(out, "category: {}", card.category);
	let _ = writeln!(out, "title: {}", card.title);

	if !card.symptoms.is_empty() {
		let _ = writeln!(out, "symptoms: {}", card.symptoms.join(", "));
	}
	if !card.tags.is_empty() {
		let _ = writeln!(out, "tags: {}", card.tags.join(", "));
	}
	if !card.quick_checks.is_empty() {
		let _ = writeln!(out, "quickChecks: {}", card.quick_checks.join(" | "));
	}
	if !card.steps.is_empty() {
		out.push_str("steps:\n");

		for step in &card.steps {
			let _ = writeln!(out, "- {}: {}", step.label, step.detail);
		}
	}

	out
}

/// Hex BLAKE3 digest used as the cache invalidation key.
pub fn content_hash(text: &str) -> String {
	blake3::hash(text.as_bytes()).to_hex().to_string()
}

pub fn card_hash(card: &HelpCard) -> String {
	content_hash(&embedding_text(card))
}
