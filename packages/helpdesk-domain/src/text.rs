//! Text normalization shared by lexical scoring and catalog browsing.

use std::collections::HashSet;

use unicode_script::{Script, UnicodeScript};

pub const MIN_TOKEN_CHARS: usize = 2;

/// Lower-cases `text`, keeps ASCII alphanumerics and Hangul, and collapses every other run of
/// characters into a single space.
pub fn normalize(text: &str) -> String {
	let mut out = String::with_capacity(text.len());
	let mut pending_space = false;

	for ch in text.chars().flat_map(char::to_lowercase) {
		if is_kept(ch) {
			if pending_space && !out.is_empty() {
				out.push(' ');
			}

			pending_space = false;

			out.push(ch);
		} else {
			pending_space = true;
		}
	}

	out
}

/// Distinct whitespace tokens of already normalized text, dropping one-character tokens.
pub fn tokenize(normalized: &str) -> HashSet<&str> {
	normalized
		.split_whitespace()
		.filter(|token| token.chars().count() >= MIN_TOKEN_CHARS)
		.collect()
}

/// Number of distinct tokens of `field` that also appear in `query_tokens`.
pub fn token_hits(query_tokens: &HashSet<&str>, field: &str) -> u32 {
	let normalized = normalize(field);

	if normalized.is_empty() {
		return 0;
	}

	tokenize(&normalized).into_iter().filter(|token| query_tokens.contains(token)).count() as u32
}

fn is_kept(ch: char) -> bool {
	ch.is_ascii_alphanumeric() || (!ch.is_whitespace() && ch.script() == Script::Hangul)
}
