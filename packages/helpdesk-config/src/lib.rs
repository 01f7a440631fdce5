mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Catalog, Config, Dialog, EmbeddingProviderConfig, LlmProviderConfig, Providers,
	Recommend, Service,
};

use std::{fs, path::Path};

use serde_json::{Map, Value};

pub const MAX_HISTORY_TURNS: u32 = 50;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	parse(&raw).map_err(|err| match err {
		Error::ParseConfig { source, .. } => {
			Error::ParseConfig { path: path.to_path_buf(), source }
		},
		other => other,
	})
}

/// Parses, normalizes and validates a config document that is already in memory.
pub fn parse(raw: &str) -> Result<Config> {
	let mut cfg: Config = toml::from_str(raw)
		.map_err(|err| Error::ParseConfig { path: Default::default(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	if cfg.cache.path.as_os_str().is_empty() {
		return Err(Error::Validation { message: "cache.path must be non-empty.".to_string() });
	}
	if cfg.providers.embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.providers.llm.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.llm.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !cfg.providers.llm.temperature.is_finite() {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be a finite number.".to_string(),
		});
	}
	if !(0.0..=2.0).contains(&cfg.providers.llm.temperature) {
		return Err(Error::Validation {
			message: "providers.llm.temperature must be in the range 0.0-2.0.".to_string(),
		});
	}
	if cfg.providers.llm.max_output_tokens == 0 {
		return Err(Error::Validation {
			message: "providers.llm.max_output_tokens must be greater than zero.".to_string(),
		});
	}
	if cfg.recommend.max_limit == 0 {
		return Err(Error::Validation {
			message: "recommend.max_limit must be greater than zero.".to_string(),
		});
	}
	if !cfg.recommend.confidence_threshold.is_finite() {
		return Err(Error::Validation {
			message: "recommend.confidence_threshold must be a finite number.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&cfg.recommend.confidence_threshold) {
		return Err(Error::Validation {
			message: "recommend.confidence_threshold must be in the range 0.0-1.0.".to_string(),
		});
	}
	if cfg.dialog.max_history_turns > MAX_HISTORY_TURNS {
		return Err(Error::Validation {
			message: format!("dialog.max_history_turns must be {MAX_HISTORY_TURNS} or less."),
		});
	}

	for (label, headers) in [
		("providers.embedding.default_headers", &cfg.providers.embedding.default_headers),
		("providers.llm.default_headers", &cfg.providers.llm.default_headers),
	] {
		validate_headers(label, headers)?;
	}

	Ok(())
}

fn validate_headers(label: &str, headers: &Map<String, Value>) -> Result<()> {
	for (key, value) in headers {
		if !value.is_string() {
			return Err(Error::Validation { message: format!("{label}.{key} must be a string.") });
		}
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	cfg.providers.embedding.api_key = cfg.providers.embedding.api_key.trim().to_string();
	cfg.providers.llm.api_key = cfg.providers.llm.api_key.trim().to_string();

	if cfg
		.catalog
		.path
		.as_deref()
		.map(|path| path.as_os_str().to_string_lossy().trim().is_empty())
		.unwrap_or(false)
	{
		cfg.catalog.path = None;
	}
}
