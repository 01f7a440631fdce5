use serde_json::Value;

use crate::{Error, Result};

/// Embeds one text. Fails with [`Error::Unavailable`] when no credential is configured.
pub async fn embed(
	cfg: &helpdesk_config::EmbeddingProviderConfig,
	text: &str,
) -> Result<Vec<f32>> {
	crate::require_key(&cfg.api_key)?;

	let client = crate::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	// Providers reject an empty input string.
	let input = if text.trim().is_empty() { " " } else { text };
	let body = serde_json::json!({
		"model": cfg.model,
		"input": input,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json = crate::read_json(res).await?;
	let vector = parse_embedding_response(&json)?;

	tracing::debug!(model = %cfg.model, dimensions = vector.len(), "Embedding received.");

	Ok(vector)
}

pub(crate) fn parse_embedding_response(json: &Value) -> Result<Vec<f32>> {
	let embedding = json
		.get("data")
		.and_then(|v| v.as_array())
		.and_then(|data| data.first())
		.and_then(|item| item.get("embedding"))
		.and_then(|v| v.as_array())
		.ok_or_else(|| Error::Malformed {
			message: "Embedding response is missing data[0].embedding.".to_string(),
		})?;

	if embedding.is_empty() {
		return Err(Error::Malformed { message: "Embedding vector is empty.".to_string() });
	}

	let mut vec = Vec::with_capacity(embedding.len());

	for value in embedding {
		let number = value.as_f64().ok_or_else(|| Error::Malformed {
			message: "Embedding value must be numeric.".to_string(),
		})?;

		vec.push(number as f32);
	}

	Ok(vec)
}
