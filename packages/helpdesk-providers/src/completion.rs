use serde_json::Value;

use crate::{Error, Result};

#[derive(Debug, Clone, Copy)]
pub struct CompletionParams {
	pub temperature: f32,
	pub max_output_tokens: u32,
	/// Asks the provider to guarantee a single JSON object as output.
	pub json_output: bool,
}
impl CompletionParams {
	pub fn from_config(cfg: &helpdesk_config::LlmProviderConfig, json_output: bool) -> Self {
		Self {
			temperature: cfg.temperature,
			max_output_tokens: cfg.max_output_tokens,
			json_output: json_output && cfg.structured_output,
		}
	}
}

/// Sends one instructions/input pair and returns the first output text block.
pub async fn send(
	cfg: &helpdesk_config::LlmProviderConfig,
	instructions: &str,
	input: &str,
	params: CompletionParams,
) -> Result<String> {
	crate::require_key(&cfg.api_key)?;

	let client = crate::client(cfg.timeout_ms)?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = build_request_body(&cfg.model, instructions, input, params);
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json = crate::read_json(res).await?;

	extract_output_text(&json).ok_or_else(|| Error::Malformed {
		message: "Completion response has no output text.".to_string(),
	})
}

pub(crate) fn build_request_body(
	model: &str,
	instructions: &str,
	input: &str,
	params: CompletionParams,
) -> Value {
	let mut body = serde_json::json!({
		"model": model,
		"instructions": instructions,
		"input": input,
		"temperature": params.temperature,
		"max_output_tokens": params.max_output_tokens,
		"store": false,
	});

	if params.json_output {
		body["text"] = serde_json::json!({ "format": { "type": "json_object" } });
	}

	body
}

/// First text block of a Responses-style (`output[].content[]`) or chat-style
/// (`choices[0].message.content`) reply.
pub fn extract_output_text(json: &Value) -> Option<String> {
	if let Some(items) = json.get("output").and_then(|v| v.as_array()) {
		for item in items {
			let Some(content) = item.get("content").and_then(|v| v.as_array()) else {
				continue;
			};

			for block in content {
				if block.get("type").and_then(|v| v.as_str()) == Some("output_text")
					&& let Some(text) = block.get("text").and_then(|v| v.as_str())
				{
					return Some(text.to_string());
				}
			}
		}
	}

	if let Some(text) = json.get("output_text").and_then(|v| v.as_str()) {
		return Some(text.to_string());
	}

	json.get("choices")
		.and_then(|v| v.as_array())
		.and_then(|arr| arr.first())
		.and_then(|choice| choice.get("message"))
		.and_then(|msg| msg.get("content"))
		.and_then(|c| c.as_str())
		.map(str::to_string)
}
