pub mod completion;
pub mod embedding;

mod error;

pub use error::{Error, Result};

use std::time::Duration;

use reqwest::{
	Client, Response,
	header::{AUTHORIZATION, HeaderMap, HeaderName},
};
use serde_json::{Map, Value};

const MAX_ERROR_BODY_CHARS: usize = 800;

pub fn auth_headers(api_key: &str, default_headers: &Map<String, Value>) -> Result<HeaderMap> {
	let mut headers = HeaderMap::new();

	headers.insert(AUTHORIZATION, format!("Bearer {api_key}").parse()?);

	for (key, value) in default_headers {
		let Some(raw) = value.as_str() else {
			return Err(Error::InvalidConfig {
				message: "Default header values must be strings.".to_string(),
			});
		};

		headers.insert(HeaderName::from_bytes(key.as_bytes())?, raw.parse()?);
	}

	Ok(headers)
}

/// Collapses whitespace and truncates a provider error body for diagnostics.
pub fn truncate_body(body: &str) -> String {
	let collapsed = body.split_whitespace().collect::<Vec<_>>().join(" ");

	if collapsed.chars().count() <= MAX_ERROR_BODY_CHARS {
		return collapsed;
	}

	let mut out: String = collapsed.chars().take(MAX_ERROR_BODY_CHARS).collect();

	out.push_str("...");

	out
}

fn require_key(api_key: &str) -> Result<()> {
	if api_key.trim().is_empty() {
		return Err(Error::Unavailable);
	}

	Ok(())
}

fn client(timeout_ms: u64) -> Result<Client> {
	Ok(Client::builder().timeout(Duration::from_millis(timeout_ms)).build()?)
}

async fn read_json(res: Response) -> Result<Value> {
	let status = res.status();

	if !status.is_success() {
		let body = res.text().await.unwrap_or_default();

		return Err(Error::Status { status: status.as_u16(), body: truncate_body(&body) });
	}

	let raw = res.text().await?;

	serde_json::from_str(&raw).map_err(|err| Error::Malformed {
		message: format!("Provider response is not JSON: {err}. body={}", truncate_body(&raw)),
	})
}
