use std::time::Duration;

use color_eyre::{Result, eyre};
use reqwest::Client;
use serde::{Deserialize, Serialize};

use lectern_config::EmbeddingProviderConfig;

#[derive(Debug, Serialize)]
struct EmbeddingRequest<'a> {
	model: &'a str,
	input: &'a [String],
	dimensions: u32,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
	data: Vec<EmbeddingDatum>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingDatum {
	#[serde(default)]
	index: Option<usize>,
	embedding: Vec<f32>,
}

/// Calls an OpenAI-compatible embeddings endpoint and returns one vector per input text, in input
/// order.
pub async fn embed(cfg: &EmbeddingProviderConfig, texts: &[String]) -> Result<Vec<Vec<f32>>> {
	if texts.is_empty() {
		return Ok(Vec::new());
	}

	let client = Client::builder()
		.timeout(Duration::from_millis(cfg.timeout_ms))
		.default_headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.build()?;
	let request = EmbeddingRequest { model: &cfg.model, input: texts, dimensions: cfg.dimensions };

	tracing::debug!(provider_id = %cfg.provider_id, count = texts.len(), "Requesting embeddings.");

	let body = client
		.post(format!("{}{}", cfg.api_base, cfg.path))
		.json(&request)
		.send()
		.await?
		.error_for_status()?
		.bytes()
		.await?;
	let vectors = parse_embedding_response(&body)?;

	if vectors.len() != texts.len() {
		return Err(eyre::eyre!(
			"Embedding provider returned {} vectors for {} inputs.",
			vectors.len(),
			texts.len()
		));
	}

	Ok(vectors)
}

/// Decodes a `{data: [{index, embedding}]}` body. Items are ordered by `index`; items without one
/// keep their position. The resulting indices must cover `0..n` exactly once.
fn parse_embedding_response(body: &[u8]) -> Result<Vec<Vec<f32>>> {
	let response: EmbeddingResponse = serde_json::from_slice(body)
		.map_err(|err| eyre::eyre!("Malformed embedding response: {err}"))?;
	let mut indexed: Vec<(usize, Vec<f32>)> = response
		.data
		.into_iter()
		.enumerate()
		.map(|(position, datum)| (datum.index.unwrap_or(position), datum.embedding))
		.collect();

	indexed.sort_by_key(|(index, _)| *index);

	if let Some((expected, (index, _))) =
		indexed.iter().enumerate().find(|(expected, (index, _))| index != expected)
	{
		return Err(eyre::eyre!(
			"Malformed embedding response: expected index {expected}, found {index}."
		));
	}

	Ok(indexed.into_iter().map(|(_, vector)| vector).collect())
}
