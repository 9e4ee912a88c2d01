use std::time::Duration;

use reqwest::Client;
use serde_json::Value;

use crate::{Error, Result};

/// Embeds `texts` with the configured backend.
///
/// `provider_id = "random"` always serves deterministic pseudo-random vectors. Otherwise the
/// OpenAI-compatible endpoint is called and failures are returned, unless `fallback_to_random` is
/// set, in which case the failure is logged and pseudo-random vectors are served instead.
pub async fn embed(
	cfg: &refuge_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	if cfg.provider_id == "random" {
		return Ok(crate::random::embed(texts, cfg.dimensions));
	}

	match embed_remote(cfg, texts).await {
		Ok(vectors) => Ok(vectors),
		Err(err) if cfg.fallback_to_random => {
			tracing::warn!(error = %err, "Embedding provider failed. Serving random vectors.");

			Ok(crate::random::embed(texts, cfg.dimensions))
		},
		Err(err) => Err(err),
	}
}

async fn embed_remote(
	cfg: &refuge_config::EmbeddingProviderConfig,
	texts: &[String],
) -> Result<Vec<Vec<f32>>> {
	let client = Client::builder().timeout(Duration::from_millis(cfg.timeout_ms)).build()?;
	let url = format!("{}{}", cfg.api_base, cfg.path);
	let body = serde_json::json!({
		"model": cfg.model,
		"input": texts,
		"dimensions": cfg.dimensions,
	});
	let res = client
		.post(url)
		.headers(crate::auth_headers(&cfg.api_key, &cfg.default_headers)?)
		.json(&body)
		.send()
		.await?;
	let json: Value = res.error_for_status()?.json().await?;
	let vectors = parse_embedding_response(json)?;

	if vectors.len() != texts.len() {
		return Err(Error::InvalidResponse {
			message: format!(
				"Embedding response returned {} vectors for {} inputs.",
				vectors.len(),
				texts.len()
			),
		});
	}

	Ok(vectors)
}

fn parse_embedding_response(json: Value) -> Result<Vec<Vec<f32>>> {
	let data = json.get("data").and_then(|v| v.as_array()).ok_or_else(|| {
		Error::InvalidResponse { message: "Embedding response is missing data array.".to_string() }
	})?;
	let mut indexed: Vec<(usize, Vec<f32>)> = Vec::with_capacity(data.len());

	for (fallback_index, item) in data.iter().enumerate() {
		let index = item
			.get("index")
			.and_then(|v| v.as_u64())
			.map(|v| v as usize)
			.unwrap_or(fallback_index);
		let embedding = item.get("embedding").and_then(|v| v.as_array()).ok_or_else(|| {
			Error::InvalidResponse {
				message: "Embedding item missing embedding array.".to_string(),
			}
		})?;
		let mut vec = Vec::with_capacity(embedding.len());

		for value in embedding {
			let number = value.as_f64().ok_or_else(|| Error::InvalidResponse {
				message: "Embedding value must be numeric.".to_string(),
			})?;

			vec.push(number as f32);
		}

		indexed.push((index, vec));
	}

	indexed.sort_by_key(|(index, _)| *index);

	Ok(indexed.into_iter().map(|(_, vec)| vec).collect())
}

#[cfg(test)]
mod tests {
	use serde_json::Map;

	use refuge_config::EmbeddingProviderConfig;

	use super::*;

	fn unreachable_provider(fallback_to_random: bool) -> EmbeddingProviderConfig {
		EmbeddingProviderConfig {
			provider_id: "openai".to_string(),
			api_base: "http://127.0.0.1:9".to_string(),
			api_key: "key".to_string(),
			path: "/v1/embeddings".to_string(),
			model: "text-embedding-ada-002".to_string(),
			dimensions: 8,
			timeout_ms: 200,
			default_headers: Map::new(),
			fallback_to_random,
		}
	}

	#[test]
	fn parses_embeddings_in_index_order() {
		let json = serde_json::json!({
			"data": [
				{ "index": 1, "embedding": [2.0, 3.0] },
				{ "index": 0, "embedding": [0.5, 1.5] }
			]
		});
		let parsed = parse_embedding_response(json).expect("parse failed");

		assert_eq!(parsed.len(), 2);
		assert_eq!(parsed[0], vec![0.5, 1.5]);
		assert_eq!(parsed[1], vec![2.0, 3.0]);
	}

	#[test]
	fn rejects_non_numeric_values() {
		let json = serde_json::json!({ "data": [{ "index": 0, "embedding": ["a"] }] });

		assert!(parse_embedding_response(json).is_err());
		assert!(parse_embedding_response(serde_json::json!({})).is_err());
	}

	#[tokio::test]
	async fn provider_failure_is_explicit_without_fallback() {
		let cfg = unreachable_provider(false);

		assert!(embed(&cfg, &["housing".to_string()]).await.is_err());
	}

	#[tokio::test]
	async fn provider_failure_serves_random_vectors_with_fallback() {
		let cfg = unreachable_provider(true);
		let vectors = embed(&cfg, &["housing".to_string()]).await.expect("Fallback must succeed.");

		assert_eq!(vectors.len(), 1);
		assert_eq!(vectors[0].len(), 8);
	}
}
