mod error;
mod types;

pub use error::{Error, Result};
pub use types::{
	Cache, Config, EmbeddingProviderConfig, Formatter, Providers, Qdrant, Ranking, RankingWeights,
	Search, Service, Storage,
};

use std::{fs, path::Path};

const WEIGHT_SUM_TOLERANCE: f32 = 0.001;

pub fn load(path: &Path) -> Result<Config> {
	let raw = fs::read_to_string(path)
		.map_err(|err| Error::ReadConfig { path: path.to_path_buf(), source: err })?;

	let mut cfg: Config = toml::from_str(&raw)
		.map_err(|err| Error::ParseConfig { path: path.to_path_buf(), source: err })?;

	normalize(&mut cfg);

	validate(&cfg)?;

	Ok(cfg)
}

pub fn validate(cfg: &Config) -> Result<()> {
	for (label, value) in [
		("service.http_bind", &cfg.service.http_bind),
		("service.admin_bind", &cfg.service.admin_bind),
		("storage.qdrant.url", &cfg.storage.qdrant.url),
		("storage.qdrant.collection", &cfg.storage.qdrant.collection),
	] {
		if value.trim().is_empty() {
			return Err(Error::Validation { message: format!("{label} must be non-empty.") });
		}
	}

	let embedding = &cfg.providers.embedding;

	if !matches!(embedding.provider_id.as_str(), "openai" | "random") {
		return Err(Error::Validation {
			message: "providers.embedding.provider_id must be one of openai or random.".to_string(),
		});
	}
	if embedding.dimensions == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must be greater than zero.".to_string(),
		});
	}
	if embedding.dimensions != cfg.storage.qdrant.vector_dim {
		return Err(Error::Validation {
			message: "providers.embedding.dimensions must match storage.qdrant.vector_dim."
				.to_string(),
		});
	}
	if embedding.provider_id == "openai" && embedding.api_key.trim().is_empty() {
		return Err(Error::Validation {
			message: "Provider embedding api_key must be non-empty.".to_string(),
		});
	}
	if embedding.timeout_ms == 0 {
		return Err(Error::Validation {
			message: "providers.embedding.timeout_ms must be greater than zero.".to_string(),
		});
	}
	if cfg.search.max_limit == 0 {
		return Err(Error::Validation {
			message: "search.max_limit must be greater than zero.".to_string(),
		});
	}
	if cfg.search.default_limit == 0 || cfg.search.default_limit > cfg.search.max_limit {
		return Err(Error::Validation {
			message: "search.default_limit must be between 1 and search.max_limit.".to_string(),
		});
	}
	if cfg.search.candidate_multiplier == 0 {
		return Err(Error::Validation {
			message: "search.candidate_multiplier must be greater than zero.".to_string(),
		});
	}
	if cfg.search.upstream_timeout_ms == 0 {
		return Err(Error::Validation {
			message: "search.upstream_timeout_ms must be greater than zero.".to_string(),
		});
	}
	if !(-12..=14).contains(&cfg.search.region_utc_offset_hours) {
		return Err(Error::Validation {
			message: "search.region_utc_offset_hours must be in the range -12 to 14.".to_string(),
		});
	}

	validate_ranking(&cfg.ranking)?;

	if cfg.cache.enabled && cfg.cache.capacity == 0 {
		return Err(Error::Validation {
			message: "cache.capacity must be greater than zero when enabled.".to_string(),
		});
	}

	for (label, ttl) in [
		("cache.search_ttl_secs", cfg.cache.search_ttl_secs),
		("cache.embedding_ttl_secs", cfg.cache.embedding_ttl_secs),
		("cache.response_ttl_secs", cfg.cache.response_ttl_secs),
		("cache.resource_ttl_secs", cfg.cache.resource_ttl_secs),
	] {
		if ttl == 0 {
			return Err(Error::Validation {
				message: format!("{label} must be greater than zero."),
			});
		}
	}

	if let Some(url) = cfg.cache.redis_url.as_deref()
		&& !(url.starts_with("redis://") || url.starts_with("rediss://"))
	{
		return Err(Error::Validation {
			message: "cache.redis_url must start with redis:// or rediss://.".to_string(),
		});
	}

	if cfg.formatter.description_max_chars == 0 {
		return Err(Error::Validation {
			message: "formatter.description_max_chars must be greater than zero.".to_string(),
		});
	}
	if !(1..=6).contains(&cfg.formatter.max_quick_replies) {
		return Err(Error::Validation {
			message: "formatter.max_quick_replies must be in the range 1-6.".to_string(),
		});
	}
	if cfg.formatter.max_call_scripts == 0 {
		return Err(Error::Validation {
			message: "formatter.max_call_scripts must be greater than zero.".to_string(),
		});
	}

	Ok(())
}

fn validate_ranking(ranking: &Ranking) -> Result<()> {
	let weights = &ranking.weights;

	for (label, weight) in [
		("ranking.weights.relevance", weights.relevance),
		("ranking.weights.availability", weights.availability),
		("ranking.weights.quality", weights.quality),
		("ranking.weights.accessibility", weights.accessibility),
		("ranking.weights.urgency", weights.urgency),
	] {
		if !weight.is_finite() {
			return Err(Error::Validation { message: format!("{label} must be a finite number.") });
		}
		if weight < 0.0 {
			return Err(Error::Validation { message: format!("{label} must be zero or greater.") });
		}
	}

	if (weights.total() - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
		return Err(Error::Validation {
			message: "ranking.weights must sum to 1.0.".to_string(),
		});
	}
	if !ranking.critical_boost.is_finite() || ranking.critical_boost < 1.0 {
		return Err(Error::Validation {
			message: "ranking.critical_boost must be a finite number of at least 1.0.".to_string(),
		});
	}
	if !(0.0..=1.0).contains(&ranking.quality_floor) {
		return Err(Error::Validation {
			message: "ranking.quality_floor must be in the range 0.0-1.0.".to_string(),
		});
	}
	if !(ranking.near_distance_km > 0.0 && ranking.near_distance_km < ranking.far_distance_km) {
		return Err(Error::Validation {
			message: "ranking.near_distance_km must be positive and less than ranking.far_distance_km."
				.to_string(),
		});
	}

	Ok(())
}

fn normalize(cfg: &mut Config) {
	if cfg.storage.qdrant.api_key.as_deref().map(|key| key.trim().is_empty()).unwrap_or(false) {
		cfg.storage.qdrant.api_key = None;
	}
	if cfg.cache.redis_url.as_deref().map(|url| url.trim().is_empty()).unwrap_or(false) {
		cfg.cache.redis_url = None;
	}

	cfg.service.cors_origins.retain(|origin| !origin.trim().is_empty());
	cfg.providers.embedding.provider_id = cfg.providers.embedding.provider_id.trim().to_lowercase();
}
