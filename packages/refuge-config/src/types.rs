use serde::Deserialize;
use serde_json::{Map, Value};

#[derive(Clone, Debug, Deserialize)]
pub struct Config {
	pub service: Service,
	pub storage: Storage,
	pub providers: Providers,
	#[serde(default)]
	pub search: Search,
	#[serde(default)]
	pub ranking: Ranking,
	#[serde(default)]
	pub cache: Cache,
	#[serde(default)]
	pub formatter: Formatter,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Service {
	pub http_bind: String,
	pub admin_bind: String,
	pub log_level: String,
	/// Optional. Allowed CORS origins for the chat front end. Empty means any origin.
	#[serde(default)]
	pub cors_origins: Vec<String>,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Storage {
	pub qdrant: Qdrant,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Qdrant {
	pub url: String,
	pub api_key: Option<String>,
	pub collection: String,
	pub vector_dim: u32,
}

#[derive(Clone, Debug, Deserialize)]
pub struct Providers {
	pub embedding: EmbeddingProviderConfig,
}

#[derive(Clone, Debug, Deserialize)]
pub struct EmbeddingProviderConfig {
	/// One of `openai` or `random`.
	pub provider_id: String,
	pub api_base: String,
	pub api_key: String,
	pub path: String,
	pub model: String,
	pub dimensions: u32,
	pub timeout_ms: u64,
	#[serde(default)]
	pub default_headers: Map<String, Value>,
	/// Serve deterministic pseudo-random vectors when the provider call fails. Test mode only.
	#[serde(default)]
	pub fallback_to_random: bool,
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Search {
	pub default_limit: u32,
	pub max_limit: u32,
	/// Vector candidates fetched per requested result, before the ranker's filter pre-pass.
	pub candidate_multiplier: u32,
	pub upstream_timeout_ms: u64,
	/// Offset of the served region's local time from UTC, used for opening-hours checks.
	pub region_utc_offset_hours: i8,
}
impl Default for Search {
	fn default() -> Self {
		Self {
			default_limit: 3,
			max_limit: 10,
			candidate_multiplier: 3,
			upstream_timeout_ms: 5_000,
			region_utc_offset_hours: 10,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Ranking {
	pub weights: RankingWeights,
	/// Multiplier applied to critical resources on critical queries, after the weighted sum.
	pub critical_boost: f32,
	/// Resources with a data-quality score below this value are excluded.
	pub quality_floor: f32,
	pub near_distance_km: f32,
	pub far_distance_km: f32,
}
impl Default for Ranking {
	fn default() -> Self {
		Self {
			weights: RankingWeights::default(),
			critical_boost: 1.5,
			quality_floor: 0.6,
			near_distance_km: 5.0,
			far_distance_km: 20.0,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct RankingWeights {
	pub relevance: f32,
	pub availability: f32,
	pub quality: f32,
	pub accessibility: f32,
	pub urgency: f32,
}
impl RankingWeights {
	pub fn total(&self) -> f32 {
		self.relevance + self.availability + self.quality + self.accessibility + self.urgency
	}
}
impl Default for RankingWeights {
	fn default() -> Self {
		Self { relevance: 0.35, availability: 0.20, quality: 0.20, accessibility: 0.15, urgency: 0.10 }
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Cache {
	pub enabled: bool,
	pub capacity: usize,
	pub search_ttl_secs: u64,
	pub embedding_ttl_secs: u64,
	pub response_ttl_secs: u64,
	pub resource_ttl_secs: u64,
	/// Shared tier behind the in-process cache. Unset keeps caching process-local.
	pub redis_url: Option<String>,
}
impl Default for Cache {
	fn default() -> Self {
		Self {
			enabled: true,
			capacity: 500,
			search_ttl_secs: 1_800,
			embedding_ttl_secs: 86_400,
			response_ttl_secs: 300,
			resource_ttl_secs: 3_600,
			redis_url: None,
		}
	}
}

#[derive(Clone, Debug, Deserialize)]
#[serde(default)]
pub struct Formatter {
	pub description_max_chars: usize,
	/// 4 for the compact chat widget, 6 for the richer variant.
	pub max_quick_replies: usize,
	pub max_call_scripts: usize,
	pub max_next_steps: usize,
}
impl Default for Formatter {
	fn default() -> Self {
		Self {
			description_max_chars: 200,
			max_quick_replies: 4,
			max_call_scripts: 5,
			max_next_steps: 4,
		}
	}
}
