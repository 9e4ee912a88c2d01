use std::{
	env, fs,
	path::PathBuf,
	sync::atomic::{AtomicU64, Ordering},
	time::{SystemTime, UNIX_EPOCH},
};

use toml::Value;

use refuge_config::Config;

const SAMPLE_CONFIG_TOML: &str = include_str!("fixtures/sample_config.toml");

fn sample_toml_with(section: &str, key: &str, value: Value) -> String {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let mut table = root.as_table_mut().expect("Sample config must be a table.");

	for part in section.split('.') {
		table = table
			.get_mut(part)
			.and_then(Value::as_table_mut)
			.unwrap_or_else(|| panic!("Sample config must include [{section}]."));
	}

	table.insert(key.to_string(), value);

	toml::to_string(&root).expect("Failed to render sample config.")
}

fn write_temp_config(payload: String) -> PathBuf {
	static COUNTER: AtomicU64 = AtomicU64::new(0);

	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();
	let ordinal = COUNTER.fetch_add(1, Ordering::SeqCst);
	let pid = std::process::id();
	let mut path = env::temp_dir();

	path.push(format!("refuge_config_test_{nanos}_{pid}_{ordinal}.toml"));

	fs::write(&path, payload).expect("Failed to write test config.");

	path
}

fn base_config() -> Config {
	toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse test config.")
}

#[test]
fn sample_config_loads() {
	let path = write_temp_config(SAMPLE_CONFIG_TOML.to_string());
	let result = refuge_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected sample config to load.");

	assert_eq!(cfg.storage.qdrant.collection, "act_resources");
	assert_eq!(cfg.ranking.critical_boost, 1.5);
	assert_eq!(cfg.ranking.quality_floor, 0.6);
	assert_eq!(cfg.cache.search_ttl_secs, 1_800);
	assert!(cfg.storage.qdrant.api_key.is_none());
}

#[test]
fn optional_sections_fall_back_to_defaults() {
	let mut root: Value = toml::from_str(SAMPLE_CONFIG_TOML).expect("Failed to parse sample config.");
	let table = root.as_table_mut().expect("Sample config must be a table.");

	for section in ["search", "ranking", "cache", "formatter"] {
		table.remove(section);
	}

	let payload = toml::to_string(&root).expect("Failed to render sample config.");
	let cfg: Config = toml::from_str(&payload).expect("Failed to parse trimmed config.");

	assert!(refuge_config::validate(&cfg).is_ok());
	assert_eq!(cfg.search.default_limit, 3);
	assert_eq!(cfg.ranking.weights.relevance, 0.35);
	assert_eq!(cfg.cache.capacity, 500);
	assert_eq!(cfg.cache.response_ttl_secs, 300);
	assert_eq!(cfg.formatter.max_quick_replies, 4);
}

#[test]
fn embedding_dimensions_must_match_vector_dim() {
	let payload = sample_toml_with("providers.embedding", "dimensions", Value::Integer(768));
	let path = write_temp_config(payload);
	let result = refuge_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected dimension mismatch error.");

	assert!(
		err.to_string()
			.contains("providers.embedding.dimensions must match storage.qdrant.vector_dim."),
		"Unexpected error: {err}"
	);
}

#[test]
fn unknown_provider_is_rejected() {
	let payload =
		sample_toml_with("providers.embedding", "provider_id", Value::String("local".to_string()));
	let path = write_temp_config(payload);
	let result = refuge_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected provider validation error.");

	assert!(
		err.to_string().contains("providers.embedding.provider_id must be one of openai or random."),
		"Unexpected error: {err}"
	);
}

#[test]
fn random_provider_does_not_need_an_api_key() {
	let mut cfg = base_config();

	cfg.providers.embedding.provider_id = "random".to_string();
	cfg.providers.embedding.api_key = String::new();

	assert!(refuge_config::validate(&cfg).is_ok());

	cfg.providers.embedding.provider_id = "openai".to_string();

	let err = refuge_config::validate(&cfg).expect_err("Expected api_key validation error.");

	assert!(
		err.to_string().contains("Provider embedding api_key must be non-empty."),
		"Unexpected error: {err}"
	);
}

#[test]
fn ranking_weights_must_sum_to_one() {
	let mut cfg = base_config();

	cfg.ranking.weights.relevance = 0.5;

	let err = refuge_config::validate(&cfg).expect_err("Expected weight sum validation error.");

	assert!(err.to_string().contains("ranking.weights must sum to 1.0."), "Unexpected error: {err}");
}

#[test]
fn ranking_weights_must_be_finite_and_non_negative() {
	let mut cfg = base_config();

	cfg.ranking.weights.urgency = f32::NAN;

	let err = refuge_config::validate(&cfg).expect_err("Expected finite weight error.");

	assert!(
		err.to_string().contains("ranking.weights.urgency must be a finite number."),
		"Unexpected error: {err}"
	);

	cfg = base_config();
	cfg.ranking.weights.quality = -0.2;
	cfg.ranking.weights.relevance = 0.75;

	let err = refuge_config::validate(&cfg).expect_err("Expected negative weight error.");

	assert!(
		err.to_string().contains("ranking.weights.quality must be zero or greater."),
		"Unexpected error: {err}"
	);
}

#[test]
fn critical_boost_and_quality_floor_are_bounded() {
	let mut cfg = base_config();

	cfg.ranking.critical_boost = 0.5;

	assert!(refuge_config::validate(&cfg).is_err());

	cfg = base_config();
	cfg.ranking.quality_floor = 1.2;

	let err = refuge_config::validate(&cfg).expect_err("Expected quality floor error.");

	assert!(
		err.to_string().contains("ranking.quality_floor must be in the range 0.0-1.0."),
		"Unexpected error: {err}"
	);
}

#[test]
fn default_limit_must_fit_max_limit() {
	let payload = sample_toml_with("search", "default_limit", Value::Integer(20));
	let path = write_temp_config(payload);
	let result = refuge_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let err = result.expect_err("Expected default_limit validation error.");

	assert!(
		err.to_string().contains("search.default_limit must be between 1 and search.max_limit."),
		"Unexpected error: {err}"
	);
}

#[test]
fn quick_reply_cap_allows_rich_variant_only() {
	let mut cfg = base_config();

	cfg.formatter.max_quick_replies = 6;

	assert!(refuge_config::validate(&cfg).is_ok());

	cfg.formatter.max_quick_replies = 7;

	assert!(refuge_config::validate(&cfg).is_err());
}

#[test]
fn cache_capacity_is_required_only_when_enabled() {
	let mut cfg = base_config();

	cfg.cache.capacity = 0;

	assert!(refuge_config::validate(&cfg).is_err());

	cfg.cache.enabled = false;

	assert!(refuge_config::validate(&cfg).is_ok());
}

#[test]
fn redis_url_is_optional_and_must_use_a_redis_scheme() {
	let payload = sample_toml_with("cache", "redis_url", Value::String(" ".to_string()));
	let path = write_temp_config(payload);
	let result = refuge_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	assert!(result.expect("Expected config to load.").cache.redis_url.is_none());

	let mut cfg = base_config();

	cfg.cache.redis_url = Some("http://127.0.0.1:6379".to_string());

	let err = refuge_config::validate(&cfg).expect_err("Expected redis_url scheme error.");

	assert!(err.to_string().contains("cache.redis_url"));

	cfg.cache.redis_url = Some("redis://127.0.0.1:6379/0".to_string());

	assert!(refuge_config::validate(&cfg).is_ok());
}

#[test]
fn blank_qdrant_api_key_is_normalized_away() {
	let payload = sample_toml_with("storage.qdrant", "api_key", Value::String("  ".to_string()));
	let path = write_temp_config(payload);
	let result = refuge_config::load(&path);

	fs::remove_file(&path).expect("Failed to remove test config.");

	let cfg = result.expect("Expected config to load.");

	assert!(cfg.storage.qdrant.api_key.is_none());
}
