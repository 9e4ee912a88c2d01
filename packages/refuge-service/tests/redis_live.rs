use std::{
	sync::Arc,
	time::{Duration, SystemTime, UNIX_EPOCH},
};

use refuge_service::{ExternalCache, InvalidateRequest, RedisCache, SearchRequest};
use refuge_testkit::{env_redis_url, fakes::InMemoryIndex, resources, test_service};

fn unique_prefix() -> String {
	let nanos = SystemTime::now()
		.duration_since(UNIX_EPOCH)
		.expect("System time must be valid.")
		.as_nanos();

	format!("refuge_live_{nanos}_{}", std::process::id())
}

#[tokio::test]
async fn redis_tier_stores_and_invalidates_by_prefix() {
	let Some(redis_url) = env_redis_url() else {
		eprintln!(
			"Skipping redis_tier_stores_and_invalidates_by_prefix; set REFUGE_REDIS_URL to run this test."
		);

		return;
	};
	let cache = RedisCache::connect(&redis_url).await.expect("Failed to connect to Redis.");
	let prefix = unique_prefix();
	let first = format!("{prefix}:a");
	let second = format!("{prefix}:b");

	cache.set(&first, b"one", Duration::from_secs(60)).await.expect("Failed to set key.");
	cache.set(&second, b"two", Duration::ZERO).await.expect("Failed to set key.");

	assert_eq!(cache.get(&first).await.expect("Failed to get key."), Some(b"one".to_vec()));
	assert_eq!(cache.get(&second).await.expect("Failed to get key."), Some(b"two".to_vec()));

	let removed = cache.invalidate(&first).await.expect("Failed to delete key.");

	assert_eq!(removed, 1);
	assert!(cache.get(&first).await.expect("Failed to get key.").is_none());

	let removed = cache.invalidate(&format!("{prefix}:*")).await.expect("Failed to scan keys.");

	assert_eq!(removed, 1);
	assert!(cache.get(&second).await.expect("Failed to get key.").is_none());
}

#[tokio::test]
async fn services_share_responses_through_redis() {
	let Some(redis_url) = env_redis_url() else {
		eprintln!(
			"Skipping services_share_responses_through_redis; set REFUGE_REDIS_URL to run this test."
		);

		return;
	};
	let cache = Arc::new(RedisCache::connect(&redis_url).await.expect("Failed to connect to Redis."));
	let index = Arc::new(InMemoryIndex::ranked(resources::sample_directory()));
	let first = test_service(index.clone()).with_external_cache(cache.clone());

	for pattern in ["search:*", "embedding:*", "response:*"] {
		first
			.invalidate_cache(InvalidateRequest { pattern: pattern.to_string() })
			.await
			.expect("Failed to clear cache.");
	}

	let fresh = first.search(SearchRequest::new("visa lawyer")).await.expect("Search failed.");

	assert!(!fresh.metadata.cached);

	let second = test_service(index.clone()).with_external_cache(cache.clone());
	let shared = second.search(SearchRequest::new("visa lawyer")).await.expect("Search failed.");

	assert!(shared.metadata.cached);
	assert_eq!(shared.resources, fresh.resources);
	assert_eq!(index.search_calls(), 1);

	let report = second
		.invalidate_cache(InvalidateRequest { pattern: "response:*".to_string() })
		.await
		.expect("Failed to invalidate.");

	assert!(report.external_removed >= 1);
}
