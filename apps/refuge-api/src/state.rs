use std::sync::Arc;

use refuge_service::{RedisCache, RefugeService};
use refuge_storage::qdrant::QdrantStore;

#[derive(Clone)]
pub struct AppState {
	pub service: Arc<RefugeService>,
}
impl AppState {
	pub async fn new(config: refuge_config::Config) -> color_eyre::Result<Self> {
		let store = QdrantStore::new(&config.storage.qdrant)?;

		if store.ensure_collection().await? {
			tracing::warn!(
				collection = %store.collection,
				"Collection was empty. Run refuge-ingest to load resources."
			);
		}

		let redis_url = config.cache.redis_url.clone().filter(|_| config.cache.enabled);
		let mut service = RefugeService::new(config, Arc::new(store));

		if let Some(url) = redis_url {
			match RedisCache::connect(&url).await {
				Ok(cache) => {
					tracing::info!("Shared Redis cache tier connected.");

					service = service.with_external_cache(Arc::new(cache));
				},
				Err(err) => {
					tracing::warn!(error = %err, "Redis cache unavailable. Caching stays in-process.");
				},
			}
		}

		Ok(Self::from_service(service))
	}

	pub fn from_service(service: RefugeService) -> Self {
		Self { service: Arc::new(service) }
	}
}
