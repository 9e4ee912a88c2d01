//! Fixtures and fakes shared by the workspace test suites.

pub mod fakes;
pub mod resources;

mod error;

pub use error::{Error, Result};

use std::{
	collections::HashSet,
	env,
	sync::{Arc, Mutex},
	time::Duration,
};

use qdrant_client::Qdrant;
use serde_json::Map;
use tokio::time;
use uuid::Uuid;

use refuge_config::Config;
use refuge_service::{Providers, RefugeService, ResourceIndex};

pub const TEST_VECTOR_DIM: u32 = 8;

/// A complete configuration that never reaches the network on its own.
pub fn test_config() -> Config {
	Config {
		service: refuge_config::Service {
			http_bind: "127.0.0.1:8080".to_string(),
			admin_bind: "127.0.0.1:8081".to_string(),
			log_level: "info".to_string(),
			cors_origins: Vec::new(),
		},
		storage: refuge_config::Storage {
			qdrant: refuge_config::Qdrant {
				url: env_qdrant_url().unwrap_or_else(|| "http://127.0.0.1:6334".to_string()),
				api_key: None,
				collection: "refuge_resources_test".to_string(),
				vector_dim: TEST_VECTOR_DIM,
			},
		},
		providers: refuge_config::Providers {
			embedding: refuge_config::EmbeddingProviderConfig {
				provider_id: "random".to_string(),
				api_base: "http://127.0.0.1:9".to_string(),
				api_key: String::new(),
				path: "/v1/embeddings".to_string(),
				model: "test-embedding".to_string(),
				dimensions: TEST_VECTOR_DIM,
				timeout_ms: 1_000,
				default_headers: Map::new(),
				fallback_to_random: false,
			},
		},
		search: refuge_config::Search { upstream_timeout_ms: 200, ..Default::default() },
		ranking: refuge_config::Ranking::default(),
		cache: refuge_config::Cache::default(),
		formatter: refuge_config::Formatter::default(),
	}
}

/// Service over an in-memory index with the fixed-vector embedding fake.
pub fn test_service(index: Arc<dyn ResourceIndex>) -> RefugeService {
	test_service_with(test_config(), index, Arc::new(fakes::FixedEmbedding::new(TEST_VECTOR_DIM)))
}

pub fn test_service_with(
	cfg: Config,
	index: Arc<dyn ResourceIndex>,
	embedding: Arc<dyn refuge_service::EmbeddingProvider>,
) -> RefugeService {
	RefugeService::with_providers(cfg, index, Providers::new(embedding))
}

pub fn env_qdrant_url() -> Option<String> {
	env::var("REFUGE_QDRANT_URL").ok()
}

pub fn env_redis_url() -> Option<String> {
	env::var("REFUGE_REDIS_URL").ok()
}

/// Uniquely named Qdrant collections for live tests, deleted on cleanup.
pub struct TestCollections {
	prefix: String,
	created: Mutex<HashSet<String>>,
}
impl TestCollections {
	pub fn new(prefix: &str) -> Self {
		Self { prefix: prefix.to_string(), created: Mutex::new(HashSet::new()) }
	}

	pub fn collection_name(&self) -> String {
		let collection = format!("{}_{}", self.prefix, Uuid::new_v4().simple());
		let mut tracked = self.created.lock().unwrap_or_else(|err| err.into_inner());

		tracked.insert(collection.clone());

		collection
	}

	pub async fn cleanup(self) -> Result<()> {
		let collections = {
			let tracked = self.created.lock().unwrap_or_else(|err| err.into_inner());

			tracked.iter().cloned().collect::<Vec<_>>()
		};

		cleanup_qdrant_collections(&collections).await
	}
}

async fn cleanup_qdrant_collections(collections: &[String]) -> Result<()> {
	if collections.is_empty() {
		return Ok(());
	}

	let Some(qdrant_url) = env_qdrant_url() else {
		eprintln!("Skipping Qdrant cleanup; set REFUGE_QDRANT_URL to delete test collections.");

		return Ok(());
	};
	let client = Qdrant::from_url(&qdrant_url)
		.build()
		.map_err(|err| Error::Message(format!("Failed to build Qdrant client: {err}.")))?;

	for collection in collections {
		match time::timeout(Duration::from_secs(10), client.delete_collection(collection.clone()))
			.await
		{
			Ok(Ok(_)) => {},
			Ok(Err(err)) => {
				return Err(Error::Message(format!(
					"Failed to delete Qdrant collection {collection:?}: {err}."
				)));
			},
			Err(_) => {
				return Err(Error::Message(format!(
					"Timed out deleting Qdrant collection {collection:?}."
				)));
			},
		}
	}

	Ok(())
}
