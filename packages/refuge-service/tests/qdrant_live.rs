use std::sync::Arc;

use refuge_domain::{ResourceCategory, UrgencyLevel};
use refuge_service::{RefugeService, SearchRequest, UrgentServicesRequest};
use refuge_storage::qdrant::{QdrantStore, ResourceFilter};
use refuge_testkit::{TestCollections, env_qdrant_url, resources, test_config};

#[tokio::test]
async fn store_round_trips_resources_through_qdrant() {
	let Some(qdrant_url) = env_qdrant_url() else {
		eprintln!(
			"Skipping store_round_trips_resources_through_qdrant; set REFUGE_QDRANT_URL to run this test."
		);

		return;
	};
	let collections = TestCollections::new("refuge_live");
	let mut cfg = test_config();

	cfg.storage.qdrant.url = qdrant_url;
	cfg.storage.qdrant.collection = collections.collection_name();

	let store = QdrantStore::new(&cfg.storage.qdrant).expect("Failed to build Qdrant store.");

	assert!(store.ensure_collection().await.expect("Failed to create collection."));
	assert!(!store.ensure_collection().await.expect("Failed to check collection."));

	let directory = resources::sample_directory();
	let texts: Vec<String> = directory.iter().map(|resource| resource.embedding_text()).collect();
	let vectors = refuge_providers::random::embed(&texts, cfg.storage.qdrant.vector_dim);
	let written = store.upsert(&directory, &vectors).await.expect("Failed to upsert.");

	assert_eq!(written, directory.len());

	let hits = store
		.search(&vectors[0], &ResourceFilter::default(), 1)
		.await
		.expect("Failed to search.");

	assert_eq!(hits[0].resource, directory[0]);

	let legal = store
		.scroll(&ResourceFilter::category(ResourceCategory::LegalAid), 10)
		.await
		.expect("Failed to scroll.");

	assert!(legal.iter().all(|resource| resource.category == ResourceCategory::LegalAid));
	assert_eq!(legal.len(), 2);
	assert!(legal[0].last_updated >= legal[1].last_updated);

	let service = RefugeService::new(cfg, Arc::new(store));
	let urgent = service
		.urgent_services(UrgentServicesRequest { limit: Some(2), language: None })
		.await
		.expect("Failed to list urgent services.");

	assert_eq!(urgent.resources[0].urgency, UrgencyLevel::Critical);

	let response =
		service.search(SearchRequest::new("visa lawyer")).await.expect("Failed to search.");

	assert!(!response.metadata.degraded);

	collections.cleanup().await.expect("Failed to clean up collections.");
}
