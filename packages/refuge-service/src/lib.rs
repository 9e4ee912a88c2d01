pub mod admin;
pub mod cache;
pub mod emergency;
pub mod error;
pub mod format;
pub mod listing;
pub mod ranking;
pub mod search;

pub use admin::InvalidateRequest;
pub use cache::{
	CacheKind, CacheStats, ExternalCache, InvalidateReport, RedisCache, ResponseCache,
};
pub use error::{Error, Result};
pub use format::{DisplayRecord, FormattedResults};
pub use listing::{CategoryListingRequest, UrgentServicesRequest};
pub use ranking::{Candidate, RankContext, RankExplain, RankedResource};
pub use search::{ResponseMetadata, SearchQuery, SearchRequest, SearchResponse};

use std::{future::Future, pin::Pin, sync::Arc};

use refuge_config::{Config, EmbeddingProviderConfig};
use refuge_domain::Resource;
use refuge_providers::embedding;
use refuge_storage::qdrant::{QdrantStore, ResourceFilter, ScoredResource};

pub type BoxFuture<'a, T> = Pin<Box<dyn Future<Output = T> + Send + 'a>>;

pub trait EmbeddingProvider
where
	Self: Send + Sync,
{
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, refuge_providers::Result<Vec<Vec<f32>>>>;
}

/// Vector search and payload-only listing over the resource directory.
pub trait ResourceIndex
where
	Self: Send + Sync,
{
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		filter: &'a ResourceFilter,
		limit: usize,
	) -> BoxFuture<'a, refuge_storage::Result<Vec<ScoredResource>>>;

	/// Filter-only lookup returning the most recently updated matches first.
	fn scroll<'a>(
		&'a self,
		filter: &'a ResourceFilter,
		limit: usize,
	) -> BoxFuture<'a, refuge_storage::Result<Vec<Resource>>>;
}

#[derive(Clone)]
pub struct Providers {
	pub embedding: Arc<dyn EmbeddingProvider>,
}

pub struct RefugeService {
	pub cfg: Config,
	pub index: Arc<dyn ResourceIndex>,
	pub providers: Providers,
	pub cache: ResponseCache,
}

struct DefaultProviders;

impl EmbeddingProvider for DefaultProviders {
	fn embed<'a>(
		&'a self,
		cfg: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, refuge_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(embedding::embed(cfg, texts))
	}
}

impl ResourceIndex for QdrantStore {
	fn search<'a>(
		&'a self,
		vector: &'a [f32],
		filter: &'a ResourceFilter,
		limit: usize,
	) -> BoxFuture<'a, refuge_storage::Result<Vec<ScoredResource>>> {
		Box::pin(QdrantStore::search(self, vector, filter, limit))
	}

	fn scroll<'a>(
		&'a self,
		filter: &'a ResourceFilter,
		limit: usize,
	) -> BoxFuture<'a, refuge_storage::Result<Vec<Resource>>> {
		Box::pin(QdrantStore::scroll(self, filter, limit))
	}
}

impl Providers {
	pub fn new(embedding: Arc<dyn EmbeddingProvider>) -> Self {
		Self { embedding }
	}
}

impl Default for Providers {
	fn default() -> Self {
		Self { embedding: Arc::new(DefaultProviders) }
	}
}

impl RefugeService {
	pub fn new(cfg: Config, index: Arc<dyn ResourceIndex>) -> Self {
		Self::with_providers(cfg, index, Providers::default())
	}

	pub fn with_providers(cfg: Config, index: Arc<dyn ResourceIndex>, providers: Providers) -> Self {
		let cache = ResponseCache::new(cfg.cache.clone(), None);

		Self { cfg, index, providers, cache }
	}

	/// Puts a shared store in front of the in-process cache tier.
	pub fn with_external_cache(mut self, external: Arc<dyn ExternalCache>) -> Self {
		self.cache = ResponseCache::new(self.cfg.cache.clone(), Some(external));

		self
	}

	pub(crate) fn collection(&self) -> &str {
		&self.cfg.storage.qdrant.collection
	}
}
