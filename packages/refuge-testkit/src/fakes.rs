//! In-memory stand-ins for the embedding provider, the vector store, and the external cache.

use std::{
	collections::HashMap,
	sync::{
		Mutex,
		atomic::{AtomicUsize, Ordering},
	},
	time::Duration,
};

use refuge_config::EmbeddingProviderConfig;
use refuge_domain::Resource;
use refuge_service::{BoxFuture, EmbeddingProvider, ExternalCache, ResourceIndex};
use refuge_storage::qdrant::{ResourceFilter, ScoredResource};

/// Returns the same unit-ish vector for every text and counts calls.
pub struct FixedEmbedding {
	dimensions: u32,
	calls: AtomicUsize,
}
impl FixedEmbedding {
	pub fn new(dimensions: u32) -> Self {
		Self { dimensions, calls: AtomicUsize::new(0) }
	}

	pub fn calls(&self) -> usize {
		self.calls.load(Ordering::SeqCst)
	}
}
impl EmbeddingProvider for FixedEmbedding {
	fn embed<'a>(
		&'a self,
		_: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, refuge_providers::Result<Vec<Vec<f32>>>> {
		self.calls.fetch_add(1, Ordering::SeqCst);

		let vectors: Vec<Vec<f32>> =
			texts.iter().map(|_| vec![0.1; self.dimensions as usize]).collect();

		Box::pin(async move { Ok(vectors) })
	}
}

pub struct FailingEmbedding;
impl EmbeddingProvider for FailingEmbedding {
	fn embed<'a>(
		&'a self,
		_: &'a EmbeddingProviderConfig,
		_: &'a [String],
	) -> BoxFuture<'a, refuge_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(async {
			Err(refuge_providers::Error::InvalidResponse {
				message: "Embedding provider is unavailable.".to_string(),
			})
		})
	}
}

/// Sleeps before answering, for timeout tests.
pub struct SlowEmbedding {
	pub delay: Duration,
	pub dimensions: u32,
}
impl EmbeddingProvider for SlowEmbedding {
	fn embed<'a>(
		&'a self,
		_: &'a EmbeddingProviderConfig,
		texts: &'a [String],
	) -> BoxFuture<'a, refuge_providers::Result<Vec<Vec<f32>>>> {
		Box::pin(async move {
			tokio::time::sleep(self.delay).await;

			Ok(texts.iter().map(|_| vec![0.1; self.dimensions as usize]).collect())
		})
	}
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
enum IndexMode {
	#[default]
	Healthy,
	Failing,
	Slow(Duration),
}

/// Resources with preset similarity scores. The query vector is ignored; filters are honoured
/// the way the store applies them.
pub struct InMemoryIndex {
	entries: Vec<(Resource, f32)>,
	mode: IndexMode,
	search_calls: AtomicUsize,
	scroll_calls: AtomicUsize,
}
impl InMemoryIndex {
	pub fn new(entries: Vec<(Resource, f32)>) -> Self {
		Self {
			entries,
			mode: IndexMode::Healthy,
			search_calls: AtomicUsize::new(0),
			scroll_calls: AtomicUsize::new(0),
		}
	}

	/// Every resource scored by its position: the first gets 0.9, each next one 0.05 less.
	pub fn ranked(resources: Vec<Resource>) -> Self {
		Self::new(
			resources
				.into_iter()
				.enumerate()
				.map(|(idx, resource)| (resource, (0.9 - 0.05 * idx as f32).max(0.0)))
				.collect(),
		)
	}

	pub fn failing(mut self) -> Self {
		self.mode = IndexMode::Failing;

		self
	}

	pub fn slow(mut self, delay: Duration) -> Self {
		self.mode = IndexMode::Slow(delay);

		self
	}

	pub fn search_calls(&self) -> usize {
		self.search_calls.load(Ordering::SeqCst)
	}

	pub fn scroll_calls(&self) -> usize {
		self.scroll_calls.load(Ordering::SeqCst)
	}

	fn matching(&self, filter: &ResourceFilter) -> impl Iterator<Item = &(Resource, f32)> {
		self.entries.iter().filter(move |(resource, _)| {
			(filter.categories.is_empty() || filter.categories.contains(&resource.category))
				&& filter.urgency.is_none_or(|urgency| urgency == resource.urgency_level)
		})
	}

	async fn ready(&self) -> refuge_storage::Result<()> {
		match self.mode {
			IndexMode::Healthy => Ok(()),
			IndexMode::Failing =>
				Err(refuge_storage::Error::InvalidArgument("Vector store is unavailable.".to_string())),
			IndexMode::Slow(delay) => {
				tokio::time::sleep(delay).await;

				Ok(())
			},
		}
	}
}
impl ResourceIndex for InMemoryIndex {
	fn search<'a>(
		&'a self,
		_: &'a [f32],
		filter: &'a ResourceFilter,
		limit: usize,
	) -> BoxFuture<'a, refuge_storage::Result<Vec<ScoredResource>>> {
		self.search_calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			self.ready().await?;

			let mut hits: Vec<ScoredResource> = self
				.matching(filter)
				.map(|(resource, score)| ScoredResource { resource: resource.clone(), score: *score })
				.collect();

			hits.sort_by(|a, b| b.score.total_cmp(&a.score));
			hits.truncate(limit);

			Ok(hits)
		})
	}

	fn scroll<'a>(
		&'a self,
		filter: &'a ResourceFilter,
		limit: usize,
	) -> BoxFuture<'a, refuge_storage::Result<Vec<Resource>>> {
		self.scroll_calls.fetch_add(1, Ordering::SeqCst);

		Box::pin(async move {
			self.ready().await?;

			let mut resources: Vec<Resource> =
				self.matching(filter).map(|(resource, _)| resource.clone()).collect();

			resources.sort_by(|a, b| {
				b.last_updated.cmp(&a.last_updated).then_with(|| a.id.cmp(&b.id))
			});
			resources.truncate(limit);

			Ok(resources)
		})
	}
}

/// Shared-store stand-in. TTLs are ignored.
#[derive(Default)]
pub struct MemoryCache {
	entries: Mutex<HashMap<String, Vec<u8>>>,
	failing: bool,
}
impl MemoryCache {
	pub fn failing() -> Self {
		Self { entries: Mutex::new(HashMap::new()), failing: true }
	}

	pub fn insert(&self, key: &str, value: Vec<u8>) {
		self.entries.lock().unwrap_or_else(|err| err.into_inner()).insert(key.to_string(), value);
	}

	pub fn contains(&self, key: &str) -> bool {
		self.entries.lock().unwrap_or_else(|err| err.into_inner()).contains_key(key)
	}

	pub fn len(&self) -> usize {
		self.entries.lock().unwrap_or_else(|err| err.into_inner()).len()
	}

	pub fn is_empty(&self) -> bool {
		self.len() == 0
	}

	fn check(&self) -> refuge_service::Result<()> {
		if self.failing {
			return Err(refuge_service::Error::Cache {
				message: "External cache is unavailable.".to_string(),
			});
		}

		Ok(())
	}
}
impl ExternalCache for MemoryCache {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, refuge_service::Result<Option<Vec<u8>>>> {
		Box::pin(async move {
			self.check()?;

			Ok(self.entries.lock().unwrap_or_else(|err| err.into_inner()).get(key).cloned())
		})
	}

	fn set<'a>(
		&'a self,
		key: &'a str,
		value: &'a [u8],
		_: Duration,
	) -> BoxFuture<'a, refuge_service::Result<()>> {
		Box::pin(async move {
			self.check()?;
			self.insert(key, value.to_vec());

			Ok(())
		})
	}

	fn invalidate<'a>(&'a self, pattern: &'a str) -> BoxFuture<'a, refuge_service::Result<u64>> {
		Box::pin(async move {
			self.check()?;

			let mut entries = self.entries.lock().unwrap_or_else(|err| err.into_inner());
			let before = entries.len();

			entries.retain(|key, _| match pattern.strip_suffix('*') {
				Some(prefix) => !key.starts_with(prefix),
				None => key != pattern,
			});

			Ok((before - entries.len()) as u64)
		})
	}
}
