//! Two-tier response cache.
//!
//! An optional external store is consulted first and a hit there is copied into the in-process
//! tier. The in-process tier is a strict LRU bounded by entry count, and every entry also expires
//! by its own TTL. The mutex is never held across an await, so a concurrent get-then-set may
//! compute a value twice but never corrupts the store.

mod shared;

pub use shared::RedisCache;

use std::{
	num::NonZeroUsize,
	sync::{
		Arc, Mutex,
		atomic::{AtomicU64, Ordering},
	},
	time::{Duration, Instant},
};

use lru::LruCache;
use serde::{Serialize, de::DeserializeOwned};

use crate::{BoxFuture, Result};

const KEY_HASH_CHARS: usize = 16;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum CacheKind {
	/// Vector candidates for a query.
	Search,
	Embedding,
	/// Formatted API responses.
	Response,
	/// Filter-only listings.
	Resource,
}
impl CacheKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Search => "search",
			Self::Embedding => "embedding",
			Self::Response => "response",
			Self::Resource => "resource",
		}
	}

	pub fn ttl(self, cfg: &refuge_config::Cache) -> Duration {
		let secs = match self {
			Self::Search => cfg.search_ttl_secs,
			Self::Embedding => cfg.embedding_ttl_secs,
			Self::Response => cfg.response_ttl_secs,
			Self::Resource => cfg.resource_ttl_secs,
		};

		Duration::from_secs(secs)
	}

	fn from_key(key: &str) -> Option<Self> {
		let (prefix, _) = key.split_once(':')?;

		[Self::Search, Self::Embedding, Self::Response, Self::Resource]
			.into_iter()
			.find(|kind| kind.as_str() == prefix)
	}
}

/// A shared cache store such as Redis.
pub trait ExternalCache
where
	Self: Send + Sync,
{
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>>>;

	fn set<'a>(&'a self, key: &'a str, value: &'a [u8], ttl: Duration) -> BoxFuture<'a, Result<()>>;

	/// Removes keys matching `pattern`. A trailing `*` matches any suffix.
	fn invalidate<'a>(&'a self, pattern: &'a str) -> BoxFuture<'a, Result<u64>>;
}

#[derive(Clone, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct CacheStats {
	pub enabled: bool,
	pub external: bool,
	pub entries: usize,
	pub capacity: usize,
	pub hits: u64,
	pub misses: u64,
}

#[derive(Clone, Debug, Eq, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct InvalidateReport {
	pub pattern: String,
	pub local_removed: usize,
	pub external_removed: u64,
}

struct Entry {
	value: Arc<[u8]>,
	/// `None` when the TTL reaches past what `Instant` can represent.
	expires_at: Option<Instant>,
}

pub struct ResponseCache {
	cfg: refuge_config::Cache,
	local: Mutex<LruCache<String, Entry>>,
	external: Option<Arc<dyn ExternalCache>>,
	hits: AtomicU64,
	misses: AtomicU64,
}
impl ResponseCache {
	pub fn new(cfg: refuge_config::Cache, external: Option<Arc<dyn ExternalCache>>) -> Self {
		let capacity = NonZeroUsize::new(cfg.capacity).unwrap_or(NonZeroUsize::MIN);

		Self {
			cfg,
			local: Mutex::new(LruCache::new(capacity)),
			external,
			hits: AtomicU64::new(0),
			misses: AtomicU64::new(0),
		}
	}

	pub fn ttl(&self, kind: CacheKind) -> Duration {
		kind.ttl(&self.cfg)
	}

	pub async fn get(&self, key: &str) -> Option<Arc<[u8]>> {
		if !self.cfg.enabled {
			return None;
		}

		if let Some(external) = self.external.as_ref() {
			match external.get(key).await {
				Ok(Some(value)) => {
					let ttl = CacheKind::from_key(key)
						.map(|kind| self.ttl(kind))
						.unwrap_or_else(|| self.ttl(CacheKind::Response));
					let value: Arc<[u8]> = value.into();

					self.put_local(key, value.clone(), ttl);
					self.hits.fetch_add(1, Ordering::Relaxed);

					return Some(value);
				},
				Ok(None) => {},
				Err(err) => {
					tracing::warn!(error = %err, cache_key = key, "External cache read failed.");
				},
			}
		}

		let value = self.get_local(key, Instant::now());

		if value.is_some() {
			self.hits.fetch_add(1, Ordering::Relaxed);
		} else {
			self.misses.fetch_add(1, Ordering::Relaxed);
		}

		value
	}

	pub async fn set(&self, key: &str, value: Vec<u8>, ttl: Duration) {
		if !self.cfg.enabled {
			return;
		}

		let value: Arc<[u8]> = value.into();

		self.put_local(key, value.clone(), ttl);

		if let Some(external) = self.external.as_ref()
			&& let Err(err) = external.set(key, &value, ttl).await
		{
			tracing::warn!(error = %err, cache_key = key, "External cache write failed.");
		}
	}

	/// Removes matching keys from both tiers. A trailing `*` matches any suffix, otherwise the
	/// pattern is an exact key.
	pub async fn invalidate(&self, pattern: &str) -> InvalidateReport {
		let local_removed = {
			let mut local = self.local.lock().unwrap_or_else(|err| err.into_inner());
			let doomed: Vec<String> = local
				.iter()
				.filter(|(key, _)| pattern_matches(pattern, key))
				.map(|(key, _)| key.clone())
				.collect();

			for key in &doomed {
				local.pop(key);
			}

			doomed.len()
		};
		let external_removed = match self.external.as_ref() {
			Some(external) => match external.invalidate(pattern).await {
				Ok(count) => count,
				Err(err) => {
					tracing::warn!(error = %err, pattern, "External cache invalidation failed.");

					0
				},
			},
			None => 0,
		};

		tracing::info!(pattern, local_removed, external_removed, "Cache invalidated.");

		InvalidateReport { pattern: pattern.to_string(), local_removed, external_removed }
	}

	pub fn stats(&self) -> CacheStats {
		let local = self.local.lock().unwrap_or_else(|err| err.into_inner());

		CacheStats {
			enabled: self.cfg.enabled,
			external: self.external.is_some(),
			entries: local.len(),
			capacity: local.cap().get(),
			hits: self.hits.load(Ordering::Relaxed),
			misses: self.misses.load(Ordering::Relaxed),
		}
	}

	pub async fn get_json<T>(&self, key: &str) -> Option<T>
	where
		T: DeserializeOwned,
	{
		let raw = self.get(key).await?;

		match serde_json::from_slice(&raw) {
			Ok(value) => Some(value),
			Err(err) => {
				tracing::warn!(error = %err, cache_key = key, "Cache payload decode failed.");

				None
			},
		}
	}

	pub async fn set_json<T>(&self, kind: CacheKind, key: &str, value: &T)
	where
		T: Serialize,
	{
		match serde_json::to_vec(value) {
			Ok(raw) => self.set(key, raw, self.ttl(kind)).await,
			Err(err) => {
				tracing::warn!(error = %err, cache_key = key, "Cache payload encode failed.");
			},
		}
	}

	fn get_local(&self, key: &str, now: Instant) -> Option<Arc<[u8]>> {
		let mut local = self.local.lock().unwrap_or_else(|err| err.into_inner());
		let expired = match local.get(key) {
			Some(entry) if entry.expires_at.is_none_or(|at| at > now) =>
				return Some(entry.value.clone()),
			Some(_) => true,
			None => false,
		};

		if expired {
			local.pop(key);
		}

		None
	}

	fn put_local(&self, key: &str, value: Arc<[u8]>, ttl: Duration) {
		let expires_at = Instant::now().checked_add(ttl);
		let mut local = self.local.lock().unwrap_or_else(|err| err.into_inner());

		local.put(key.to_string(), Entry { value, expires_at });
	}
}

/// Builds `"{kind}:{hash}"` from the query in the form the intent classifier sees, its filter facets, the collection, and the
/// result limit.
pub fn cache_key(kind: CacheKind, query: &str, facets: &str, collection: &str, limit: u32) -> String {
	let payload = serde_json::json!({
		"kind": kind.as_str(),
		"query": refuge_domain::text::normalize(query),
		"facets": facets,
		"collection": collection,
		"limit": limit,
	});
	let hash = blake3::hash(payload.to_string().as_bytes()).to_hex().to_string();

	format!("{}:{}", kind.as_str(), &hash[..KEY_HASH_CHARS])
}

fn pattern_matches(pattern: &str, key: &str) -> bool {
	match pattern.strip_suffix('*') {
		Some(prefix) => key.starts_with(prefix),
		None => key == pattern,
	}
}
