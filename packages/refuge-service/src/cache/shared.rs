//! Redis-backed shared tier.

use std::time::Duration;

use redis::{AsyncCommands, aio::ConnectionManager};

use crate::{BoxFuture, Error, Result, cache::ExternalCache};

/// Shared cache tier over a multiplexed, auto-reconnecting Redis connection.
#[derive(Clone)]
pub struct RedisCache {
	conn: ConnectionManager,
}
impl RedisCache {
	pub async fn connect(url: &str) -> Result<Self> {
		let client = redis::Client::open(url).map_err(cache_error)?;
		let conn = client.get_connection_manager().await.map_err(cache_error)?;

		Ok(Self { conn })
	}

	async fn fetch(&self, key: &str) -> Result<Option<Vec<u8>>> {
		let mut conn = self.conn.clone();
		let value: Option<Vec<u8>> = conn.get(key).await.map_err(cache_error)?;

		Ok(value)
	}

	async fn store(&self, key: &str, value: &[u8], ttl: Duration) -> Result<()> {
		let mut conn = self.conn.clone();
		// Redis rejects a zero expiry.
		let secs = ttl.as_secs().max(1);
		let _: () = conn.set_ex(key, value, secs).await.map_err(cache_error)?;

		Ok(())
	}

	async fn remove(&self, pattern: &str) -> Result<u64> {
		let mut conn = self.conn.clone();
		let keys = match pattern.strip_suffix('*') {
			Some(prefix) => {
				let mut keys = Vec::new();
				let mut iter = conn
					.scan_match::<_, String>(format!("{}*", escape_glob(prefix)))
					.await
					.map_err(cache_error)?;

				while let Some(key) = iter.next_item().await {
					keys.push(key);
				}

				keys
			},
			None => vec![pattern.to_string()],
		};

		if keys.is_empty() {
			return Ok(0);
		}

		let removed: u64 = conn.del(&keys).await.map_err(cache_error)?;

		Ok(removed)
	}
}
impl ExternalCache for RedisCache {
	fn get<'a>(&'a self, key: &'a str) -> BoxFuture<'a, Result<Option<Vec<u8>>>> {
		Box::pin(self.fetch(key))
	}

	fn set<'a>(&'a self, key: &'a str, value: &'a [u8], ttl: Duration) -> BoxFuture<'a, Result<()>> {
		Box::pin(self.store(key, value, ttl))
	}

	fn invalidate<'a>(&'a self, pattern: &'a str) -> BoxFuture<'a, Result<u64>> {
		Box::pin(self.remove(pattern))
	}
}

fn cache_error(err: redis::RedisError) -> Error {
	Error::Cache { message: err.to_string() }
}

/// Escapes Redis glob metacharacters so a prefix matches literally.
fn escape_glob(prefix: &str) -> String {
	let mut escaped = String::with_capacity(prefix.len());

	for ch in prefix.chars() {
		if matches!(ch, '*' | '?' | '[' | ']' | '\\') {
			escaped.push('\\');
		}

		escaped.push(ch);
	}

	escaped
}

#[cfg(test)]
mod tests {
	use crate::cache::shared;

	#[test]
	fn glob_metacharacters_match_literally() {
		assert_eq!(shared::escape_glob("response:ab"), "response:ab");
		assert_eq!(shared::escape_glob("search:[x]?"), "search:\\[x\\]\\?");
		assert_eq!(shared::escape_glob("a\\b*"), "a\\\\b\\*");
	}
}
