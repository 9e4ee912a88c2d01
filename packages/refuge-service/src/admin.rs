use serde::{Deserialize, Serialize};

use crate::{CacheStats, Error, InvalidateReport, RefugeService, Result};

#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct InvalidateRequest {
	/// Exact key, or a prefix ending in `*` such as `search:*`. `*` alone clears everything.
	pub pattern: String,
}

impl RefugeService {
	pub async fn invalidate_cache(&self, req: InvalidateRequest) -> Result<InvalidateReport> {
		let pattern = req.pattern.trim();

		if pattern.is_empty() {
			return Err(Error::InvalidRequest { message: "pattern must not be empty.".to_string() });
		}
		if pattern.strip_suffix('*').unwrap_or(pattern).contains('*') {
			return Err(Error::InvalidRequest {
				message: "pattern may only contain `*` as its last character.".to_string(),
			});
		}

		Ok(self.cache.invalidate(pattern).await)
	}

	pub fn cache_stats(&self) -> CacheStats {
		self.cache.stats()
	}
}
