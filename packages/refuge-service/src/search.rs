use std::time::Duration;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use refuge_domain::{
	EconomicNeed, EmergencyKind, Intent, IntentTag, Need, ResourceCategory, UrgencyLevel, economic,
	intent, needs, resource::GeoPoint, rewrite,
};
use refuge_storage::qdrant::ResourceFilter;

use crate::{
	Error, RefugeService, Result,
	cache::{self, CacheKind},
	emergency,
	format::{self, DisplayRecord, FormattedResults},
	ranking::{self, Candidate, RankContext},
};

const DEFAULT_LANGUAGE: &str = "English";

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct SearchRequest {
	pub message: String,
	/// One category or several separated by commas.
	pub category: Option<String>,
	pub urgency: Option<String>,
	pub language: Option<String>,
	pub limit: Option<u32>,
	pub location: Option<GeoPoint>,
}
impl SearchRequest {
	pub fn new(message: impl Into<String>) -> Self {
		Self { message: message.into(), ..Default::default() }
	}

	/// Validates the request. Unknown categories and urgencies are dropped with a warning.
	pub fn into_query(self, cfg: &refuge_config::Search) -> Result<SearchQuery> {
		let text = self.message.trim().to_string();

		if text.is_empty() {
			return Err(Error::InvalidRequest { message: "message must not be empty.".to_string() });
		}

		let limit = match self.limit {
			Some(0) =>
				return Err(Error::InvalidRequest {
					message: "limit must be greater than zero.".to_string(),
				}),
			Some(limit) => limit.min(cfg.max_limit),
			None => cfg.default_limit,
		};
		let categories = self.category.as_deref().map(parse_categories).unwrap_or_default();
		let urgency = self.urgency.as_deref().and_then(parse_urgency);
		let language = self
			.language
			.map(|language| language.trim().to_string())
			.filter(|language| !language.is_empty())
			.unwrap_or_else(|| DEFAULT_LANGUAGE.to_string());

		Ok(SearchQuery { text, categories, urgency, language, limit, location: self.location })
	}
}

#[derive(Clone, Debug, PartialEq)]
pub struct SearchQuery {
	pub text: String,
	pub categories: Vec<ResourceCategory>,
	pub urgency: Option<UrgencyLevel>,
	pub language: String,
	pub limit: u32,
	pub location: Option<GeoPoint>,
}
impl SearchQuery {
	pub fn filter(&self) -> ResourceFilter {
		ResourceFilter { categories: self.categories.clone(), urgency: self.urgency }
	}

	/// Facets that change which candidates the store returns.
	fn filter_facets(&self) -> String {
		let categories: Vec<&str> =
			self.categories.iter().map(|category| category.as_str()).collect();

		format!(
			"categories={};urgency={}",
			categories.join(","),
			self.urgency.map(UrgencyLevel::as_str).unwrap_or("")
		)
	}

	/// Facets that change the formatted response.
	fn response_facets(&self, mode: &str) -> String {
		let location = self
			.location
			.map(|point| format!("{:.4},{:.4}", point.lat, point.lon))
			.unwrap_or_default();

		format!(
			"mode={mode};{};language={};location={location}",
			self.filter_facets(),
			self.language.to_lowercase()
		)
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct SearchResponse {
	pub success: bool,
	pub message: String,
	pub resources: Vec<DisplayRecord>,
	pub quick_replies: Vec<String>,
	pub call_scripts: Vec<String>,
	pub next_steps: Vec<String>,
	pub metadata: ResponseMetadata,
}
impl SearchResponse {
	pub(crate) fn from_formatted(formatted: FormattedResults, metadata: ResponseMetadata) -> Self {
		Self {
			success: true,
			message: formatted.message,
			resources: formatted.services,
			quick_replies: formatted.quick_replies,
			call_scripts: formatted.call_scripts,
			next_steps: formatted.next_steps,
			metadata,
		}
	}
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct ResponseMetadata {
	pub intent: IntentTag,
	pub urgency: UrgencyLevel,
	pub confidence: f32,
	pub results_count: usize,
	pub cached: bool,
	pub degraded: bool,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub emergency_type: Option<EmergencyKind>,
	/// Needs implied by the message but not asked for.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub hidden_needs: Vec<Need>,
	/// Services to arrange once an emergency has passed.
	#[serde(default, skip_serializing_if = "Vec::is_empty")]
	pub follow_up: Vec<String>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub economic_need: Option<EconomicNeed>,
}
impl ResponseMetadata {
	pub(crate) fn for_intent(intent: &Intent, urgency: UrgencyLevel, results_count: usize) -> Self {
		Self {
			intent: intent.tag,
			urgency,
			confidence: intent.confidence,
			results_count,
			cached: false,
			degraded: false,
			emergency_type: None,
			hidden_needs: Vec::new(),
			follow_up: Vec::new(),
			economic_need: None,
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum SearchMode {
	/// Classifier-driven search.
	Standard,
	/// Follow-up crisis search: emergency rewrite and critical ranking context.
	Crisis,
	/// Economic-integration routes: fixed retrieval text per route, scoped categories.
	Economic,
}
impl SearchMode {
	fn as_str(self) -> &'static str {
		match self {
			Self::Standard => "standard",
			Self::Crisis => "crisis",
			Self::Economic => "economic",
		}
	}
}

impl RefugeService {
	/// Runs the full pipeline for one chat message.
	///
	/// Emergency messages short-circuit to fixed crisis contacts without touching the embedding
	/// provider or the store. Upstream failures degrade to essential contacts instead of erroring.
	pub async fn search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let query = req.into_query(&self.cfg.search)?;
		let intent = intent::classify(&query.text);

		if intent.is_emergency {
			let response = emergency::emergency_response(&query.text, &query.language);

			tracing::info!(
				intent = intent.tag.as_str(),
				emergency_type = ?response.metadata.emergency_type,
				"Emergency short-circuit."
			);

			return Ok(response);
		}

		self.search_with_mode(query, intent, SearchMode::Standard).await
	}

	/// Vector search with the emergency rewrite and critical ranking context. Never
	/// short-circuits, so callers get directory matches rather than the fixed contact set.
	pub async fn crisis_search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let query = req.into_query(&self.cfg.search)?;
		let intent = Intent {
			tag: IntentTag::Emergency,
			is_emergency: true,
			urgency: UrgencyLevel::Critical,
			confidence: IntentTag::Emergency.confidence(),
		};

		self.search_with_mode(query, intent, SearchMode::Crisis).await
	}

	/// Routes work and business questions to skills recognition, entrepreneurship, mentoring,
	/// training, or career pathway services.
	pub async fn economic_search(&self, req: SearchRequest) -> Result<SearchResponse> {
		let query = req.into_query(&self.cfg.search)?;
		let intent = Intent {
			tag: IntentTag::Economic,
			is_emergency: false,
			urgency: UrgencyLevel::Standard,
			confidence: IntentTag::Economic.confidence(),
		};

		self.search_with_mode(query, intent, SearchMode::Economic).await
	}

	async fn search_with_mode(
		&self,
		query: SearchQuery,
		intent: Intent,
		mode: SearchMode,
	) -> Result<SearchResponse> {
		let response_key = cache::cache_key(
			CacheKind::Response,
			&query.text,
			&query.response_facets(mode.as_str()),
			self.collection(),
			query.limit,
		);

		if let Some(mut cached) = self.cache.get_json::<SearchResponse>(&response_key).await {
			tracing::info!(
				cache_kind = CacheKind::Response.as_str(),
				cache_key_prefix = cache_key_prefix(&response_key),
				hit = true,
				"Cache lookup."
			);

			cached.metadata.cached = true;

			return Ok(cached);
		}

		let outcome = match self.run_pipeline(&query, &intent, mode).await {
			Ok(response)
				if mode == SearchMode::Standard
					&& response.resources.is_empty()
					&& economic::mentions_work(&query.text) =>
			{
				tracing::info!(
					intent = intent.tag.as_str(),
					"No matches. Falling back to economic routes."
				);

				self.run_pipeline(&query, &intent, SearchMode::Economic).await
			},
			outcome => outcome,
		};

		match outcome {
			Ok(response) => {
				if !response.resources.is_empty() {
					self.cache.set_json(CacheKind::Response, &response_key, &response).await;
				}

				Ok(response)
			},
			Err(err) if err.is_upstream() => {
				tracing::error!(error = %err, intent = intent.tag.as_str(), "Search degraded.");

				Ok(emergency::degraded_response(&intent))
			},
			Err(err) => Err(err),
		}
	}

	async fn run_pipeline(
		&self,
		query: &SearchQuery,
		intent: &Intent,
		mode: SearchMode,
	) -> Result<SearchResponse> {
		let economic_need = match mode {
			SearchMode::Economic => Some(economic::classify(&query.text)),
			SearchMode::Standard | SearchMode::Crisis => None,
		};
		let (rewritten, context_urgency, format_tag) = match (mode, economic_need) {
			(SearchMode::Crisis, _) => (
				rewrite::rewrite(&query.text, IntentTag::Emergency),
				UrgencyLevel::Critical,
				intent.tag,
			),
			(_, Some(need)) =>
				(need.query_terms().to_string(), context_urgency(intent, query), IntentTag::Economic),
			_ => (rewrite::rewrite(&query.text, intent.tag), context_urgency(intent, query), intent.tag),
		};
		// Economic routes replace the request filters with the route's own scope.
		let scoped;
		let query = match economic_need {
			Some(need) => {
				scoped = SearchQuery {
					categories: need.categories().to_vec(),
					urgency: None,
					..query.clone()
				};

				&scoped
			},
			None => query,
		};
		let candidates = self.candidates(query, &rewritten).await?;
		let candidate_count = candidates.len();
		let ctx = RankContext {
			urgency: context_urgency,
			language: query.language.clone(),
			location: query.location,
			now: OffsetDateTime::now_utc(),
			utc_offset_hours: self.cfg.search.region_utc_offset_hours,
		};
		let mut ranked =
			ranking::rank(candidates, &query.text, &query.filter(), &ctx, &self.cfg.ranking);

		if let Some(need) = economic_need.filter(|need| need.free_only()) {
			ranked.retain(|item| economic::is_affordable(&item.resource));

			tracing::debug!(route = need.as_str(), kept = ranked.len(), "Kept free services only.");
		}

		ranked.truncate(query.limit as usize);

		let analysis = needs::analyze(&query.text, format_tag);
		let mut formatted = format::format(
			&ranked,
			format_tag,
			intent.urgency,
			&query.language,
			&analysis,
			&self.cfg.formatter,
		);

		if let Some(need) = economic_need {
			format::apply_economic_route(&mut formatted, need, &self.cfg.formatter);
		}

		let mut metadata = ResponseMetadata::for_intent(intent, intent.urgency, ranked.len());

		metadata.hidden_needs = analysis.hidden_needs;
		metadata.economic_need = economic_need;

		tracing::info!(
			intent = intent.tag.as_str(),
			mode = mode.as_str(),
			economic_route = economic_need.map(EconomicNeed::as_str),
			context_urgency = context_urgency.as_str(),
			candidates = candidate_count,
			results = ranked.len(),
			"Search completed."
		);

		Ok(SearchResponse::from_formatted(formatted, metadata))
	}

	/// Vector candidates for the rewritten query. Timeouts yield an empty set.
	async fn candidates(&self, query: &SearchQuery, rewritten: &str) -> Result<Vec<Candidate>> {
		let fetch = query.limit.saturating_mul(self.cfg.search.candidate_multiplier.max(1));
		let key = cache::cache_key(
			CacheKind::Search,
			rewritten,
			&query.filter_facets(),
			self.collection(),
			fetch,
		);

		if let Some(candidates) = self.cache.get_json::<Vec<Candidate>>(&key).await {
			tracing::info!(
				cache_kind = CacheKind::Search.as_str(),
				cache_key_prefix = cache_key_prefix(&key),
				hit = true,
				"Cache lookup."
			);

			return Ok(candidates);
		}

		let Some(vector) = self.embed_query(rewritten).await? else {
			return Ok(Vec::new());
		};
		let filter = query.filter();
		let hits = match tokio::time::timeout(
			self.upstream_timeout(),
			self.index.search(&vector, &filter, fetch as usize),
		)
		.await
		{
			Ok(result) => result?,
			Err(_) => {
				tracing::warn!(
					timeout_ms = self.cfg.search.upstream_timeout_ms,
					"Vector search timed out."
				);

				return Ok(Vec::new());
			},
		};
		let candidates: Vec<Candidate> = hits
			.into_iter()
			.map(|hit| Candidate { resource: hit.resource, similarity: hit.score })
			.collect();

		if !candidates.is_empty() {
			self.cache.set_json(CacheKind::Search, &key, &candidates).await;
		}

		Ok(candidates)
	}

	/// Embeds one query, through the embedding cache. `None` means the provider timed out.
	async fn embed_query(&self, text: &str) -> Result<Option<Vec<f32>>> {
		let cfg = &self.cfg.providers.embedding;
		let key = cache::cache_key(
			CacheKind::Embedding,
			text,
			&cfg.provider_id,
			&cfg.model,
			cfg.dimensions,
		);

		if let Some(vector) = self.cache.get_json::<Vec<f32>>(&key).await {
			return Ok(Some(vector));
		}

		let texts = [text.to_string()];
		let embeddings =
			match tokio::time::timeout(self.upstream_timeout(), self.providers.embedding.embed(cfg, &texts))
				.await
			{
				Ok(result) => result?,
				Err(_) => {
					tracing::warn!(
						timeout_ms = self.cfg.search.upstream_timeout_ms,
						"Embedding request timed out."
					);

					return Ok(None);
				},
			};
		let vector = embeddings.into_iter().next().ok_or_else(|| Error::Provider {
			message: "Embedding provider returned no vectors.".to_string(),
		})?;

		if vector.len() != self.cfg.storage.qdrant.vector_dim as usize {
			return Err(Error::Provider {
				message: "Embedding vector dimension mismatch.".to_string(),
			});
		}

		self.cache.set_json(CacheKind::Embedding, &key, &vector).await;

		Ok(Some(vector))
	}

	fn upstream_timeout(&self) -> Duration {
		Duration::from_millis(self.cfg.search.upstream_timeout_ms)
	}
}

/// The strongest of the classifier urgency, query-side urgency cues, and the requested filter.
pub fn context_urgency(intent: &Intent, query: &SearchQuery) -> UrgencyLevel {
	[Some(intent.urgency), intent::urgency_signal(&query.text), query.urgency]
		.into_iter()
		.flatten()
		.max()
		.unwrap_or_default()
}

pub(crate) fn cache_key_prefix(key: &str) -> &str {
	key.get(..12).unwrap_or(key)
}

fn parse_categories(raw: &str) -> Vec<ResourceCategory> {
	let mut categories = Vec::new();

	for part in raw.split(',').map(str::trim).filter(|part| !part.is_empty()) {
		match part.parse::<ResourceCategory>() {
			Ok(category) if !categories.contains(&category) => categories.push(category),
			Ok(_) => {},
			Err(_) => tracing::warn!(category = part, "Unknown category filter dropped."),
		}
	}

	categories
}

fn parse_urgency(raw: &str) -> Option<UrgencyLevel> {
	let raw = raw.trim();

	if raw.is_empty() {
		return None;
	}

	let urgency = UrgencyLevel::parse_strict(raw);

	if urgency.is_none() {
		tracing::warn!(urgency = raw, "Unknown urgency filter dropped.");
	}

	urgency
}

#[cfg(test)]
mod tests {
	use refuge_domain::{ResourceCategory, UrgencyLevel, intent};

	use crate::search::{self, SearchRequest};

	fn cfg() -> refuge_config::Search {
		refuge_config::Search::default()
	}

	#[test]
	fn rejects_empty_message_and_zero_limit() {
		let err = SearchRequest::new("   ").into_query(&cfg()).expect_err("Expected empty message error.");

		assert!(err.to_string().contains("message must not be empty"));

		let mut req = SearchRequest::new("visa help");

		req.limit = Some(0);

		let err = req.into_query(&cfg()).expect_err("Expected zero limit error.");

		assert!(err.to_string().contains("limit must be greater than zero"));
	}

	#[test]
	fn caps_limit_and_defaults_language() {
		let mut req = SearchRequest::new("visa help");

		req.limit = Some(50);

		let query = req.into_query(&cfg()).expect("Expected valid query.");

		assert_eq!(query.limit, 10);
		assert_eq!(query.language, "English");
		assert_eq!(SearchRequest::new("x").into_query(&cfg()).expect("Expected query.").limit, 3);
	}

	#[test]
	fn drops_unknown_filters() {
		let mut req = SearchRequest::new("doctor");

		req.category = Some("healthcare, spaceships ,mental health,healthcare".to_string());
		req.urgency = Some("whenever".to_string());

		let query = req.into_query(&cfg()).expect("Expected valid query.");

		assert_eq!(
			query.categories,
			vec![ResourceCategory::Healthcare, ResourceCategory::MentalHealth]
		);
		assert_eq!(query.urgency, None);
	}

	#[test]
	fn context_urgency_takes_strongest_signal() {
		let query = SearchRequest::new("I need a job today").into_query(&cfg()).expect("Expected query.");
		let intent = intent::classify(&query.text);

		assert_eq!(intent.urgency, UrgencyLevel::Standard);
		assert_eq!(search::context_urgency(&intent, &query), UrgencyLevel::High);

		let mut req = SearchRequest::new("learn english");

		req.urgency = Some("critical".to_string());

		let query = req.into_query(&cfg()).expect("Expected query.");

		assert_eq!(
			search::context_urgency(&intent::classify(&query.text), &query),
			UrgencyLevel::Critical
		);
	}

	#[test]
	fn response_facets_separate_filters_and_modes() {
		let plain = SearchRequest::new("doctor").into_query(&cfg()).expect("Expected query.");
		let mut req = SearchRequest::new("doctor");

		req.language = Some("Arabic".to_string());

		let arabic = req.into_query(&cfg()).expect("Expected query.");

		assert_ne!(plain.response_facets("standard"), arabic.response_facets("standard"));
		assert_ne!(plain.response_facets("standard"), plain.response_facets("crisis"));
		assert_eq!(plain.filter_facets(), arabic.filter_facets());
	}
}
