//! Filter-only listings served by scrolling the store. No embedding call is made.

use serde::{Deserialize, Serialize};

use refuge_domain::{IntentTag, Resource, ResourceCategory, UrgencyLevel};
use refuge_storage::qdrant::ResourceFilter;

use crate::{
	Error, RefugeService, Result,
	cache::{self, CacheKind},
	emergency, format,
	search::{ResponseMetadata, SearchResponse},
};

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct UrgentServicesRequest {
	pub limit: Option<u32>,
	pub language: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct CategoryListingRequest {
	pub category: String,
	pub limit: Option<u32>,
	pub language: Option<String>,
}

impl RefugeService {
	/// Critical resources first, then high-urgency resources up to the limit.
	pub async fn urgent_services(&self, req: UrgentServicesRequest) -> Result<SearchResponse> {
		let limit = self.listing_limit(req.limit)?;
		let language = listing_language(req.language);
		let key = cache::cache_key(
			CacheKind::Resource,
			"urgent",
			&format!("language={}", language.to_lowercase()),
			self.collection(),
			limit,
		);

		if let Some(response) = self.cached_listing(&key).await {
			return Ok(response);
		}

		let intent = refuge_domain::Intent {
			tag: IntentTag::Emergency,
			is_emergency: true,
			urgency: UrgencyLevel::Critical,
			confidence: IntentTag::Emergency.confidence(),
		};
		let resources = match self.scroll_urgent(limit as usize).await {
			Ok(resources) => resources,
			Err(err) if err.is_upstream() => {
				tracing::error!(error = %err, "Urgent services listing degraded.");

				return Ok(emergency::degraded_response(&intent));
			},
			Err(err) => return Err(err),
		};
		let formatted = format::format_listing(
			&resources,
			IntentTag::Emergency,
			UrgencyLevel::Critical,
			&language,
			&self.cfg.formatter,
		);
		let metadata = ResponseMetadata::for_intent(&intent, UrgencyLevel::Critical, resources.len());
		let response = SearchResponse::from_formatted(formatted, metadata);

		self.store_listing(&key, &response).await;

		Ok(response)
	}

	pub async fn category_listing(&self, req: CategoryListingRequest) -> Result<SearchResponse> {
		let category: ResourceCategory = req.category.parse().map_err(|_| Error::InvalidRequest {
			message: format!("Unknown category: {}.", req.category.trim()),
		})?;
		let limit = self.listing_limit(req.limit)?;
		let language = listing_language(req.language);
		let key = cache::cache_key(
			CacheKind::Resource,
			category.as_str(),
			&format!("language={}", language.to_lowercase()),
			self.collection(),
			limit,
		);

		if let Some(response) = self.cached_listing(&key).await {
			return Ok(response);
		}

		let tag = intent_for_category(category);
		let intent = refuge_domain::Intent {
			tag,
			is_emergency: false,
			urgency: UrgencyLevel::Standard,
			confidence: tag.confidence(),
		};
		let resources = match self
			.index
			.scroll(&ResourceFilter::category(category), limit as usize)
			.await
			.map_err(Error::from)
		{
			Ok(mut resources) => {
				sort_listing(&mut resources);

				resources
			},
			Err(err) => {
				tracing::error!(error = %err, category = category.as_str(), "Category listing degraded.");

				return Ok(emergency::degraded_response(&intent));
			},
		};
		let formatted = format::format_listing(
			&resources,
			tag,
			UrgencyLevel::Standard,
			&language,
			&self.cfg.formatter,
		);
		let metadata = ResponseMetadata::for_intent(&intent, UrgencyLevel::Standard, resources.len());
		let response = SearchResponse::from_formatted(formatted, metadata);

		self.store_listing(&key, &response).await;

		Ok(response)
	}

	async fn scroll_urgent(&self, limit: usize) -> Result<Vec<Resource>> {
		let mut critical =
			self.index.scroll(&ResourceFilter::urgency(UrgencyLevel::Critical), limit).await?;

		sort_listing(&mut critical);
		critical.truncate(limit);

		if critical.len() < limit {
			let mut high = self
				.index
				.scroll(&ResourceFilter::urgency(UrgencyLevel::High), limit - critical.len())
				.await?;

			sort_listing(&mut high);
			high.truncate(limit - critical.len());
			critical.extend(high);
		}

		Ok(critical)
	}

	fn listing_limit(&self, limit: Option<u32>) -> Result<u32> {
		match limit {
			Some(0) => Err(Error::InvalidRequest {
				message: "limit must be greater than zero.".to_string(),
			}),
			Some(limit) => Ok(limit.min(self.cfg.search.max_limit)),
			None => Ok(self.cfg.search.default_limit),
		}
	}

	async fn cached_listing(&self, key: &str) -> Option<SearchResponse> {
		let mut response = self.cache.get_json::<SearchResponse>(key).await?;

		response.metadata.cached = true;

		Some(response)
	}

	async fn store_listing(&self, key: &str, response: &SearchResponse) {
		if !response.resources.is_empty() {
			self.cache.set_json(CacheKind::Resource, key, response).await;
		}
	}
}

fn listing_language(language: Option<String>) -> String {
	language
		.map(|language| language.trim().to_string())
		.filter(|language| !language.is_empty())
		.unwrap_or_else(|| "English".to_string())
}

/// Most recently updated first, then by id.
fn sort_listing(resources: &mut [Resource]) {
	resources.sort_by(|a, b| b.last_updated.cmp(&a.last_updated).then_with(|| a.id.cmp(&b.id)));
}

fn intent_for_category(category: ResourceCategory) -> IntentTag {
	match category {
		ResourceCategory::LegalAid => IntentTag::Legal,
		ResourceCategory::Healthcare | ResourceCategory::MentalHealth => IntentTag::Health,
		ResourceCategory::Housing => IntentTag::Housing,
		ResourceCategory::Education | ResourceCategory::LanguageLearning => IntentTag::Education,
		ResourceCategory::Employment => IntentTag::Economic,
		ResourceCategory::EmergencyServices => IntentTag::Emergency,
		ResourceCategory::FinancialAssistance => IntentTag::Financial,
		ResourceCategory::ChildrenServices => IntentTag::Family,
		ResourceCategory::CommunitySupport
		| ResourceCategory::GovernmentPrograms
		| ResourceCategory::WomenServices
		| ResourceCategory::DisabilitySupport => IntentTag::General,
	}
}
