//! Hybrid ranking: vector similarity blended with rule-based component scores.

pub mod components;

use std::cmp::Ordering;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use refuge_domain::{Resource, UrgencyLevel, resource::GeoPoint};
use refuge_storage::qdrant::ResourceFilter;

/// A resource paired with its vector similarity.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct Candidate {
	pub resource: Resource,
	pub similarity: f32,
}

#[derive(Clone, Debug)]
pub struct RankContext {
	pub urgency: UrgencyLevel,
	pub language: String,
	pub location: Option<GeoPoint>,
	pub now: OffsetDateTime,
	pub utc_offset_hours: i8,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RankExplain {
	pub relevance: f32,
	pub availability: f32,
	pub quality: f32,
	pub accessibility: f32,
	pub urgency: f32,
	pub weighted: f32,
	/// Multiplier applied after the weighted sum. `1.0` when no boost applies.
	pub boost: f32,
	pub final_score: f32,
	pub reasons: Vec<String>,
}
impl RankExplain {
	pub fn explanation(&self) -> String {
		let mut out = format!(
			"Match score: {:.2} (relevance {:.2}, availability {:.2}, quality {:.2}, accessibility {:.2}, urgency {:.2})",
			self.final_score,
			self.relevance,
			self.availability,
			self.quality,
			self.accessibility,
			self.urgency
		);

		if self.boost != 1.0 {
			out.push_str(&format!(", critical boost x{:.1}", self.boost));
		}

		out.push_str(". ");
		out.push_str(&self.reasons.join("; "));

		out
	}
}

#[derive(Clone, Debug)]
pub struct RankedResource {
	pub resource: Resource,
	pub score: f32,
	pub explain: RankExplain,
}

/// Filters, scores, and orders candidates.
///
/// The category, urgency, and quality-floor checks run before scoring and drop candidates
/// outright. Order is final score descending, then `last_updated` descending, then id ascending.
pub fn rank(
	candidates: Vec<Candidate>,
	query: &str,
	filter: &ResourceFilter,
	ctx: &RankContext,
	cfg: &refuge_config::Ranking,
) -> Vec<RankedResource> {
	let mut ranked: Vec<RankedResource> = candidates
		.into_iter()
		.filter(|candidate| passes_filters(&candidate.resource, filter, cfg.quality_floor))
		.map(|candidate| score_candidate(candidate, query, ctx, cfg))
		.collect();

	ranked.sort_by(|a, b| {
		cmp_f32_desc(a.score, b.score)
			.then_with(|| b.resource.last_updated.cmp(&a.resource.last_updated))
			.then_with(|| a.resource.id.cmp(&b.resource.id))
	});

	ranked
}

pub fn passes_filters(resource: &Resource, filter: &ResourceFilter, quality_floor: f32) -> bool {
	if !filter.categories.is_empty() && !filter.categories.contains(&resource.category) {
		return false;
	}
	if filter.urgency.is_some_and(|urgency| urgency != resource.urgency_level) {
		return false;
	}

	resource.data_quality.is_none_or(|score| score >= quality_floor)
}

pub fn cmp_f32_desc(a: f32, b: f32) -> Ordering {
	match (a.is_nan(), b.is_nan()) {
		(true, true) => Ordering::Equal,
		(true, false) => Ordering::Greater,
		(false, true) => Ordering::Less,
		(false, false) => b.partial_cmp(&a).unwrap_or(Ordering::Equal),
	}
}

fn score_candidate(
	candidate: Candidate,
	query: &str,
	ctx: &RankContext,
	cfg: &refuge_config::Ranking,
) -> RankedResource {
	let Candidate { resource, similarity } = candidate;
	let weights = &cfg.weights;
	let relevance = components::relevance(similarity);
	let availability = components::availability(&resource, ctx);
	let quality = components::quality(&resource, ctx.now);
	let accessibility =
		components::accessibility(&resource, ctx, cfg.near_distance_km, cfg.far_distance_km);
	let urgency = components::urgency_match(&resource, query, ctx);
	let weighted = weights.relevance * relevance
		+ weights.availability * availability
		+ weights.quality * quality
		+ weights.accessibility * accessibility
		+ weights.urgency * urgency;
	let boost = if ctx.urgency == UrgencyLevel::Critical
		&& resource.urgency_level == UrgencyLevel::Critical
	{
		cfg.critical_boost
	} else {
		1.0
	};
	let final_score = weighted * boost;
	let reasons = match_reasons(&resource, relevance, ctx);

	RankedResource {
		score: final_score,
		explain: RankExplain {
			relevance,
			availability,
			quality,
			accessibility,
			urgency,
			weighted,
			boost,
			final_score,
			reasons,
		},
		resource,
	}
}

fn match_reasons(resource: &Resource, relevance: f32, ctx: &RankContext) -> Vec<String> {
	let mut reasons = Vec::new();

	if relevance > 0.8 {
		reasons.push("Highly relevant to your search".to_string());
	}
	if components::is_open_now(resource, ctx) {
		reasons.push("Currently open".to_string());
	}
	if !resource.availability.appointment_required {
		reasons.push("No appointment needed".to_string());
	}
	if let Some(rating) = resource.quality.average_rating
		&& rating >= 4.5
	{
		reasons.push(format!("Highly rated ({rating}/5)"));
	}
	if resource.quality.verified {
		reasons.push("Verified service".to_string());
	}
	if resource.is_free() {
		reasons.push("Free service".to_string());
	}
	if resource.crisis.crisis_support {
		reasons.push("Crisis support available".to_string());
	}
	if resource.access.cultural_liaison {
		reasons.push("Cultural liaison available".to_string());
	}
	if !refuge_domain::emergency::is_english(&ctx.language) && resource.speaks(&ctx.language) {
		reasons.push(format!("{} speaking staff", ctx.language.trim()));
	}
	if let Some(distance) = components::distance_km(resource, ctx) {
		reasons.push(format!("{distance:.1} km away"));
	}
	if reasons.is_empty() {
		reasons.push("Matches your search criteria".to_string());
	}

	reasons
}
