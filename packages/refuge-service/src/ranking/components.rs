//! Component scores for hybrid ranking. Each returns a value clamped to 0-1.

use time::{OffsetDateTime, UtcOffset};

use refuge_domain::{Resource, UrgencyLevel};

use crate::ranking::RankContext;

const URGENT_QUERY_TERMS: [&str; 6] = ["emergency", "urgent", "crisis", "immediate", "now", "help"];

pub fn relevance(similarity: f32) -> f32 {
	clamp_unit(similarity)
}

pub fn availability(resource: &Resource, ctx: &RankContext) -> f32 {
	let mut score = 0.5;

	if is_open_now(resource, ctx) {
		score += 0.2;
	}
	if !resource.availability.appointment_required {
		score += 0.15;
	}
	if resource.availability.online_booking {
		score += 0.1;
	}
	if let Some(wait) = resource.availability.typical_wait.as_deref() {
		let wait = wait.to_lowercase();

		if wait.contains("15") || wait.contains("immediate") {
			score += 0.05;
		} else if wait.contains("hours") {
			score -= 0.1;
		} else if wait.contains("hour") {
			score -= 0.05;
		}
	}

	clamp_unit(score)
}

pub fn quality(resource: &Resource, now: OffsetDateTime) -> f32 {
	let metrics = &resource.quality;
	let mut score = metrics.average_rating.map(|rating| rating / 5.0).unwrap_or(0.5);

	if metrics.verified {
		score += 0.1;
	}

	score += (0.02 * metrics.accreditations.len() as f32).min(0.1);

	if metrics.recommendation_rate.is_some_and(|rate| rate > 80.0) {
		score += 0.1;
	}

	let age_days = (now - resource.last_updated).whole_days();

	if age_days < 30 {
		score += 0.05;
	} else if age_days > 180 {
		score -= 0.1;
	}

	clamp_unit(score)
}

pub fn accessibility(resource: &Resource, ctx: &RankContext, near_km: f32, far_km: f32) -> f32 {
	let access = &resource.access;
	let mut score = 0.7;

	if access.wheelchair_accessible() {
		score += 0.1;
	}
	if resource.speaks(&ctx.language) || access.phone_interpreter {
		score += 0.1;
	}
	if !access.onsite_interpreters.is_empty() {
		score += 0.05;
	}
	if resource.is_free() {
		score += 0.05;
	}
	if access.childcare {
		score += 0.05;
	}
	if access.cultural_liaison {
		score += 0.05;
	}
	if let Some(distance) = distance_km(resource, ctx) {
		if distance < near_km {
			score += 0.1;
		} else if distance > far_km {
			score -= 0.1;
		}
	}

	clamp_unit(score)
}

pub fn urgency_match(resource: &Resource, query: &str, ctx: &RankContext) -> f32 {
	let mut score = 0.5;

	if query_signals_urgency(query, ctx) {
		if resource.crisis.crisis_support {
			score += 0.3;
		}
		if resource.crisis.after_hours {
			score += 0.2;
		}
		if resource.urgency_level == UrgencyLevel::Critical {
			score += 0.2;
		}
	} else if resource.urgency_level == UrgencyLevel::Standard {
		score += 0.1;
	}

	clamp_unit(score)
}

pub fn query_signals_urgency(query: &str, ctx: &RankContext) -> bool {
	if ctx.urgency >= UrgencyLevel::High {
		return true;
	}

	let lowered = query.to_lowercase();

	URGENT_QUERY_TERMS.iter().any(|term| lowered.contains(term))
}

/// Opening hours for the local weekday when known, otherwise a 24/7 contact line.
pub fn is_open_now(resource: &Resource, ctx: &RankContext) -> bool {
	match resource.opening_hours.as_ref() {
		Some(hours) => {
			let offset = UtcOffset::from_hms(ctx.utc_offset_hours, 0, 0).unwrap_or(UtcOffset::UTC);
			let local = ctx.now.to_offset(offset);
			let minute_of_day = u16::from(local.hour()) * 60 + u16::from(local.minute());

			hours.is_open_at(local.weekday(), minute_of_day)
		},
		None => resource.contact.hours.as_deref().is_some_and(|hours| hours.contains("24/7")),
	}
}

pub fn distance_km(resource: &Resource, ctx: &RankContext) -> Option<f32> {
	let (user, service) = (ctx.location.as_ref()?, resource.coordinates.as_ref()?);

	Some(user.distance_km(service) as f32)
}

fn clamp_unit(value: f32) -> f32 {
	if value.is_nan() { 0.0 } else { value.clamp(0.0, 1.0) }
}
