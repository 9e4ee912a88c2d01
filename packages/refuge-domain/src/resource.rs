use std::{fmt, str::FromStr};

use serde::{Deserialize, Deserializer, Serialize};
use time::{OffsetDateTime, Weekday};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceCategory {
	LegalAid,
	Healthcare,
	Housing,
	Education,
	Employment,
	LanguageLearning,
	EmergencyServices,
	CommunitySupport,
	FinancialAssistance,
	MentalHealth,
	GovernmentPrograms,
	ChildrenServices,
	WomenServices,
	DisabilitySupport,
}
impl ResourceCategory {
	pub const ALL: [Self; 14] = [
		Self::LegalAid,
		Self::Healthcare,
		Self::Housing,
		Self::Education,
		Self::Employment,
		Self::LanguageLearning,
		Self::EmergencyServices,
		Self::CommunitySupport,
		Self::FinancialAssistance,
		Self::MentalHealth,
		Self::GovernmentPrograms,
		Self::ChildrenServices,
		Self::WomenServices,
		Self::DisabilitySupport,
	];

	pub fn as_str(self) -> &'static str {
		match self {
			Self::LegalAid => "legal_aid",
			Self::Healthcare => "healthcare",
			Self::Housing => "housing",
			Self::Education => "education",
			Self::Employment => "employment",
			Self::LanguageLearning => "language_learning",
			Self::EmergencyServices => "emergency_services",
			Self::CommunitySupport => "community_support",
			Self::FinancialAssistance => "financial_assistance",
			Self::MentalHealth => "mental_health",
			Self::GovernmentPrograms => "government_programs",
			Self::ChildrenServices => "children_services",
			Self::WomenServices => "women_services",
			Self::DisabilitySupport => "disability_support",
		}
	}

	/// Title-cased label used in embedding text, e.g. `Legal Aid`.
	pub fn label(self) -> String {
		self.as_str()
			.split('_')
			.map(|word| {
				let mut chars = word.chars();

				match chars.next() {
					Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
					None => String::new(),
				}
			})
			.collect::<Vec<_>>()
			.join(" ")
	}
}
impl fmt::Display for ResourceCategory {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl FromStr for ResourceCategory {
	type Err = UnknownCategory;

	fn from_str(s: &str) -> Result<Self, Self::Err> {
		let needle = s.trim().to_ascii_lowercase().replace([' ', '-'], "_");

		Self::ALL
			.into_iter()
			.find(|category| category.as_str() == needle)
			.ok_or_else(|| UnknownCategory(s.to_string()))
	}
}

#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[error("unknown resource category {0:?}")]
pub struct UnknownCategory(pub String);

/// Severity tag shared by queries and resources. Variants are ordered from least to most severe.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, Ord, PartialEq, PartialOrd, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UrgencyLevel {
	Low,
	#[default]
	Standard,
	High,
	Critical,
}
impl UrgencyLevel {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Low => "low",
			Self::Standard => "standard",
			Self::High => "high",
			Self::Critical => "critical",
		}
	}

	/// Strict parse for caller-supplied filters.
	pub fn parse_strict(value: &str) -> Option<Self> {
		match value.trim().to_ascii_lowercase().as_str() {
			"low" => Some(Self::Low),
			"standard" => Some(Self::Standard),
			"high" => Some(Self::High),
			"critical" => Some(Self::Critical),
			_ => None,
		}
	}

	/// Lenient parse for stored records. Unknown values degrade to `Standard`.
	pub fn parse_lenient(value: &str) -> Self {
		Self::parse_strict(value).unwrap_or_default()
	}
}
impl fmt::Display for UrgencyLevel {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}
impl<'de> Deserialize<'de> for UrgencyLevel {
	fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
	where
		D: Deserializer<'de>,
	{
		let raw = Option::<String>::deserialize(deserializer)?;

		Ok(raw.as_deref().map(Self::parse_lenient).unwrap_or_default())
	}
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct ContactInfo {
	pub phone: Option<String>,
	pub email: Option<String>,
	pub website: Option<String>,
	pub address: Option<String>,
	pub hours: Option<String>,
}

#[derive(Clone, Copy, Debug, Deserialize, PartialEq, Serialize)]
pub struct GeoPoint {
	pub lat: f64,
	pub lon: f64,
}
impl GeoPoint {
	const EARTH_RADIUS_KM: f64 = 6_371.0;

	/// Great-circle distance in kilometres.
	pub fn distance_km(&self, other: &GeoPoint) -> f64 {
		let (lat1, lat2) = (self.lat.to_radians(), other.lat.to_radians());
		let d_lat = lat2 - lat1;
		let d_lon = (other.lon - self.lon).to_radians();
		let a = (d_lat / 2.0).sin().powi(2) + lat1.cos() * lat2.cos() * (d_lon / 2.0).sin().powi(2);

		2.0 * Self::EARTH_RADIUS_KM * a.sqrt().asin()
	}
}

/// Weekly opening hours. Each day is `"HH:MM-HH:MM"`, `"24 hours"`, or `"Closed"`.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct OpeningHours {
	pub monday: Option<String>,
	pub tuesday: Option<String>,
	pub wednesday: Option<String>,
	pub thursday: Option<String>,
	pub friday: Option<String>,
	pub saturday: Option<String>,
	pub sunday: Option<String>,
}
impl OpeningHours {
	pub fn for_weekday(&self, weekday: Weekday) -> Option<&str> {
		let day = match weekday {
			Weekday::Monday => &self.monday,
			Weekday::Tuesday => &self.tuesday,
			Weekday::Wednesday => &self.wednesday,
			Weekday::Thursday => &self.thursday,
			Weekday::Friday => &self.friday,
			Weekday::Saturday => &self.saturday,
			Weekday::Sunday => &self.sunday,
		};

		day.as_deref()
	}

	/// Whether the service is open at `minute_of_day` on `weekday`. Malformed entries read as
	/// closed.
	pub fn is_open_at(&self, weekday: Weekday, minute_of_day: u16) -> bool {
		let Some(hours) = self.for_weekday(weekday) else {
			return false;
		};
		let hours = hours.trim().to_ascii_lowercase();

		if hours == "24 hours" || hours == "24/7" {
			return true;
		}

		let Some((open, close)) = hours.split_once('-') else {
			return false;
		};

		match (parse_clock(open), parse_clock(close)) {
			(Some(open), Some(close)) if open <= close => (open..close).contains(&minute_of_day),
			// Overnight span, e.g. 22:00-06:00.
			(Some(open), Some(close)) => minute_of_day >= open || minute_of_day < close,
			_ => false,
		}
	}
}

fn parse_clock(raw: &str) -> Option<u16> {
	let (hour, minute) = raw.trim().split_once(':')?;
	let hour: u16 = hour.parse().ok()?;
	let minute: u16 = minute.parse().ok()?;

	(hour <= 24 && minute < 60).then_some(hour * 60 + minute)
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct Availability {
	pub appointment_required: bool,
	pub online_booking: bool,
	/// Free text such as `"15 minutes"` or `"2-3 hours"`.
	pub typical_wait: Option<String>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct QualityMetrics {
	/// 0-5 stars.
	pub average_rating: Option<f32>,
	pub verified: bool,
	pub accreditations: Vec<String>,
	/// Percentage of clients who would recommend the service.
	pub recommendation_rate: Option<f32>,
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct AccessSupport {
	/// e.g. `wheelchair_accessible`, `hearing_loop`.
	pub features: Vec<String>,
	pub phone_interpreter: bool,
	pub onsite_interpreters: Vec<String>,
	pub cultural_liaison: bool,
	pub childcare: bool,
}
impl AccessSupport {
	pub fn wheelchair_accessible(&self) -> bool {
		self.features.iter().any(|feature| feature.eq_ignore_ascii_case("wheelchair_accessible"))
	}
}

#[derive(Clone, Debug, Default, Deserialize, PartialEq, Serialize)]
#[serde(default)]
pub struct CrisisSupport {
	pub crisis_support: bool,
	pub after_hours: bool,
}

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct Resource {
	pub id: String,
	pub name: String,
	#[serde(default)]
	pub description: String,
	pub category: ResourceCategory,
	#[serde(default)]
	pub subcategory: Option<String>,
	#[serde(default)]
	pub contact: ContactInfo,
	#[serde(default)]
	pub services_provided: Vec<String>,
	#[serde(default = "default_languages")]
	pub languages_available: Vec<String>,
	#[serde(default = "default_cost")]
	pub cost: String,
	#[serde(default)]
	pub eligibility: Option<String>,
	#[serde(default = "default_location")]
	pub location: String,
	#[serde(default)]
	pub coordinates: Option<GeoPoint>,
	#[serde(default)]
	pub urgency_level: UrgencyLevel,
	#[serde(default)]
	pub keywords: Vec<String>,
	#[serde(with = "time::serde::rfc3339")]
	pub last_updated: OffsetDateTime,
	#[serde(default)]
	pub opening_hours: Option<OpeningHours>,
	#[serde(default)]
	pub availability: Availability,
	#[serde(default)]
	pub quality: QualityMetrics,
	#[serde(default)]
	pub access: AccessSupport,
	#[serde(default)]
	pub crisis: CrisisSupport,
	/// Service does not check visa status.
	#[serde(default)]
	pub confidential: bool,
	/// Curated data-quality score in 0-1.
	#[serde(default)]
	pub data_quality: Option<f32>,
}
impl Resource {
	/// Checks the record invariants enforced at the storage boundary.
	pub fn validate(&self) -> Result<(), InvalidResource> {
		if self.id.trim().is_empty() {
			return Err(InvalidResource::EmptyId);
		}
		if self.name.trim().is_empty() {
			return Err(InvalidResource::EmptyName { id: self.id.clone() });
		}
		if let Some(score) = self.data_quality
			&& !(0.0..=1.0).contains(&score)
		{
			return Err(InvalidResource::DataQualityOutOfRange { id: self.id.clone(), score });
		}

		Ok(())
	}

	pub fn is_free(&self) -> bool {
		self.cost.trim().to_lowercase().starts_with("free")
	}

	pub fn speaks(&self, language: &str) -> bool {
		let language = language.trim();

		self.languages_available.iter().any(|available| available.trim().eq_ignore_ascii_case(language))
	}

	/// Text embedded for vector search.
	pub fn embedding_text(&self) -> String {
		let mut parts = vec![
			format!("Service: {}", self.name),
			format!("Category: {}", self.category.label()),
			format!("Description: {}", self.description),
		];

		if let Some(subcategory) = self.subcategory.as_deref() {
			parts.push(format!("Subcategory: {subcategory}"));
		}
		if !self.services_provided.is_empty() {
			parts.push(format!("Services: {}", self.services_provided.join(", ")));
		}

		parts.push(format!("Location: {}", self.location));

		if let Some(eligibility) = self.eligibility.as_deref() {
			parts.push(format!("Eligibility: {eligibility}"));
		}
		if !self.languages_available.is_empty() {
			parts.push(format!("Languages: {}", self.languages_available.join(", ")));
		}
		if !self.keywords.is_empty() {
			parts.push(format!("Keywords: {}", self.keywords.join(", ")));
		}

		parts.join(" | ")
	}
}

#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum InvalidResource {
	#[error("resource id must be non-empty")]
	EmptyId,
	#[error("resource {id} must have a non-empty name")]
	EmptyName { id: String },
	#[error("resource {id} data_quality {score} must be in the range 0.0-1.0")]
	DataQualityOutOfRange { id: String, score: f32 },
}

fn default_languages() -> Vec<String> {
	vec!["English".to_string()]
}

fn default_cost() -> String {
	"Free".to_string()
}

fn default_location() -> String {
	"Canberra, ACT".to_string()
}
