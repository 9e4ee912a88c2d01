//! Economic-integration sub-routing: which kind of work or business help a message asks for.

use serde::{Deserialize, Serialize};

use crate::{
	resource::{Resource, ResourceCategory},
	text,
};

pub const QUICK_REPLIES: [&str; 5] =
	["Skills assessment", "Start a business", "Free training", "Find a mentor", "Job search help"];

/// Words that send a fruitless general search on to the economic sub-routes.
const FALLBACK_TRIGGERS: [&str; 5] = ["job", "work", "skill", "qualification", "business"];

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EconomicNeed {
	SkillsRecognition,
	Entrepreneurship,
	Mentoring,
	Training,
	CareerPathways,
}
impl EconomicNeed {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::SkillsRecognition => "skills_recognition",
			Self::Entrepreneurship => "entrepreneurship",
			Self::Mentoring => "mentoring",
			Self::Training => "training",
			Self::CareerPathways => "career_pathways",
		}
	}

	/// Fixed retrieval text. The user's wording only selects the route.
	pub fn query_terms(self) -> &'static str {
		match self {
			Self::SkillsRecognition =>
				"skills assessment qualification recognition bridging program professional registration career pathway",
			Self::Entrepreneurship =>
				"business entrepreneur startup NEIS microfinance business plan incubator",
			Self::Mentoring => "mentoring mentor professional network networking guidance",
			Self::Training =>
				"vocational training certificate TAFE apprenticeship course free JobTrainer subsidized",
			Self::CareerPathways => "career pathway professional development placement",
		}
	}

	/// Categories searched when the request names none.
	pub fn categories(self) -> &'static [ResourceCategory] {
		match self {
			Self::SkillsRecognition | Self::Entrepreneurship => &[ResourceCategory::Employment],
			Self::Training => &[ResourceCategory::Education, ResourceCategory::Employment],
			Self::Mentoring | Self::CareerPathways => &[],
		}
	}

	pub fn message(self) -> &'static str {
		match self {
			Self::SkillsRecognition => "Here are services to help recognize your qualifications:",
			Self::Entrepreneurship => "Here are business and entrepreneurship support services:",
			Self::Mentoring => "Here are mentoring and networking opportunities:",
			Self::Training => "Here are training opportunities (many are FREE):",
			Self::CareerPathways => "Here are employment and career services:",
		}
	}

	/// Whether the route only lists free or subsidised services.
	pub fn free_only(self) -> bool {
		self == Self::Training
	}
}

pub fn classify(raw: &str) -> EconomicNeed {
	let lowered = text::normalize(raw);
	let any = |keywords: &[&str]| keywords.iter().any(|keyword| lowered.contains(keyword));

	if any(&["skill", "qualification", "degree", "recognition"]) {
		EconomicNeed::SkillsRecognition
	} else if any(&["business", "entrepreneur", "startup", "loan"]) {
		EconomicNeed::Entrepreneurship
	} else if any(&["mentor", "network", "professional"]) {
		EconomicNeed::Mentoring
	} else if any(&["training", "course", "certificate", "tafe"]) {
		EconomicNeed::Training
	} else {
		EconomicNeed::CareerPathways
	}
}

pub fn mentions_work(raw: &str) -> bool {
	let lowered = text::normalize(raw);

	FALLBACK_TRIGGERS.iter().any(|trigger| lowered.contains(trigger))
}

pub fn is_affordable(resource: &Resource) -> bool {
	let cost = resource.cost.to_lowercase();

	cost.contains("free") || cost.contains("subsidi")
}
