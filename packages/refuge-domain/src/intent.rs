//! Keyword intent classification.
//!
//! Rules are checked in table order and the first rule with a matching keyword wins, so the
//! emergency rule pre-empts every other intent.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::{resource::UrgencyLevel, text};

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IntentTag {
	Emergency,
	Exploitation,
	DigitalHelp,
	Economic,
	Housing,
	Education,
	Legal,
	Health,
	Financial,
	Family,
	General,
}
impl IntentTag {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Emergency => "emergency",
			Self::Exploitation => "exploitation",
			Self::DigitalHelp => "digital_help",
			Self::Economic => "economic",
			Self::Housing => "housing",
			Self::Education => "education",
			Self::Legal => "legal",
			Self::Health => "health",
			Self::Financial => "financial",
			Self::Family => "family",
			Self::General => "general",
		}
	}

	pub fn confidence(self) -> f32 {
		match self {
			Self::Emergency => 0.95,
			Self::Exploitation => 0.9,
			Self::DigitalHelp | Self::Economic | Self::Housing => 0.85,
			Self::Education | Self::Legal | Self::Health | Self::Financial | Self::Family => 0.8,
			Self::General => 0.7,
		}
	}
}
impl fmt::Display for IntentTag {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		f.write_str(self.as_str())
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct Intent {
	pub tag: IntentTag,
	pub is_emergency: bool,
	pub urgency: UrgencyLevel,
	pub confidence: f32,
}

struct Rule {
	tag: IntentTag,
	keywords: &'static [&'static str],
}

const RULES: &[Rule] = &[
	Rule {
		tag: IntentTag::Emergency,
		keywords: &[
			"emergency",
			"urgent",
			"help now",
			"crisis",
			"000",
			"police",
			"ambulance",
			"fire",
			"suicide",
			"danger",
			"domestic violence",
			"assault",
			"hurt",
			"bleeding",
		],
	},
	Rule {
		tag: IntentTag::Exploitation,
		keywords: &[
			"exploitation",
			"underpaid",
			"wage theft",
			"unfair",
			"boss",
			"unsafe work",
			"employer",
			"not paid",
			"rights",
		],
	},
	Rule {
		tag: IntentTag::DigitalHelp,
		keywords: &[
			"mygov",
			"online",
			"computer",
			"internet",
			"email",
			"digital",
			"website",
			"centrelink",
			"app",
			"phone",
		],
	},
	Rule {
		tag: IntentTag::Economic,
		keywords: &[
			"job",
			"work",
			"employment",
			"career",
			"skill",
			"qualification",
			"business",
			"entrepreneur",
			"training",
		],
	},
	Rule {
		tag: IntentTag::Housing,
		keywords: &[
			"house",
			"housing",
			"rent",
			"accommodation",
			"homeless",
			"shelter",
			"eviction",
			"tenant",
			"lease",
		],
	},
	Rule {
		tag: IntentTag::Education,
		keywords: &["english", "language", "amep", "learn", "school", "education", "study"],
	},
	Rule {
		tag: IntentTag::Legal,
		keywords: &["visa", "immigration", "lawyer", "legal", "citizenship", "passport"],
	},
	Rule {
		tag: IntentTag::Health,
		keywords: &["doctor", "health", "medical", "hospital", "sick", "medicine", "mental"],
	},
	Rule { tag: IntentTag::Financial, keywords: &["money", "payment", "financial", "loan", "benefit"] },
	Rule { tag: IntentTag::Family, keywords: &["family", "parent", "children", "reunion", "sponsor"] },
];

pub fn classify(raw: &str) -> Intent {
	let lowered = text::normalize(raw);
	let tag = RULES
		.iter()
		.find(|rule| rule.keywords.iter().any(|keyword| lowered.contains(keyword)))
		.map(|rule| rule.tag)
		.unwrap_or(IntentTag::General);
	let urgency = match tag {
		IntentTag::Emergency => UrgencyLevel::Critical,
		IntentTag::Exploitation => UrgencyLevel::High,
		IntentTag::Housing if lowered.contains("homeless") => UrgencyLevel::High,
		_ => UrgencyLevel::Standard,
	};

	Intent { tag, is_emergency: tag == IntentTag::Emergency, urgency, confidence: tag.confidence() }
}

/// Query-side urgency cues, independent of the intent rules.
pub fn urgency_signal(raw: &str) -> Option<UrgencyLevel> {
	let lowered = text::normalize(raw);
	let has_word = |needle: &str| {
		lowered.split(|ch: char| !ch.is_alphanumeric()).any(|word| word == needle)
	};

	if ["emergency", "urgent", "now", "immediately"].into_iter().any(has_word) {
		return Some(UrgencyLevel::Critical);
	}
	if ["today", "tonight", "eviction"].into_iter().any(has_word) || lowered.contains("no food") {
		return Some(UrgencyLevel::High);
	}

	None
}
