//! Needs a message implies without asking for them, and the follow-up suggestions built on top.
//!
//! Pattern rules fire independently, so one message can carry several patterns. Each pattern
//! predicts a fixed set of related needs.

use serde::{Deserialize, Serialize};

use crate::{intent::IntentTag, text};

const MAX_SUGGESTIONS: usize = 3;
const HIDDEN_NEEDS_SUGGESTED: usize = 2;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedPattern {
	NewArrival,
	FamilyNeeds,
	FinancialStress,
	Isolation,
}
impl NeedPattern {
	pub const ALL: [Self; 4] =
		[Self::NewArrival, Self::FamilyNeeds, Self::FinancialStress, Self::Isolation];

	pub fn keywords(self) -> &'static [&'static str] {
		match self {
			Self::NewArrival => &["just arrived", "new to", "recently came", "first time"],
			Self::FamilyNeeds => &["children", "family", "kids", "spouse", "wife", "husband"],
			Self::FinancialStress => &["no money", "can't afford", "expensive", "cost", "free"],
			Self::Isolation => &["alone", "lonely", "no friends", "isolated", "depressed"],
		}
	}

	pub fn predicted_needs(self) -> [NeedKind; 3] {
		match self {
			Self::NewArrival => [NeedKind::Medicare, NeedKind::Bank, NeedKind::School],
			Self::FamilyNeeds => [NeedKind::Childcare, NeedKind::FamilySupport, NeedKind::Parenting],
			Self::FinancialStress =>
				[NeedKind::EmergencyRelief, NeedKind::FoodBank, NeedKind::Vouchers],
			Self::Isolation => [NeedKind::Community, NeedKind::MentalHealth, NeedKind::Social],
		}
	}
}

#[derive(Clone, Copy, Debug, Deserialize, Eq, Hash, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NeedKind {
	Medicare,
	Bank,
	School,
	Childcare,
	FamilySupport,
	Parenting,
	EmergencyRelief,
	FoodBank,
	Vouchers,
	Community,
	MentalHealth,
	Social,
	Financial,
	Furniture,
	Utilities,
	Skills,
	Resume,
	Interview,
}
impl NeedKind {
	pub fn label(self) -> &'static str {
		match self {
			Self::Medicare => "Medicare registration",
			Self::Bank => "Bank account setup",
			Self::School => "School enrollment",
			Self::Childcare => "Childcare services",
			Self::FamilySupport => "Family support groups",
			Self::Parenting => "Parenting resources",
			Self::EmergencyRelief => "Emergency financial aid",
			Self::FoodBank => "Food assistance",
			Self::Vouchers => "Essential item vouchers",
			Self::Community => "Community groups",
			Self::MentalHealth => "Mental health support",
			Self::Social => "Social activities",
			Self::Financial => "Financial assistance",
			Self::Furniture => "Free furniture",
			Self::Utilities => "Utility connection help",
			Self::Skills => "Skills recognition",
			Self::Resume => "Resume help",
			Self::Interview => "Interview preparation",
		}
	}
}

#[derive(Clone, Debug, Deserialize, Eq, PartialEq, Serialize)]
pub struct Need {
	#[serde(rename = "type")]
	pub kind: NeedKind,
	pub label: String,
}
impl From<NeedKind> for Need {
	fn from(kind: NeedKind) -> Self {
		Self { kind, label: kind.label().to_string() }
	}
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct NeedsAnalysis {
	pub patterns: Vec<NeedPattern>,
	pub hidden_needs: Vec<Need>,
	pub suggestions: Vec<Need>,
}

pub fn analyze(raw: &str, intent: IntentTag) -> NeedsAnalysis {
	let patterns = detect_patterns(raw);
	let hidden_needs = hidden_needs(&patterns);
	let suggestions = suggestions(intent, &hidden_needs);

	NeedsAnalysis { patterns, hidden_needs, suggestions }
}

pub fn detect_patterns(raw: &str) -> Vec<NeedPattern> {
	let lowered = text::normalize(raw);

	NeedPattern::ALL
		.into_iter()
		.filter(|pattern| pattern.keywords().iter().any(|keyword| lowered.contains(keyword)))
		.collect()
}

pub fn hidden_needs(patterns: &[NeedPattern]) -> Vec<Need> {
	patterns.iter().flat_map(|pattern| pattern.predicted_needs()).map(Need::from).collect()
}

/// Intent-driven suggestions first, then the leading hidden needs, at most three in total.
pub fn suggestions(intent: IntentTag, hidden_needs: &[Need]) -> Vec<Need> {
	let by_intent: &[NeedKind] = match intent {
		IntentTag::Housing => &[NeedKind::Financial, NeedKind::Furniture, NeedKind::Utilities],
		IntentTag::Economic => &[NeedKind::Skills, NeedKind::Resume, NeedKind::Interview],
		_ => &[],
	};

	by_intent
		.iter()
		.copied()
		.map(Need::from)
		.chain(hidden_needs.iter().take(HIDDEN_NEEDS_SUGGESTED).cloned())
		.take(MAX_SUGGESTIONS)
		.collect()
}

#[cfg(test)]
mod tests {
	use crate::{
		intent::IntentTag,
		needs::{self, NeedKind, NeedPattern},
	};

	#[test]
	fn patterns_fire_independently() {
		let patterns = needs::detect_patterns("We just arrived with our kids and have no money");

		assert_eq!(
			patterns,
			vec![NeedPattern::NewArrival, NeedPattern::FamilyNeeds, NeedPattern::FinancialStress]
		);
		assert!(needs::detect_patterns("visa lawyer").is_empty());
	}

	#[test]
	fn hidden_needs_follow_pattern_order() {
		let analysis = needs::analyze("I feel so alone since I am new to Canberra", IntentTag::General);
		let kinds: Vec<NeedKind> = analysis.hidden_needs.iter().map(|need| need.kind).collect();

		assert_eq!(
			kinds,
			vec![
				NeedKind::Medicare,
				NeedKind::Bank,
				NeedKind::School,
				NeedKind::Community,
				NeedKind::MentalHealth,
				NeedKind::Social,
			]
		);
		assert_eq!(analysis.hidden_needs[0].label, "Medicare registration");
	}

	#[test]
	fn suggestions_lead_with_intent_and_cap_at_three() {
		let analysis = needs::analyze("rent is too expensive", IntentTag::Housing);
		let labels: Vec<&str> = analysis.suggestions.iter().map(|need| need.label.as_str()).collect();

		assert_eq!(labels, vec!["Financial assistance", "Free furniture", "Utility connection help"]);

		let analysis = needs::analyze("lonely and need a doctor", IntentTag::Health);
		let labels: Vec<&str> = analysis.suggestions.iter().map(|need| need.label.as_str()).collect();

		assert_eq!(labels, vec!["Community groups", "Mental health support"]);
		assert!(needs::analyze("doctor", IntentTag::Health).suggestions.is_empty());
	}

	#[test]
	fn needs_serialize_with_type_and_label() {
		let need = needs::Need::from(NeedKind::FoodBank);
		let value = serde_json::to_value(&need).expect("Need must serialize.");

		assert_eq!(value, serde_json::json!({ "type": "food_bank", "label": "Food assistance" }));
	}
}
