//! Turns ranked resources into chat-ready records, messages, and UI affordances.
//!
//! Everything here is a pure function of its inputs.

use serde::{Deserialize, Serialize};

use refuge_domain::{
	EconomicNeed, EmergencyContact, IntentTag, Need, NeedsAnalysis, Resource, ResourceCategory,
	UrgencyLevel, economic, emergency,
};

use crate::ranking::RankedResource;

pub const CRITICAL_PREFIX: &str = "🚨 ";
pub const CONFIDENTIAL_PREFIX: &str = "🔒 ";
pub const FREE_PREFIX: &str = "✅ ";

pub const URGENT_MESSAGE: &str = "⚠️ This is urgent. Here's immediate help:";
pub const CONFIDENTIAL_MESSAGE: &str = "🔒 CONFIDENTIAL HELP - Your visa status will NOT be checked:";
pub const NO_RESULTS_PREFIX: &str = "I couldn't find specific services matching your search. ";
pub const TRY_ANOTHER_SEARCH: &str = "Try another search";
pub const SHOW_MORE_OPTIONS: &str = "Show more options";
pub const RELATED_NEEDS_STEP: &str = "Consider getting help with related needs";

const ELLIPSIS: &str = "...";
const SERVICES_SHOWN: usize = 3;
const LANGUAGES_SHOWN: usize = 3;
const SCRIPTED_RESOURCES: usize = 3;
const TEMPLATE_REPLIES_WITH_SUGGESTIONS: usize = 2;
const SUGGESTION_REPLIES: usize = 2;

#[derive(Clone, Debug, Deserialize, PartialEq, Serialize)]
pub struct DisplayRecord {
	pub id: String,
	pub name: String,
	pub description: String,
	pub phone: String,
	pub website: String,
	pub address: String,
	pub hours: String,
	pub services: String,
	pub cost: String,
	pub languages: String,
	pub urgency: UrgencyLevel,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub category: Option<ResourceCategory>,
	#[serde(default, skip_serializing_if = "Option::is_none")]
	pub relevance: Option<String>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct FormattedResults {
	pub message: String,
	pub services: Vec<DisplayRecord>,
	pub quick_replies: Vec<String>,
	pub call_scripts: Vec<String>,
	pub next_steps: Vec<String>,
}

pub fn format(
	ranked: &[RankedResource],
	intent: IntentTag,
	urgency: UrgencyLevel,
	language: &str,
	needs: &NeedsAnalysis,
	cfg: &refuge_config::Formatter,
) -> FormattedResults {
	let confidential = intent == IntentTag::Exploitation;
	let services = ranked
		.iter()
		.map(|item| {
			let mut record = display_record(&item.resource, confidential, cfg);

			record.relevance = Some(item.explain.explanation());

			record
		})
		.collect();
	let names: Vec<&str> = ranked.iter().map(|item| item.resource.name.as_str()).collect();

	assemble(services, &names, intent, urgency, language, needs, cfg)
}

/// Formats unranked resources, such as filter-only listings. Records carry no relevance text.
pub fn format_listing(
	resources: &[Resource],
	intent: IntentTag,
	urgency: UrgencyLevel,
	language: &str,
	cfg: &refuge_config::Formatter,
) -> FormattedResults {
	let confidential = intent == IntentTag::Exploitation;
	let services =
		resources.iter().map(|resource| display_record(resource, confidential, cfg)).collect();
	let names: Vec<&str> = resources.iter().map(|resource| resource.name.as_str()).collect();

	assemble(services, &names, intent, urgency, language, &NeedsAnalysis::default(), cfg)
}

/// Swaps in the economic route's message and replies. Empty results keep the zero-results
/// guidance.
pub fn apply_economic_route(
	formatted: &mut FormattedResults,
	need: EconomicNeed,
	cfg: &refuge_config::Formatter,
) {
	if formatted.services.is_empty() {
		return;
	}

	formatted.message = need.message().to_string();
	formatted.quick_replies = economic::QUICK_REPLIES
		.iter()
		.take(cfg.max_quick_replies)
		.map(|reply| reply.to_string())
		.collect();
}

fn assemble(
	services: Vec<DisplayRecord>,
	names: &[&str],
	intent: IntentTag,
	urgency: UrgencyLevel,
	language: &str,
	needs: &NeedsAnalysis,
	cfg: &refuge_config::Formatter,
) -> FormattedResults {
	FormattedResults {
		message: message(intent, urgency, services.len(), language),
		quick_replies: quick_replies(
			intent,
			&needs.suggestions,
			services.len(),
			cfg.max_quick_replies,
		),
		call_scripts: call_scripts(names, language, cfg.max_call_scripts),
		next_steps: next_steps(
			names.first().copied(),
			urgency,
			!needs.hidden_needs.is_empty(),
			cfg.max_next_steps,
		),
		services,
	}
}

/// Builds a display record. `confidential_context` marks every record confidential, as for
/// exploitation queries.
pub fn display_record(
	resource: &Resource,
	confidential_context: bool,
	cfg: &refuge_config::Formatter,
) -> DisplayRecord {
	let contact = &resource.contact;

	DisplayRecord {
		id: resource.id.clone(),
		name: format!("{}{}", name_prefix(resource, confidential_context), resource.name),
		description: truncate_chars(&resource.description, cfg.description_max_chars),
		phone: or_placeholder(contact.phone.as_deref(), "No phone"),
		website: or_placeholder(contact.website.as_deref(), "No website"),
		address: or_placeholder(contact.address.as_deref(), "Contact for address"),
		hours: or_placeholder(contact.hours.as_deref(), "Contact for hours"),
		services: join_first(&resource.services_provided, SERVICES_SHOWN, "Multiple services"),
		cost: resource.cost.clone(),
		languages: join_first(&resource.languages_available, LANGUAGES_SHOWN, "English"),
		urgency: resource.urgency_level,
		category: Some(resource.category),
		relevance: None,
	}
}

/// Display record for a fixed crisis contact.
pub fn contact_record(contact: &EmergencyContact) -> DisplayRecord {
	DisplayRecord {
		id: format!("contact_{}", contact.phone.replace(' ', "")),
		name: format!("{CRITICAL_PREFIX}{}", contact.name),
		description: contact.description.to_string(),
		phone: contact.phone.to_string(),
		website: "No website".to_string(),
		address: "Contact for address".to_string(),
		hours: contact.available.to_string(),
		services: contact.description.to_string(),
		cost: "Free".to_string(),
		languages: "Interpreter available".to_string(),
		urgency: UrgencyLevel::Critical,
		category: None,
		relevance: None,
	}
}

/// At most one prefix: critical, then confidential, then free.
pub fn name_prefix(resource: &Resource, confidential_context: bool) -> &'static str {
	if resource.urgency_level == UrgencyLevel::Critical {
		CRITICAL_PREFIX
	} else if resource.confidential || confidential_context {
		CONFIDENTIAL_PREFIX
	} else if resource.is_free() {
		FREE_PREFIX
	} else {
		""
	}
}

pub fn message(intent: IntentTag, urgency: UrgencyLevel, count: usize, language: &str) -> String {
	if urgency == UrgencyLevel::Critical {
		return URGENT_MESSAGE.to_string();
	}
	if count == 0 {
		return format!("{NO_RESULTS_PREFIX}{}", no_results_guidance(intent));
	}
	if intent == IntentTag::Exploitation {
		return CONFIDENTIAL_MESSAGE.to_string();
	}

	let found = match count {
		1 => "I found 1 service that can help you:".to_string(),
		n => format!("I found {n} services that can help you:"),
	};

	if emergency::is_english(language) {
		found
	} else {
		format!(
			"{found}\n\n*Services available in {} or with interpreter support are marked*",
			language.trim()
		)
	}
}

fn no_results_guidance(intent: IntentTag) -> &'static str {
	match intent {
		IntentTag::Emergency =>
			"For emergencies, call 000 immediately. For crisis support, call Lifeline on 13 11 14.",
		IntentTag::DigitalHelp => "Visit your local library for free computer and internet access.",
		IntentTag::Economic => "Contact Centrelink on 13 28 50 for employment services.",
		IntentTag::Housing =>
			"Call Homelessness Australia on 1800 326 713 for immediate housing help.",
		_ => "Try searching with different words or call 131 450 for help in your language.",
	}
}

fn quick_reply_template(intent: IntentTag) -> &'static [&'static str] {
	match intent {
		IntentTag::Emergency => &["Call 000", "Find hospital", "Crisis support", "Safe place"],
		IntentTag::DigitalHelp => &["MyGov help", "Get computer", "Learn online", "Email setup"],
		IntentTag::Exploitation =>
			&["Report anonymously", "Know my rights", "Get wages back", "Legal help"],
		IntentTag::Economic => &["Skills assessment", "Find job", "Start business", "Free training"],
		IntentTag::Housing =>
			&["Emergency shelter", "Rental help", "Share house", "Bond assistance"],
		IntentTag::Education =>
			&["English classes", "School enrollment", "Adult education", "University"],
		IntentTag::Legal => &["Visa help", "Free lawyer", "Immigration", "Work rights"],
		IntentTag::Health => &["Find doctor", "Mental health", "Hospital", "Medicare"],
		IntentTag::Financial =>
			&["Centrelink", "Emergency money", "No interest loan", "Budget help"],
		IntentTag::Family =>
			&["Family reunion", "Parent visa", "Children services", "Parenting help"],
		IntentTag::General =>
			&["Emergency help", "New arrival", "Find services", "Speak my language"],
	}
}

/// Intent template capped at `cap`. With suggestions, the first two template entries are
/// followed by up to two suggestion labels. Zero results append a new-search hint and one or two
/// results append a show-more hint; the hint displaces the last entry when at the cap.
pub fn quick_replies(
	intent: IntentTag,
	suggestions: &[Need],
	count: usize,
	cap: usize,
) -> Vec<String> {
	let hint = match count {
		0 => Some(TRY_ANOTHER_SEARCH),
		1 | 2 => Some(SHOW_MORE_OPTIONS),
		_ => None,
	};
	let template = quick_reply_template(intent);
	let base: Vec<&str> = if suggestions.is_empty() {
		template.to_vec()
	} else {
		template
			.iter()
			.copied()
			.take(TEMPLATE_REPLIES_WITH_SUGGESTIONS)
			.chain(suggestions.iter().take(SUGGESTION_REPLIES).map(|need| need.label.as_str()))
			.collect()
	};
	let room = if hint.is_some() { cap.saturating_sub(1) } else { cap };
	let mut replies: Vec<String> = base.into_iter().take(room).map(str::to_string).collect();

	if let Some(hint) = hint
		&& cap > 0
	{
		replies.push(hint.to_string());
	}

	replies
}

pub fn call_scripts(names: &[&str], language: &str, cap: usize) -> Vec<String> {
	let mut scripts = Vec::new();

	if !emergency::is_english(language) {
		scripts.push(format!("Hello, I need help in {}", language.trim()));
	}

	scripts.extend(
		names.iter().take(SCRIPTED_RESOURCES).map(|name| format!("Hello, I'm calling about {name}")),
	);
	scripts.push("I am a refugee/migrant and need assistance".to_string());
	scripts.truncate(cap);

	scripts
}

pub fn next_steps(
	first_service: Option<&str>,
	urgency: UrgencyLevel,
	has_hidden_needs: bool,
	cap: usize,
) -> Vec<String> {
	let mut steps = Vec::new();

	if urgency == UrgencyLevel::Critical {
		steps.push("Call emergency services immediately".to_string());
	}
	if let Some(name) = first_service {
		steps.push(format!("Call {name} first"));
		steps.push("Save these contact numbers".to_string());
	}
	if has_hidden_needs {
		steps.push(RELATED_NEEDS_STEP.to_string());
	}

	steps.push("Ask for an interpreter if needed".to_string());
	steps.truncate(cap);

	steps
}

fn truncate_chars(text: &str, max_chars: usize) -> String {
	match text.char_indices().nth(max_chars) {
		Some((byte_index, _)) => format!("{}{ELLIPSIS}", &text[..byte_index]),
		None => text.to_string(),
	}
}

fn or_placeholder(value: Option<&str>, placeholder: &str) -> String {
	match value.map(str::trim) {
		Some(value) if !value.is_empty() => value.to_string(),
		_ => placeholder.to_string(),
	}
}

fn join_first(values: &[String], count: usize, fallback: &str) -> String {
	if values.is_empty() {
		return fallback.to_string();
	}

	values.iter().take(count).map(String::as_str).collect::<Vec<_>>().join(", ")
}

#[cfg(test)]
mod tests {
	use time::macros::datetime;

	use refuge_domain::{
		EconomicNeed, IntentTag, NeedKind, NeedsAnalysis, ResourceCategory, UrgencyLevel, needs,
	};
	use refuge_storage::qdrant::ResourceFilter;
	use refuge_testkit::resources;

	use crate::{
		format::{self, CONFIDENTIAL_PREFIX, CRITICAL_PREFIX, FREE_PREFIX},
		ranking::{self, Candidate, RankContext},
		search::{ResponseMetadata, SearchResponse},
	};

	fn cfg() -> refuge_config::Formatter {
		refuge_config::Formatter::default()
	}

	#[test]
	fn description_is_capped_with_ellipsis() {
		let mut resource = resources::basic("a", ResourceCategory::Housing);

		resource.description = "é".repeat(450);

		let record = format::display_record(&resource, false, &cfg());

		assert_eq!(record.description.chars().count(), 203);
		assert!(record.description.ends_with("..."));

		resource.description = "x".repeat(200);

		assert_eq!(format::display_record(&resource, false, &cfg()).description.len(), 200);
	}

	#[test]
	fn missing_contact_fields_get_placeholders() {
		let mut resource = resources::basic("a", ResourceCategory::Housing);

		resource.contact.phone = Some("  ".to_string());
		resource.services_provided.clear();
		resource.languages_available.clear();

		let record = format::display_record(&resource, false, &cfg());

		assert_eq!(record.phone, "No phone");
		assert_eq!(record.website, "No website");
		assert_eq!(record.address, "Contact for address");
		assert_eq!(record.hours, "Contact for hours");
		assert_eq!(record.services, "Multiple services");
		assert_eq!(record.languages, "English");
	}

	#[test]
	fn services_and_languages_show_first_three() {
		let mut resource = resources::basic("a", ResourceCategory::Housing);

		resource.services_provided = ["A", "B", "C", "D"].map(String::from).to_vec();
		resource.languages_available = ["English", "Arabic", "Dari", "Tamil"].map(String::from).to_vec();

		let record = format::display_record(&resource, false, &cfg());

		assert_eq!(record.services, "A, B, C");
		assert_eq!(record.languages, "English, Arabic, Dari");
	}

	#[test]
	fn name_carries_single_strongest_prefix() {
		let mut resource = resources::basic("a", ResourceCategory::Housing);

		resource.name = "Shelter".to_string();
		resource.urgency_level = UrgencyLevel::Critical;
		resource.confidential = true;

		assert_eq!(format::display_record(&resource, false, &cfg()).name, format!("{CRITICAL_PREFIX}Shelter"));

		resource.urgency_level = UrgencyLevel::High;

		assert_eq!(format::display_record(&resource, false, &cfg()).name, format!("{CONFIDENTIAL_PREFIX}Shelter"));

		resource.confidential = false;

		assert_eq!(format::display_record(&resource, true, &cfg()).name, format!("{CONFIDENTIAL_PREFIX}Shelter"));
		assert_eq!(format::display_record(&resource, false, &cfg()).name, format!("{FREE_PREFIX}Shelter"));

		resource.cost = "Bulk billed".to_string();

		assert_eq!(format::display_record(&resource, false, &cfg()).name, "Shelter");
	}

	#[test]
	fn message_follows_decision_table() {
		assert_eq!(
			format::message(IntentTag::Housing, UrgencyLevel::Critical, 0, "English"),
			"⚠️ This is urgent. Here's immediate help:"
		);
		assert_eq!(
			format::message(IntentTag::General, UrgencyLevel::Standard, 0, "Arabic"),
			"I couldn't find specific services matching your search. Try searching with different words or call 131 450 for help in your language."
		);
		assert_eq!(
			format::message(IntentTag::Exploitation, UrgencyLevel::High, 2, "English"),
			"🔒 CONFIDENTIAL HELP - Your visa status will NOT be checked:"
		);
		assert_eq!(
			format::message(IntentTag::Legal, UrgencyLevel::Standard, 1, "English"),
			"I found 1 service that can help you:"
		);
		assert_eq!(
			format::message(IntentTag::Legal, UrgencyLevel::Standard, 3, "English"),
			"I found 3 services that can help you:"
		);
	}

	#[test]
	fn other_languages_get_interpreter_note_when_results_exist() {
		assert_eq!(
			format::message(IntentTag::Legal, UrgencyLevel::Standard, 2, "Dari"),
			"I found 2 services that can help you:\n\n*Services available in Dari or with interpreter support are marked*"
		);
		assert_eq!(
			format::message(IntentTag::Legal, UrgencyLevel::Standard, 2, " english "),
			"I found 2 services that can help you:"
		);
		assert!(format::message(IntentTag::Housing, UrgencyLevel::Standard, 0, "Dari")
			.starts_with("I couldn't find specific services"));
	}

	#[test]
	fn quick_replies_respect_cap_and_result_hints() {
		let none = format::quick_replies(IntentTag::Housing, &[], 0, 4);

		assert_eq!(none, vec!["Emergency shelter", "Rental help", "Share house", "Try another search"]);

		let few = format::quick_replies(IntentTag::Legal, &[], 2, 4);

		assert_eq!(few.len(), 4);
		assert_eq!(few.last().map(String::as_str), Some("Show more options"));

		let many = format::quick_replies(IntentTag::Legal, &[], 3, 4);

		assert_eq!(many, vec!["Visa help", "Free lawyer", "Immigration", "Work rights"]);

		let rich = format::quick_replies(IntentTag::Legal, &[], 1, 6);

		assert_eq!(rich.len(), 5);
		assert_eq!(rich[3], "Work rights");
	}

	#[test]
	fn suggestions_replace_template_tail() {
		let suggestions = needs::suggestions(IntentTag::Housing, &[]);
		let replies = format::quick_replies(IntentTag::Housing, &suggestions, 3, 4);

		assert_eq!(
			replies,
			vec!["Emergency shelter", "Rental help", "Financial assistance", "Free furniture"]
		);

		let replies = format::quick_replies(IntentTag::Housing, &suggestions, 1, 4);

		assert_eq!(
			replies,
			vec!["Emergency shelter", "Rental help", "Financial assistance", "Show more options"]
		);
	}

	#[test]
	fn call_scripts_splice_language_and_names() {
		let scripts = format::call_scripts(&["A", "B", "C", "D"], "Arabic", 5);

		assert_eq!(
			scripts,
			vec![
				"Hello, I need help in Arabic",
				"Hello, I'm calling about A",
				"Hello, I'm calling about B",
				"Hello, I'm calling about C",
				"I am a refugee/migrant and need assistance",
			]
		);
		assert_eq!(format::call_scripts(&["A"], "English", 5).len(), 2);
	}

	#[test]
	fn next_steps_lead_with_emergency_services_when_critical() {
		let steps = format::next_steps(Some("Lifeline"), UrgencyLevel::Critical, false, 4);

		assert_eq!(
			steps,
			vec![
				"Call emergency services immediately",
				"Call Lifeline first",
				"Save these contact numbers",
				"Ask for an interpreter if needed",
			]
		);
		assert_eq!(format::next_steps(None, UrgencyLevel::Standard, false, 4), vec!["Ask for an interpreter if needed"]);
	}

	#[test]
	fn hidden_needs_add_related_needs_step() {
		let steps = format::next_steps(Some("Legal Aid ACT"), UrgencyLevel::Standard, true, 4);

		assert_eq!(
			steps,
			vec![
				"Call Legal Aid ACT first",
				"Save these contact numbers",
				"Consider getting help with related needs",
				"Ask for an interpreter if needed",
			]
		);

		let capped = format::next_steps(Some("Lifeline"), UrgencyLevel::Critical, true, 4);

		assert_eq!(capped.last().map(String::as_str), Some("Consider getting help with related needs"));
	}

	#[test]
	fn economic_route_swaps_message_and_replies() {
		let mut formatted = format::format_listing(
			&[resources::basic("employment_001", ResourceCategory::Employment)],
			IntentTag::Economic,
			UrgencyLevel::Standard,
			"English",
			&cfg(),
		);

		format::apply_economic_route(&mut formatted, EconomicNeed::Training, &cfg());

		assert_eq!(formatted.message, "Here are training opportunities (many are FREE):");
		assert_eq!(
			formatted.quick_replies,
			vec!["Skills assessment", "Start a business", "Free training", "Find a mentor"]
		);

		let mut empty = format::format_listing(
			&[],
			IntentTag::Economic,
			UrgencyLevel::Standard,
			"English",
			&cfg(),
		);
		let before = empty.clone();

		format::apply_economic_route(&mut empty, EconomicNeed::Training, &cfg());

		assert_eq!(empty, before);
	}

	#[test]
	fn formatting_identical_ranked_input_is_byte_identical() {
		let candidates = vec![
			Candidate { resource: resources::legal_aid(), similarity: 0.82 },
			Candidate { resource: resources::shelter(), similarity: 0.74 },
			Candidate { resource: resources::english_classes(), similarity: 0.74 },
		];
		let ctx = RankContext {
			urgency: UrgencyLevel::Standard,
			language: "Arabic".to_string(),
			location: None,
			now: datetime!(2025-06-04 02:00 UTC),
			utc_offset_hours: 10,
		};
		let ranking_cfg = refuge_config::Ranking::default();
		let needs = needs::analyze("we just arrived and need free legal help", IntentTag::Legal);
		let serialized = || {
			let ranked = ranking::rank(
				candidates.clone(),
				"we just arrived and need free legal help",
				&ResourceFilter::default(),
				&ctx,
				&ranking_cfg,
			);
			let formatted = format::format(
				&ranked,
				IntentTag::Legal,
				UrgencyLevel::Standard,
				"Arabic",
				&needs,
				&cfg(),
			);
			let metadata = ResponseMetadata {
				intent: IntentTag::Legal,
				urgency: UrgencyLevel::Standard,
				confidence: IntentTag::Legal.confidence(),
				results_count: formatted.services.len(),
				cached: false,
				degraded: false,
				emergency_type: None,
				hidden_needs: needs.hidden_needs.clone(),
				follow_up: Vec::new(),
				economic_need: None,
			};

			serde_json::to_vec(&SearchResponse::from_formatted(formatted, metadata))
				.expect("Response must serialize.")
		};
		let first = serialized();

		assert_eq!(first, serialized());
		assert!(needs.hidden_needs.iter().any(|need| need.kind == NeedKind::Medicare));
		assert_ne!(NeedsAnalysis::default(), needs);
	}
}
