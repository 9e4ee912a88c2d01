//! Responses built from fixed crisis contacts.

use refuge_domain::{Intent, IntentTag, UrgencyLevel, emergency};

use crate::{
	format::{self, URGENT_MESSAGE},
	search::{ResponseMetadata, SearchResponse},
};

pub const EMERGENCY_QUICK_REPLIES: [&str; 4] =
	["Call 000", "I'm safe now", "Need interpreter", "Other help"];
pub const DEGRADED_MESSAGE: &str = "I'm having trouble processing your request, but here are essential services that are always available:";
pub const DEGRADED_QUICK_REPLIES: [&str; 3] = ["Try again", "Emergency help", "Call interpreter"];

/// Crisis contacts for an emergency message, chosen by emergency subtype and language.
pub fn emergency_response(text: &str, language: &str) -> SearchResponse {
	let kind = emergency::classify_emergency(text);
	let resources: Vec<_> =
		emergency::contacts_for(kind, language).iter().map(format::contact_record).collect();
	let metadata = ResponseMetadata {
		intent: IntentTag::Emergency,
		urgency: UrgencyLevel::Critical,
		confidence: IntentTag::Emergency.confidence(),
		results_count: resources.len(),
		cached: false,
		degraded: false,
		emergency_type: Some(kind),
		hidden_needs: Vec::new(),
		follow_up: emergency::follow_up_services(kind).map(str::to_string).to_vec(),
		economic_need: None,
	};

	SearchResponse {
		success: true,
		message: URGENT_MESSAGE.to_string(),
		resources,
		quick_replies: EMERGENCY_QUICK_REPLIES.map(str::to_string).to_vec(),
		call_scripts: emergency::call_scripts(language),
		next_steps: emergency::immediate_actions(kind).into_iter().map(str::to_string).collect(),
		metadata,
	}
}

/// Successful response carrying essential contacts after an upstream failure.
pub fn degraded_response(intent: &Intent) -> SearchResponse {
	let resources: Vec<_> = emergency::ESSENTIAL_CONTACTS.iter().map(format::contact_record).collect();
	let mut metadata = ResponseMetadata::for_intent(intent, intent.urgency, resources.len());

	metadata.degraded = true;

	SearchResponse {
		success: true,
		message: DEGRADED_MESSAGE.to_string(),
		resources,
		quick_replies: DEGRADED_QUICK_REPLIES.map(str::to_string).to_vec(),
		call_scripts: Vec::new(),
		next_steps: Vec::new(),
		metadata,
	}
}

#[cfg(test)]
mod tests {
	use refuge_domain::{EmergencyKind, intent};

	use crate::emergency;

	#[test]
	fn domestic_violence_lists_respect_after_000() {
		let response = emergency::emergency_response("my husband hit me, help now", "English");
		let phones: Vec<&str> = response.resources.iter().map(|record| record.phone.as_str()).collect();

		assert_eq!(phones, vec!["000", "1800 737 732"]);
		assert_eq!(response.metadata.emergency_type, Some(EmergencyKind::DomesticViolence));
		assert_eq!(response.message, "⚠️ This is urgent. Here's immediate help:");
		assert!(response.resources.iter().all(|record| record.name.starts_with("🚨 ")));
		assert_eq!(response.metadata.follow_up, vec!["Legal aid", "Safe housing", "Counseling services"]);
	}

	#[test]
	fn non_english_adds_interpreter_line_and_script() {
		let response = emergency::emergency_response("suicide thoughts emergency", "Dari");
		let phones: Vec<&str> = response.resources.iter().map(|record| record.phone.as_str()).collect();

		assert_eq!(phones, vec!["000", "13 11 14", "131 450"]);
		assert_eq!(response.call_scripts[0], "I need an interpreter for Dari");
		assert_eq!(response.quick_replies, vec!["Call 000", "I'm safe now", "Need interpreter", "Other help"]);
	}

	#[test]
	fn degraded_response_carries_essential_contacts() {
		let intent = intent::classify("help with rent");
		let response = emergency::degraded_response(&intent);
		let phones: Vec<&str> = response.resources.iter().map(|record| record.phone.as_str()).collect();

		assert!(response.success);
		assert!(response.metadata.degraded);
		assert_eq!(phones, vec!["000", "131 450", "13 11 14"]);
		assert_eq!(response.quick_replies, vec!["Try again", "Emergency help", "Call interpreter"]);
	}
}
