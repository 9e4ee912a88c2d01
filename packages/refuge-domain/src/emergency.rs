//! Fixed crisis contacts served without touching the embedding provider or the store.

use serde::{Deserialize, Serialize};

use crate::text;

#[derive(Clone, Copy, Debug, Deserialize, Eq, PartialEq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EmergencyKind {
	Suicide,
	DomesticViolence,
	ChildProtection,
	MentalHealth,
	General,
}
impl EmergencyKind {
	pub fn as_str(self) -> &'static str {
		match self {
			Self::Suicide => "suicide",
			Self::DomesticViolence => "domestic_violence",
			Self::ChildProtection => "child_protection",
			Self::MentalHealth => "mental_health",
			Self::General => "general",
		}
	}
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct EmergencyContact {
	pub name: &'static str,
	pub phone: &'static str,
	pub description: &'static str,
	pub available: &'static str,
}

pub const EMERGENCY_SERVICES: EmergencyContact = EmergencyContact {
	name: "Emergency Services (000)",
	phone: "000",
	description: "Police, Fire, Ambulance - Life threatening emergencies",
	available: "24/7",
};
pub const LIFELINE: EmergencyContact = EmergencyContact {
	name: "Lifeline Crisis Support",
	phone: "13 11 14",
	description: "Crisis support and suicide prevention",
	available: "24/7",
};
pub const RESPECT: EmergencyContact = EmergencyContact {
	name: "1800RESPECT",
	phone: "1800 737 732",
	description: "Domestic violence support and counseling",
	available: "24/7",
};
pub const MENTAL_HEALTH_CRISIS: EmergencyContact = EmergencyContact {
	name: "Mental Health Crisis Team",
	phone: "1800 648 911",
	description: "ACT mental health crisis support",
	available: "24/7",
};
pub const CHILD_PROTECTION: EmergencyContact = EmergencyContact {
	name: "Child Protection",
	phone: "1300 556 729",
	description: "Report child abuse or get help",
	available: "24/7",
};
pub const INTERPRETER: EmergencyContact = EmergencyContact {
	name: "Interpreter Service (TIS National)",
	phone: "131 450",
	description: "24/7 interpretation in your language",
	available: "24/7",
};

/// Contacts returned when the search backends are unavailable.
pub const ESSENTIAL_CONTACTS: [EmergencyContact; 3] = [EMERGENCY_SERVICES, INTERPRETER, LIFELINE];

pub fn classify_emergency(raw: &str) -> EmergencyKind {
	let lowered = text::normalize(raw);
	let any = |keywords: &[&str]| keywords.iter().any(|keyword| lowered.contains(keyword));

	if any(&["suicide", "kill myself", "end my life"]) {
		EmergencyKind::Suicide
	} else if any(&["domestic", "violence", "abuse", "hit", "hurt me"]) {
		EmergencyKind::DomesticViolence
	} else if any(&["child", "kids", "danger"]) {
		EmergencyKind::ChildProtection
	} else if any(&["mental", "breakdown", "panic", "anxiety"]) {
		EmergencyKind::MentalHealth
	} else {
		EmergencyKind::General
	}
}

/// 000 first, then the kind-specific line, then crisis support and the interpreter service.
pub fn contacts_for(kind: EmergencyKind, language: &str) -> Vec<EmergencyContact> {
	let mut contacts = vec![EMERGENCY_SERVICES];

	match kind {
		EmergencyKind::DomesticViolence => contacts.push(RESPECT),
		EmergencyKind::MentalHealth => contacts.push(MENTAL_HEALTH_CRISIS),
		EmergencyKind::ChildProtection => contacts.push(CHILD_PROTECTION),
		EmergencyKind::Suicide | EmergencyKind::General => {},
	}

	if matches!(kind, EmergencyKind::Suicide | EmergencyKind::MentalHealth) {
		contacts.push(LIFELINE);
	}
	if !is_english(language) {
		contacts.push(INTERPRETER);
	}

	contacts
}

pub fn immediate_actions(kind: EmergencyKind) -> Vec<&'static str> {
	match kind {
		EmergencyKind::General => vec![
			"Call 000 immediately",
			"Stay safe and wait for help",
			"If you need an interpreter, say your language after connecting",
		],
		EmergencyKind::DomesticViolence => vec![
			"Go to a safe place immediately",
			"Call 000 if in immediate danger",
			"Call 1800 737 732 for confidential support",
			"Do not delete this conversation - you may need evidence",
		],
		EmergencyKind::Suicide => vec![
			"You are not alone - help is available",
			"Call 13 11 14 to speak with someone now",
			"Go to nearest hospital emergency if in immediate danger",
			"Text or online chat available if you can't call",
		],
		EmergencyKind::ChildProtection | EmergencyKind::MentalHealth => vec![
			"Call the emergency number provided",
			"Explain your situation clearly",
			"Ask for an interpreter if needed",
		],
	}
}

/// Services worth arranging once the immediate danger has passed.
pub fn follow_up_services(kind: EmergencyKind) -> [&'static str; 3] {
	match kind {
		EmergencyKind::DomesticViolence => ["Legal aid", "Safe housing", "Counseling services"],
		EmergencyKind::MentalHealth => ["Ongoing counseling", "Support groups", "Mental health plan"],
		EmergencyKind::Suicide | EmergencyKind::ChildProtection | EmergencyKind::General =>
			["Medical follow-up", "Support services", "Community assistance"],
	}
}

pub fn call_scripts(language: &str) -> Vec<String> {
	let mut scripts = Vec::with_capacity(4);

	if !is_english(language) {
		scripts.push(format!("I need an interpreter for {}", language.trim()));
	}

	scripts.extend(
		["I need emergency help", "My location is [your address]", "I am a refugee/migrant and need assistance"]
			.map(str::to_string),
	);

	scripts
}

pub fn is_english(language: &str) -> bool {
	let language = language.trim();

	language.is_empty() || language.eq_ignore_ascii_case("english")
}

#[cfg(test)]
mod tests {
	use crate::emergency::{self, EmergencyKind};

	#[test]
	fn subtype_checks_run_in_order() {
		assert_eq!(emergency::classify_emergency("I want to end my life"), EmergencyKind::Suicide);
		assert_eq!(
			emergency::classify_emergency("domestic violence at home, kids scared"),
			EmergencyKind::DomesticViolence
		);
		assert_eq!(emergency::classify_emergency("my child is in danger"), EmergencyKind::ChildProtection);
		assert_eq!(emergency::classify_emergency("panic attack crisis"), EmergencyKind::MentalHealth);
		assert_eq!(emergency::classify_emergency("ｓｕｉｃｉｄｅ"), EmergencyKind::Suicide);
		assert_eq!(
			emergency::classify_emergency("I need urgent help emergency medical doctor"),
			EmergencyKind::General
		);
	}

	#[test]
	fn emergency_services_always_lead() {
		for kind in [
			EmergencyKind::Suicide,
			EmergencyKind::DomesticViolence,
			EmergencyKind::ChildProtection,
			EmergencyKind::MentalHealth,
			EmergencyKind::General,
		] {
			let contacts = emergency::contacts_for(kind, "English");

			assert_eq!(contacts[0].phone, "000");
		}
	}

	#[test]
	fn crisis_line_and_interpreter_are_added_when_relevant() {
		let suicide: Vec<_> =
			emergency::contacts_for(EmergencyKind::Suicide, "Arabic").iter().map(|c| c.phone).collect();

		assert_eq!(suicide, vec!["000", "13 11 14", "131 450"]);

		let violence: Vec<_> = emergency::contacts_for(EmergencyKind::DomesticViolence, "english")
			.iter()
			.map(|c| c.phone)
			.collect();

		assert_eq!(violence, vec!["000", "1800 737 732"]);
	}

	#[test]
	fn follow_up_services_depend_on_kind() {
		assert_eq!(
			emergency::follow_up_services(EmergencyKind::DomesticViolence),
			["Legal aid", "Safe housing", "Counseling services"]
		);
		assert_eq!(emergency::follow_up_services(EmergencyKind::MentalHealth)[2], "Mental health plan");
		assert_eq!(emergency::follow_up_services(EmergencyKind::Suicide)[0], "Medical follow-up");
	}

	#[test]
	fn call_scripts_request_interpreter_for_other_languages() {
		let scripts = emergency::call_scripts("Dari");

		assert_eq!(scripts[0], "I need an interpreter for Dari");
		assert_eq!(scripts.len(), 4);
		assert_eq!(emergency::call_scripts("English").len(), 3);
	}
}
