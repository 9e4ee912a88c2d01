use crate::intent::IntentTag;

const DIGITAL_HELP_TERMS: &str = "computer digital online MyGov internet help";
const EXPLOITATION_TERMS: &str = "exploitation wage theft workplace rights underpaid unsafe work";
const EMERGENCY_TERMS: &str = "emergency crisis urgent help 24/7 immediate support";

/// Expands a raw query with domain terms for intents whose wording rarely matches service
/// descriptions. Other intents pass through unchanged.
pub fn rewrite(raw: &str, tag: IntentTag) -> String {
	let raw = raw.trim();
	let terms = match tag {
		IntentTag::DigitalHelp => DIGITAL_HELP_TERMS,
		IntentTag::Exploitation => EXPLOITATION_TERMS,
		IntentTag::Emergency => EMERGENCY_TERMS,
		_ => return raw.to_string(),
	};

	if raw.is_empty() { terms.to_string() } else { format!("{raw} {terms}") }
}

#[cfg(test)]
mod tests {
	use crate::{intent::IntentTag, rewrite};

	#[test]
	fn expands_only_templated_intents() {
		assert_eq!(
			rewrite::rewrite("my boss won't pay me", IntentTag::Exploitation),
			"my boss won't pay me exploitation wage theft workplace rights underpaid unsafe work"
		);
		assert_eq!(
			rewrite::rewrite("mygov login", IntentTag::DigitalHelp),
			"mygov login computer digital online MyGov internet help"
		);
		assert_eq!(
			rewrite::rewrite("need support", IntentTag::Emergency),
			"need support emergency crisis urgent help 24/7 immediate support"
		);
		assert_eq!(rewrite::rewrite("  housing assistance ", IntentTag::Housing), "housing assistance");
	}

	#[test]
	fn empty_query_yields_bare_template() {
		assert_eq!(
			rewrite::rewrite("   ", IntentTag::DigitalHelp),
			"computer digital online MyGov internet help"
		);
		assert_eq!(rewrite::rewrite("", IntentTag::General), "");
	}
}
