use unicode_normalization::UnicodeNormalization;

/// NFKC, lower-case, and collapse whitespace. Every keyword table matches against this form.
pub fn normalize(text: &str) -> String {
	let folded = text.nfkc().collect::<String>().to_lowercase();

	folded.split_whitespace().collect::<Vec<_>>().join(" ")
}
