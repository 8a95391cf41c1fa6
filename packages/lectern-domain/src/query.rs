use unicode_normalization::UnicodeNormalization;

use lectern_config::Replacement;

/// Rewrites free-text chat queries before they are embedded.
///
/// Replacements run in table order over the NFC form of the query, so a pattern may match text
/// produced by an earlier replacement.
#[derive(Clone, Debug, Default)]
pub struct QueryNormalizer {
	replacements: Vec<(String, String)>,
}
impl QueryNormalizer {
	pub fn new(table: &[Replacement]) -> Self {
		let replacements = table
			.iter()
			.filter(|entry| !entry.pattern.is_empty())
			.map(|entry| (entry.pattern.nfc().collect(), entry.replacement.nfc().collect()))
			.collect();

		Self { replacements }
	}

	pub fn normalize(&self, query: &str) -> String {
		let mut out: String = query.nfc().collect();

		for (pattern, replacement) in &self.replacements {
			if out.contains(pattern.as_str()) {
				out = out.replace(pattern.as_str(), replacement);
			}
		}

		out
	}

	pub fn is_empty(&self) -> bool {
		self.replacements.is_empty()
	}
}
