use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};

use crate::error::LexiconError;

/// Fallback wildcard marker when the config omits `WildcardToken`.
const DEFAULT_WILDCARD: &str = "?";
/// Fallback minimum word length when the config omits `MinimumWord`.
const DEFAULT_MIN_WORD_LEN: usize = 2;

/// Per-language configuration artifact (`config-<lang>.json`).
///
/// Field names match the persisted JSON schema:
/// `{ Tokens, GameTokens, WildcardToken, MinimumWord }`.
///
/// - `Tokens` defines the linguistic alphabet (how words are spelled).
/// - `GameTokens` defines the game alphabet (the tiles offered to the
///   player), case-preserving.
/// - `WildcardToken` and `MinimumWord` are optional with defaults
///   `"?"` and `2`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct LanguageConfig {
	pub tokens: Vec<String>,
	pub game_tokens: Vec<String>,
	#[serde(default = "LanguageConfig::default_wildcard")]
	pub wildcard_token: String,
	#[serde(default = "LanguageConfig::default_minimum_word")]
	pub minimum_word: usize,
}

impl LanguageConfig {
	fn default_wildcard() -> String {
		DEFAULT_WILDCARD.to_owned()
	}

	fn default_minimum_word() -> usize {
		DEFAULT_MIN_WORD_LEN
	}
}

/// The token alphabets of one language, derived from a `LanguageConfig`.
///
/// # Responsibilities
/// - Uppercase all tokens for lookups, retaining a readable form for any
///   game token whose configured spelling differs from its uppercase form
/// - Partition tokens into linguistic / game / game-only / combined sets
/// - Derive `max_token_len` (chars, across both alphabets) and
///   `min_word_len`
///
/// # Invariants
/// - `game_only_tokens ⊆ game_tokens` and `game_only_tokens ∩ lang_tokens = ∅`
/// - `all_tokens = lang_tokens ∪ game_tokens`
/// - `max_token_len >= 1`
#[derive(Debug, Clone)]
pub struct Alphabet {
	lang_tokens: BTreeSet<String>,
	game_tokens: BTreeSet<String>,
	game_only_tokens: BTreeSet<String>,
	all_tokens: BTreeSet<String>,
	readable: HashMap<String, String>,
	max_token_len: usize,
	min_word_len: usize,
	wildcard: String,
}

impl Alphabet {
	/// Builds the alphabet sets from a parsed language config.
	///
	/// # Errors
	/// Returns `LexiconError::EmptyAlphabet` if the config defines no
	/// linguistic tokens.
	pub fn from_config(config: &LanguageConfig) -> Result<Self, LexiconError> {
		if config.tokens.is_empty() {
			return Err(LexiconError::EmptyAlphabet);
		}

		let mut lang_tokens = BTreeSet::new();
		let mut game_tokens = BTreeSet::new();
		let mut game_only_tokens = BTreeSet::new();
		let mut all_tokens = BTreeSet::new();
		let mut readable = HashMap::new();
		let mut max_token_len = 1;

		for token in &config.tokens {
			let upper = token.to_uppercase();
			max_token_len = max_token_len.max(upper.chars().count());
			lang_tokens.insert(upper.clone());
			all_tokens.insert(upper);
		}

		for token in &config.game_tokens {
			let upper = token.to_uppercase();
			max_token_len = max_token_len.max(upper.chars().count());

			if upper != *token {
				readable.insert(upper.clone(), token.clone());
			}

			if !lang_tokens.contains(&upper) {
				game_only_tokens.insert(upper.clone());
				all_tokens.insert(upper.clone());
			}
			game_tokens.insert(upper);
		}

		Ok(Self {
			lang_tokens,
			game_tokens,
			game_only_tokens,
			all_tokens,
			readable,
			max_token_len,
			min_word_len: config.minimum_word,
			wildcard: config.wildcard_token.clone(),
		})
	}

	/// The linguistic alphabet (uppercased).
	pub fn lang_tokens(&self) -> &BTreeSet<String> {
		&self.lang_tokens
	}

	/// The game alphabet (uppercased).
	pub fn game_tokens(&self) -> &BTreeSet<String> {
		&self.game_tokens
	}

	/// Game tokens absent from the linguistic alphabet (e.g. a combined tile).
	pub fn game_only_tokens(&self) -> &BTreeSet<String> {
		&self.game_only_tokens
	}

	/// Union of the linguistic and game alphabets.
	pub fn all_tokens(&self) -> &BTreeSet<String> {
		&self.all_tokens
	}

	/// Display form of a token: the configured spelling when it differs
	/// from the canonical uppercase form, the token itself otherwise.
	pub fn readable_form<'a>(&'a self, token: &'a str) -> &'a str {
		self.readable.get(token).map_or(token, String::as_str)
	}

	/// Length in characters of the longest token across both alphabets.
	pub fn max_token_len(&self) -> usize {
		self.max_token_len
	}

	/// Minimum length (in characters) for a string to count as a word.
	pub fn min_word_len(&self) -> usize {
		self.min_word_len
	}

	/// The wildcard marker used in pattern expansion.
	pub fn wildcard(&self) -> &str {
		&self.wildcard
	}
}

/// Returns the first token of `text` under `tokens`, or `None`.
///
/// Candidate lengths are scanned **ascending from 1** up to
/// `max_token_len`; the first prefix contained in the set wins
/// (shortest match, not longest).
///
/// # Notes
/// Callers must pass a single purpose-specific set (linguistic-only,
/// game-only, ...). A set mixing single- and multi-character tokens
/// that share a starting character will always resolve the shorter
/// token first; never pass a naive union of alphabets unless that
/// tie-break is wanted.
pub fn next_token<'a>(
	text: &'a str,
	tokens: &BTreeSet<String>,
	max_token_len: usize,
) -> Option<&'a str> {
	let mut end = 0;
	for (i, c) in text.chars().enumerate() {
		if i >= max_token_len {
			break;
		}
		end += c.len_utf8();
		let candidate = &text[..end];
		if tokens.contains(candidate) {
			return Some(candidate);
		}
	}
	None
}

/// Segments `text` end-to-end into tokens drawn from `tokens`.
///
/// Returns `None` if any position fails to resolve to a token.
pub fn tokenize<'a>(
	text: &'a str,
	tokens: &BTreeSet<String>,
	max_token_len: usize,
) -> Option<Vec<&'a str>> {
	let mut rest = text;
	let mut out = Vec::new();
	while !rest.is_empty() {
		let token = next_token(rest, tokens, max_token_len)?;
		rest = &rest[token.len()..];
		out.push(token);
	}
	Some(out)
}

#[cfg(test)]
mod tests {
	use super::*;

	fn set(tokens: &[&str]) -> BTreeSet<String> {
		tokens.iter().map(|t| (*t).to_owned()).collect()
	}

	fn test_config() -> LanguageConfig {
		serde_json::from_str(
			r#"{
				"Tokens": ["A", "B", "C", "Q", "U"],
				"GameTokens": ["A", "B", "C", "Q", "U", "Qu"],
				"WildcardToken": "?",
				"MinimumWord": 2
			}"#,
		)
		.unwrap()
	}

	#[test]
	fn config_defaults_apply_when_fields_missing() {
		let config: LanguageConfig =
			serde_json::from_str(r#"{ "Tokens": ["A"], "GameTokens": ["A"] }"#).unwrap();
		assert_eq!(config.wildcard_token, "?");
		assert_eq!(config.minimum_word, 2);
	}

	#[test]
	fn alphabet_partitions_game_only_tokens() {
		let alphabet = Alphabet::from_config(&test_config()).unwrap();
		assert!(alphabet.lang_tokens().contains("Q"));
		assert!(!alphabet.lang_tokens().contains("QU"));
		assert!(alphabet.game_tokens().contains("QU"));
		assert_eq!(
			alphabet.game_only_tokens().iter().collect::<Vec<_>>(),
			["QU"]
		);
		assert!(alphabet.all_tokens().contains("QU"));
		assert_eq!(alphabet.max_token_len(), 2);
	}

	#[test]
	fn readable_form_restores_configured_casing() {
		let alphabet = Alphabet::from_config(&test_config()).unwrap();
		assert_eq!(alphabet.readable_form("QU"), "Qu");
		assert_eq!(alphabet.readable_form("A"), "A");
	}

	#[test]
	fn empty_config_is_rejected() {
		let config: LanguageConfig =
			serde_json::from_str(r#"{ "Tokens": [], "GameTokens": [] }"#).unwrap();
		assert!(matches!(
			Alphabet::from_config(&config),
			Err(LexiconError::EmptyAlphabet)
		));
	}

	#[test]
	fn next_token_prefers_the_shortest_match() {
		let tokens = set(&["A", "AB"]);
		assert_eq!(next_token("ABC", &tokens, 2), Some("A"));
	}

	#[test]
	fn next_token_resolves_multi_char_tokens() {
		let tokens = set(&["QU"]);
		assert_eq!(next_token("QUIT", &tokens, 2), Some("QU"));
		assert_eq!(next_token("IT", &tokens, 2), None);
		assert_eq!(next_token("", &tokens, 2), None);
	}

	#[test]
	fn tokenize_consumes_the_whole_string_or_fails() {
		let tokens = set(&["A", "B", "QU"]);
		assert_eq!(tokenize("AQUB", &tokens, 2), Some(vec!["A", "QU", "B"]));
		assert_eq!(tokenize("AXB", &tokens, 2), None);
		assert_eq!(tokenize("", &tokens, 2), Some(vec![]));
	}
}
