use std::collections::BTreeSet;
use std::path::Path;

use rand::Rng;

use crate::error::LexiconError;
use crate::io;

use super::alphabet::{Alphabet, LanguageConfig};
use super::frequency::{FrequencyTable, SampleParams};
use super::trie::TokenTrie;
use super::wildcard;

/// File name prefix of the language config artifact.
pub const CONFIG_FILE_PREFIX: &str = "config-";
/// File name prefix of the frequency table artifact.
pub const FREQ_FILE_PREFIX: &str = "prob-";
/// File name prefix of the serialized trie artifact.
pub const TREE_FILE_PREFIX: &str = "tree-";
/// File name prefix of the raw word list (offline build input only).
pub const WORDS_FILE_PREFIX: &str = "words-";

/// The lexicon facade: alphabet, word trie and frequency model behind
/// one query/generation API.
///
/// # Responsibilities
/// - Load the three runtime artifacts (config, frequency table,
///   serialized trie) or assemble from a builder run
/// - Validate words and prefixes against the linguistic alphabet
/// - Sample random words, completions and frequency-weighted tokens
/// - Expand wildcard patterns into matching words or prefixes
///
/// # Notes
/// A `Lexicon` is constructed explicitly and passed by handle; there is
/// no process-wide instance. Construction either succeeds completely or
/// fails with a `LexiconError` — an existing value is always ready, so
/// no initialized-check precedes queries. After construction all data
/// is immutable: every query takes `&self` plus an injected random
/// source, making concurrent reads safe without locking.
pub struct Lexicon {
	alphabet: Alphabet,
	trie: TokenTrie,
	frequencies: FrequencyTable,
}

impl Lexicon {
	/// Loads the three artifacts of `lang_code` from `data_dir`.
	///
	/// # Errors
	/// - `Io` / `Json` when an artifact is missing or malformed
	/// - `CorruptTrie` when nonzero-length trie input decodes to a
	///   structurally empty root (the decoder itself is tolerant of
	///   truncation; an empty result from real input signals corruption)
	/// - `InvalidFrequencies` when a row violates the total invariant
	pub fn load<P: AsRef<Path>>(data_dir: P, lang_code: &str) -> Result<Self, LexiconError> {
		let dir = data_dir.as_ref();

		let config_text =
			io::read_file(io::data_file_path(dir, CONFIG_FILE_PREFIX, lang_code, "json"))?;
		let config: LanguageConfig = serde_json::from_str(&config_text)?;
		let alphabet = Alphabet::from_config(&config)?;

		let freq_text =
			io::read_file(io::data_file_path(dir, FREQ_FILE_PREFIX, lang_code, "json"))?;
		let frequencies: FrequencyTable = serde_json::from_str(&freq_text)?;

		let tree_text =
			io::read_file(io::data_file_path(dir, TREE_FILE_PREFIX, lang_code, "txt"))?;
		let trie = TokenTrie::decode(&tree_text);
		if !tree_text.trim().is_empty() && trie.is_empty() {
			return Err(LexiconError::CorruptTrie {
				input_len: tree_text.len(),
			});
		}

		let lexicon = Self::from_parts(alphabet, trie, frequencies)?;
		tracing::info!(
			lang = lang_code,
			nodes = lexicon.trie.node_count(),
			tree_bytes = tree_text.len(),
			"loaded lexicon artifacts"
		);
		Ok(lexicon)
	}

	/// Assembles a lexicon from already-built parts (e.g. a
	/// [`builder`](super::builder) run).
	///
	/// # Errors
	/// Returns `LexiconError::InvalidFrequencies` when a frequency row
	/// violates the total-equals-sum invariant.
	pub fn from_parts(
		alphabet: Alphabet,
		trie: TokenTrie,
		frequencies: FrequencyTable,
	) -> Result<Self, LexiconError> {
		frequencies.validate()?;
		Ok(Self {
			alphabet,
			trie,
			frequencies,
		})
	}

	/// The alphabet configuration this lexicon was built with.
	pub fn alphabet(&self) -> &Alphabet {
		&self.alphabet
	}

	/// True when `word` is a complete dictionary word of at least the
	/// configured minimum length. Case-insensitive.
	pub fn is_valid_word(&self, word: &str) -> bool {
		if word.chars().count() < self.alphabet.min_word_len() {
			return false;
		}
		let word = word.to_uppercase();
		self.trie
			.match_word(&word, self.alphabet.lang_tokens(), self.alphabet.max_token_len())
			.is_full_word
	}

	/// True when `word` is a non-empty prefix of at least one
	/// dictionary word (complete words included). Case-insensitive.
	pub fn is_valid_partial_word(&self, word: &str) -> bool {
		if word.is_empty() {
			return false;
		}
		let word = word.to_uppercase();
		self.trie
			.match_word(&word, self.alphabet.lang_tokens(), self.alphabet.max_token_len())
			.is_partial
	}

	/// The tokens that can extend `prefix` into a longer prefix or
	/// word, in sorted order; empty when the prefix is empty or
	/// unresolvable. Drives typing hints and wildcard expansion.
	pub fn next_tokens_after(&self, prefix: &str) -> Vec<String> {
		if prefix.is_empty() {
			return Vec::new();
		}
		let prefix = prefix.to_uppercase();
		self.trie
			.node_for_prefix(&prefix, self.alphabet.lang_tokens(), self.alphabet.max_token_len())
			.map(|node| node.next_tokens().map(str::to_owned).collect())
			.unwrap_or_default()
	}

	/// A uniformly-random dictionary word of exactly `num_tokens` game
	/// tokens, or `None` if no such word exists.
	pub fn random_word(&self, num_tokens: usize, rng: &mut impl Rng) -> Option<String> {
		self.trie
			.random_word_of_length(num_tokens, self.alphabet.game_tokens(), rng)
	}

	/// A uniformly-random dictionary word starting with `prefix` and
	/// continuing for exactly `extra_tokens` further game tokens.
	pub fn random_word_completion(
		&self,
		prefix: &str,
		extra_tokens: usize,
		rng: &mut impl Rng,
	) -> Option<String> {
		let prefix = prefix.to_uppercase();
		self.trie.random_completion(
			&prefix,
			extra_tokens,
			self.alphabet.game_tokens(),
			self.alphabet.max_token_len(),
			rng,
		)
	}

	/// Samples a token from the unconditional frequency distribution.
	pub fn sample_token(&self, rng: &mut impl Rng) -> Result<String, LexiconError> {
		self.frequencies
			.sample_unconditional(rng)
			.map(str::to_owned)
	}

	/// Samples a token conditioned on the tokens already placed next to
	/// the target position (see
	/// [`FrequencyTable::sample_given_neighbors`]).
	pub fn sample_token_given_neighbors(
		&self,
		neighbors: &[&str],
		params: &SampleParams,
		rng: &mut impl Rng,
	) -> Result<String, LexiconError> {
		self.frequencies
			.sample_given_neighbors(neighbors, params, rng)
	}

	/// All dictionary words matching `pattern`, where each wildcard
	/// marker stands for exactly one token.
	pub fn expand_wildcard_words(&self, pattern: &str) -> BTreeSet<String> {
		let pattern = pattern.to_uppercase();
		wildcard::expand(&self.trie, &self.alphabet, &pattern, &|word| {
			self.is_valid_word(word)
		})
	}

	/// All valid prefixes matching `pattern` (used for live-typing
	/// hints); same recursion as [`Lexicon::expand_wildcard_words`]
	/// with the partial-word check at the leaves.
	pub fn expand_wildcard_partials(&self, pattern: &str) -> BTreeSet<String> {
		let pattern = pattern.to_uppercase();
		wildcard::expand(&self.trie, &self.alphabet, &pattern, &|word| {
			self.is_valid_partial_word(word)
		})
	}

	/// Display form of a token (configured casing of a game tile).
	pub fn readable_form<'a>(&'a self, token: &'a str) -> &'a str {
		self.alphabet.readable_form(token)
	}
}
