use std::sync::mpsc;
use std::thread;

use crate::error::LexiconError;
use crate::io;

use super::alphabet::{Alphabet, next_token, tokenize};
use super::frequency::{FrequencyTable, UNCONDITIONAL_CONTEXT};
use super::lexicon::{CONFIG_FILE_PREFIX, FREQ_FILE_PREFIX, TREE_FILE_PREFIX, WORDS_FILE_PREFIX};
use super::trie::TokenTrie;

/// Aggregate counters of one build run.
///
/// Returned by value; the builder never accumulates counts on shared
/// state.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuildStats {
	/// Word-list entries inserted into the trie.
	pub words: usize,
	/// Entries dropped because the linguistic alphabet could not
	/// tokenize them end-to-end.
	pub skipped: usize,
	/// Trie nodes below the root after merging.
	pub nodes: usize,
}

/// The artifacts of one build run plus its statistics.
pub struct BuildOutcome {
	pub trie: TokenTrie,
	pub frequencies: FrequencyTable,
	pub stats: BuildStats,
}

struct PartialBuild {
	trie: TokenTrie,
	frequencies: FrequencyTable,
	words: usize,
	skipped: usize,
}

/// Builds the trie and frequency table from a raw newline-delimited
/// word list.
///
/// # Behavior
/// - Trims, uppercases and drops entries shorter than the configured
///   minimum word length.
/// - Splits the entries into chunks (based on CPU cores), builds
///   partial models on worker threads, and merges them over an MPSC
///   channel.
/// - Frequency counting tokenizes each word with game-only precedence
///   so multi-character tile contexts receive pairwise rows; every
///   game token plus the unconditional context gets a row even when
///   its counts stay empty.
///
/// # Errors
/// Returns `LexiconError::InvalidFrequencies` if the merged table
/// violates the total-equals-sum invariant (indicates a logic error,
/// checked on every rebuild).
pub fn build(word_list: &str, alphabet: &Alphabet) -> Result<BuildOutcome, LexiconError> {
	let words: Vec<String> = word_list
		.lines()
		.map(|line| line.trim().to_uppercase())
		.filter(|word| word.chars().count() >= alphabet.min_word_len())
		.collect();

	let cpus = num_cpus::get().max(1);
	let chunk_size = words.len().div_ceil(cpus).max(1);

	let (tx, rx) = mpsc::channel();
	for chunk in words.chunks(chunk_size) {
		let tx = tx.clone();
		let chunk: Vec<String> = chunk.to_vec();
		let alphabet = alphabet.clone();

		thread::spawn(move || {
			let partial = build_chunk(&chunk, &alphabet);
			tx.send(partial).expect("Failed to send from thread");
		});
	}
	drop(tx);

	let mut trie = TokenTrie::new();
	let mut frequencies = FrequencyTable::new();
	let mut stats = BuildStats::default();
	for partial in rx.iter() {
		trie.merge(partial.trie);
		frequencies.merge(partial.frequencies);
		stats.words += partial.words;
		stats.skipped += partial.skipped;
	}

	frequencies.ensure_context(UNCONDITIONAL_CONTEXT);
	for token in alphabet.game_tokens() {
		frequencies.ensure_context(token);
	}
	frequencies.validate()?;

	stats.nodes = trie.node_count();
	if stats.skipped > 0 {
		tracing::warn!(
			skipped = stats.skipped,
			"dropped word-list entries the linguistic alphabet cannot tokenize"
		);
	}
	tracing::info!(words = stats.words, nodes = stats.nodes, "lexicon build complete");

	Ok(BuildOutcome {
		trie,
		frequencies,
		stats,
	})
}

fn build_chunk(words: &[String], alphabet: &Alphabet) -> PartialBuild {
	let mut partial = PartialBuild {
		trie: TokenTrie::new(),
		frequencies: FrequencyTable::new(),
		words: 0,
		skipped: 0,
	};

	for word in words {
		if tokenize(word, alphabet.lang_tokens(), alphabet.max_token_len()).is_none() {
			partial.skipped += 1;
			continue;
		}

		partial.trie.insert(
			word,
			&[alphabet.lang_tokens(), alphabet.game_only_tokens()],
			alphabet.max_token_len(),
		);
		partial.words += 1;

		count_frequencies(word, alphabet, &mut partial.frequencies);
	}

	partial
}

/// Counts unconditional and pairwise occurrences over one word.
///
/// Tokenization prefers game-only tokens at each position (a `QU` tile
/// is counted as the tile, not as `Q` then `U`), falling back to the
/// plain game alphabet.
fn count_frequencies(word: &str, alphabet: &Alphabet, frequencies: &mut FrequencyTable) {
	let mut rest = word;
	let mut previous: Option<&str> = None;
	while !rest.is_empty() {
		let token = next_token(rest, alphabet.game_only_tokens(), alphabet.max_token_len())
			.or_else(|| next_token(rest, alphabet.game_tokens(), alphabet.max_token_len()));
		let Some(token) = token else {
			// The linguistic spelling may use tokens the game alphabet
			// lacks; stop counting at the first such position.
			return;
		};

		frequencies.record(UNCONDITIONAL_CONTEXT, token);
		if let Some(previous) = previous {
			frequencies.record(previous, token);
		}
		previous = Some(token);
		rest = &rest[token.len()..];
	}
}

/// Builds the runtime artifacts for `lang_code` inside `data_dir`.
///
/// Reads `config-<lang>.json` and `words-<lang>.txt`, then writes
/// `tree-<lang>.txt` and `prob-<lang>.json` (pretty-printed) next to
/// them. The word list is an offline input only; it is never read at
/// runtime.
pub fn export<P: AsRef<std::path::Path>>(
	data_dir: P,
	lang_code: &str,
) -> Result<BuildStats, LexiconError> {
	let dir = data_dir.as_ref();

	let config_text = io::read_file(io::data_file_path(dir, CONFIG_FILE_PREFIX, lang_code, "json"))?;
	let config = serde_json::from_str(&config_text)?;
	let alphabet = Alphabet::from_config(&config)?;

	let word_list = io::read_file(io::data_file_path(dir, WORDS_FILE_PREFIX, lang_code, "txt"))?;
	let outcome = build(&word_list, &alphabet)?;

	let tree_path = io::data_file_path(dir, TREE_FILE_PREFIX, lang_code, "txt");
	let encoded = outcome.trie.encode();
	std::fs::write(&tree_path, &encoded)?;

	let freq_path = io::data_file_path(dir, FREQ_FILE_PREFIX, lang_code, "json");
	std::fs::write(&freq_path, serde_json::to_string_pretty(&outcome.frequencies)?)?;

	tracing::info!(
		tree = %tree_path.display(),
		tree_bytes = encoded.len(),
		freq = %freq_path.display(),
		"exported lexicon artifacts"
	);

	Ok(outcome.stats)
}
