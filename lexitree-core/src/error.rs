use thiserror::Error;

/// Errors produced while loading artifacts, building a lexicon from a raw
/// word list, or sampling from the frequency model.
///
/// # Notes
/// - Query functions (`is_valid_word`, wildcard expansion, ...) never fail:
///   unknown words or unresolvable prefixes yield negative/empty results.
/// - Sampling with an all-zero weight distribution is a hard error
///   (`NoCandidateToken`), never a silent arbitrary pick.
#[derive(Debug, Error)]
pub enum LexiconError {
	#[error("i/o error: {0}")]
	Io(#[from] std::io::Error),

	#[error("malformed JSON artifact: {0}")]
	Json(#[from] serde_json::Error),

	#[error("language config defines an empty token alphabet")]
	EmptyAlphabet,

	#[error("serialized trie decoded to an empty root from {input_len} bytes of input")]
	CorruptTrie { input_len: usize },

	#[error("frequency row '{0}': total does not match the sum of its counts")]
	InvalidFrequencies(String),

	#[error("no candidate token: all sampling weights are zero")]
	NoCandidateToken,

	#[error("invalid parameter: {0}")]
	InvalidParam(&'static str),
}
