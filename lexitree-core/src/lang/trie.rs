use std::collections::{BTreeMap, BTreeSet};
use std::iter::Peekable;
use std::str::Chars;

use rand::Rng;

use super::alphabet::next_token;

/// Result of walking a word through the trie.
///
/// `is_partial` is true when every token of the word resolved to a
/// child node; `is_full_word` additionally requires the terminal node
/// to be marked as a complete word.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WordMatch {
	pub is_partial: bool,
	pub is_full_word: bool,
}

/// One node of the token trie.
///
/// Children are keyed by token (one tile, 1+ characters) in a
/// `BTreeMap` so that enumeration and serialization order are
/// deterministic — seeded generation must reproduce identical results
/// across runs.
#[derive(Debug, Clone, Default)]
pub struct TokenNode {
	children: BTreeMap<String, TokenNode>,
	is_word: bool,
}

impl TokenNode {
	/// Whether the path from the root to this node spells a complete word.
	pub fn is_word(&self) -> bool {
		self.is_word
	}

	/// The tokens that can follow this node's prefix, in sorted order.
	pub fn next_tokens(&self) -> impl Iterator<Item = &str> {
		self.children.keys().map(String::as_str)
	}

	fn child_entry(&mut self, token: &str) -> &mut TokenNode {
		self.children.entry(token.to_owned()).or_default()
	}
}

/// A trie keyed by tokens (not characters) recording which token
/// sequences form valid words.
///
/// # Responsibilities
/// - Record every spelling of every inserted word, forking parallel
///   branches when a word admits more than one tokenization
/// - Answer word/prefix membership queries without mutation
/// - Enumerate and uniformly sample complete words of a fixed token count
/// - Encode to / decode from the compact bracket-grammar text format
///
/// # Invariants
/// - The root represents the empty prefix and is never a word
/// - `is_word` is set only at nodes reached by fully consuming an
///   inserted word
/// - Immutable after the build phase; all queries take `&self`
pub struct TokenTrie {
	root: TokenNode,
}

impl TokenTrie {
	/// Creates an empty trie.
	pub fn new() -> Self {
		Self {
			root: TokenNode::default(),
		}
	}

	/// True when the root has no children.
	pub fn is_empty(&self) -> bool {
		self.root.children.is_empty()
	}

	/// Number of nodes below the root.
	pub fn node_count(&self) -> usize {
		fn count(node: &TokenNode) -> usize {
			node.children.values().map(|child| 1 + count(child)).sum()
		}
		count(&self.root)
	}

	/// Inserts a word, forking one branch per resolvable token set.
	///
	/// At every node, each set in `token_sets` independently resolves
	/// the next token of the remaining text and the insertion recurses
	/// on the matching child. With `[linguistic, game-only]` this
	/// produces parallel spellings of the same word (e.g. `Q-U-E-S-T`
	/// and `QU-E-S-T`) so either typing path is accepted as correct.
	///
	/// Positions where a set resolves no token simply skip that set;
	/// callers wanting whole-word coverage should pre-check with
	/// [`tokenize`](super::alphabet::tokenize).
	pub fn insert(&mut self, word: &str, token_sets: &[&BTreeSet<String>], max_token_len: usize) {
		fn insert_at(
			node: &mut TokenNode,
			word: &str,
			token_sets: &[&BTreeSet<String>],
			max_token_len: usize,
		) {
			for tokens in token_sets {
				let Some(token) = next_token(word, tokens, max_token_len) else {
					continue;
				};
				let child = node.child_entry(token);
				let rest = &word[token.len()..];
				if rest.is_empty() {
					child.is_word = true;
				} else {
					insert_at(child, rest, token_sets, max_token_len);
				}
			}
		}
		insert_at(&mut self.root, word, token_sets, max_token_len);
	}

	/// Walks `word` one token at a time against a single token set.
	///
	/// Fails as soon as a token cannot be resolved or no matching child
	/// exists; a failed walk never backtracks to try an alternate
	/// tokenization within the same call.
	pub fn match_word(
		&self,
		word: &str,
		tokens: &BTreeSet<String>,
		max_token_len: usize,
	) -> WordMatch {
		match walk(&self.root, word, tokens, max_token_len) {
			Some(node) => WordMatch {
				is_partial: true,
				is_full_word: node.is_word,
			},
			None => WordMatch {
				is_partial: false,
				is_full_word: false,
			},
		}
	}

	/// Resolves the node reached by consuming `prefix`, for further
	/// queries such as [`TokenNode::next_tokens`].
	pub fn node_for_prefix(
		&self,
		prefix: &str,
		tokens: &BTreeSet<String>,
		max_token_len: usize,
	) -> Option<&TokenNode> {
		walk(&self.root, prefix, tokens, max_token_len)
	}

	/// Enumerates every complete word reachable in exactly `num_tokens`
	/// tokens, each drawn from `tokens`.
	///
	/// The candidate set is enumerated exhaustively and deduplicated
	/// before any sampling: a step-by-step random descent (choosing a
	/// random child at each depth) yields a biased distribution.
	pub fn words_of_length(&self, num_tokens: usize, tokens: &BTreeSet<String>) -> Vec<String> {
		let mut found = BTreeSet::new();
		let mut prefix = String::new();
		collect_words(&self.root, num_tokens, tokens, &mut prefix, &mut found);
		found.into_iter().collect()
	}

	/// Draws a uniformly-random word of exactly `num_tokens` tokens.
	///
	/// Returns `None` if no such word exists.
	pub fn random_word_of_length(
		&self,
		num_tokens: usize,
		tokens: &BTreeSet<String>,
		rng: &mut impl Rng,
	) -> Option<String> {
		let mut words = self.words_of_length(num_tokens, tokens);
		if words.is_empty() {
			return None;
		}
		let index = rng.random_range(0..words.len());
		Some(words.swap_remove(index))
	}

	/// Draws a uniformly-random word starting with `prefix` and
	/// continuing for exactly `extra_tokens` further tokens.
	pub fn random_completion(
		&self,
		prefix: &str,
		extra_tokens: usize,
		tokens: &BTreeSet<String>,
		max_token_len: usize,
		rng: &mut impl Rng,
	) -> Option<String> {
		let node = walk(&self.root, prefix, tokens, max_token_len)?;
		let mut found = BTreeSet::new();
		let mut completion = String::new();
		collect_words(node, extra_tokens, tokens, &mut completion, &mut found);
		if found.is_empty() {
			return None;
		}
		let index = rng.random_range(0..found.len());
		found
			.into_iter()
			.nth(index)
			.map(|completion| format!("{prefix}{completion}"))
	}

	/// Merges another trie into this one, unioning children and word marks.
	pub fn merge(&mut self, other: TokenTrie) {
		merge_nodes(&mut self.root, other.root);
	}

	/// Serializes the trie to the bracket-grammar text format.
	///
	/// Depth-first, pre-order, no whitespace:
	/// a word node is `[`children`]`, a non-word node `(`children`)`,
	/// each child one token literal (multi-character tokens wrapped in
	/// `{}`) followed by its node.
	pub fn encode(&self) -> String {
		let mut out = String::new();
		encode_node(&self.root, &mut out);
		out
	}

	/// Decodes a trie from the bracket-grammar text format.
	///
	/// Single forward scan, no backtracking. Truncated input or an
	/// unrecognized leading character yields a node with no children
	/// rather than an error (this also tolerates encoders that elide
	/// the bracket pair of leaf nodes). Callers detecting corruption
	/// should check [`TokenTrie::is_empty`] against the input length.
	pub fn decode(text: &str) -> Self {
		let mut chars = text.chars().peekable();
		let mut root = decode_node(&mut chars);
		// The empty prefix is never a word, whatever the input claims.
		root.is_word = false;
		Self { root }
	}
}

impl Default for TokenTrie {
	fn default() -> Self {
		Self::new()
	}
}

fn walk<'a>(
	node: &'a TokenNode,
	word: &str,
	tokens: &BTreeSet<String>,
	max_token_len: usize,
) -> Option<&'a TokenNode> {
	if word.is_empty() {
		return Some(node);
	}
	let token = next_token(word, tokens, max_token_len)?;
	let child = node.children.get(token)?;
	walk(child, &word[token.len()..], tokens, max_token_len)
}

fn collect_words(
	node: &TokenNode,
	remaining: usize,
	tokens: &BTreeSet<String>,
	prefix: &mut String,
	found: &mut BTreeSet<String>,
) {
	if remaining == 0 {
		if node.is_word {
			found.insert(prefix.clone());
		}
		return;
	}
	for (token, child) in &node.children {
		if !tokens.contains(token) {
			continue;
		}
		let len = prefix.len();
		prefix.push_str(token);
		collect_words(child, remaining - 1, tokens, prefix, found);
		prefix.truncate(len);
	}
}

fn merge_nodes(into: &mut TokenNode, from: TokenNode) {
	into.is_word |= from.is_word;
	for (token, child) in from.children {
		match into.children.get_mut(&token) {
			Some(existing) => merge_nodes(existing, child),
			None => {
				into.children.insert(token, child);
			}
		}
	}
}

fn encode_node(node: &TokenNode, out: &mut String) {
	out.push(if node.is_word { '[' } else { '(' });
	for (token, child) in &node.children {
		if token.chars().count() == 1 {
			out.push_str(token);
		} else {
			out.push('{');
			out.push_str(token);
			out.push('}');
		}
		encode_node(child, out);
	}
	out.push(if node.is_word { ']' } else { ')' });
}

fn decode_node(chars: &mut Peekable<Chars>) -> TokenNode {
	let mut node = TokenNode {
		children: BTreeMap::new(),
		is_word: true,
	};

	match chars.peek() {
		None => return node,
		Some('(') => {
			node.is_word = false;
			chars.next();
		}
		Some('[') => {
			chars.next();
		}
		// Parent's closing bracket or an elided leaf: a complete word
		// with no children. Leave the character unconsumed.
		Some(_) => return node,
	}

	loop {
		let token = match chars.next() {
			None | Some(']') | Some(')') => return node,
			Some('{') => {
				let mut token = String::new();
				loop {
					match chars.next() {
						None | Some('}') => break,
						Some(c) => token.push(c),
					}
				}
				token
			}
			Some(c) => c.to_string(),
		};

		let child = decode_node(chars);
		match node.children.get_mut(&token) {
			Some(existing) => merge_nodes(existing, child),
			None => {
				node.children.insert(token, child);
			}
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn set(tokens: &[&str]) -> BTreeSet<String> {
		tokens.iter().map(|t| (*t).to_owned()).collect()
	}

	fn letters() -> BTreeSet<String> {
		('A'..='Z').map(|c| c.to_string()).collect()
	}

	fn sample_trie() -> TokenTrie {
		let lang = letters();
		let game_only = set(&["QU"]);
		let mut trie = TokenTrie::new();
		for word in ["QUEST", "QUOTE", "TEST"] {
			trie.insert(word, &[&lang, &game_only], 2);
		}
		trie
	}

	#[test]
	fn insert_marks_full_words_only() {
		let trie = sample_trie();
		let lang = letters();

		let full = trie.match_word("QUEST", &lang, 2);
		assert!(full.is_partial && full.is_full_word);

		let partial = trie.match_word("QUE", &lang, 2);
		assert!(partial.is_partial && !partial.is_full_word);

		let miss = trie.match_word("QUIZ", &lang, 2);
		assert!(!miss.is_partial && !miss.is_full_word);
	}

	#[test]
	fn insert_forks_parallel_spellings() {
		let trie = sample_trie();

		// Single-letter spelling: Q-U-E-S-T.
		assert!(trie.match_word("QUEST", &letters(), 2).is_full_word);

		// Combined-tile spelling: QU-E-S-T. The set omits "Q" so the
		// walk can only succeed through the game-only fork.
		let tile_spelling = set(&["QU", "E", "S", "T"]);
		assert!(trie.match_word("QUEST", &tile_spelling, 2).is_full_word);
	}

	#[test]
	fn walk_never_backtracks_across_tokenizations() {
		let lang = letters();
		let game_only = set(&["QU"]);
		let mut trie = TokenTrie::new();
		trie.insert("QUIT", &[&lang, &game_only], 2);

		// A set holding both "Q" and "QU" resolves "Q" first (shortest
		// match); the walk must not retry with "QU" when "Q" succeeds.
		let mixed = set(&["Q", "QU", "U", "I", "T"]);
		assert!(trie.match_word("QUIT", &mixed, 2).is_full_word);
	}

	#[test]
	fn next_tokens_lists_children_of_a_prefix() {
		let trie = sample_trie();
		let node = trie.node_for_prefix("QU", &letters(), 2).unwrap();
		let next: Vec<&str> = node.next_tokens().collect();
		assert_eq!(next, ["E", "O"]);
	}

	#[test]
	fn words_of_length_counts_tokens_not_characters() {
		let trie = sample_trie();
		let game = {
			let mut game = letters();
			game.insert("QU".to_owned());
			game
		};

		// Under the game alphabet QUEST and QUOTE are reachable in four
		// tokens (QU-E-S-T / QU-O-T-E), alongside the four-letter TEST.
		let four = trie.words_of_length(4, &game);
		assert_eq!(four, ["QUEST", "QUOTE", "TEST"]);

		// Under single letters only the five-letter words remain.
		let five = trie.words_of_length(5, &letters());
		assert_eq!(five, ["QUEST", "QUOTE"]);

		assert!(trie.words_of_length(3, &letters()).is_empty());
	}

	#[test]
	fn words_of_length_has_no_duplicates() {
		let lang = letters();
		let game_only = set(&["QU"]);
		let mut trie = TokenTrie::new();
		// Two QU digraphs: the parallel forks spell the same surface
		// string along several three- and four-token paths.
		trie.insert("QUQU", &[&lang, &game_only], 2);

		let game = {
			let mut game = letters();
			game.insert("QU".to_owned());
			game
		};
		let words = trie.words_of_length(3, &game);
		assert_eq!(words, ["QUQU"]);
	}

	#[test]
	fn random_word_sampling_is_uniform() {
		let lang = letters();
		let words = ["ACT", "BED", "CAT", "DOG", "EAR"];
		let mut trie = TokenTrie::new();
		for word in words {
			trie.insert(word, &[&lang], 1);
		}

		let mut rng = StdRng::seed_from_u64(7);
		let mut counts = std::collections::HashMap::new();
		for _ in 0..10_000 {
			let word = trie.random_word_of_length(3, &lang, &mut rng).unwrap();
			*counts.entry(word).or_insert(0u32) += 1;
		}

		assert_eq!(counts.len(), words.len());
		for (word, count) in counts {
			// Expected 2000 per word; allow a wide statistical margin.
			assert!(
				(1700..=2300).contains(&count),
				"{word} drawn {count} times"
			);
		}
	}

	#[test]
	fn random_completion_extends_a_prefix() {
		let trie = sample_trie();
		let game = {
			let mut game = letters();
			game.insert("QU".to_owned());
			game
		};

		let mut rng = StdRng::seed_from_u64(1);
		let word = trie
			.random_completion("QU", 3, &game, 2, &mut rng)
			.unwrap();
		assert!(word == "QUEST" || word == "QUOTE");

		// No word is exactly QU + two tokens.
		assert_eq!(trie.random_completion("QU", 2, &game, 2, &mut rng), None);
		// Unresolvable prefix.
		assert_eq!(trie.random_completion("ZZ", 2, &game, 2, &mut rng), None);
	}

	#[test]
	fn codec_round_trip_preserves_queries() {
		let trie = sample_trie();
		let encoded = trie.encode();
		let decoded = TokenTrie::decode(&encoded);

		let lang = letters();
		for word in ["QUEST", "QUOTE", "TEST", "QUE", "TES", "QUIZ", "Q"] {
			assert_eq!(
				trie.match_word(word, &lang, 2),
				decoded.match_word(word, &lang, 2),
				"diverged on {word}"
			);
		}
		assert_eq!(decoded.encode(), encoded);
	}

	#[test]
	fn encode_wraps_multi_char_tokens_in_braces() {
		let lang = set(&["A"]);
		let game_only = set(&["AB"]);
		let mut trie = TokenTrie::new();
		trie.insert("AB", &[&lang, &game_only], 2);

		// Branch A-B (A is a word prefix, B unresolvable by either set,
		// so only the game-only fork completes) plus branch {AB}.
		assert_eq!(trie.encode(), "(A(){AB}[])");
	}

	#[test]
	fn decode_tolerates_elided_leaf_brackets() {
		// Output of an encoder that serializes leaves as nothing at
		// all: word A-B spelled "(A(B))" instead of "(A(B[]))".
		let decoded = TokenTrie::decode("(A(B))");
		let tokens = set(&["A", "B"]);
		assert!(decoded.match_word("AB", &tokens, 1).is_full_word);
		assert!(!decoded.match_word("A", &tokens, 1).is_full_word);
	}

	#[test]
	fn decode_tolerates_truncation_and_garbage() {
		assert!(TokenTrie::decode("").is_empty());
		assert!(TokenTrie::decode("x").is_empty());

		// Truncated mid-children: keeps everything scanned so far.
		let truncated = TokenTrie::decode("(A(B");
		let tokens = set(&["A", "B"]);
		assert!(truncated.match_word("AB", &tokens, 1).is_full_word);
	}

	#[test]
	fn merge_unions_words() {
		let lang = letters();
		let mut a = TokenTrie::new();
		a.insert("CAT", &[&lang], 1);
		let mut b = TokenTrie::new();
		b.insert("CAR", &[&lang], 1);
		b.insert("CAT", &[&lang], 1);

		a.merge(b);
		assert!(a.match_word("CAT", &lang, 1).is_full_word);
		assert!(a.match_word("CAR", &lang, 1).is_full_word);
		assert_eq!(a.words_of_length(3, &lang), ["CAR", "CAT"]);
	}
}
