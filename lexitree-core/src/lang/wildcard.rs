use std::collections::BTreeSet;

use super::alphabet::Alphabet;
use super::trie::TokenTrie;

/// Expands every wildcard marker in `pattern` into concrete tokens and
/// collects the substitutions accepted by `accept`.
///
/// Recursion locates the first marker only; substituted patterns are
/// re-expanded until none remain. A marker in first position is
/// substituted with the full alphabet; later markers are substituted
/// only with the tokens that can follow the preceding prefix in the
/// trie (pruned expansion). A prefix that fails to resolve terminates
/// that branch with no results — silently, not as an error.
///
/// Cost is exponential in the number of markers; bounding pattern
/// length is the caller's responsibility.
pub(crate) fn expand<F>(
	trie: &TokenTrie,
	alphabet: &Alphabet,
	pattern: &str,
	accept: &F,
) -> BTreeSet<String>
where
	F: Fn(&str) -> bool,
{
	let mut results = BTreeSet::new();
	expand_into(trie, alphabet, pattern, accept, &mut results);
	results
}

fn expand_into<F>(
	trie: &TokenTrie,
	alphabet: &Alphabet,
	pattern: &str,
	accept: &F,
	results: &mut BTreeSet<String>,
) where
	F: Fn(&str) -> bool,
{
	let marker = alphabet.wildcard();
	let Some(index) = pattern.find(marker) else {
		if accept(pattern) {
			results.insert(pattern.to_owned());
		}
		return;
	};

	let prefix = &pattern[..index];
	let rest = &pattern[index + marker.len()..];

	if index == 0 {
		for token in alphabet.all_tokens() {
			expand_into(trie, alphabet, &format!("{token}{rest}"), accept, results);
		}
		return;
	}

	let Some(node) =
		trie.node_for_prefix(prefix, alphabet.lang_tokens(), alphabet.max_token_len())
	else {
		return;
	};
	for token in node.next_tokens() {
		expand_into(trie, alphabet, &format!("{prefix}{token}{rest}"), accept, results);
	}
}
