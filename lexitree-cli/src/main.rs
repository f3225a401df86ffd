use std::env;
use std::time::Instant;

use anyhow::{Context, Result, bail};
use rand::Rng;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lexitree_core::lang::builder;
use lexitree_core::lang::lexicon::Lexicon;

fn main() -> Result<()> {
	tracing_subscriber::registry()
		.with(
			tracing_subscriber::EnvFilter::try_from_default_env()
				.unwrap_or_else(|_| "lexitree_core=info".into()),
		)
		.with(tracing_subscriber::fmt::layer())
		.init();

	let args: Vec<String> = env::args().collect();
	let command = args.get(1).map(String::as_str);
	let lang_code = args.get(2).map(String::as_str).unwrap_or("en");
	let data_dir = args.get(3).map(String::as_str).unwrap_or("data");

	let start = Instant::now();
	match command {
		Some("export") => export(lang_code, data_dir)?,
		Some("check") => check(lang_code, data_dir)?,
		Some(other) => bail!("unknown command '{other}'"),
		None => {
			println!(
				"Usage: lexitree <export|check> [language-code (default en)] [data-dir (default data)]"
			);
			return Ok(());
		}
	}
	println!(
		"Command complete in {:.3}s",
		start.elapsed().as_secs_f64()
	);
	Ok(())
}

/// Builds `tree-<lang>.txt` and `prob-<lang>.json` from the raw word
/// list and config in `data_dir`.
fn export(lang_code: &str, data_dir: &str) -> Result<()> {
	let stats = builder::export(data_dir, lang_code)
		.with_context(|| format!("exporting '{lang_code}' artifacts from {data_dir}"))?;
	println!(
		"#words: {}, #nodes: {}, skipped: {}",
		stats.words, stats.nodes, stats.skipped
	);
	Ok(())
}

/// Loads the built artifacts and runs a round of smoke queries against
/// them: random words of ascending length, a completion chain, and a
/// wildcard expansion of a partially-masked random word.
fn check(lang_code: &str, data_dir: &str) -> Result<()> {
	let lexicon = Lexicon::load(data_dir, lang_code)
		.with_context(|| format!("loading '{lang_code}' artifacts from {data_dir}"))?;
	let mut rng = rand::rng();

	println!("Random words:");
	let min = lexicon.alphabet().min_word_len();
	for num_tokens in min..20 {
		match lexicon.random_word(num_tokens, &mut rng) {
			Some(word) => println!("{num_tokens} {word}"),
			None => break,
		}
	}

	if let Some(mut word) = lexicon.random_word(min, &mut rng) {
		println!("\nCompletion: (random word '{word}')");
		loop {
			let options = lexicon.next_tokens_after(&word);
			println!("Possible tokens after '{word}': {options:?}");
			match options.first() {
				Some(token) => word.push_str(token),
				None => break,
			}
		}
	}

	if let Some(word) = lexicon.random_word(7, &mut rng) {
		let pattern = mask_random_positions(&word, 3, lexicon.alphabet().wildcard(), &mut rng);
		println!(
			"\nWildcard pattern {pattern} expands to: {:?}",
			lexicon.expand_wildcard_words(&pattern)
		);
	}

	Ok(())
}

/// Replaces `count` distinct random character positions of `word` with
/// the wildcard marker.
fn mask_random_positions(word: &str, count: usize, marker: &str, rng: &mut impl Rng) -> String {
	let mut out: Vec<String> = word.chars().map(|c| c.to_string()).collect();
	let mut positions: Vec<usize> = (0..out.len()).collect();
	for _ in 0..count.min(out.len()) {
		let pick = rng.random_range(0..positions.len());
		let position = positions.swap_remove(pick);
		out[position] = marker.to_owned();
	}
	out.concat()
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn masking_replaces_distinct_positions() {
		let mut rng = rand::rng();
		let masked = mask_random_positions("LANTERN", 3, "?", &mut rng);
		assert_eq!(masked.chars().count(), 7);
		assert_eq!(masked.chars().filter(|c| *c == '?').count(), 3);

		// Never masks more positions than the word has.
		let masked = mask_random_positions("AB", 5, "?", &mut rng);
		assert_eq!(masked, "??");
	}
}
