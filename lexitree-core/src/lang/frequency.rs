use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::error::LexiconError;

/// Sentinel context keying the unconditional token distribution.
pub const UNCONDITIONAL_CONTEXT: &str = "_";

/// One weighted distribution: raw occurrence counts per token plus
/// their running total.
///
/// Field names match the persisted JSON schema
/// (`{ "total": number, "probs": { token: count } }`); the values are
/// counts, normalized to probabilities at query time (`count / total`).
///
/// # Invariants
/// - `total` equals the sum of all `probs` values; this must hold
///   after every rebuild and is checked by [`FrequencyTable::validate`]
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ContextRow {
	pub total: u64,
	pub probs: BTreeMap<String, u64>,
}

impl ContextRow {
	/// Records one occurrence of `token`.
	pub fn record(&mut self, token: &str) {
		*self.probs.entry(token.to_owned()).or_insert(0) += 1;
		self.total += 1;
	}

	/// Merges another row into this one, summing counts.
	fn merge(&mut self, other: ContextRow) {
		for (token, count) in other.probs {
			*self.probs.entry(token).or_insert(0) += count;
		}
		self.total += other.total;
	}
}

/// Unconditional and pairwise token distributions, keyed by context.
///
/// The context is either [`UNCONDITIONAL_CONTEXT`] or a specific
/// preceding token. Matches the persisted `prob-<lang>.json` artifact:
/// a bare JSON object mapping each context to its row.
///
/// # Responsibilities
/// - Accumulate occurrence counts during the offline build
/// - Sample a token from the unconditional distribution (inverse CDF)
/// - Sample a token conditioned on neighboring tokens, with flattening,
///   pairwise reinforcement and repeat suppression
///
/// # Invariants
/// - Immutable after the build phase; samplers take `&self` plus an
///   injected random source so seeded generation is reproducible
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct FrequencyTable {
	contexts: BTreeMap<String, ContextRow>,
}

impl FrequencyTable {
	/// Creates an empty table.
	pub fn new() -> Self {
		Self::default()
	}

	/// Ensures a (possibly empty) row exists for `context`.
	pub fn ensure_context(&mut self, context: &str) {
		self.contexts.entry(context.to_owned()).or_default();
	}

	/// Records one occurrence of `token` under `context`.
	pub fn record(&mut self, context: &str, token: &str) {
		self.contexts
			.entry(context.to_owned())
			.or_default()
			.record(token);
	}

	/// The row for `context`, if any.
	pub fn row(&self, context: &str) -> Option<&ContextRow> {
		self.contexts.get(context)
	}

	/// Merges another table into this one, summing counts per context.
	pub fn merge(&mut self, other: FrequencyTable) {
		for (context, row) in other.contexts {
			match self.contexts.get_mut(&context) {
				Some(existing) => existing.merge(row),
				None => {
					self.contexts.insert(context, row);
				}
			}
		}
	}

	/// Checks that every row's total equals the sum of its counts.
	///
	/// # Errors
	/// Returns `LexiconError::InvalidFrequencies` naming the first
	/// offending context.
	pub fn validate(&self) -> Result<(), LexiconError> {
		for (context, row) in &self.contexts {
			let sum: u64 = row.probs.values().sum();
			if sum != row.total {
				return Err(LexiconError::InvalidFrequencies(context.clone()));
			}
		}
		Ok(())
	}

	/// Samples a token from the unconditional distribution.
	///
	/// Inverse-CDF: draws `r` uniformly in `[0, total)` and subtracts
	/// each token's count in iteration order until `r` goes negative.
	///
	/// # Errors
	/// Returns `LexiconError::NoCandidateToken` when the unconditional
	/// row is missing or empty.
	pub fn sample_unconditional(&self, rng: &mut impl Rng) -> Result<&str, LexiconError> {
		let row = self
			.contexts
			.get(UNCONDITIONAL_CONTEXT)
			.ok_or(LexiconError::NoCandidateToken)?;
		if row.total == 0 {
			return Err(LexiconError::NoCandidateToken);
		}

		let mut r = rng.random_range(0..row.total);
		let mut fallback = None;
		for (token, count) in &row.probs {
			if r < *count {
				return Ok(token);
			}
			r -= count;
			fallback = Some(token.as_str());
		}
		// Unreachable while the total invariant holds, kept for safety.
		fallback.ok_or(LexiconError::NoCandidateToken)
	}

	/// Samples a token conditioned on the tokens already adjacent to
	/// the position being generated.
	///
	/// The working distribution is built in probability space:
	/// 1. Start from the unconditional row flattened toward its mean
	///    by `params.flatten_scale()` (`0` = fully uniform, `1` =
	///    unmodified): `value = mean + (original - mean) * scale`.
	/// 2. For each token in `neighbors`, add that neighbor's
	///    conditional row scaled by `params.pair_weight`.
	/// 3. Multiply the accumulated weight of every token that itself
	///    appears in `neighbors` by `params.repeat_weight` (< 1
	///    suppresses the same tile reappearing next to itself). Applied
	///    once per token, only to tokens present in `neighbors`.
	/// 4. Inverse-CDF sample over the result.
	///
	/// # Errors
	/// - `LexiconError::InvalidParam` when a weight is negative
	/// - `LexiconError::NoCandidateToken` when the resulting total
	///   weight is zero — never a silent arbitrary pick
	pub fn sample_given_neighbors(
		&self,
		neighbors: &[&str],
		params: &SampleParams,
		rng: &mut impl Rng,
	) -> Result<String, LexiconError> {
		if params.pair_weight < 0.0 {
			return Err(LexiconError::InvalidParam("pair_weight must be >= 0"));
		}
		if params.repeat_weight < 0.0 {
			return Err(LexiconError::InvalidParam("repeat_weight must be >= 0"));
		}

		let base = self
			.contexts
			.get(UNCONDITIONAL_CONTEXT)
			.ok_or(LexiconError::NoCandidateToken)?;
		if base.total == 0 {
			return Err(LexiconError::NoCandidateToken);
		}

		let mean = 1.0 / base.probs.len() as f64;
		let mut weights: BTreeMap<&str, f64> = base
			.probs
			.iter()
			.map(|(token, count)| {
				let original = *count as f64 / base.total as f64;
				let flattened = mean + (original - mean) * params.flatten_scale;
				(token.as_str(), flattened)
			})
			.collect();

		for neighbor in neighbors {
			let Some(row) = self.contexts.get(*neighbor) else {
				continue;
			};
			if row.total == 0 {
				continue;
			}
			for (token, count) in &row.probs {
				let conditional = *count as f64 / row.total as f64;
				*weights.entry(token.as_str()).or_insert(0.0) +=
					conditional * params.pair_weight;
			}
		}

		for (token, weight) in weights.iter_mut() {
			if neighbors.contains(token) {
				*weight *= params.repeat_weight;
			}
		}

		let total: f64 = weights.values().sum();
		if total <= 0.0 {
			return Err(LexiconError::NoCandidateToken);
		}

		let mut r = rng.random::<f64>() * total;
		let mut fallback = None;
		for (token, weight) in &weights {
			if r < *weight {
				return Ok((*token).to_owned());
			}
			r -= weight;
			fallback = Some(*token);
		}
		// Floating-point remainder can leak past the last bucket.
		fallback
			.map(str::to_owned)
			.ok_or(LexiconError::NoCandidateToken)
	}
}

/// Tuning knobs for neighbor-conditioned sampling.
///
/// `pair_weight` scales the pairwise reinforcement of each neighbor's
/// conditional row; `repeat_weight` rescales tokens already present
/// among the neighbors (below 1 discourages adjacent repeats);
/// `flatten_scale` blends the unconditional distribution toward
/// uniform and is kept in `[0, 1]` by its setter.
#[derive(Debug, Clone)]
pub struct SampleParams {
	pub pair_weight: f64,
	pub repeat_weight: f64,
	flatten_scale: f64,
}

impl SampleParams {
	pub fn new() -> Self {
		Self {
			pair_weight: 1.0,
			repeat_weight: 1.0,
			flatten_scale: 1.0,
		}
	}

	/// Returns the current flattening factor.
	pub fn flatten_scale(&self) -> f64 {
		self.flatten_scale
	}

	/// Sets the flattening factor (0.0 = fully uniform, 1.0 = unmodified).
	///
	/// # Errors
	/// Returns an error if the value is outside `[0.0, 1.0]`.
	pub fn set_flatten_scale(&mut self, flatten_scale: f64) -> Result<(), LexiconError> {
		if !(0.0..=1.0).contains(&flatten_scale) {
			return Err(LexiconError::InvalidParam(
				"flatten_scale must be between 0.0 and 1.0",
			));
		}
		self.flatten_scale = flatten_scale;
		Ok(())
	}
}

impl Default for SampleParams {
	fn default() -> Self {
		Self::new()
	}
}
