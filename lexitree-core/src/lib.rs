//! Token-trie lexicon engine for tile-based word games.
//!
//! This crate provides the language core of a word-tile game, including:
//! - Dual token alphabets (linguistic and game tiles) with a shortest-match tokenizer
//! - A token-keyed trie for word and prefix validation
//! - Uniform random word and completion sampling
//! - Wildcard pattern expansion pruned by the trie
//! - A pairwise frequency model for procedural tile generation
//! - An offline builder turning raw word lists into the runtime artifacts
//!
//! Only the high-level API is exposed publicly. Low-level components
//! are kept internal to ensure consistency and prevent misuse.

/// Core lexicon types and query logic.
///
/// This module exposes the high-level lexicon interface while keeping
/// internal walk and expansion helpers private.
pub mod lang;

/// Error type shared by loading, building and sampling operations.
pub mod error;

/// I/O utilities (artifact reading, path helpers).
///
/// Not exposed publicly.
pub(crate) mod io;
