//! Top-level module for the lexicon engine.
//!
//! This module provides the token-oriented language core, including:
//! - Token alphabets and the shortest-match tokenizer (`alphabet`)
//! - The token-keyed word trie with its text codec (`trie`)
//! - The pairwise frequency model and weighted samplers (`frequency`)
//! - The offline artifact builder (`builder`)
//! - A high-level query facade (`lexicon`)

/// Token alphabets, language configuration and the tokenizer.
///
/// Handles the split between the linguistic alphabet (how words are
/// spelled) and the game alphabet (the tiles offered to the player),
/// and derives the global token-length and word-length bounds.
pub mod alphabet;

/// Token-keyed trie recording which token sequences form valid words.
///
/// Supports parallel spellings of the same word, exhaustive
/// fixed-length enumeration, uniform random sampling and a compact
/// bracket-grammar text codec.
pub mod trie;

/// Unconditional and pairwise (context → next token) frequency tables.
///
/// Tracks raw occurrence counts and supports inverse-CDF sampling,
/// optionally conditioned on neighboring tokens.
pub mod frequency;

/// Offline builder: raw word list → trie + frequency table.
///
/// Builds partial models on worker threads and merges them,
/// returning aggregate statistics alongside the artifacts.
pub mod builder;

/// High-level facade combining alphabet, trie and frequency model.
///
/// Exposes artifact loading and the full query/generation API consumed
/// by the presentation layer.
pub mod lexicon;

/// Internal wildcard pattern expansion.
///
/// Recursively substitutes wildcard markers, pruned by the trie.
/// This module is not exposed publicly.
mod wildcard;
