//! Top-level module for the fixed-order Markov chain.
//!
//! This module provides:
//! - The sliding context window used as lookup key (`State`)
//! - Per-state next-symbol counts with a frequency-ranked view (`Transition`)
//! - The chain itself, with random walks (`MarkovChain`)
//! - Lazy, deterministic enumeration of the chain's language (`Sequences`)
//! - The integer to pseudo-word encoder (`NumberEncoder`)
//! - A high-level facade over one sample file (`Generator`)

/// Fixed-width window over the last `K` symbols.
pub mod state;

/// Next-symbol counts of a single state.
///
/// Exposes the ordered view walked by the enumerator and indexed by the
/// encoder, and the refinement used to bound the branching factor.
pub mod transition;

/// The state to transition table, built once from training samples.
pub mod chain;

/// Depth-first enumerator over a chain.
pub mod sequences;

/// Mixed-radix integer encoder over a refined chain.
pub mod encoder;

/// Front-end parameters (retry budget, length window, threshold).
pub mod options;

/// High-level interface over one sample file.
///
/// Adds de-duplication against the training samples on top of the chain.
pub mod generator;

/// One unit of a sequence: a byte of a sample.
pub type Symbol = u8;

/// Reserved symbol marking the end of a sequence.
pub const END: Symbol = 0;

/// Model order used when none is given.
pub const DEFAULT_ORDER: usize = 3;
