//! Fixed-order Markov chain over short samples such as names.
//!
//! This crate provides:
//! - Character-level (byte) Markov chains of any fixed order
//! - Weighted random generation of new words
//! - Lazy, deterministic enumeration of every word a chain can produce
//!   within a length window, most frequent branches first
//! - Deterministic encoding of integers into pseudo-words
//! - Sample file loading helpers

/// Core chain types, enumeration and encoding.
pub mod model;

/// Error type shared by the whole crate.
pub mod error;

/// I/O utilities (sample loading, path helpers).
pub mod io;

pub use error::{MarkovError, Result};
pub use model::chain::MarkovChain;
pub use model::encoder::{DEFAULT_THRESHOLD, NumberEncoder, diffuse};
pub use model::generator::Generator;
pub use model::options::GeneratorOptions;
pub use model::sequences::Sequences;
pub use model::state::State;
pub use model::transition::{Frequency, Transition};
pub use model::{DEFAULT_ORDER, END, Symbol};
