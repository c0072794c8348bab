use std::collections::HashSet;

use log::{debug, warn};

use super::chain::MarkovChain;
use super::state::State;
use super::{DEFAULT_ORDER, Symbol};
use crate::error::{MarkovError, Result};

/// Default number of next symbols kept per state.
pub const DEFAULT_THRESHOLD: usize = 15;

/// Turns non-negative integers into pseudo-words shaped by a chain.
///
/// The encoder trains a chain without end markers, then refines every
/// transition to its `threshold` most frequent symbols. A number is written
/// as a mixed-radix numeral, lowest digit first, where the radix of each
/// digit is the branching factor of the state reached so far and the digit
/// picks the next symbol from that state's ordered view.
///
/// The mapping is deterministic for a given chain, but is not guaranteed to
/// be injective.
#[derive(Clone, Debug)]
pub struct NumberEncoder<const K: usize = DEFAULT_ORDER> {
	chain: MarkovChain<K>,
	threshold: usize,
}

impl<const K: usize> NumberEncoder<K> {
	/// Trains an encoder on `samples`.
	///
	/// # Errors
	/// - [`MarkovError::InvalidThreshold`] if `threshold < 2`.
	/// - [`MarkovError::ReservedSymbol`] if a sample contains the end symbol.
	pub fn new<I, S>(samples: I, threshold: usize) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		Self::from_chain(MarkovChain::from_samples(samples, false)?, threshold)
	}

	/// Refines an already trained chain into an encoder.
	///
	/// # Errors
	/// Returns [`MarkovError::InvalidThreshold`] if `threshold < 2`.
	pub fn from_chain(mut chain: MarkovChain<K>, threshold: usize) -> Result<Self> {
		if threshold < 2 {
			return Err(MarkovError::InvalidThreshold(threshold));
		}

		chain.refine(threshold);
		debug!("refined {} states down to {} branches", chain.len(), threshold);

		Ok(Self { chain, threshold })
	}

	pub fn threshold(&self) -> usize {
		self.threshold
	}

	pub fn chain(&self) -> &MarkovChain<K> {
		&self.chain
	}

	/// Encodes `number` into a pseudo-word. `0` encodes to the empty string.
	///
	/// # Behavior
	/// While `number > 0`: take the branching factor `b` of the current state,
	/// emit the symbol at `(number + offset) % b`, divide `number` by `b`,
	/// bump `offset` and advance the state by the emitted symbol.
	///
	/// A state whose branches were all refined away restarts from the root.
	///
	/// # Errors
	/// - [`MarkovError::MissingTransition`] if the walk reaches a state the
	///   chain never trained on (the tail of a sample), or the root has no
	///   branches.
	/// - [`MarkovError::Stalled`] if single-branch states lead back to a
	///   state already visited while the number cannot shrink.
	pub fn encode(&self, mut number: u64) -> Result<String> {
		let mut word: Vec<Symbol> = Vec::new();
		let mut state = State::<K>::default();
		let mut offset: u64 = 0;
		// States visited since the number last shrank.
		let mut unit_run: HashSet<State<K>> = HashSet::new();

		while number > 0 {
			let mut transition = self.chain.transition(&state)?;
			if transition.count() == 0 {
				state.clear();
				transition = self.chain.transition(&state)?;
			}

			let radix = transition.count() as u64;
			if radix == 0 {
				return Err(MarkovError::MissingTransition { state: state.to_string() });
			}

			if radix == 1 {
				if !unit_run.insert(state) {
					warn!("encoding of {} stalled at state{}", number, state);
					return Err(MarkovError::Stalled { state: state.to_string() });
				}
			} else {
				unit_run.clear();
			}

			let index = ((number as u128 + offset as u128) % radix as u128) as usize;
			let symbol = transition.get(index)?;
			word.push(symbol);

			number /= radix;
			offset += 1;
			state.push_back(symbol);
		}

		Ok(String::from_utf8_lossy(&word).into_owned())
	}
}

/// Bit diffusion applied by front ends before encoding, so that consecutive
/// integers do not map to words sharing a long prefix.
///
/// Eight rounds of xor with `0b1001_1010` followed by a shift-rotate that
/// keeps 31 bits.
pub fn diffuse(number: u32) -> u32 {
	let mut value = number;
	for _ in 0..8 {
		value ^= 0b1001_1010;
		value = ((value << 1) & (u32::MAX >> 1)) | (value >> (u32::BITS - 2));
	}
	value
}
