use std::collections::HashMap;
use std::sync::mpsc;
use std::thread;

use log::debug;
use rand::Rng;

use super::sequences::Sequences;
use super::state::State;
use super::transition::Transition;
use super::{DEFAULT_ORDER, END, Symbol};
use crate::error::{MarkovError, Result};

/// Fixed-order Markov chain over the bytes of short samples.
///
/// The chain maps every [`State`] (the last `K` symbols) seen during training
/// to the [`Transition`] holding the counts of the symbols that followed it.
///
/// # Responsibilities
/// - Build the table from training samples, in one pass
/// - Walk it randomly, weighted by the recorded counts
/// - Set up deterministic enumeration of everything it can produce
/// - Merge with another chain of the same order (parallel training)
///
/// # Invariants
/// - Every state reachable from the root by a trained path has an entry
/// - With `terminate`, every trained path ends on a transition containing [`END`]
#[derive(Clone, Debug)]
pub struct MarkovChain<const K: usize = DEFAULT_ORDER> {
	/// Whether an [`END`] transition is recorded after every sample.
	terminate: bool,

	/// Mapping from a state to its outgoing transitions.
	states: HashMap<State<K>, Transition>,
}

impl<const K: usize> MarkovChain<K> {
	/// Creates an empty chain.
	///
	/// Fails to compile for `K == 0`.
	pub fn new(terminate: bool) -> Self {
		const { assert!(K > 0, "a chain needs at least one symbol of memory") };
		Self { terminate, states: HashMap::new() }
	}

	/// Builds a chain from a sequence of samples on the current thread.
	///
	/// # Errors
	/// Returns an error if a sample contains the reserved end symbol.
	pub fn from_samples<I, S>(samples: I, terminate: bool) -> Result<Self>
	where
		I: IntoIterator<Item = S>,
		S: AsRef<str>,
	{
		let mut chain = Self::new(terminate);
		for sample in samples {
			chain.add_sample(sample.as_ref())?;
		}
		Ok(chain)
	}

	/// Splits the samples into chunks, trains partial chains in parallel and
	/// merges them into a single chain.
	///
	/// # Behavior
	/// - Chunk count is based on CPU cores * factor.
	/// - Partial chains are collected over an MPSC channel.
	/// - The result is equal to [`from_samples`](Self::from_samples) on the
	///   same input, counts being order independent.
	///
	/// # Errors
	/// Returns the first training error reported by a worker, or
	/// [`MarkovError::Worker`] if a worker died before reporting.
	pub fn from_samples_parallel(samples: &[String], terminate: bool) -> Result<Self> {
		if samples.is_empty() {
			return Ok(Self::new(terminate));
		}

		let cpus = num_cpus::get();
		let factor = 8;
		let chunks = cpus * factor;
		let chunk_size = samples.len().div_ceil(chunks);

		let (tx, rx) = mpsc::channel();
		let mut workers = 0;
		for chunk in samples.chunks(chunk_size) {
			let tx = tx.clone();
			let chunk: Vec<String> = chunk.to_vec();
			workers += 1;

			thread::spawn(move || {
				let partial = Self::from_samples(&chunk, terminate);
				// A closed receiver means another worker already failed.
				let _ = tx.send(partial);
			});
		}
		drop(tx);

		let mut chain = Self::new(terminate);
		let mut reported = 0;
		for partial in rx.iter() {
			chain.merge(&partial?);
			reported += 1;
		}

		if reported != workers {
			return Err(MarkovError::Worker);
		}

		debug!(
			"trained order-{} chain on {} samples with {} workers: {} states",
			K,
			samples.len(),
			workers,
			chain.len()
		);

		Ok(chain)
	}

	/// Adds one training sample.
	///
	/// Records `(state, symbol)` for every byte of the sample while sliding
	/// the state forward, then `(state, END)` if the chain terminates samples.
	///
	/// # Errors
	/// Returns [`MarkovError::ReservedSymbol`] if the sample contains [`END`].
	/// The chain is left untouched in that case.
	pub fn add_sample(&mut self, sample: &str) -> Result<()> {
		if sample.as_bytes().contains(&END) {
			return Err(MarkovError::ReservedSymbol { sample: sample.to_owned() });
		}

		let mut state = State::default();
		for &symbol in sample.as_bytes() {
			self.add_transition(state, symbol);
			state.push_back(symbol);
		}

		if self.terminate {
			self.add_transition(state, END);
		}

		Ok(())
	}

	fn add_transition(&mut self, state: State<K>, symbol: Symbol) {
		self.states.entry(state).or_default().add(symbol);
	}

	/// Returns the transition recorded for `state`.
	///
	/// # Errors
	/// Returns [`MarkovError::MissingTransition`] if the state was never trained.
	pub fn transition(&self, state: &State<K>) -> Result<&Transition> {
		self.states
			.get(state)
			.ok_or_else(|| MarkovError::MissingTransition { state: state.to_string() })
	}

	/// Transition of `state`, or `None` if the state was never trained.
	pub fn get(&self, state: &State<K>) -> Option<&Transition> {
		self.states.get(state)
	}

	#[cfg(test)]
	pub(crate) fn get_mut(&mut self, state: &State<K>) -> Option<&mut Transition> {
		self.states.get_mut(state)
	}

	/// Generates one sequence by a weighted random walk from the root.
	///
	/// At every step the next symbol is drawn with probability proportional
	/// to its count; the walk stops on [`END`], which is not emitted.
	///
	/// # Errors
	/// Returns [`MarkovError::MissingTransition`] if the walk reaches a state
	/// the chain has no entry for (e.g. a chain trained without `terminate`).
	pub fn random<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<String> {
		let mut word = Vec::new();
		let mut state = State::default();

		loop {
			let transition = self.transition(&state)?;
			let symbol = transition
				.sample(rng)
				.ok_or_else(|| MarkovError::MissingTransition { state: state.to_string() })?;

			if symbol != END {
				word.push(symbol);
			}
			state.push_back(symbol);
			if state.is_terminated() {
				break;
			}
		}

		Ok(String::from_utf8_lossy(&word).into_owned())
	}

	/// Lazily enumerates every sequence of length `min..=max` the chain can
	/// produce, most frequent branch first.
	///
	/// # Errors
	/// - [`MarkovError::InvalidBounds`] if `max == 0` or `min > max`.
	/// - [`MarkovError::MissingTransition`] if positioning on the first
	///   sequence walks into an untrained state.
	pub fn iter(&self, min: usize, max: usize) -> Result<Sequences<'_, K>> {
		Sequences::new(self, min, max)
	}

	/// Merges another chain into this one.
	///
	/// Transitions of matching states are summed, missing ones are cloned.
	pub fn merge(&mut self, other: &Self) {
		for (state, transition) in &other.states {
			if let Some(existing) = self.states.get_mut(state) {
				existing.merge(transition);
			} else {
				self.states.insert(*state, transition.clone());
			}
		}
	}

	/// Refines every transition to its `threshold` most frequent symbols.
	pub(crate) fn refine(&mut self, threshold: usize) {
		for transition in self.states.values_mut() {
			transition.refine(threshold);
		}
	}

	/// Number of trained states.
	pub fn len(&self) -> usize {
		self.states.len()
	}

	pub fn is_empty(&self) -> bool {
		self.states.is_empty()
	}

	pub fn terminates(&self) -> bool {
		self.terminate
	}

	pub fn states(&self) -> impl Iterator<Item = (&State<K>, &Transition)> {
		self.states.iter()
	}
}

impl<const K: usize> PartialEq for MarkovChain<K> {
	fn eq(&self, other: &Self) -> bool {
		self.terminate == other.terminate && self.states == other.states
	}
}
