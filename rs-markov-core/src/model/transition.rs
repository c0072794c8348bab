use std::collections::HashMap;
use std::sync::OnceLock;

use rand::Rng;

use super::Symbol;
use crate::error::{MarkovError, Result};

/// One entry of a transition's ordered view.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub struct Frequency {
	pub symbol: Symbol,
	pub count: usize,
}

/// Observed next-symbol counts for a single state.
///
/// Conceptually, this is the set of outgoing edges of a node in the Markov
/// chain, weighted by how many times each edge was observed during training.
///
/// ## Ordered view
/// [`frequencies`](Transition::frequencies) returns the entries sorted by
/// count, most frequent first. Equal counts are ordered by ascending symbol
/// value, so [`END`](super::END) comes before any other symbol it ties with.
/// The view is built on first read and reused until the next write.
///
/// ## Invariants
/// - Every recorded count is strictly positive
/// - Equality only looks at the raw counts, never at the cached view
#[derive(Clone, Debug, Default)]
pub struct Transition {
	/// Example: { b'e' => 42, b'a' => 3 }
	counts: HashMap<Symbol, usize>,
	/// Empty cell means dirty.
	ordered: OnceLock<Vec<Frequency>>,
}

impl Transition {
	pub fn new() -> Self {
		Self::default()
	}

	/// Records an occurrence of `symbol` after this state.
	///
	/// Invalidates the ordered view.
	pub fn add(&mut self, symbol: Symbol) {
		*self.counts.entry(symbol).or_insert(0) += 1;
		self.ordered.take();
	}

	/// Number of distinct symbols observed (the branching factor).
	pub fn count(&self) -> usize {
		self.counts.len()
	}

	/// Sum of all recorded occurrences.
	pub fn total(&self) -> usize {
		self.counts.values().sum()
	}

	/// Ordered view: most frequent symbol first, ties by ascending symbol.
	pub fn frequencies(&self) -> &[Frequency] {
		self.ordered.get_or_init(|| {
			let mut frequencies: Vec<Frequency> = self
				.counts
				.iter()
				.map(|(&symbol, &count)| Frequency { symbol, count })
				.collect();
			frequencies.sort_by(|a, b| b.count.cmp(&a.count).then(a.symbol.cmp(&b.symbol)));
			frequencies
		})
	}

	pub fn iter(&self) -> impl Iterator<Item = &Frequency> {
		self.frequencies().iter()
	}

	/// Returns the symbol at `index` of the ordered view.
	///
	/// # Errors
	/// Returns [`MarkovError::IndexOutOfRange`] if `index >= count()`.
	pub fn get(&self, index: usize) -> Result<Symbol> {
		self.frequencies()
			.get(index)
			.map(|frequency| frequency.symbol)
			.ok_or(MarkovError::IndexOutOfRange { index, count: self.count() })
	}

	/// Keeps only the `threshold` most frequent symbols and drops the rest.
	///
	/// Uses the ordered view, so ties at the cut are resolved by symbol value.
	pub fn refine(&mut self, threshold: usize) {
		let dropped: Vec<Symbol> = self
			.frequencies()
			.iter()
			.skip(threshold)
			.map(|frequency| frequency.symbol)
			.collect();

		if dropped.is_empty() {
			return;
		}

		for symbol in dropped {
			self.counts.remove(&symbol);
		}
		self.ordered.take();
	}

	/// Draws a symbol with probability proportional to its count.
	///
	/// Buckets are scanned in ordered-view order, so a seeded generator always
	/// yields the same draw. Returns `None` if nothing was recorded.
	pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Option<Symbol> {
		let total = self.total();
		if total == 0 {
			return None;
		}

		let mut r = rng.random_range(0..total);
		for frequency in self.frequencies() {
			if r < frequency.count {
				return Some(frequency.symbol);
			}
			r -= frequency.count;
		}

		None
	}

	/// Merges another transition into this one by summing counts.
	///
	/// Used to combine partial chains trained in parallel.
	pub fn merge(&mut self, other: &Self) {
		for (symbol, count) in &other.counts {
			*self.counts.entry(*symbol).or_insert(0) += *count;
		}
		self.ordered.take();
	}
}

impl PartialEq for Transition {
	fn eq(&self, other: &Self) -> bool {
		self.counts == other.counts
	}
}

impl Eq for Transition {}
