use std::fmt;

use super::{Symbol, END};

/// Fixed-width window over the last `K` symbols of a sequence.
///
/// A `State` is the lookup key of a [`MarkovChain`](super::chain::MarkovChain):
/// two states are equal when all `K` positions match, and the derived hash
/// covers every position.
///
/// States stored in a chain are never mutated. Walking the chain happens on a
/// caller-owned copy shifted with [`push_back`](State::push_back), and undone
/// with [`push_front`](State::push_front).
///
/// ## Invariants
/// - The initial state is all [`END`]
/// - `push_front(push_back(s))` restores the state exactly, `END` included
#[derive(Clone, Copy, PartialEq, Eq, Hash, Debug)]
pub struct State<const K: usize> {
	/// Oldest symbol first, most recent symbol last.
	symbols: [Symbol; K],
}

impl<const K: usize> Default for State<K> {
	fn default() -> Self {
		Self { symbols: [END; K] }
	}
}

impl<const K: usize> State<K> {
	/// Shifts the window left and appends `symbol` at the tail.
	///
	/// Returns the symbol that fell off the front.
	pub fn push_back(&mut self, symbol: Symbol) -> Symbol {
		if K == 0 {
			return symbol;
		}
		let evicted = self.symbols[0];
		self.symbols.copy_within(1.., 0);
		self.symbols[K - 1] = symbol;
		evicted
	}

	/// Shifts the window right and inserts `symbol` at the front.
	///
	/// Feeding it the value returned by the last `push_back` undoes that call.
	pub fn push_front(&mut self, symbol: Symbol) -> Symbol {
		if K == 0 {
			return symbol;
		}
		let evicted = self.symbols[K - 1];
		self.symbols.copy_within(..K - 1, 1);
		self.symbols[0] = symbol;
		evicted
	}

	/// Returns the `n`-th symbol from the end (`0` is the most recent one).
	///
	/// Returns `None` when `n >= K`.
	pub fn last(&self, n: usize) -> Option<Symbol> {
		if n >= K {
			return None;
		}
		Some(self.symbols[K - n - 1])
	}

	/// Whether the most recent symbol is [`END`].
	pub fn is_terminated(&self) -> bool {
		self.last(0) == Some(END)
	}

	/// Resets the window to the root state.
	pub fn clear(&mut self) {
		self.symbols = [END; K];
	}

	pub fn symbols(&self) -> &[Symbol; K] {
		&self.symbols
	}
}

impl<const K: usize> fmt::Display for State<K> {
	fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
		for symbol in &self.symbols {
			write!(f, " 0x{:02x}", symbol)?;
		}
		Ok(())
	}
}
