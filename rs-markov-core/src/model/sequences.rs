use std::iter::FusedIterator;
use std::ptr;

use super::chain::MarkovChain;
use super::state::State;
use super::transition::Transition;
use super::{END, Symbol};
use crate::error::{MarkovError, Result};

/// A transition together with the position of the candidate currently
/// followed in its ordered view.
#[derive(Clone, Copy, Debug)]
struct Frame<'a> {
	transition: &'a Transition,
	position: usize,
}

impl<'a> Frame<'a> {
	fn new(transition: &'a Transition) -> Self {
		Self { transition, position: 0 }
	}

	/// Candidate symbol at the current position, `None` once exhausted.
	fn current(&self) -> Option<Symbol> {
		self.transition
			.frequencies()
			.get(self.position)
			.map(|frequency| frequency.symbol)
	}
}

impl PartialEq for Frame<'_> {
	fn eq(&self, other: &Self) -> bool {
		ptr::eq(self.transition, other.transition) && self.position == other.position
	}
}

/// Lazy, depth-bounded enumeration of every sequence a chain can produce.
///
/// The cursor performs an iterative depth-first walk of the chain. Each frame
/// of the stack follows one candidate of a transition's ordered view, so
/// branches are visited most frequent first, and each path of states is
/// visited once. Only sequences that reach [`END`] after `min..=max` symbols
/// are yielded.
///
/// The walk moves with two primitives:
/// - `dive` extends the path along the current candidates until one of them
///   is [`END`] or `max` symbols are on the path;
/// - `roll` advances the deepest frame to its next candidate, popping
///   exhausted frames (and undoing their state shift) on the way up.
///
/// Built by [`MarkovChain::iter`]. A fresh cursor restarts the enumeration;
/// two cursors over the same chain and bounds yield the same sequence of
/// items.
#[derive(Clone, Debug)]
pub struct Sequences<'a, const K: usize> {
	chain: &'a MarkovChain<K>,
	root: Option<&'a Transition>,

	min: usize,
	max: usize,

	/// Working state, shifted on every extension.
	state: State<K>,
	/// Symbol evicted from `state` by each extension, innermost last.
	popped: Vec<Symbol>,
	/// Root frame first, deepest extension last.
	frames: Vec<Frame<'a>>,

	/// Current position is accepted but not yet yielded.
	pending: bool,
}

impl<'a, const K: usize> Sequences<'a, K> {
	pub(crate) fn new(chain: &'a MarkovChain<K>, min: usize, max: usize) -> Result<Self> {
		if max == 0 || min > max {
			return Err(MarkovError::InvalidBounds { min, max });
		}

		let state = State::default();
		let root = chain.get(&state);
		let mut sequences = Self {
			chain,
			root,
			min,
			max,
			state,
			popped: Vec::new(),
			frames: Vec::new(),
			pending: false,
		};

		// An untrained chain has nothing to enumerate.
		if let Some(transition) = root {
			sequences.frames.push(Frame::new(transition));
			sequences.dive()?;
			if !sequences.is_accepted() {
				sequences.step()?;
			}
			sequences.pending = !sequences.is_end();
		}

		Ok(sequences)
	}

	/// Whether the enumeration is over.
	pub fn is_end(&self) -> bool {
		self.frames.is_empty()
	}

	/// The sequence at the cursor: every frame's current candidate, root to
	/// leaf, without [`END`]. Empty once the enumeration is over.
	pub fn current(&self) -> String {
		let word: Vec<Symbol> = self
			.frames
			.iter()
			.filter_map(Frame::current)
			.filter(|&symbol| symbol != END)
			.collect();
		String::from_utf8_lossy(&word).into_owned()
	}

	/// Moves the cursor to the next accepted sequence, or to the end.
	///
	/// # Errors
	/// Returns [`MarkovError::MissingTransition`] if an extension reaches a
	/// state the chain never trained on.
	pub fn step(&mut self) -> Result<()> {
		loop {
			self.roll();
			if self.is_end() {
				return Ok(());
			}
			self.dive()?;
			if self.is_accepted() {
				return Ok(());
			}
		}
	}

	/// Number of symbols on the current path, [`END`] excluded.
	fn extensions(&self) -> usize {
		self.frames.len().saturating_sub(1)
	}

	fn is_accepted(&self) -> bool {
		match self.frames.last() {
			Some(top) => top.current() == Some(END) && self.extensions() >= self.min,
			None => false,
		}
	}

	fn dive(&mut self) -> Result<()> {
		while let Some(top) = self.frames.last() {
			let symbol = match top.current() {
				Some(symbol) => symbol,
				None => return Ok(()),
			};
			if symbol == END || self.extensions() >= self.max {
				return Ok(());
			}

			self.popped.push(self.state.push_back(symbol));
			let transition = self.walk(&self.state)?;
			self.frames.push(Frame::new(transition));
		}
		Ok(())
	}

	fn roll(&mut self) {
		while let Some(top) = self.frames.last_mut() {
			top.position += 1;
			if top.current().is_some() {
				return;
			}

			self.frames.pop();
			if self.frames.is_empty() {
				return;
			}
			if let Some(symbol) = self.popped.pop() {
				self.state.push_front(symbol);
			}
		}
	}

	/// Transition to extend into. A state refined down to nothing falls back
	/// to the root transition.
	fn walk(&self, state: &State<K>) -> Result<&'a Transition> {
		let transition = self.chain.transition(state)?;
		match self.root {
			Some(root) if transition.count() == 0 => Ok(root),
			_ => Ok(transition),
		}
	}
}

impl<const K: usize> Iterator for Sequences<'_, K> {
	type Item = Result<String>;

	fn next(&mut self) -> Option<Self::Item> {
		if self.pending {
			self.pending = false;
		} else if let Err(error) = self.step() {
			self.frames.clear();
			return Some(Err(error));
		}

		if self.is_end() {
			None
		} else {
			Some(Ok(self.current()))
		}
	}
}

impl<const K: usize> FusedIterator for Sequences<'_, K> {}

impl<const K: usize> PartialEq for Sequences<'_, K> {
	fn eq(&self, other: &Self) -> bool {
		match (self.is_end(), other.is_end()) {
			(true, true) => true,
			(false, false) => ptr::eq(self.chain, other.chain) && self.frames == other.frames,
			_ => false,
		}
	}
}
