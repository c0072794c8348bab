use thiserror::Error;

/// Errors raised while training, walking or encoding with a Markov chain.
#[derive(Debug, Error)]
pub enum MarkovError {
	/// A state reached by walking forward from the root has no transition.
	///
	/// The chain was queried with a state it never trained on; the current
	/// walk, enumeration step or encoding is aborted.
	#[error("no transition recorded for state{state}")]
	MissingTransition { state: String },

	/// A training sample contains the reserved end symbol.
	#[error("sample {sample:?} contains the reserved end symbol")]
	ReservedSymbol { sample: String },

	/// Enumeration bounds are unusable (`max` must be >= 1 and >= `min`).
	#[error("invalid length bounds: min {min}, max {max}")]
	InvalidBounds { min: usize, max: usize },

	/// `Transition::get` was called past the end of the ordered view.
	#[error("index {index} out of range for a transition with {count} symbols")]
	IndexOutOfRange { index: usize, count: usize },

	/// Encoder pruning threshold too small to make progress.
	#[error("threshold must be at least 2, got {0}")]
	InvalidThreshold(usize),

	/// A generation option failed validation.
	#[error("invalid option: {0}")]
	InvalidOption(String),

	/// The encoder entered a cycle of single-choice states.
	#[error("encoding stalled in a cycle of single-choice states at{state}")]
	Stalled { state: String },

	/// A training worker exited without reporting its partial chain.
	#[error("a training worker exited before reporting")]
	Worker,

	#[error(transparent)]
	Io(#[from] std::io::Error),
}

/// Result type alias for chain operations.
pub type Result<T> = std::result::Result<T, MarkovError>;
