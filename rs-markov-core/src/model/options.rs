use serde::{Deserialize, Serialize};

use super::encoder::DEFAULT_THRESHOLD;
use crate::error::{MarkovError, Result};

/// Parameters shared by the front ends when driving a [`Generator`](super::generator::Generator).
///
/// # Responsibilities
/// - Track the retry budget of random generation (`nb_try`)
/// - Track the length window of enumeration (`min_len..=max_len`)
/// - Track the encoder pruning threshold
///
/// # Invariants
/// - `1 <= max_len` and `min_len <= max_len`
/// - `threshold >= 2`
///
/// Deserialized values bypass the setters; call [`validate`](Self::validate)
/// after loading them.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
#[serde(default)]
pub struct GeneratorOptions {
	/// Number of regenerations when a random word is already a training sample.
	pub nb_try: usize,

	min_len: usize,
	max_len: usize,
	threshold: usize,
}

impl Default for GeneratorOptions {
	fn default() -> Self {
		Self {
			nb_try: 100,
			min_len: 5,
			max_len: 10,
			threshold: DEFAULT_THRESHOLD,
		}
	}
}

impl GeneratorOptions {
	pub fn min_len(&self) -> usize {
		self.min_len
	}

	pub fn max_len(&self) -> usize {
		self.max_len
	}

	pub fn threshold(&self) -> usize {
		self.threshold
	}

	/// Sets the enumeration length window.
	///
	/// # Errors
	/// Returns an error if `max == 0` or `min > max`.
	pub fn set_bounds(&mut self, min: usize, max: usize) -> Result<()> {
		if max == 0 || min > max {
			return Err(MarkovError::InvalidBounds { min, max });
		}
		self.min_len = min;
		self.max_len = max;
		Ok(())
	}

	/// Sets the encoder pruning threshold.
	///
	/// # Errors
	/// Returns an error if `threshold < 2`.
	pub fn set_threshold(&mut self, threshold: usize) -> Result<()> {
		if threshold < 2 {
			return Err(MarkovError::InvalidThreshold(threshold));
		}
		self.threshold = threshold;
		Ok(())
	}

	/// Checks the invariants, e.g. after deserialization.
	pub fn validate(&self) -> Result<()> {
		if self.max_len == 0 || self.min_len > self.max_len {
			return Err(MarkovError::InvalidOption(format!(
				"length window {}..={} is empty",
				self.min_len, self.max_len
			)));
		}
		if self.threshold < 2 {
			return Err(MarkovError::InvalidOption(format!(
				"threshold {} is below 2",
				self.threshold
			)));
		}
		Ok(())
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn defaults_match_the_name_generator() {
		let options = GeneratorOptions::default();
		assert_eq!(options.nb_try, 100);
		assert_eq!((options.min_len(), options.max_len()), (5, 10));
		assert_eq!(options.threshold(), 15);
		assert!(options.validate().is_ok());
	}

	#[test]
	fn setters_reject_invalid_values() {
		let mut options = GeneratorOptions::default();
		assert!(options.set_bounds(3, 2).is_err());
		assert!(options.set_bounds(0, 0).is_err());
		assert!(options.set_threshold(1).is_err());
		assert_eq!(options, GeneratorOptions::default());

		options.set_bounds(0, 3).unwrap();
		options.set_threshold(4).unwrap();
		assert_eq!((options.min_len(), options.max_len(), options.threshold()), (0, 3, 4));
	}

	#[test]
	fn deserialized_values_need_validation() {
		let options: GeneratorOptions = toml::from_str("min_len = 4\nmax_len = 2").unwrap();
		assert!(matches!(options.validate(), Err(MarkovError::InvalidOption(_))));

		let options: GeneratorOptions = toml::from_str("nb_try = 3").unwrap();
		assert_eq!(options.nb_try, 3);
		assert_eq!(options.max_len(), 10);
		assert!(options.validate().is_ok());
	}
}
