use std::collections::HashSet;
use std::path::Path;

use log::{debug, info, warn};
use rand::Rng;

use super::chain::MarkovChain;
use super::encoder::NumberEncoder;
use super::options::GeneratorOptions;
use super::DEFAULT_ORDER;
use crate::error::Result;
use crate::io;

/// High-level generator built from one sample file.
///
/// # Responsibilities
/// - Train the terminated chain used by random generation and enumeration
/// - Train the refined, unterminated chain used by the number encoder
/// - Keep the training samples to tell new words from known ones
#[derive(Debug)]
pub struct Generator<const K: usize = DEFAULT_ORDER> {
	name: String,
	chain: MarkovChain<K>,
	encoder: NumberEncoder<K>,
	/// Lowercased training samples.
	samples: HashSet<String>,
}

impl<const K: usize> Generator<K> {
	/// Creates a generator from a sample file.
	///
	/// The generator is named after the file stem.
	///
	/// # Errors
	/// - Returns an error if the file cannot be read.
	/// - Returns an error if a sample contains the end symbol or if the
	///   options are invalid.
	pub fn new<P: AsRef<Path>>(filepath: P, options: &GeneratorOptions) -> Result<Self> {
		let name = io::get_filename(&filepath)?;
		let samples = io::read_samples(&filepath)?;
		info!("loaded {} samples for model '{}'", samples.len(), name);
		Self::from_samples(name, samples, options)
	}

	/// Creates a generator from in-memory samples.
	///
	/// Both chains are trained in parallel chunks.
	pub fn from_samples(name: impl Into<String>, samples: Vec<String>, options: &GeneratorOptions) -> Result<Self> {
		options.validate()?;

		let chain = MarkovChain::from_samples_parallel(&samples, true)?;
		let encoder = NumberEncoder::from_chain(
			MarkovChain::from_samples_parallel(&samples, false)?,
			options.threshold(),
		)?;
		let samples = samples.iter().map(|s| s.to_lowercase()).collect();

		Ok(Self { name: name.into(), chain, encoder, samples })
	}

	pub fn name(&self) -> &str {
		&self.name
	}

	pub fn chain(&self) -> &MarkovChain<K> {
		&self.chain
	}

	pub fn encoder(&self) -> &NumberEncoder<K> {
		&self.encoder
	}

	/// Whether `word` is one of the training samples (case-insensitive).
	pub fn is_known(&self, word: &str) -> bool {
		self.samples.contains(&word.to_lowercase())
	}

	/// Generates a word by weighted random walk, avoiding training samples.
	///
	/// # Behavior
	/// - Regenerates up to `nb_try` times while the word is a known sample.
	/// - Returns the last attempt if every try produced a known sample.
	/// - If `nb_try` is 0, returns the first generated word.
	pub fn predict<R: Rng + ?Sized>(&self, rng: &mut R, mut nb_try: usize) -> Result<String> {
		let mut word = self.chain.random(rng)?;

		while nb_try > 0 && self.is_known(&word) {
			debug!("'{}' is a training sample, {} tries left", word, nb_try);
			word = self.chain.random(rng)?;
			nb_try -= 1;
		}
		if self.is_known(&word) {
			warn!("model '{}' only produced known samples", self.name);
		}

		Ok(word)
	}

	/// Enumerates every word of length `min..=max` the chain can produce that
	/// is not a training sample.
	///
	/// # Errors
	/// Same as [`MarkovChain::iter`].
	pub fn novel(&self, min: usize, max: usize) -> Result<impl Iterator<Item = Result<String>> + '_> {
		let sequences = self.chain.iter(min, max)?;
		Ok(sequences.filter(move |word| match word {
			Ok(word) => !self.is_known(word),
			Err(_) => true,
		}))
	}

	/// Encodes a number with the refined chain.
	pub fn encode(&self, number: u64) -> Result<String> {
		self.encoder.encode(number)
	}
}

#[cfg(test)]
mod tests {
	use super::*;
	use rand::SeedableRng;
	use rand::rngs::StdRng;

	fn samples(words: &[&str]) -> Vec<String> {
		words.iter().map(|w| w.to_string()).collect()
	}

	#[test]
	fn novel_words_exclude_the_samples() {
		let generator: Generator<1> = Generator::from_samples(
			"toy",
			samples(&["ab", "ba"]),
			&GeneratorOptions::default(),
		)
		.unwrap();

		let words: Vec<String> = generator.novel(1, 4).unwrap().collect::<Result<_>>().unwrap();
		assert!(!words.is_empty());
		assert!(!words.contains(&"ab".to_owned()));
		assert!(!words.contains(&"ba".to_owned()));
		assert!(words.contains(&"aba".to_owned()));
	}

	#[test]
	fn known_words_are_case_insensitive() {
		let generator: Generator =
			Generator::from_samples("names", samples(&["Anna"]), &GeneratorOptions::default()).unwrap();
		assert!(generator.is_known("anna"));
		assert!(generator.is_known("ANNA"));
		assert!(!generator.is_known("ann"));
		assert_eq!(generator.name(), "names");
	}

	#[test]
	fn predict_gives_up_after_nb_try() {
		// Only one word can ever be produced; it is known, so the last try wins.
		let generator: Generator =
			Generator::from_samples("one", samples(&["solo"]), &GeneratorOptions::default()).unwrap();
		let mut rng = StdRng::seed_from_u64(1);
		assert_eq!(generator.predict(&mut rng, 5).unwrap(), "solo");
		assert_eq!(generator.predict(&mut rng, 0).unwrap(), "solo");
	}

	#[test]
	fn invalid_options_are_rejected() {
		let options: GeneratorOptions = toml::from_str("threshold = 1").unwrap();
		assert!(Generator::<3>::from_samples("x", samples(&["ab"]), &options).is_err());
	}

	#[test]
	fn encode_uses_the_refined_chain() {
		let generator: Generator = Generator::from_samples(
			"names",
			samples(&["anna", "bob", "carla"]),
			&GeneratorOptions::default(),
		)
		.unwrap();
		assert_eq!(generator.encode(0).unwrap(), "");
		assert_eq!(generator.encode(1).unwrap(), generator.encoder().encode(1).unwrap());
	}
}
