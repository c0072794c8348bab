use std::error::Error;
use std::path::PathBuf;

use clap::Parser;
use log::{error, info};
use rand::SeedableRng;
use rand::rngs::StdRng;

use rs_markov_core::{Generator, GeneratorOptions, diffuse};

/// Generate new names from a list of samples with a fixed-order Markov chain.
///
/// Without a mode flag, every name of `--min..=--max` letters the chain can
/// produce (and that is not a sample) is printed, most likely first.
#[derive(Parser, Debug)]
#[command(author, version, about)]
struct Args {
	/// File with the training samples (whitespace separated)
	samples: PathBuf,

	/// Print a single randomly generated name
	#[arg(short, long, conflicts_with = "encode")]
	random: bool,

	/// Encode comma separated numbers into names
	#[arg(short, long, value_delimiter = ',')]
	encode: Option<Vec<u32>>,

	/// Scramble the numbers before encoding them
	#[arg(long, requires = "encode")]
	diffuse: bool,

	/// Minimum length of enumerated names
	#[arg(long, default_value_t = 5)]
	min: usize,

	/// Maximum length of enumerated names
	#[arg(long, default_value_t = 10)]
	max: usize,

	/// Stop after this many enumerated names (0 for all)
	#[arg(long, default_value_t = 0)]
	limit: usize,

	/// Number of regenerations when a random name is a sample
	#[arg(long, default_value_t = 100)]
	nb_try: usize,

	/// Branches kept per state by the encoder
	#[arg(long, default_value_t = rs_markov_core::DEFAULT_THRESHOLD)]
	threshold: usize,

	/// Number of letters the chain remembers
	#[arg(long, default_value_t = 3, value_parser = clap::value_parser!(u8).range(1..=4))]
	order: u8,

	/// Seed of the random generator (random mode)
	#[arg(long)]
	seed: Option<u64>,
}

impl Args {
	fn options(&self) -> Result<GeneratorOptions, Box<dyn Error>> {
		let mut options = GeneratorOptions::default();
		options.set_bounds(self.min, self.max)?;
		options.set_threshold(self.threshold)?;
		options.nb_try = self.nb_try;
		Ok(options)
	}
}

fn run<const K: usize>(args: &Args) -> Result<(), Box<dyn Error>> {
	let options = args.options()?;
	let generator: Generator<K> = Generator::new(&args.samples, &options)?;
	info!("model '{}' has {} states", generator.name(), generator.chain().len());

	if let Some(numbers) = &args.encode {
		for &number in numbers {
			let value = if args.diffuse { diffuse(number) } else { number };
			match generator.encode(value as u64) {
				Ok(word) => println!("Number {}: '{}'", number, word),
				Err(e) => error!("number {} cannot be encoded: {}", number, e),
			}
		}
		return Ok(());
	}

	if args.random {
		let word = match args.seed {
			Some(seed) => generator.predict(&mut StdRng::seed_from_u64(seed), options.nb_try)?,
			None => generator.predict(&mut rand::rng(), options.nb_try)?,
		};
		println!("{}", word);
		return Ok(());
	}

	let mut count = 0;
	for word in generator.novel(options.min_len(), options.max_len())? {
		println!("{}", word?);
		count += 1;
		if count == args.limit {
			info!("stopped after {} names", count);
			break;
		}
	}
	info!("enumerated {} new names", count);

	Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
	env_logger::init();

	let args = Args::parse();
	match args.order {
		1 => run::<1>(&args),
		2 => run::<2>(&args),
		3 => run::<3>(&args),
		_ => run::<4>(&args),
	}
}
