//! Server configuration.
//!
//! Loaded from an optional TOML file; every field has a default so an empty
//! (or missing) file gives a working server on 127.0.0.1:5000.

use std::io;
use std::path::{Component, Path, PathBuf};

use serde::{Deserialize, Serialize};

use rs_markov_core::GeneratorOptions;

/// Environment variable holding the configuration file path.
pub const CONFIG_ENV: &str = "RS_MARKOV_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
	pub host: String,
	pub port: u16,

	/// Directory holding the sample files.
	pub data_dir: PathBuf,

	/// Extension of sample files in `data_dir`.
	pub sample_extension: String,

	/// Model trained at startup, if any.
	pub default_model: Option<String>,

	/// Upper bound on the names returned by one enumeration request.
	pub enumerate_limit: usize,

	/// Allow cross-origin requests from anywhere.
	pub cors: bool,

	/// Defaults for generation requests and encoder threshold.
	pub generator: GeneratorOptions,
}

impl Default for ServerConfig {
	fn default() -> Self {
		Self {
			host: "127.0.0.1".to_owned(),
			port: 5000,
			data_dir: PathBuf::from("./data"),
			sample_extension: "txt".to_owned(),
			default_model: None,
			enumerate_limit: 1000,
			cors: false,
			generator: GeneratorOptions::default(),
		}
	}
}

impl ServerConfig {
	/// Loads the configuration from `path`, or returns the defaults.
	///
	/// # Errors
	/// Returns an error if the file cannot be read, is not valid TOML, or
	/// holds invalid generator options.
	pub fn load(path: Option<&Path>) -> io::Result<Self> {
		let config: Self = match path {
			Some(path) => {
				let contents = std::fs::read_to_string(path)?;
				toml::from_str(&contents).map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))?
			}
			None => Self::default(),
		};

		config
			.generator
			.validate()
			.map_err(|e| io::Error::new(io::ErrorKind::InvalidInput, e))?;

		Ok(config)
	}

	/// Path of the sample file for model `name`.
	///
	/// Returns `None` if `name` is empty or would escape `data_dir`.
	pub fn model_path(&self, name: &str) -> Option<PathBuf> {
		let mut components = Path::new(name).components();
		match (components.next(), components.next()) {
			(Some(Component::Normal(_)), None) => {
				Some(self.data_dir.join(format!("{}.{}", name, self.sample_extension)))
			}
			_ => None,
		}
	}
}

#[cfg(test)]
mod tests {
	use super::*;

	#[test]
	fn missing_file_means_defaults() {
		let config = ServerConfig::load(None).unwrap();
		assert_eq!(config.port, 5000);
		assert_eq!(config.host, "127.0.0.1");
		assert_eq!(config.generator, GeneratorOptions::default());
	}

	#[test]
	fn partial_file_keeps_defaults() {
		let config: ServerConfig = toml::from_str(
			r#"
			port = 8080
			default_model = "names"

			[generator]
			nb_try = 3
			"#,
		)
		.unwrap();
		assert_eq!(config.port, 8080);
		assert_eq!(config.default_model.as_deref(), Some("names"));
		assert_eq!(config.generator.nb_try, 3);
		assert_eq!(config.generator.max_len(), 10);
		assert_eq!(config.sample_extension, "txt");
	}

	#[test]
	fn invalid_generator_options_are_rejected() {
		let path = std::env::temp_dir().join(format!("rs-markov-config-{}.toml", std::process::id()));
		std::fs::write(&path, "[generator]\nthreshold = 1\n").unwrap();
		assert!(ServerConfig::load(Some(&path)).is_err());
		std::fs::remove_file(path).unwrap();
	}

	#[test]
	fn model_names_stay_in_the_data_dir() {
		let config = ServerConfig::default();
		assert_eq!(config.model_path("names"), Some(PathBuf::from("./data/names.txt")));
		assert_eq!(config.model_path("../etc/passwd"), None);
		assert_eq!(config.model_path("a/b"), None);
		assert_eq!(config.model_path(""), None);
	}
}
