use std::fs;
use std::io;
use std::path::Path;

/// Reads a text file and returns its whitespace-separated tokens.
///
/// - Reads the entire file into memory
/// - Splits on any run of whitespace, so one sample per line and several
///   samples per line are both accepted
pub fn read_samples<P: AsRef<Path>>(filename: P) -> io::Result<Vec<String>> {
	let contents = fs::read_to_string(filename)?;
	Ok(contents.split_whitespace().map(str::to_owned).collect())
}

/// Extracts the base filename without extension.
///
/// Examples:
/// - `"./data/names.txt"` → `"names"`
/// - `"names.txt"` → `"names"`
pub fn get_filename<P: AsRef<Path>>(input_path: P) -> io::Result<String> {
	let stem = input_path
		.as_ref()
		.file_stem()
		.ok_or_else(|| io::Error::new(io::ErrorKind::InvalidInput, "Path has no filename"))?;

	Ok(stem.to_string_lossy().to_string())
}

/// Lists all files with a given extension in a directory.
///
/// Returns file names only (no paths), sorted.
pub fn list_files<P: AsRef<Path>>(dir: P, extension: &str) -> io::Result<Vec<String>> {
	let mut files = Vec::new();

	for entry in fs::read_dir(dir)? {
		let entry = entry?;
		let path = entry.path();

		if path.is_file() && path.extension() == Some(std::ffi::OsStr::new(extension)) {
			if let Some(name) = path.file_name() {
				files.push(name.to_string_lossy().to_string());
			}
		}
	}

	files.sort();
	Ok(files)
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::env;
	use std::process;

	fn scratch_dir(name: &str) -> std::path::PathBuf {
		let dir = env::temp_dir().join(format!("rs-markov-io-{}-{}", name, process::id()));
		fs::create_dir_all(&dir).unwrap();
		dir
	}

	#[test]
	fn samples_are_whitespace_tokens() {
		let dir = scratch_dir("samples");
		let path = dir.join("names.txt");
		fs::write(&path, "anna  bob\r\ncarla\n\n  mia\t maya\n").unwrap();

		let samples = read_samples(&path).unwrap();
		assert_eq!(samples, vec!["anna", "bob", "carla", "mia", "maya"]);

		fs::remove_dir_all(dir).unwrap();
	}

	#[test]
	fn missing_file_is_an_error() {
		assert!(read_samples("/definitely/not/here.txt").is_err());
	}

	#[test]
	fn filename_without_extension() {
		assert_eq!(get_filename("./data/names.txt").unwrap(), "names");
		assert_eq!(get_filename("names").unwrap(), "names");
	}

	#[test]
	fn lists_only_matching_files() {
		let dir = scratch_dir("list");
		fs::write(dir.join("b.txt"), "x").unwrap();
		fs::write(dir.join("a.txt"), "x").unwrap();
		fs::write(dir.join("c.dat"), "x").unwrap();
		fs::create_dir_all(dir.join("d.txt")).unwrap();

		assert_eq!(list_files(&dir, "txt").unwrap(), vec!["a.txt", "b.txt"]);

		fs::remove_dir_all(dir).unwrap();
	}
}
