use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

/// Reads a whole text file into a `String`.
///
/// - Reads the entire file into memory
/// - Strips a leading byte order mark if present (word lists exported
///   from desktop editors frequently carry one)
pub(crate) fn read_file<P: AsRef<Path>>(filename: P) -> std::io::Result<String> {
	let mut contents = String::new();
	File::open(filename)?.read_to_string(&mut contents)?;
	match contents.strip_prefix('\u{feff}') {
		Some(stripped) => Ok(stripped.to_owned()),
		None => Ok(contents),
	}
}

/// Builds the path of a per-language data file inside a directory.
///
/// Example:
/// `data` + `"tree-"` + `"en"` + `"txt"` → `data/tree-en.txt`
pub(crate) fn data_file_path<P: AsRef<Path>>(
	dir: P,
	prefix: &str,
	lang_code: &str,
	extension: &str,
) -> PathBuf {
	dir.as_ref().join(format!("{prefix}{lang_code}.{extension}"))
}

#[cfg(test)]
mod tests {
	use super::*;
	use std::io::Write;

	#[test]
	fn read_file_strips_byte_order_mark() {
		let mut file = tempfile::NamedTempFile::new().unwrap();
		file.write_all("\u{feff}HELLO\nWORLD\n".as_bytes()).unwrap();

		let contents = read_file(file.path()).unwrap();
		assert_eq!(contents, "HELLO\nWORLD\n");
	}

	#[test]
	fn data_file_path_joins_prefix_code_and_extension() {
		let path = data_file_path("data", "tree-", "en", "txt");
		assert_eq!(path, PathBuf::from("data").join("tree-en.txt"));
	}
}
