//! Input and output file names for one volume.

use std::path::{Path, PathBuf};

/// Header extension for MetaImage volumes.
const HEADER_EXT: &str = "mhd";

/// Suffix appended to the input name for the output volume.
const OUTPUT_SUFFIX: &str = "_skel";

/// Where a run reads from and writes to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VolumePaths {
	/// `<dir>/<name>.mhd`
	pub input: PathBuf,
	/// `<dir>/<name>_skel.mhd`; the payload lands next to it as `.raw`.
	pub output: PathBuf,
}

impl VolumePaths {
	/// Resolve paths from a directory and a volume name. The name may carry
	/// the `.mhd` extension or not.
	pub fn resolve(dir: &Path, name: &str) -> Self {
		let stem = name
			.strip_suffix(&format!(".{}", HEADER_EXT))
			.unwrap_or(name);
		Self {
			input: dir.join(format!("{}.{}", stem, HEADER_EXT)),
			output: dir.join(format!("{}{}.{}", stem, OUTPUT_SUFFIX, HEADER_EXT)),
		}
	}
}

#[cfg(test)]
#[path = "paths_test.rs"]
mod paths_test;
