//! Output path resolution for translated subtitle files.

use std::path::{Path, PathBuf};
use tracing::trace;

/// Suffix appended to the file stem of translated files.
pub const SUFFIX: &str = "-AR";

/// `movie.srt` -> `movie-AR.srt`.
fn suffixed_name(input: &Path) -> String {
    let stem = input.file_stem().unwrap_or_default().to_string_lossy();
    match input.extension() {
        Some(ext) => format!("{stem}{SUFFIX}.{}", ext.to_string_lossy()),
        None => format!("{stem}{SUFFIX}"),
    }
}

/// Decide where the translation of `input` is written.
///
/// Without `output` the file lands next to the input. An existing directory
/// (or `.`) receives the suffixed input file name; anything else is used as
/// the literal output path.
pub fn resolve_output_path(input: &Path, output: Option<&Path>) -> PathBuf {
    let resolved = match output {
        None => input.with_file_name(suffixed_name(input)),
        Some(dir) if dir.is_dir() || dir == Path::new(".") => dir.join(suffixed_name(input)),
        Some(path) => path.to_path_buf(),
    };
    trace!(
        "resolve_output_path input={} output={}",
        input.display(),
        resolved.display()
    );
    resolved
}
