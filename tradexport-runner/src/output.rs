//! Output path resolution.

use std::path::{Path, PathBuf};

pub const DEFAULT_STEM: &str = "records";

/// Turn a user-supplied output location into the CSV file to write.
///
/// - nothing → `records.csv` in the working directory
/// - a path ending in a separator, or an existing directory → `<dir>/records.csv`
/// - anything else gets `.csv` appended unless its name already ends in
///   `.csv` (case-sensitive, so a bare `.csv` is kept as is)
pub fn resolve_output_path(requested: Option<&Path>) -> PathBuf {
    resolve_with_extension(requested, "csv")
}

/// [`resolve_output_path`] for an exporter writing `extension` files.
pub fn resolve_with_extension(requested: Option<&Path>, extension: &str) -> PathBuf {
    let default_name = format!("{DEFAULT_STEM}.{extension}");
    let path = match requested {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => return PathBuf::from(default_name),
    };

    let raw = path.to_string_lossy();
    if raw.ends_with(std::path::MAIN_SEPARATOR) || raw.ends_with('/') || path.is_dir() {
        return path.join(default_name);
    }

    let suffix = format!(".{extension}");
    let has_extension = path
        .file_name()
        .is_some_and(|name| name.to_string_lossy().ends_with(&suffix));
    if has_extension {
        path.to_path_buf()
    } else {
        let mut os = path.as_os_str().to_owned();
        os.push(".");
        os.push(extension);
        PathBuf::from(os)
    }
}
