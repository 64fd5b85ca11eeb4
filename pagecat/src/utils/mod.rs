//! Small helpers: input globbing, file names, sizes.

use std::path::{Path, PathBuf};

use crate::error::{PageCatError, Result};

/// Expand glob patterns into paths, keeping pattern order.
///
/// Within one pattern, matches come back in the sorted order `glob` yields
/// them. A pattern with no glob metacharacters that matches nothing is kept
/// as a literal path, so a missing file surfaces later as a per-file open
/// failure rather than vanishing silently.
///
/// # Errors
///
/// Returns an error for a malformed pattern or an unreadable directory.
pub fn collect_paths_for_patterns<T>(patterns: T) -> Result<Vec<PathBuf>>
where
    T: IntoIterator,
    T::Item: AsRef<str>,
{
    let mut resolved = Vec::new();
    for pattern in patterns {
        resolved.extend(collect_paths_for_pattern(pattern.as_ref())?);
    }
    Ok(resolved)
}

fn collect_paths_for_pattern(pattern: &str) -> Result<Vec<PathBuf>> {
    let entries = glob::glob(pattern).map_err(|e| {
        PageCatError::invalid_config(format!("Invalid input pattern '{pattern}': {e}"))
    })?;

    let mut paths = Vec::new();
    for entry in entries {
        paths.push(entry.map_err(|e| PageCatError::other(e.to_string()))?);
    }

    if paths.is_empty() && !has_glob_chars(pattern) {
        paths.push(PathBuf::from(pattern));
    }
    Ok(paths)
}

fn has_glob_chars(pattern: &str) -> bool {
    pattern.contains(['*', '?', '['])
}

/// File name of `path` for display, or the whole path if it has none.
pub fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Format a byte count as a human-readable string.
pub fn format_file_size(size: u64) -> String {
    const KB: u64 = 1024;
    const MB: u64 = KB * 1024;
    const GB: u64 = MB * 1024;

    match size {
        s if s >= GB => format!("{:.2} GB", s as f64 / GB as f64),
        s if s >= MB => format!("{:.2} MB", s as f64 / MB as f64),
        s if s >= KB => format!("{:.2} KB", s as f64 / KB as f64),
        s => format!("{s} bytes"),
    }
}
