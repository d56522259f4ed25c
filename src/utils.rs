//! Utility functions for path handling

use std::path::{Path, PathBuf};

/// Expand a leading `~` in a path to the user's home directory
///
/// Only the bare `~` and the `~/...` shorthand are expanded; `~user` forms
/// are returned unchanged, as is any path when no home directory can be
/// determined.
///
/// # Examples
///
/// ```
/// use media_dl::utils::expand_home;
/// use std::path::Path;
///
/// let expanded = expand_home(Path::new("~/Videos"));
/// assert!(!expanded.starts_with("~"));
///
/// let absolute = expand_home(Path::new("/data/downloads"));
/// assert_eq!(absolute, Path::new("/data/downloads"));
/// ```
#[must_use]
pub fn expand_home(path: &Path) -> PathBuf {
    let Some(text) = path.to_str() else {
        return path.to_path_buf();
    };

    if text == "~" {
        return dirs::home_dir().unwrap_or_else(|| path.to_path_buf());
    }

    if let Some(rest) = text.strip_prefix("~/")
        && let Some(home) = dirs::home_dir()
    {
        return home.join(rest);
    }

    path.to_path_buf()
}
