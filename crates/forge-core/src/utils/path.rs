//! Tarball locator construction.
//!
//! Release archives are stored under `<author initial>/<author>/<file>`
//! below the configured releases URL.

use crate::error::{ForgeError, ForgeResult};
use std::path::{Component, Path};

/// Check if a path is safe (relative, no directory traversal)
pub fn is_safe_path(path: &Path) -> bool {
    if path.is_absolute() {
        return false;
    }

    let mut depth = 0i32;

    for component in path.components() {
        match component {
            Component::CurDir => {},
            Component::ParentDir => {
                depth -= 1;
                if depth < 0 {
                    return false;
                }
            },
            Component::Normal(_) => {
                depth += 1;
            },
            _ => {
                return false;
            },
        }
    }

    true
}

/// Build the locator for a release archive uploaded by `author`
pub fn tarball_locator(releases_url: &str, author: &str, filename: &str) -> ForgeResult<String> {
    let file = Path::new(filename);
    let single_component = matches!(
        file.components().collect::<Vec<_>>().as_slice(),
        [Component::Normal(_)]
    );
    if filename.is_empty() || !single_component || !is_safe_path(file) {
        return Err(ForgeError::UnsafePath {
            path: filename.to_string(),
        });
    }

    let initial = author
        .chars()
        .next()
        .ok_or_else(|| ForgeError::InvalidModuleName {
            name: format!("{}/", author),
        })?
        .to_lowercase();

    Ok(format!(
        "{}/{}/{}/{}",
        releases_url.trim_end_matches('/'),
        initial,
        author,
        filename
    ))
}
