// src/watch/path_utils.rs

use std::path::Path;

/// Convert a path into a string relative to `root`, with forward slashes.
///
/// Falls back to comparing canonical forms (macOS reports `/private/var/...`
/// for temp dirs). Returns `None` for paths outside `root` and for `root`
/// itself.
pub fn relative_str(root: &Path, path: &Path) -> Option<String> {
    if let Ok(rel) = path.strip_prefix(root) {
        return non_empty(rel);
    }

    if let (Ok(root_canon), Ok(path_canon)) = (root.canonicalize(), path.canonicalize()) {
        if let Ok(rel) = path_canon.strip_prefix(&root_canon) {
            return non_empty(rel);
        }
    }

    None
}

fn non_empty(rel: &Path) -> Option<String> {
    let s = rel.to_string_lossy().replace('\\', "/");
    if s.is_empty() { None } else { Some(s) }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strips_root_and_normalizes() {
        let root = Path::new("/proj");
        assert_eq!(
            relative_str(root, Path::new("/proj/_sass/x.scss")).as_deref(),
            Some("_sass/x.scss")
        );
        assert_eq!(relative_str(root, Path::new("/proj")), None);
        assert_eq!(relative_str(root, Path::new("/elsewhere/a")), None);
    }
}
