//! Utility functions and helpers.

pub mod http;

use std::path::{Path, PathBuf};

/// Resolve an output file name against a base directory.
///
/// Absolute paths are returned unchanged.
pub fn resolve_output(base: &Path, file_name: &Path) -> PathBuf {
    if file_name.is_absolute() {
        file_name.to_path_buf()
    } else {
        base.join(file_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resolve_output() {
        let base = Path::new("/srv/feeds");
        assert_eq!(
            resolve_output(base, Path::new("more-or-less.xml")),
            PathBuf::from("/srv/feeds/more-or-less.xml")
        );
        assert_eq!(
            resolve_output(base, Path::new("/tmp/out.xml")),
            PathBuf::from("/tmp/out.xml")
        );
    }
}
