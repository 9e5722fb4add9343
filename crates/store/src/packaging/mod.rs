//! Menu design packages (.mdp)
//!
//! A package is a ZIP archive containing:
//! - manifest.txt: `key: value` lines naming every entry below
//! - applications/<name>.xml: the design document
//! - pdf/: PDF manuals referenced by the design
//! - graphics/: images used by graphic menus
//! - source/, winbin/: optional source and binaries archives

mod manifest;
mod package;

pub use manifest::{read_manifest, Manifest};
pub use package::{PackOutcome, Package};

/// Entry names within the package
pub const MANIFEST_FILE: &str = "manifest.txt";
pub const APPLICATIONS_DIR: &str = "applications/";
pub const PDF_DIR: &str = "pdf/";
pub const GRAPHICS_DIR: &str = "graphics/";
pub const SOURCE_DIR: &str = "source/";
pub const BINARIES_DIR: &str = "winbin/";

/// Package extension
pub const PACKAGE_EXTENSION: &str = "mdp";

/// Make `name` usable as a single archive path component
pub fn sanitize_file_name(name: &str) -> String {
    let cleaned: String = name
        .trim()
        .chars()
        .map(|c| {
            if c.is_alphanumeric() || matches!(c, '-' | '_' | '.' | ' ') {
                c
            } else {
                '_'
            }
        })
        .collect();
    let cleaned = cleaned.trim_matches(|c| c == '.' || c == ' ');
    if cleaned.is_empty() {
        "design".to_string()
    } else {
        cleaned.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sanitize_file_name() {
        assert_eq!(sanitize_file_name("Stats Tools"), "Stats Tools");
        assert_eq!(sanitize_file_name("a/b:c"), "a_b_c");
        assert_eq!(sanitize_file_name(".."), "design");
        assert_eq!(sanitize_file_name("  "), "design");
    }
}
