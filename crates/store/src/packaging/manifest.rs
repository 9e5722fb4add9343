//! Package manifest
//!
//! One `key: value` pair per line. Lines starting with `#` are comments; the
//! creation time is kept in a `# created <rfc3339>` comment. Keys are matched
//! by case-insensitive prefix.

use super::MANIFEST_FILE;
use crate::error::{IoContext, Result, StoreError};
use chrono::{DateTime, SecondsFormat, Utc};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use tracing::warn;
use uuid::Uuid;
use zip::ZipArchive;

const CREATED_PREFIX: &str = "# created ";

#[derive(Debug, Clone, Default, PartialEq)]
pub struct Manifest {
    /// Design name
    pub name: Option<String>,
    /// Archive path of the design document
    pub app: Option<String>,
    pub id: Option<Uuid>,
    pub created: Option<DateTime<Utc>>,
    pub pdfs: Vec<String>,
    pub graphics: Vec<String>,
    pub source: Option<String>,
    pub binaries: Option<String>,
}

impl Manifest {
    pub fn to_text(&self) -> String {
        let mut text = String::from("# menu design package\n");
        if let Some(created) = self.created {
            text.push_str(CREATED_PREFIX);
            text.push_str(&created.to_rfc3339_opts(SecondsFormat::Secs, true));
            text.push('\n');
        }

        let mut line = |key: &str, value: &str| {
            if value.contains(':') || value.contains('\n') {
                warn!(key, value, "value cannot be written to the manifest, skipping");
            } else {
                text.push_str(&format!("{}: {}\n", key, value));
            }
        };
        if let Some(name) = &self.name {
            line("name", name);
        }
        if let Some(app) = &self.app {
            line("app", app);
        }
        if let Some(id) = &self.id {
            line("id", &id.to_string());
        }
        for pdf in &self.pdfs {
            line("pdf", pdf);
        }
        for graphic in &self.graphics {
            line("graphic", graphic);
        }
        if let Some(source) = &self.source {
            line("src", source);
        }
        if let Some(binaries) = &self.binaries {
            line("winbin", binaries);
        }
        text
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut manifest = Manifest::default();

        for (index, raw) in text.lines().enumerate() {
            let line = raw.trim();
            if line.is_empty() {
                continue;
            }
            if line.starts_with('#') {
                if let Some(stamp) = line.strip_prefix(CREATED_PREFIX) {
                    manifest.created = DateTime::parse_from_rfc3339(stamp.trim())
                        .ok()
                        .map(|t| t.with_timezone(&Utc));
                }
                continue;
            }

            let parts: Vec<&str> = line.split(':').collect();
            if parts.len() != 2 {
                return Err(malformed(index + 1, format!("expected 'key: value', got '{}'", line)));
            }
            let key = parts[0].trim().to_ascii_lowercase();
            let value = parts[1].trim().to_string();

            if key.starts_with("app") {
                manifest.app = Some(value);
            } else if key.starts_with("name") {
                manifest.name = Some(value);
            } else if key.starts_with("id") {
                let id = Uuid::parse_str(&value)
                    .map_err(|e| malformed(index + 1, format!("invalid id '{}': {}", value, e)))?;
                manifest.id = Some(id);
            } else if key.starts_with("pdf") {
                manifest.pdfs.push(value);
            } else if key.starts_with("graphic") {
                manifest.graphics.push(value);
            } else if key.starts_with("src") {
                manifest.source = Some(value);
            } else if key.starts_with("winbin") {
                manifest.binaries = Some(value);
            } else {
                warn!(line = index + 1, key = %key, "unknown manifest key");
            }
        }
        Ok(manifest)
    }

    /// Every archive entry the manifest references
    pub fn entries(&self) -> impl Iterator<Item = &str> {
        self.app
            .iter()
            .chain(self.pdfs.iter())
            .chain(self.graphics.iter())
            .chain(self.source.iter())
            .chain(self.binaries.iter())
            .map(String::as_str)
    }
}

pub(crate) fn malformed(line: usize, message: impl Into<String>) -> StoreError {
    StoreError::MalformedManifest {
        line,
        message: message.into(),
    }
}

/// Read only the manifest from a package
pub fn read_manifest(path: impl AsRef<Path>) -> Result<Manifest> {
    let path = path.as_ref();
    let file = File::open(path).io_context(|| format!("opening {}", path.display()))?;
    let mut archive =
        ZipArchive::new(file).io_context(|| format!("reading archive {}", path.display()))?;

    let mut entry = archive.by_name(MANIFEST_FILE).map_err(|e| match e {
        zip::result::ZipError::FileNotFound => malformed(0, format!("{} not found", MANIFEST_FILE)),
        other => StoreError::io(
            format!("reading {}", MANIFEST_FILE),
            std::io::Error::other(other),
        ),
    })?;
    let mut contents = String::new();
    entry
        .read_to_string(&mut contents)
        .io_context(|| format!("reading {}", MANIFEST_FILE))?;
    Manifest::parse(&contents)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> Manifest {
        Manifest {
            name: Some("App".into()),
            app: Some("applications/App.xml".into()),
            id: Some(Uuid::new_v4()),
            created: DateTime::parse_from_rfc3339("2024-05-01T12:30:00Z")
                .ok()
                .map(|t| t.with_timezone(&Utc)),
            pdfs: vec!["pdf/guide.pdf".into()],
            graphics: vec!["graphics/hist.png".into(), "graphics/box.png".into()],
            source: None,
            binaries: Some("winbin/bin.zip".into()),
        }
    }

    #[test]
    fn test_text_parses_back() {
        let manifest = sample();
        let text = manifest.to_text();
        assert!(text.contains("# created 2024-05-01T12:30:00Z"));
        assert_eq!(Manifest::parse(&text).unwrap(), manifest);
    }

    #[test]
    fn test_keys_match_by_prefix_ignoring_case() {
        let manifest = Manifest::parse(
            "\n# comment\nNAME: App\nApplication: applications/App.xml\nPDFFile: pdf/a.pdf\nGraphics: graphics/a.png\nSource: source/s.zip\n",
        )
        .unwrap();
        assert_eq!(manifest.name.as_deref(), Some("App"));
        assert_eq!(manifest.app.as_deref(), Some("applications/App.xml"));
        assert_eq!(manifest.pdfs, ["pdf/a.pdf"]);
        assert_eq!(manifest.graphics, ["graphics/a.png"]);
        // "source" does not start with "src"
        assert_eq!(manifest.source, None);
    }

    #[test]
    fn test_line_without_single_colon_fails() {
        for text in ["name App", "name: a: b", "pdf: pdf/a.pdf\napp:x:y"] {
            assert!(
                matches!(Manifest::parse(text), Err(StoreError::MalformedManifest { .. })),
                "{text}"
            );
        }
        match Manifest::parse("name: App\n\nbroken") {
            Err(StoreError::MalformedManifest { line, .. }) => assert_eq!(line, 3),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_id_fails() {
        assert!(Manifest::parse("id: not-a-uuid").is_err());
    }

    #[test]
    fn test_values_with_colons_are_skipped() {
        let manifest = Manifest {
            name: Some("a:b".into()),
            ..Default::default()
        };
        let text = manifest.to_text();
        assert!(!text.contains("name"));
        assert_eq!(Manifest::parse(&text).unwrap().name, None);
    }
}
