//! Packager settings and resource lookup
//!
//! Settings live in `settings.json` inside the application data directory.

use crate::error::{IoContext, Result};
use crate::file_io::write_atomic;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Default zip deflate level
pub const DEFAULT_COMPRESSION_LEVEL: i64 = 6;

/// Settings used when packing designs
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct PackagerSettings {
    /// Folder searched for PDF manuals given by bare name
    pub pdf_folder: Option<PathBuf>,
    /// Folder searched for menu images given by bare name
    pub graphics_folder: Option<PathBuf>,
    /// Deflate level for package entries (1-9); 0 stores them uncompressed
    pub compression_level: i64,
}

impl Default for PackagerSettings {
    fn default() -> Self {
        Self {
            pdf_folder: None,
            graphics_folder: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
        }
    }
}

/// Maps resource names used in a design to files on disk
pub trait ResourceLocator {
    fn pdf_folder(&self) -> Option<&Path>;

    fn graphics_folder(&self) -> Option<&Path>;

    fn resolve_pdf(&self, name: &str) -> Option<PathBuf> {
        resolve_in(self.pdf_folder(), name)
    }

    fn resolve_graphic(&self, name: &str) -> Option<PathBuf> {
        resolve_in(self.graphics_folder(), name)
    }
}

impl ResourceLocator for PackagerSettings {
    fn pdf_folder(&self) -> Option<&Path> {
        self.pdf_folder.as_deref()
    }

    fn graphics_folder(&self) -> Option<&Path> {
        self.graphics_folder.as_deref()
    }
}

/// Existing file for `name`: tried relative to `folder` first, then as given
pub fn resolve_in(folder: Option<&Path>, name: &str) -> Option<PathBuf> {
    let name = name.trim();
    if name.is_empty() {
        return None;
    }
    let given = PathBuf::from(name);
    if let Some(folder) = folder.filter(|_| given.is_relative()) {
        let candidate = folder.join(&given);
        if candidate.is_file() {
            return Some(candidate);
        }
    }
    given.is_file().then_some(given)
}

/// Settings manager for loading, saving, and updating packager settings
pub struct SettingsManager {
    settings_path: PathBuf,
    current: PackagerSettings,
}

impl SettingsManager {
    pub fn new(app_data_dir: PathBuf) -> Self {
        Self {
            settings_path: app_data_dir.join("settings.json"),
            current: PackagerSettings::default(),
        }
    }

    pub fn settings_path(&self) -> &Path {
        &self.settings_path
    }

    /// Load settings from disk, or defaults if the file is absent or unreadable
    pub fn load(&mut self) -> Result<&PackagerSettings> {
        self.current = if self.settings_path.exists() {
            let content = std::fs::read_to_string(&self.settings_path)
                .io_context(|| format!("reading {}", self.settings_path.display()))?;
            match serde_json::from_str::<PackagerSettings>(&content) {
                Ok(settings) => settings,
                Err(e) => {
                    tracing::warn!("Failed to parse settings file, using defaults: {}", e);
                    PackagerSettings::default()
                }
            }
        } else {
            PackagerSettings::default()
        };
        Ok(&self.current)
    }

    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.settings_path.parent() {
            std::fs::create_dir_all(parent)
                .io_context(|| format!("creating {}", parent.display()))?;
        }
        let content = serde_json::to_string_pretty(&self.current)?;
        write_atomic(&self.settings_path, content.as_bytes())
    }

    pub fn get(&self) -> &PackagerSettings {
        &self.current
    }

    /// Replace the settings and save them
    pub fn update(&mut self, settings: PackagerSettings) -> Result<()> {
        self.current = settings;
        self.save()
    }

    pub fn reset(&mut self) -> Result<&PackagerSettings> {
        self.current = PackagerSettings::default();
        self.save()?;
        Ok(&self.current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_settings() {
        let settings = PackagerSettings::default();
        assert_eq!(settings.pdf_folder, None);
        assert_eq!(settings.compression_level, 6);
        assert_eq!(settings.graphics_folder, None);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let settings: PackagerSettings =
            serde_json::from_str(r#"{"pdf_folder": "/opt/docs"}"#).unwrap();
        assert_eq!(settings.pdf_folder, Some(PathBuf::from("/opt/docs")));
        assert_eq!(settings.compression_level, DEFAULT_COMPRESSION_LEVEL);
    }

    #[test]
    fn test_settings_manager_load_save() {
        let temp_dir = TempDir::new().unwrap();
        let mut manager = SettingsManager::new(temp_dir.path().to_path_buf());
        assert_eq!(manager.load().unwrap(), &PackagerSettings::default());

        let mut settings = PackagerSettings::default();
        settings.pdf_folder = Some(temp_dir.path().join("docs"));
        manager.update(settings.clone()).unwrap();

        let mut reloaded = SettingsManager::new(temp_dir.path().to_path_buf());
        assert_eq!(reloaded.load().unwrap(), &settings);

        assert_eq!(reloaded.reset().unwrap(), &PackagerSettings::default());
    }

    #[test]
    fn test_unparseable_settings_fall_back() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("settings.json"), "{not json").unwrap();
        let mut manager = SettingsManager::new(temp_dir.path().to_path_buf());
        assert_eq!(manager.load().unwrap(), &PackagerSettings::default());
    }

    #[test]
    fn test_resolve_prefers_folder() {
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join("guide.pdf"), b"%PDF").unwrap();

        let settings = PackagerSettings {
            pdf_folder: Some(temp_dir.path().to_path_buf()),
            ..Default::default()
        };
        assert_eq!(
            settings.resolve_pdf("guide.pdf"),
            Some(temp_dir.path().join("guide.pdf"))
        );
        assert_eq!(settings.resolve_pdf("other.pdf"), None);
        assert_eq!(settings.resolve_graphic("guide.pdf"), None);

        let absolute = temp_dir.path().join("guide.pdf");
        let absolute = absolute.to_str().unwrap();
        assert_eq!(
            PackagerSettings::default().resolve_pdf(absolute),
            Some(PathBuf::from(absolute))
        );
    }
}
