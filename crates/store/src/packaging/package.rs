//! Packing a design with its resources, and unpacking it again

use super::manifest::{malformed, Manifest};
use super::{
    sanitize_file_name, APPLICATIONS_DIR, BINARIES_DIR, GRAPHICS_DIR, MANIFEST_FILE, PDF_DIR,
    SOURCE_DIR,
};
use crate::error::{IoContext, Result};
use crate::file_io::{load_design, parent_dir, persist_or_copy};
use crate::settings::{resolve_in, PackagerSettings, ResourceLocator, DEFAULT_COMPRESSION_LEVEL};
use crate::xml::encode_design;
use chrono::{DateTime, Utc};
use menu_model::{file_name_of, MenuDesign};
use std::collections::{HashMap, HashSet};
use std::fs::File;
use std::io::{Seek, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::{NamedTempFile, TempDir};
use tracing::{debug, info, warn};
use uuid::Uuid;
use zip::read::ZipArchive;
use zip::write::SimpleFileOptions;
use zip::{CompressionMethod, ZipWriter};

/// What a call to [`Package::pack`] put into the archive
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PackOutcome {
    /// Archive entries written, in manifest order
    pub entries: Vec<String>,
    /// Resource names from the design that could not be found on disk
    pub missing: Vec<String>,
}

enum EntrySource {
    File(PathBuf),
    Bytes(Vec<u8>),
}

struct Entry {
    name: String,
    source: EntrySource,
}

/// A design together with the resource files that travel with it
#[derive(Debug)]
pub struct Package {
    design: MenuDesign,
    name: String,
    id: Uuid,
    created: Option<DateTime<Utc>>,
    pdf_files: Vec<PathBuf>,
    graphic_files: Vec<PathBuf>,
    // Design reference -> file on disk
    pdf_refs: HashMap<String, PathBuf>,
    graphic_refs: HashMap<String, PathBuf>,
    source_file: Option<PathBuf>,
    binaries_file: Option<PathBuf>,
    working_dir: Option<PathBuf>,
    compression_level: i64,
    // Keeps the extraction directory alive for unpacked packages
    _scratch: Option<TempDir>,
}

impl Package {
    /// Wrap a design in a new package with a fresh id
    pub fn new(design: MenuDesign) -> Self {
        Self {
            name: design.name().to_string(),
            design,
            id: Uuid::new_v4(),
            created: None,
            pdf_files: Vec::new(),
            graphic_files: Vec::new(),
            pdf_refs: HashMap::new(),
            graphic_refs: HashMap::new(),
            source_file: None,
            binaries_file: None,
            working_dir: None,
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            _scratch: None,
        }
    }

    pub fn with_compression_level(mut self, level: i64) -> Self {
        self.compression_level = level.clamp(0, 9);
        self
    }

    pub fn design(&self) -> &MenuDesign {
        &self.design
    }

    pub fn design_mut(&mut self) -> &mut MenuDesign {
        &mut self.design
    }

    pub fn into_design(self) -> MenuDesign {
        self.design
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created(&self) -> Option<DateTime<Utc>> {
        self.created
    }

    /// PDF files on disk: the packed sources after `pack`, extracted files after `unpack`
    pub fn pdf_files(&self) -> &[PathBuf] {
        &self.pdf_files
    }

    pub fn graphic_files(&self) -> &[PathBuf] {
        &self.graphic_files
    }

    pub fn source_file(&self) -> Option<&Path> {
        self.source_file.as_deref()
    }

    pub fn binaries_file(&self) -> Option<&Path> {
        self.binaries_file.as_deref()
    }

    /// Extraction directory of an unpacked package
    pub fn working_dir(&self) -> Option<&Path> {
        self.working_dir.as_deref()
    }

    /// Pack using the folders and compression level from `settings`
    pub fn pack_with_settings(
        &mut self,
        target: impl AsRef<Path>,
        settings: &PackagerSettings,
    ) -> Result<PackOutcome> {
        self.compression_level = settings.compression_level.clamp(0, 9);
        self.pack(target, settings)
    }

    /// Write the package archive to `target`.
    ///
    /// The package takes the design's current name. Resources sharing a
    /// file name get numbered entries (`x.pdf`, `x-1.pdf`). Resources that cannot be resolved are left out with a warning and
    /// reported in [`PackOutcome::missing`]. The archive is written to a
    /// temporary file and moved into place once complete.
    pub fn pack(
        &mut self,
        target: impl AsRef<Path>,
        locator: &impl ResourceLocator,
    ) -> Result<PackOutcome> {
        let target = target.as_ref();
        let mut outcome = PackOutcome::default();
        let mut entries = Vec::new();
        self.name = self.design.name().to_string();

        let created = Utc::now();
        let mut manifest = Manifest {
            name: Some(self.name.clone()),
            id: Some(self.id),
            created: Some(created),
            ..Default::default()
        };

        let mut pdf_files = Vec::new();
        let mut pdf_refs = HashMap::new();
        for (name, entry) in entry_names(PDF_DIR, &self.design.pdf_names()) {
            match locator.resolve_pdf(&name) {
                Some(path) => {
                    entries.push(file_entry(&entry, &path));
                    manifest.pdfs.push(entry);
                    pdf_refs.insert(name, path.clone());
                    pdf_files.push(path);
                }
                None => {
                    warn!(pdf = %name, "PDF not found, leaving it out of the package");
                    outcome.missing.push(name);
                }
            }
        }

        let mut graphic_files = Vec::new();
        let mut graphic_refs = HashMap::new();
        for (name, entry) in entry_names(GRAPHICS_DIR, &self.design.graphic_file_names()) {
            match locator.resolve_graphic(&name) {
                Some(path) => {
                    entries.push(file_entry(&entry, &path));
                    manifest.graphics.push(entry);
                    graphic_refs.insert(name, path.clone());
                    graphic_files.push(path);
                }
                None => {
                    warn!(graphic = %name, "image not found, leaving it out of the package");
                    outcome.missing.push(name);
                }
            }
        }

        let mut source_file = None;
        if let Some(source) = self.design.source_archive() {
            match resolve_in(None, source) {
                Some(path) => {
                    let entry = format!("{}{}", SOURCE_DIR, sanitize_file_name(file_name_of(source)));
                    entries.push(file_entry(&entry, &path));
                    manifest.source = Some(entry);
                    source_file = Some(path);
                }
                None => {
                    warn!(source = %source, "source archive not found, leaving it out of the package");
                    outcome.missing.push(source.to_string());
                }
            }
        }

        let mut binaries_file = None;
        if let Some(binaries) = self.design.binaries_archive() {
            match resolve_in(None, binaries) {
                Some(path) => {
                    let entry =
                        format!("{}{}", BINARIES_DIR, sanitize_file_name(file_name_of(binaries)));
                    entries.push(file_entry(&entry, &path));
                    manifest.binaries = Some(entry);
                    binaries_file = Some(path);
                }
                None => {
                    warn!(binaries = %binaries, "binaries archive not found, leaving it out of the package");
                    outcome.missing.push(binaries.to_string());
                }
            }
        }

        let app = format!("{}{}.xml", APPLICATIONS_DIR, sanitize_file_name(&self.name));
        entries.push(Entry {
            name: app.clone(),
            source: EntrySource::Bytes(encode_design(&self.design).into_bytes()),
        });
        manifest.app = Some(app);

        entries.push(Entry {
            name: MANIFEST_FILE.to_string(),
            source: EntrySource::Bytes(manifest.to_text().into_bytes()),
        });

        let mut tmp = NamedTempFile::new_in(parent_dir(target))
            .io_context(|| format!("creating temporary package next to {}", target.display()))?;
        write_entries(tmp.as_file_mut(), &entries, entry_options(self.compression_level))
            .io_context(|| format!("writing package {}", target.display()))?;
        persist_or_copy(tmp, target)?;

        self.created = Some(created);
        self.pdf_files = pdf_files;
        self.graphic_files = graphic_files;
        self.pdf_refs = pdf_refs;
        self.graphic_refs = graphic_refs;
        self.source_file = source_file;
        self.binaries_file = binaries_file;

        outcome.entries = entries.into_iter().map(|e| e.name).collect();
        info!(
            package = %target.display(),
            entries = outcome.entries.len(),
            missing = outcome.missing.len(),
            "packed design"
        );
        Ok(outcome)
    }

    /// Extract a package into a fresh temporary directory and load its design.
    ///
    /// Fails without returning partial state when the manifest is malformed,
    /// lacks an id or design entry, or names files the archive does not hold.
    pub fn unpack(path: impl AsRef<Path>) -> Result<Package> {
        let path = path.as_ref();
        let file = File::open(path).io_context(|| format!("opening {}", path.display()))?;
        let mut archive =
            ZipArchive::new(file).io_context(|| format!("reading archive {}", path.display()))?;

        let scratch = TempDir::new().io_context(|| "creating extraction directory")?;
        archive
            .extract(scratch.path())
            .io_context(|| format!("extracting {}", path.display()))?;
        debug!(package = %path.display(), files = archive.len(), "extracted package");

        let manifest_path = scratch.path().join(MANIFEST_FILE);
        if !manifest_path.is_file() {
            return Err(malformed(0, format!("{} not found", MANIFEST_FILE)));
        }
        let text = std::fs::read_to_string(&manifest_path)
            .io_context(|| format!("reading {}", MANIFEST_FILE))?;
        let manifest = Manifest::parse(&text)?;

        let root = scratch.path();
        for entry in manifest.entries() {
            locate_entry(root, entry)?;
        }

        let id = manifest
            .id
            .ok_or_else(|| malformed(0, "package id is missing"))?;
        let app = manifest
            .app
            .as_deref()
            .ok_or_else(|| malformed(0, "design entry is missing"))?;
        let design = load_design(locate_entry(root, app)?)?;

        let name = manifest
            .name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| design.name())
            .to_string();

        let locate_all = |list: &[String]| -> Result<Vec<PathBuf>> {
            list.iter().map(|e| locate_entry(root, e)).collect()
        };
        let pdf_files = locate_all(&manifest.pdfs)?;
        let graphic_files = locate_all(&manifest.graphics)?;
        let locate_refs = |dir: &str, names: &[String], list: &[String]| {
            entry_names(dir, names)
                .into_iter()
                .filter(|(_, entry)| list.contains(entry))
                .map(|(name, entry)| locate_entry(root, &entry).map(|path| (name, path)))
                .collect::<Result<HashMap<_, _>>>()
        };
        let pdf_refs = locate_refs(PDF_DIR, &design.pdf_names(), &manifest.pdfs)?;
        let graphic_refs =
            locate_refs(GRAPHICS_DIR, &design.graphic_file_names(), &manifest.graphics)?;
        let source_file = manifest.source.as_deref().map(|e| locate_entry(root, e)).transpose()?;
        let binaries_file = manifest
            .binaries
            .as_deref()
            .map(|e| locate_entry(root, e))
            .transpose()?;

        info!(package = %path.display(), name = %name, "unpacked design");
        Ok(Package {
            design,
            name,
            id,
            created: manifest.created,
            pdf_files,
            graphic_files,
            pdf_refs,
            graphic_refs,
            source_file,
            binaries_file,
            working_dir: Some(root.to_path_buf()),
            compression_level: DEFAULT_COMPRESSION_LEVEL,
            _scratch: Some(scratch),
        })
    }

    /// File carrying the PDF a design refers to as `name`
    pub fn locate_pdf(&self, name: &str) -> Option<&Path> {
        self.pdf_refs
            .get(name)
            .map(PathBuf::as_path)
            .or_else(|| find_by_file_name(&self.pdf_files, name))
    }

    /// File carrying the image a graphic entry refers to as `name`
    pub fn locate_graphic(&self, name: &str) -> Option<&Path> {
        self.graphic_refs
            .get(name)
            .map(PathBuf::as_path)
            .or_else(|| find_by_file_name(&self.graphic_files, name))
    }
}

fn file_entry(name: &str, path: &Path) -> Entry {
    Entry {
        name: name.to_string(),
        source: EntrySource::File(path.to_path_buf()),
    }
}

/// Pair each resource reference with its archive entry under `dir`.
///
/// File names are numbered in reference order when they clash, ignoring
/// case, so packing and unpacking the same design agree on every entry.
fn entry_names(dir: &str, names: &[String]) -> Vec<(String, String)> {
    let mut used = HashSet::new();
    names
        .iter()
        .map(|name| {
            let file = sanitize_file_name(file_name_of(name));
            let (stem, ext) = match file.rfind('.') {
                Some(dot) if dot > 0 => file.split_at(dot),
                _ => (file.as_str(), ""),
            };
            let mut candidate = file.clone();
            let mut n = 1;
            while !used.insert(candidate.to_lowercase()) {
                candidate = format!("{stem}-{n}{ext}");
                n += 1;
            }
            (name.clone(), format!("{dir}{candidate}"))
        })
        .collect()
}

/// Level 0 stores entries; Deflate only accepts levels 1-9
fn entry_options(level: i64) -> SimpleFileOptions {
    match level {
        0 => SimpleFileOptions::default().compression_method(CompressionMethod::Stored),
        level => SimpleFileOptions::default()
            .compression_method(CompressionMethod::Deflated)
            .compression_level(Some(level)),
    }
}

fn write_entries<W: Write + Seek>(
    writer: W,
    entries: &[Entry],
    options: SimpleFileOptions,
) -> zip::result::ZipResult<W> {
    let mut zip = ZipWriter::new(writer);
    for entry in entries {
        zip.start_file(entry.name.as_str(), options)?;
        match &entry.source {
            EntrySource::File(path) => {
                let mut file = File::open(path)?;
                std::io::copy(&mut file, &mut zip)?;
            }
            EntrySource::Bytes(bytes) => zip.write_all(bytes)?,
        }
        debug!(entry = %entry.name, "wrote archive entry");
    }
    zip.finish()
}

/// Resolve a manifest entry inside the extraction directory
fn locate_entry(root: &Path, entry: &str) -> Result<PathBuf> {
    let relative = Path::new(entry);
    let safe = !entry.is_empty()
        && relative
            .components()
            .all(|c| matches!(c, Component::Normal(_) | Component::CurDir));
    if !safe {
        return Err(malformed(0, format!("entry '{}' escapes the package", entry)));
    }
    let path = root.join(relative);
    if !path.is_file() {
        return Err(malformed(0, format!("entry '{}' is not in the package", entry)));
    }
    Ok(path)
}

fn find_by_file_name<'a>(files: &'a [PathBuf], name: &str) -> Option<&'a Path> {
    let wanted = sanitize_file_name(file_name_of(name));
    files
        .iter()
        .find(|f| f.file_name().and_then(|n| n.to_str()) == Some(wanted.as_str()))
        .map(PathBuf::as_path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StoreError;

    struct Folders {
        pdf: PathBuf,
        graphics: PathBuf,
    }

    impl ResourceLocator for Folders {
        fn pdf_folder(&self) -> Option<&Path> {
            Some(&self.pdf)
        }

        fn graphics_folder(&self) -> Option<&Path> {
            Some(&self.graphics)
        }
    }

    fn fixture(dir: &Path) -> Folders {
        let pdf = dir.join("docs");
        let graphics = dir.join("img");
        std::fs::create_dir_all(&pdf).unwrap();
        std::fs::create_dir_all(&graphics).unwrap();
        std::fs::write(pdf.join("guide.pdf"), b"%PDF-1.4").unwrap();
        std::fs::write(graphics.join("hist.png"), b"png").unwrap();
        Folders { pdf, graphics }
    }

    fn design() -> MenuDesign {
        let mut design = MenuDesign::new("App").unwrap();
        let root = design.root_id();
        design.add_pdf_file(root, "guide.pdf").unwrap();
        let plots = design.add_graphic_menu(root, "Plots").unwrap();
        let entry = design.add_graphic_entry(plots, "hist").unwrap();
        design.graphic_entry_mut(entry).unwrap().image_path = "hist.png".into();
        design
    }

    #[test]
    fn test_pack_writes_expected_entries() {
        let dir = TempDir::new().unwrap();
        let folders = fixture(dir.path());
        let target = dir.path().join("app.mdp");

        let mut package = Package::new(design());
        let outcome = package.pack(&target, &folders).unwrap();
        assert_eq!(
            outcome.entries,
            [
                "pdf/guide.pdf",
                "graphics/hist.png",
                "applications/App.xml",
                "manifest.txt"
            ]
        );
        assert!(outcome.missing.is_empty());
        assert_eq!(package.pdf_files(), [folders.pdf.join("guide.pdf")]);
        assert!(package.created().is_some());

        let manifest = crate::packaging::read_manifest(&target).unwrap();
        assert_eq!(manifest.id, Some(package.id()));
        assert_eq!(manifest.app.as_deref(), Some("applications/App.xml"));
    }

    #[test]
    fn test_unpack_locates_resources() {
        let dir = TempDir::new().unwrap();
        let folders = fixture(dir.path());
        let target = dir.path().join("app.mdp");
        let mut package = Package::new(design());
        package.pack(&target, &folders).unwrap();

        let unpacked = Package::unpack(&target).unwrap();
        assert_eq!(unpacked.id(), package.id());
        assert_eq!(unpacked.name(), "App");
        let pdf = unpacked.locate_pdf("some/dir/guide.pdf").unwrap();
        assert_eq!(std::fs::read(pdf).unwrap(), b"%PDF-1.4");
        assert!(unpacked.locate_graphic("hist.png").is_some());
        assert!(unpacked.locate_graphic("missing.png").is_none());
        assert!(pdf.starts_with(unpacked.working_dir().unwrap()));
    }

    #[test]
    fn test_missing_resources_are_dropped() {
        let dir = TempDir::new().unwrap();
        let folders = fixture(dir.path());
        let mut d = design();
        let root = d.root_id();
        d.add_pdf_file(root, "nowhere.pdf").unwrap();
        d.set_source_archive(Some("/definitely/not/here.zip".into()));

        let mut package = Package::new(d);
        let outcome = package.pack(dir.path().join("app.mdp"), &folders).unwrap();
        assert_eq!(outcome.missing, ["nowhere.pdf", "/definitely/not/here.zip"]);
        assert!(!outcome.entries.iter().any(|e| e.contains("nowhere")));
        assert_eq!(package.source_file(), None);
    }

    #[test]
    fn test_pack_uses_current_design_name() {
        let dir = TempDir::new().unwrap();
        let folders = fixture(dir.path());
        let target = dir.path().join("app.mdp");

        let mut package = Package::new(MenuDesign::new("Old").unwrap());
        package.design_mut().set_name("New").unwrap();
        let outcome = package.pack(&target, &folders).unwrap();
        assert_eq!(outcome.entries, ["applications/New.xml", "manifest.txt"]);
        assert_eq!(package.name(), "New");

        let unpacked = Package::unpack(&target).unwrap();
        assert_eq!(unpacked.name(), "New");
        assert_eq!(unpacked.design().name(), "New");
    }

    #[test]
    fn test_pack_uncompressed() {
        let dir = TempDir::new().unwrap();
        let folders = fixture(dir.path());
        let target = dir.path().join("app.mdp");

        let mut package = Package::new(design()).with_compression_level(0);
        package.pack(&target, &folders).unwrap();

        let unpacked = Package::unpack(&target).unwrap();
        let pdf = unpacked.locate_pdf("guide.pdf").unwrap();
        assert_eq!(std::fs::read(pdf).unwrap(), b"%PDF-1.4");
    }

    #[test]
    fn test_same_file_names_get_numbered_entries() {
        let dir = TempDir::new().unwrap();
        let folders = fixture(dir.path());
        let a = dir.path().join("a").join("x.pdf");
        let b = dir.path().join("b").join("x.pdf");
        for (path, body) in [(&a, "A"), (&b, "B")] {
            std::fs::create_dir_all(path.parent().unwrap()).unwrap();
            std::fs::write(path, body).unwrap();
        }
        let (a, b) = (a.to_str().unwrap(), b.to_str().unwrap());

        let mut d = MenuDesign::new("App").unwrap();
        let root = d.root_id();
        d.add_pdf_file(root, a).unwrap();
        d.add_pdf_file(root, b).unwrap();

        let target = dir.path().join("app.mdp");
        let mut package = Package::new(d);
        let outcome = package.pack(&target, &folders).unwrap();
        assert_eq!(
            outcome.entries,
            ["pdf/x.pdf", "pdf/x-1.pdf", "applications/App.xml", "manifest.txt"]
        );
        assert!(outcome.missing.is_empty());

        let unpacked = Package::unpack(&target).unwrap();
        assert_eq!(std::fs::read(unpacked.locate_pdf(a).unwrap()).unwrap(), b"A");
        assert_eq!(std::fs::read(unpacked.locate_pdf(b).unwrap()).unwrap(), b"B");
    }

    #[test]
    fn test_entry_names_ignore_case_when_numbering() {
        let names = ["one/Hist.png", "two/hist.png", "three/hist.png", "README"]
            .map(String::from);
        let entries: Vec<_> = entry_names(GRAPHICS_DIR, &names)
            .into_iter()
            .map(|(_, entry)| entry)
            .collect();
        assert_eq!(
            entries,
            [
                "graphics/Hist.png",
                "graphics/hist-1.png",
                "graphics/hist-2.png",
                "graphics/README"
            ]
        );
    }

    #[test]
    fn test_unpack_rejects_manifest_pointing_outside() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("evil.mdp");
        let manifest = format!("id: {}\napp: ../App.xml\n", Uuid::new_v4());
        let entries = [Entry {
            name: MANIFEST_FILE.into(),
            source: EntrySource::Bytes(manifest.into_bytes()),
        }];
        write_entries(File::create(&target).unwrap(), &entries, SimpleFileOptions::default())
            .unwrap();

        assert!(matches!(
            Package::unpack(&target),
            Err(StoreError::MalformedManifest { .. })
        ));
    }

    #[test]
    fn test_unpack_requires_manifest() {
        let dir = TempDir::new().unwrap();
        let target = dir.path().join("empty.mdp");
        write_entries(File::create(&target).unwrap(), &[], SimpleFileOptions::default()).unwrap();
        assert!(matches!(
            Package::unpack(&target),
            Err(StoreError::MalformedManifest { line: 0, .. })
        ));
    }
}
