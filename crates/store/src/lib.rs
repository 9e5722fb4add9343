//! Store - Persistence and packaging for menu designs
//!
//! This crate handles the design XML codec, atomic file saves, packager
//! settings, and the archive format that bundles a design with its PDF
//! manuals, images and optional source/binaries archives.

mod error;
mod file_io;
mod settings;
pub mod packaging;
pub mod xml;

pub use error::*;
pub use file_io::*;
pub use settings::*;

pub use packaging::{read_manifest, Manifest, PackOutcome, Package};
pub use xml::{classify_menu, decode_design, encode_design, MenuSpec, XmlElement};
