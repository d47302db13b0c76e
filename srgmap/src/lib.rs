//! Jar symbol renamer.
//!
//! Rewrites intermediate ("searge") field and method names inside the class
//! files of a packaged jar to their human-readable spellings, driven by the
//! CSV mapping resources of an MCP data archive, and re-emits the jar.
//! Optionally strips signature artifacts (`.SF`/`.RSA` entries and manifest
//! `SHA-256-Digest` attributes), since renamed classes no longer match them.
//!
//! - `mapping`: the old-name -> new-name lookup and CSV dataset loading
//! - `classfile`: constant-pool parsing and in-place name substitution
//! - `manifest`: signature-digest scrubbing for `MANIFEST.MF`
//! - `jar`: the entry-by-entry archive transcoder
//! - `types`: progress events for callers that want them

pub mod classfile;
pub mod error;
pub mod jar;
pub mod manifest;
pub mod mapping;
pub mod types;

pub use classfile::remap_class;
pub use error::{ClassError, Error};
pub use jar::transcode;
pub use manifest::strip_manifest;
pub use mapping::{load_symbol_map, MappingRow, SymbolMap};
pub use types::{RenameEvent, Stage, StageProgress};
