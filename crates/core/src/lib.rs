//! fontvault-core — font library management for a PDF-generation
//! subsystem.
//!
//! The library lives in one of two modes: **core** serves the read-only
//! vendor-shipped font set, **customized** serves a writable directory the
//! vendor fonts were copied into. On top of that sit the ingestion pipeline
//! for TrueType/OpenType uploads, the zipped-bundle import with per-file
//! outcomes, the catalog scanner, and the export packager. The directory
//! listing is the catalog; there is no index or database.
//!
//! Callers are expected to have validated parameters and checked
//! authorization before invoking any operation here.

pub mod bundle;
pub mod catalog;
pub mod config;
pub mod convert;
pub mod descriptor;
pub mod error;
pub mod events;
pub mod export;
pub mod ingest;
pub mod library;
pub mod naming;

mod lock;

pub use bundle::BundleFileResult;
pub use catalog::{FontRecord, natural_cmp};
pub use config::{DEFAULT_IDENTIFIER, DESCRIPTOR_EXT, LibraryConfig, PROTECTED_FAMILIES};
pub use convert::{ConversionRequest, DescriptorFlags, FontConverter, FontType, TtfConverter};
pub use descriptor::Descriptor;
pub use error::{Error, Result};
pub use events::{EventSink, FontEvent, LogSink};
pub use export::ExportSelector;
pub use ingest::IngestOptions;
pub use library::{FontActions, FontLibrary};
pub use naming::FontStyle;
