//! Library path configuration and fixed naming constants.

use std::path::{Path, PathBuf};

/// File extension of font descriptor files.
pub const DESCRIPTOR_EXT: &str = "def";

/// Fallback identifier used when normalization strips a file name down to
/// nothing.
pub const DEFAULT_IDENTIFIER: &str = "pdffont";

/// Families the PDF engine's own fallback logic requires. Deleting or
/// overwriting any of these is rejected regardless of library mode.
pub const PROTECTED_FAMILIES: &[&str] = &[
    "courier",
    "helvetica",
    "times",
    "symbol",
    "zapfdingbats",
    "freeserif",
    "freesans",
];

/// True iff `family` is in the protected set.
pub fn is_protected_family(family: &str) -> bool {
    PROTECTED_FAMILIES.contains(&family)
}

/// Filesystem layout of the font library.
#[derive(Debug, Clone)]
pub struct LibraryConfig {
    /// Vendor-shipped read-only font directory.
    pub vendor_dir: PathBuf,
    /// Writable custom font directory, if the deployment configured one.
    pub custom_dir: Option<PathBuf>,
    /// Directory export archives are written to.
    pub export_dir: PathBuf,
}

impl LibraryConfig {
    pub fn new(
        vendor_dir: impl Into<PathBuf>,
        custom_dir: Option<PathBuf>,
        export_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            vendor_dir: vendor_dir.into(),
            custom_dir,
            export_dir: export_dir.into(),
        }
    }

    /// The directory the catalog is served from.
    ///
    /// The custom directory is active only while it exists on disk; until it
    /// is initialized (and after a reset) the vendor directory is served.
    pub fn active_dir(&self) -> &Path {
        match &self.custom_dir {
            Some(dir) if dir.is_dir() => dir,
            _ => &self.vendor_dir,
        }
    }

    /// True iff the active directory differs from the vendor default.
    ///
    /// Recomputed from the path comparison on every call; never cached.
    pub fn is_customized(&self) -> bool {
        self.active_dir() != self.vendor_dir
    }

    /// Path a descriptor with the given identifier would occupy in the
    /// active directory.
    pub fn descriptor_path(&self, identifier: &str) -> PathBuf {
        self.active_dir().join(format!("{identifier}.{DESCRIPTOR_EXT}"))
    }

    /// Path of the vendor-shipped descriptor with the given identifier.
    pub fn vendor_descriptor_path(&self, identifier: &str) -> PathBuf {
        self.vendor_dir.join(format!("{identifier}.{DESCRIPTOR_EXT}"))
    }
}
