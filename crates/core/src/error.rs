//! Error types for font library operations.

use std::path::PathBuf;

/// Result type for font library operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while managing the font library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// A mutating operation was attempted while the library is in core mode.
    #[error("font library is in core mode; initialize custom fonts first")]
    NotCustomized,

    /// The uploaded font is CFF-flavored OpenType, which the descriptor
    /// converter cannot handle.
    #[error("'{path}' is a CFF-flavored OpenType font (OTTO)")]
    UnsupportedFormat { path: PathBuf },

    /// A font with the same identifier exists and overwrite was not requested.
    #[error("font '{identifier}' already exists at '{path}'")]
    FontExists { identifier: String, path: PathBuf },

    /// The converter produced no font identifier.
    #[error("conversion produced no font for '{path}'")]
    ConversionFailed { path: PathBuf },

    /// The uploaded bundle is not a zip archive.
    #[error("'{path}' is not a zip archive")]
    NotAZip { path: PathBuf },

    /// The bundle contains no descriptor candidates.
    #[error("bundle '{path}' contains no font descriptors")]
    EmptyBundle { path: PathBuf },

    /// The bundle could not be extracted.
    #[error("failed to extract bundle '{path}': {message}")]
    ExtractionFailed { path: PathBuf, message: String },

    /// A descriptor file is missing a required declaration.
    #[error("malformed font descriptor '{path}': missing {missing}")]
    MalformedDescriptor { path: PathBuf, missing: &'static str },

    /// A descriptor declares a glyph data file that is not present.
    #[error("font '{identifier}' declares missing glyph data file '{file}'")]
    MissingBinaryFile { identifier: String, file: String },

    /// A descriptor declares a metrics file that is not present.
    #[error("font '{identifier}' declares missing metrics file '{file}'")]
    MissingMetricsFile { identifier: String, file: String },

    /// No custom font directory is configured for this deployment.
    #[error("no custom font directory is configured")]
    CustomFontPathUndefined,

    /// An export archive could not be created.
    #[error("failed to create export archive '{path}': {message}")]
    ZipCreation { path: PathBuf, message: String },

    /// No font matched the given identifier or family.
    #[error("no font matches '{identifier}'")]
    FontNotFound { identifier: String },

    /// The font family is a hard dependency of the PDF engine's fallback
    /// logic and can never be mutated.
    #[error("font family '{family}' is protected and cannot be modified")]
    ProtectedFont { family: String },

    /// Filesystem error.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Zip archive error.
    #[error("zip archive error: {0}")]
    Zip(#[from] zip::result::ZipError),
}

impl Error {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io { path: path.into(), source }
    }
}
