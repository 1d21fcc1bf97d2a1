//! Single-font ingestion pipeline.
//!
//! Sequential steps, each able to abort: pre-flight shape check, collision
//! check, conversion, notification. Pre-flight and collision failures leave
//! the library untouched.

use std::{
    fs::File,
    io::Read,
    path::Path,
};

use log::info;

use crate::{
    convert::{ConversionRequest, DescriptorFlags, FontConverter, FontType},
    error::{Error, Result},
    events::FontEvent,
    library::{self, FontLibrary},
    lock,
    naming::normalize_identifier,
};

/// Magic of CFF-flavored OpenType fonts, which the converter rejects.
const OTTO_MAGIC: &[u8; 4] = b"OTTO";

/// Caller-facing knobs of the ingestion pipeline.
#[derive(Debug, Clone)]
pub struct IngestOptions {
    pub font_type: FontType,
    /// Name of the encoding table to use; `None` for the default.
    pub encoding: Option<String>,
    /// Symbol/non-symbol choice; fixed and italic are autodetected.
    pub flags: DescriptorFlags,
    pub platform_id: u16,
    pub encoding_id: u16,
    pub include_cbbox: bool,
    /// Replace an existing font with the same identifier.
    pub overwrite: bool,
}

impl Default for IngestOptions {
    fn default() -> Self {
        Self {
            font_type: FontType::Autodetect,
            encoding: None,
            flags: DescriptorFlags::NONSYMBOL,
            platform_id: 3,
            encoding_id: 1,
            include_cbbox: false,
            overwrite: false,
        }
    }
}

impl FontLibrary {
    /// Ingest a single uploaded font file and return its new identifier.
    ///
    /// The caller has already checked authorization and
    /// [`FontLibrary::is_customized`]; the pipeline trusts its parameters
    /// and does not re-assert library mode.
    pub fn ingest_font(
        &self,
        source: &Path,
        options: &IngestOptions,
        converter: &dyn FontConverter,
    ) -> Result<String> {
        let out_dir = self.config().active_dir().to_path_buf();
        let lock = lock::for_path(&out_dir);
        let _guard = lock.lock();

        reject_cff(source)?;

        let candidate = normalize_identifier(source);
        let descriptor_path = self.config().descriptor_path(&candidate);
        if descriptor_path.is_file() {
            if !options.overwrite {
                return Err(Error::FontExists { identifier: candidate, path: descriptor_path });
            }
            library::remove_font_files(&descriptor_path, &out_dir)?;
        }

        let request = ConversionRequest {
            source,
            font_type: options.font_type,
            encoding: options.encoding.as_deref(),
            flags: options.flags,
            platform_id: options.platform_id,
            encoding_id: options.encoding_id,
            include_cbbox: options.include_cbbox,
        };
        let Some(identifier) = converter.convert(&request, &out_dir)? else {
            return Err(Error::ConversionFailed { path: source.to_path_buf() });
        };

        info!("ingested font '{identifier}' from {}", source.display());
        self.emit(FontEvent::Created { identifier: identifier.clone() });
        Ok(identifier)
    }
}

/// Pre-flight shape check: CFF-flavored OpenType is rejected before
/// anything is written.
fn reject_cff(source: &Path) -> Result<()> {
    let mut magic = [0u8; 4];
    let mut file = File::open(source).map_err(|e| Error::io(source, e))?;
    let read = file.read(&mut magic).map_err(|e| Error::io(source, e))?;
    if read == magic.len() && &magic == OTTO_MAGIC {
        return Err(Error::UnsupportedFormat { path: source.to_path_buf() });
    }
    Ok(())
}
