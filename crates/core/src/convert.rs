//! The font conversion seam.
//!
//! Turning a TrueType/OpenType file into the engine's descriptor format is
//! an external capability: the ingestion pipeline only depends on the
//! [`FontConverter`] trait. [`TtfConverter`] is the bundled implementation,
//! a thin adapter over `ttf-parser` plus `flate2` for the compressed glyph
//! data dependent.

use std::{
    fmt,
    fs,
    io::Write,
    path::Path,
    str::FromStr,
};

use bitflags::bitflags;
use flate2::{Compression, write::ZlibEncoder};
use log::debug;
use ttf_parser::PlatformId;

use crate::{
    config::DESCRIPTOR_EXT,
    descriptor::Descriptor,
    error::{Error, Result},
    naming::normalize_identifier,
};

/// Supported font types for conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum FontType {
    /// Let the converter decide from the font tables.
    #[default]
    Autodetect,
    TrueType,
    TrueTypeUnicode,
    Type1,
    /// CID-0 Japanese.
    Cid0Jp,
    /// CID-0 Korean.
    Cid0Kr,
    /// CID-0 Chinese Simplified.
    Cid0Cs,
    /// CID-0 Chinese Traditional.
    Cid0Ct,
}

impl FontType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Autodetect => "",
            Self::TrueType => "TrueType",
            Self::TrueTypeUnicode => "TrueTypeUnicode",
            Self::Type1 => "Type1",
            Self::Cid0Jp => "CID0JP",
            Self::Cid0Kr => "CID0KR",
            Self::Cid0Cs => "CID0CS",
            Self::Cid0Ct => "CID0CT",
        }
    }
}

impl fmt::Display for FontType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FontType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "" | "auto" | "autodetect" => Ok(Self::Autodetect),
            "truetype" => Ok(Self::TrueType),
            "truetypeunicode" => Ok(Self::TrueTypeUnicode),
            "type1" => Ok(Self::Type1),
            "cid0jp" => Ok(Self::Cid0Jp),
            "cid0kr" => Ok(Self::Cid0Kr),
            "cid0cs" => Ok(Self::Cid0Cs),
            "cid0ct" => Ok(Self::Cid0Ct),
            other => Err(format!("unknown font type '{other}'")),
        }
    }
}

bitflags! {
    /// Font descriptor flags (PDF 32000-1:2008, 9.8.2).
    ///
    /// Fixed pitch and italic are autodetected from the font; the caller
    /// only has to choose between symbolic and non-symbolic.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct DescriptorFlags: u32 {
        const FIXED = 1;
        const SYMBOL = 4;
        const NONSYMBOL = 32;
        const ITALIC = 64;
    }
}

impl Default for DescriptorFlags {
    fn default() -> Self {
        Self::NONSYMBOL
    }
}

/// Everything the converter needs for one font.
#[derive(Debug, Clone)]
pub struct ConversionRequest<'a> {
    /// Uploaded source font file.
    pub source: &'a Path,
    pub font_type: FontType,
    /// Name of the encoding table to use; `None` for the default.
    pub encoding: Option<&'a str>,
    pub flags: DescriptorFlags,
    /// Platform ID of the cmap subtable to extract (3 Windows, 1 Macintosh).
    pub platform_id: u16,
    /// Encoding ID of the cmap subtable to extract.
    pub encoding_id: u16,
    /// Include per-character bounding boxes in the descriptor.
    pub include_cbbox: bool,
}

impl<'a> ConversionRequest<'a> {
    /// Request with the default knobs: autodetect, non-symbolic, Windows
    /// Unicode cmap.
    pub fn new(source: &'a Path) -> Self {
        Self {
            source,
            font_type: FontType::Autodetect,
            encoding: None,
            flags: DescriptorFlags::NONSYMBOL,
            platform_id: 3,
            encoding_id: 1,
            include_cbbox: false,
        }
    }
}

/// Converts one font file into a descriptor plus dependent files inside
/// `out_dir`.
///
/// Returns the new font identifier, or `None` when the source cannot be
/// converted.
pub trait FontConverter {
    fn convert(&self, request: &ConversionRequest<'_>, out_dir: &Path) -> Result<Option<String>>;
}

/// Bundled converter backed by `ttf-parser`.
#[derive(Debug, Default)]
pub struct TtfConverter;

impl FontConverter for TtfConverter {
    fn convert(&self, request: &ConversionRequest<'_>, out_dir: &Path) -> Result<Option<String>> {
        let data = fs::read(request.source).map_err(|e| Error::io(request.source, e))?;
        let Ok(face) = ttf_parser::Face::parse(&data, 0) else {
            return Ok(None);
        };

        if !has_usable_cmap(&face, request.platform_id, request.encoding_id) {
            return Ok(None);
        }

        let identifier = normalize_identifier(request.source);

        let font_type = match request.font_type {
            FontType::Autodetect => FontType::TrueTypeUnicode,
            other => other,
        };

        let mut flags = request.flags;
        if face.is_monospaced() {
            flags |= DescriptorFlags::FIXED;
        }
        if face.is_italic() {
            flags |= DescriptorFlags::ITALIC;
        }
        debug!(
            "converting '{identifier}' as {font_type} (flags {:#x}, enc {:?}, cbbox {})",
            flags.bits(),
            request.encoding,
            request.include_cbbox
        );

        // Glyph program dependent, deflate-compressed.
        let z_name = format!("{identifier}.z");
        let z_path = out_dir.join(&z_name);
        let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
        encoder.write_all(&data).map_err(|e| Error::io(&z_path, e))?;
        let compressed = encoder.finish().map_err(|e| Error::io(&z_path, e))?;
        fs::write(&z_path, compressed).map_err(|e| Error::io(&z_path, e))?;

        let descriptor = Descriptor {
            name: display_name(&face).unwrap_or_else(|| identifier.clone()),
            font_type: font_type.as_str().to_string(),
            file: Some(z_name),
            ctg: None,
        };
        descriptor.write(&out_dir.join(format!("{identifier}.{DESCRIPTOR_EXT}")))?;

        Ok(Some(identifier))
    }
}

/// The requested cmap subtable must exist; failing that, any Unicode
/// subtable will do.
fn has_usable_cmap(face: &ttf_parser::Face<'_>, platform_id: u16, encoding_id: u16) -> bool {
    let Some(cmap) = face.tables().cmap else {
        return false;
    };
    let wanted = match platform_id {
        0 => Some(PlatformId::Unicode),
        1 => Some(PlatformId::Macintosh),
        3 => Some(PlatformId::Windows),
        _ => None,
    };
    let mut any_unicode = false;
    for subtable in cmap.subtables {
        if Some(subtable.platform_id) == wanted && subtable.encoding_id == encoding_id {
            return true;
        }
        any_unicode |= subtable.is_unicode();
    }
    any_unicode
}

fn display_name(face: &ttf_parser::Face<'_>) -> Option<String> {
    let mut family = None;
    for name in face.names() {
        match name.name_id {
            ttf_parser::name_id::TYPOGRAPHIC_FAMILY => {
                if let Some(value) = name.to_string() {
                    return Some(value);
                }
            }
            ttf_parser::name_id::FAMILY => {
                if family.is_none() {
                    family = name.to_string();
                }
            }
            _ => {}
        }
    }
    family
}
