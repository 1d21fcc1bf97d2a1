//! Font catalog scanning and grouping.
//!
//! The directory listing IS the catalog: no index is maintained, every scan
//! re-reads the filesystem, and records are rebuilt fresh each time.

use std::{
    cmp::Ordering,
    iter::Peekable,
    path::{Path, PathBuf},
    str::Chars,
};

use glob::glob;
use indexmap::IndexMap;
use log::warn;

use crate::{
    config::{DESCRIPTOR_EXT, LibraryConfig, is_protected_family},
    descriptor::Descriptor,
    error::{Error, Result},
    naming::{FontStyle, split_family_style},
};

/// Parsed metadata for one installed font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FontRecord {
    /// Unique key: descriptor base name, case-normalized.
    pub identifier: String,
    /// Human-readable name declared by the descriptor.
    pub display_name: String,
    /// Declared font type (e.g. `TrueTypeUnicode`).
    pub font_type: String,
    /// Style flags derived from the identifier suffix.
    pub style: FontStyle,
    /// Grouping key: identifier with the style suffix stripped.
    pub family: String,
    /// Declared glyph data file, if any.
    pub file: Option<String>,
    /// Declared compressed metrics file, if any.
    pub ctg: Option<String>,
    /// On-disk descriptor file name.
    pub descriptor_file: String,
    /// True if an identically-named descriptor ships with the vendor set.
    pub is_vendor: bool,
    /// True if the family is required by the PDF engine's fallback logic.
    pub is_protected: bool,
}

/// Scan the active font directory into an ordered record list.
///
/// One level deep only; malformed descriptors are skipped with a warning
/// and the scan continues. The result is sorted by display name using
/// natural ordering.
pub fn scan(config: &LibraryConfig) -> Result<Vec<FontRecord>> {
    let mut fonts: IndexMap<String, FontRecord> = IndexMap::new();

    for path in descriptor_files(config.active_dir())? {
        let Some(stem) = path.file_stem().map(|s| s.to_string_lossy().to_lowercase()) else {
            continue;
        };
        let descriptor = match Descriptor::parse(&path) {
            Ok(descriptor) => descriptor,
            Err(err) => {
                warn!("skipping descriptor {}: {err}", path.display());
                continue;
            }
        };

        let (family, style) = split_family_style(&stem);
        let record = FontRecord {
            display_name: descriptor.name,
            font_type: descriptor.font_type,
            style,
            file: descriptor.file,
            ctg: descriptor.ctg,
            descriptor_file: format!("{stem}.{DESCRIPTOR_EXT}"),
            is_vendor: config.vendor_descriptor_path(&stem).is_file(),
            is_protected: is_protected_family(&family),
            family,
            identifier: stem.clone(),
        };
        fonts.insert(stem, record);
    }

    let mut records: Vec<FontRecord> = fonts.into_values().collect();
    records.sort_by(|a, b| natural_cmp(&a.display_name, &b.display_name));
    Ok(records)
}

/// Resolve one record by identifier.
pub fn find(config: &LibraryConfig, identifier: &str) -> Result<FontRecord> {
    scan(config)?
        .into_iter()
        .find(|record| record.identifier == identifier)
        .ok_or_else(|| Error::FontNotFound { identifier: identifier.to_string() })
}

/// Scan grouped by family, preserving the sorted order of first appearance.
pub fn list_families(config: &LibraryConfig) -> Result<Vec<(String, Vec<FontRecord>)>> {
    let mut families: IndexMap<String, Vec<FontRecord>> = IndexMap::new();
    for record in scan(config)? {
        families.entry(record.family.clone()).or_default().push(record);
    }
    Ok(families.into_iter().collect())
}

/// Descriptor files directly under `dir`, one level deep.
pub(crate) fn descriptor_files(dir: &Path) -> Result<Vec<PathBuf>> {
    let pattern = dir.join(format!("*.{DESCRIPTOR_EXT}"));
    let pattern = pattern.to_string_lossy();
    let paths = glob(&pattern).map_err(|e| Error::io(dir, std::io::Error::other(e)))?;
    Ok(paths.filter_map(std::result::Result::ok).collect())
}

/// Compare strings the way a human sorts them: runs of digits compare
/// numerically, everything else case-insensitively, with byte order as the
/// final tie-breaker ("Font2" < "Font10").
pub fn natural_cmp(a: &str, b: &str) -> Ordering {
    let mut ca = a.chars().peekable();
    let mut cb = b.chars().peekable();
    loop {
        match (ca.peek().copied(), cb.peek().copied()) {
            (None, None) => return a.cmp(b),
            (None, Some(_)) => return Ordering::Less,
            (Some(_), None) => return Ordering::Greater,
            (Some(x), Some(y)) if x.is_ascii_digit() && y.is_ascii_digit() => {
                let run_a = take_digits(&mut ca);
                let run_b = take_digits(&mut cb);
                let ord = cmp_digit_runs(&run_a, &run_b);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            (Some(x), Some(y)) => {
                let ord = x.to_ascii_lowercase().cmp(&y.to_ascii_lowercase());
                if ord != Ordering::Equal {
                    return ord;
                }
                ca.next();
                cb.next();
            }
        }
    }
}

fn take_digits(chars: &mut Peekable<Chars<'_>>) -> String {
    let mut run = String::new();
    while let Some(c) = chars.peek() {
        if !c.is_ascii_digit() {
            break;
        }
        run.push(*c);
        chars.next();
    }
    run
}

fn cmp_digit_runs(a: &str, b: &str) -> Ordering {
    let a = a.trim_start_matches('0');
    let b = b.trim_start_matches('0');
    a.len().cmp(&b.len()).then_with(|| a.cmp(b))
}
