//! Parsing and writing of font descriptor files.
//!
//! A descriptor is a small plain-text file of `key = 'value'` lines and is
//! the authoritative record for one installed font:
//!
//! ```text
//! name = 'DejaVu Sans Bold'
//! type = 'TrueTypeUnicode'
//! file = 'dejavusansb.z'
//! ctg = 'dejavusansb.ctg.z'
//! ```
//!
//! Only the whitelisted keys `name`, `type`, `file` and `ctg` are honored;
//! anything else is ignored and the content is never executed.

use std::{
    fmt,
    fs::{self, File},
    io::Read,
    path::Path,
};

use crate::error::{Error, Result};

/// Number of leading bytes inspected by the conformance sniff.
const SNIFF_LEN: u64 = 500;

/// Declared metadata of one font.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Descriptor {
    /// Human-readable font name.
    pub name: String,
    /// Font type (e.g. `TrueTypeUnicode`).
    pub font_type: String,
    /// Dependent glyph data file, if any.
    pub file: Option<String>,
    /// Dependent compressed metrics file, if any.
    pub ctg: Option<String>,
}

impl Descriptor {
    /// Parse a descriptor file with the strict line scanner.
    pub fn parse(path: &Path) -> Result<Self> {
        let text = fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        Self::parse_str(&text, path)
    }

    fn parse_str(text: &str, path: &Path) -> Result<Self> {
        let mut name = None;
        let mut font_type = None;
        let mut file = None;
        let mut ctg = None;

        for line in text.lines() {
            let Some((key, value)) = split_assignment(line) else {
                continue;
            };
            match key {
                "name" => name = Some(value),
                "type" => font_type = Some(value),
                "file" => file = Some(value),
                "ctg" => ctg = Some(value),
                _ => {}
            }
        }

        let name = name.ok_or(Error::MalformedDescriptor {
            path: path.to_path_buf(),
            missing: "'name' declaration",
        })?;
        let font_type = font_type.ok_or(Error::MalformedDescriptor {
            path: path.to_path_buf(),
            missing: "'type' declaration",
        })?;

        Ok(Self { name, font_type, file: file.filter(|f| !f.is_empty()), ctg: ctg.filter(|c| !c.is_empty()) })
    }

    /// Write the descriptor to its on-disk form.
    pub fn write(&self, path: &Path) -> Result<()> {
        fs::write(path, self.to_string()).map_err(|e| Error::io(path, e))
    }

    /// Filenames of the declared dependent files, in declaration order.
    pub fn dependents(&self) -> impl Iterator<Item = &str> {
        self.file.as_deref().into_iter().chain(self.ctg.as_deref())
    }
}

impl fmt::Display for Descriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "name = '{}'", self.name)?;
        writeln!(f, "type = '{}'", self.font_type)?;
        if let Some(file) = &self.file {
            writeln!(f, "file = '{file}'")?;
        }
        if let Some(ctg) = &self.ctg {
            writeln!(f, "ctg = '{ctg}'")?;
        }
        Ok(())
    }
}

/// Split one `key = 'value'` line into its parts.
///
/// The value may be bare, single- or double-quoted, with an optional
/// trailing semicolon. Lines that are not assignments yield `None`.
fn split_assignment(line: &str) -> Option<(&str, String)> {
    let line = line.trim();
    if line.is_empty() || line.starts_with('#') {
        return None;
    }
    let (key, value) = line.split_once('=')?;
    let key = key.trim();
    if key.is_empty() || !key.chars().all(|c| c.is_ascii_alphanumeric()) {
        return None;
    }
    let value = value.trim().trim_end_matches(';').trim();
    let value = value
        .strip_prefix('\'')
        .and_then(|v| v.strip_suffix('\''))
        .or_else(|| value.strip_prefix('"').and_then(|v| v.strip_suffix('"')))
        .unwrap_or(value);
    Some((key, value.to_string()))
}

/// Conformance sniff used by bundle import.
///
/// Inspects only the first [`SNIFF_LEN`] bytes as text; the file conforms
/// when both a `name` and a `type` assignment are present.
pub fn sniff_conforms(path: &Path) -> Result<bool> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut head = Vec::with_capacity(SNIFF_LEN as usize);
    file.take(SNIFF_LEN)
        .read_to_end(&mut head)
        .map_err(|e| Error::io(path, e))?;
    let text = String::from_utf8_lossy(&head);
    Ok(has_assignment(&text, "name") && has_assignment(&text, "type"))
}

fn has_assignment(text: &str, key: &str) -> bool {
    text.lines().any(|line| {
        line.trim_start()
            .strip_prefix(key)
            .is_some_and(|rest| rest.trim_start().starts_with('='))
    })
}
