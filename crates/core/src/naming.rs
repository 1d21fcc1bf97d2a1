//! Identifier and family naming rules.
//!
//! Two deliberately different derivations live side by side here, matching
//! the PDF engine's own behavior:
//!
//! - [`normalize_identifier`] is the collision-naming rule applied to
//!   uploaded files: it collapses the literal words bold/oblique/italic/
//!   regular.
//! - [`split_family_style`] is the family-derivation rule applied to
//!   installed identifiers: it strips at most one trailing `I`, then one
//!   trailing `B`.
//!
//! The two can disagree on identifiers ending in `ib`; both behaviors are
//! intentional and pinned by tests.

use std::path::Path;

use crate::config::DEFAULT_IDENTIFIER;

/// Style flags carried by an identifier's trailing characters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FontStyle {
    pub bold: bool,
    pub italic: bool,
}

impl FontStyle {
    /// Identifier suffix form, bold before italic: ``, `B`, `I` or `BI`.
    pub fn suffix(&self) -> &'static str {
        match (self.bold, self.italic) {
            (false, false) => "",
            (true, false) => "B",
            (false, true) => "I",
            (true, true) => "BI",
        }
    }
}

/// Identifier a source font file will be installed under.
///
/// Lower-cases the file stem, strips everything outside `[a-z0-9_]`, then
/// collapses the style words `bold` -> `b`, `oblique` -> `i`, `italic` ->
/// `i` and `regular` -> nothing. An empty result falls back to
/// [`DEFAULT_IDENTIFIER`].
pub fn normalize_identifier(source: &Path) -> String {
    let stem = source
        .file_stem()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    let mut identifier: String = stem
        .chars()
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '_')
        .collect();
    for (word, short) in [("bold", "b"), ("oblique", "i"), ("italic", "i"), ("regular", "")] {
        identifier = identifier.replace(word, short);
    }
    if identifier.is_empty() {
        DEFAULT_IDENTIFIER.to_string()
    } else {
        identifier
    }
}

/// Family derivation: strip at most one trailing `I`, then one trailing
/// `B`, case-insensitively. Returns the lower-cased family name and the
/// style flags the stripped suffix encoded.
pub fn split_family_style(identifier: &str) -> (String, FontStyle) {
    let mut family = identifier.to_uppercase();
    let mut style = FontStyle::default();
    if family.ends_with('I') {
        style.italic = true;
        family.pop();
    }
    if family.ends_with('B') {
        style.bold = true;
        family.pop();
    }
    (family.to_lowercase(), style)
}
