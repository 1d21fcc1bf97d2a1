//! The font library handle: state resolution, lifecycle transitions,
//! deletion and listings.

use std::{
    fs,
    path::Path,
};

use log::{info, warn};

use crate::{
    catalog::{self, FontRecord},
    config::{LibraryConfig, is_protected_family},
    descriptor::Descriptor,
    error::{Error, Result},
    events::{EventSink, FontEvent, LogSink},
    lock,
    naming::split_family_style,
};

/// Per-font capability answer, as shown in listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontActions {
    /// Mutating actions may be offered for this font.
    pub allowed: bool,
    /// The font belongs to the protected set.
    pub protected: bool,
}

/// Handle on the font library described by a [`LibraryConfig`].
///
/// Operations accept pre-validated, already-authorized parameters; identity
/// and permission checks live with the caller.
pub struct FontLibrary {
    config: LibraryConfig,
    events: Box<dyn EventSink>,
}

impl FontLibrary {
    pub fn new(config: LibraryConfig) -> Self {
        Self { config, events: Box::new(LogSink) }
    }

    /// Replace the default event sink.
    pub fn with_event_sink(mut self, events: Box<dyn EventSink>) -> Self {
        self.events = events;
        self
    }

    pub fn config(&self) -> &LibraryConfig {
        &self.config
    }

    pub(crate) fn emit(&self, event: FontEvent) {
        self.events.notify(&event);
    }

    /// True iff the library serves a writable custom directory.
    pub fn is_customized(&self) -> bool {
        self.config.is_customized()
    }

    /// True iff a vendor-shipped descriptor exists for `identifier`.
    pub fn is_vendor_font(&self, identifier: &str) -> bool {
        self.config.vendor_descriptor_path(identifier).is_file()
    }

    /// Fails unless the library is customized. Mutating operations go
    /// through this first.
    pub fn assert_customized(&self) -> Result<()> {
        if self.is_customized() { Ok(()) } else { Err(Error::NotCustomized) }
    }

    /// Capability check for one font.
    pub fn actions_allowed(&self, identifier: &str) -> FontActions {
        if !self.is_customized() {
            return FontActions { allowed: false, protected: false };
        }
        let (family, _) = split_family_style(identifier);
        if is_protected_family(&family) {
            return FontActions { allowed: false, protected: true };
        }
        FontActions { allowed: true, protected: false }
    }

    /// One-time transition into customized mode.
    ///
    /// Copies every vendor descriptor (one level deep) together with its
    /// declared dependents into the custom directory. Copy, never move, so
    /// running it again is a no-op.
    pub fn initialize_custom_fonts(&self) -> Result<()> {
        if self.is_customized() {
            return Ok(());
        }
        let Some(custom_dir) = self.config.custom_dir.clone() else {
            return Err(Error::CustomFontPathUndefined);
        };

        let lock = lock::for_path(&custom_dir);
        let _guard = lock.lock();

        fs::create_dir_all(&custom_dir).map_err(|e| Error::io(&custom_dir, e))?;
        for descriptor_path in catalog::descriptor_files(&self.config.vendor_dir)? {
            copy_font_files(&descriptor_path, &custom_dir)?;
        }

        info!("initialized custom font directory {}", custom_dir.display());
        Ok(())
    }

    /// Reverse transition: drop every customization and serve the vendor
    /// set again. Irreversible; the caller owns user confirmation.
    pub fn reset_to_core(&self) -> Result<()> {
        if !self.is_customized() {
            return Ok(());
        }
        let Some(custom_dir) = self.config.custom_dir.clone() else {
            return Err(Error::CustomFontPathUndefined);
        };

        let lock = lock::for_path(&custom_dir);
        let _guard = lock.lock();

        if custom_dir.is_dir() {
            fs::remove_dir_all(&custom_dir).map_err(|e| Error::io(&custom_dir, e))?;
        }

        info!("font library reset to core");
        Ok(())
    }

    /// Delete one font: its descriptor and every declared dependent.
    pub fn delete_font(&self, identifier: &str) -> Result<()> {
        self.assert_customized()?;

        let dir = self.config.active_dir().to_path_buf();
        let lock = lock::for_path(&dir);
        let _guard = lock.lock();

        let (family, _) = split_family_style(identifier);
        if is_protected_family(&family) {
            return Err(Error::ProtectedFont { family });
        }

        let descriptor_path = self.config.descriptor_path(identifier);
        if !descriptor_path.is_file() {
            return Err(Error::FontNotFound { identifier: identifier.to_string() });
        }

        remove_font_files(&descriptor_path, &dir)?;

        self.emit(FontEvent::Deleted { identifier: identifier.to_string() });
        Ok(())
    }

    /// Delete every style variant of a family.
    pub fn delete_family(&self, family: &str) -> Result<usize> {
        self.assert_customized()?;

        let members: Vec<String> = self
            .scan()?
            .into_iter()
            .filter(|record| record.family == family)
            .map(|record| record.identifier)
            .collect();
        if members.is_empty() {
            return Err(Error::FontNotFound { identifier: family.to_string() });
        }
        for identifier in &members {
            self.delete_font(identifier)?;
        }
        Ok(members.len())
    }

    /// Eagerly scan the active directory into an ordered record list.
    pub fn scan(&self) -> Result<Vec<FontRecord>> {
        catalog::scan(&self.config)
    }

    /// Scan grouped by family, preserving the sorted order.
    pub fn list_families(&self) -> Result<Vec<(String, Vec<FontRecord>)>> {
        catalog::list_families(&self.config)
    }

    /// Resolve one record by identifier.
    pub fn find_font(&self, identifier: &str) -> Result<FontRecord> {
        catalog::find(&self.config, identifier)
    }
}

/// Copy a descriptor and its declared dependents into `target_dir`.
///
/// A descriptor that fails to parse is still copied; its dependents are
/// simply unknown and skipped.
pub(crate) fn copy_font_files(descriptor_path: &Path, target_dir: &Path) -> Result<()> {
    let Some(file_name) = descriptor_path.file_name() else {
        return Ok(());
    };
    let source_dir = descriptor_path.parent().unwrap_or(Path::new("."));
    let target = target_dir.join(file_name);
    fs::copy(descriptor_path, &target).map_err(|e| Error::io(&target, e))?;

    match Descriptor::parse(descriptor_path) {
        Ok(descriptor) => {
            for dependent in descriptor.dependents() {
                let source = source_dir.join(dependent);
                let Some(base) = source.file_name() else {
                    warn!("ignoring unusable dependent '{dependent}' of {}", descriptor_path.display());
                    continue;
                };
                if source.is_file() {
                    let target = target_dir.join(base);
                    fs::copy(&source, &target).map_err(|e| Error::io(&target, e))?;
                }
            }
        }
        Err(err) => {
            warn!("copied {} without dependents: {err}", descriptor_path.display());
        }
    }
    Ok(())
}

/// Remove a descriptor and every declared dependent that exists.
///
/// Malformed descriptors lose only their descriptor file; there is nothing
/// trustworthy left to resolve dependents from.
pub(crate) fn remove_font_files(descriptor_path: &Path, dir: &Path) -> Result<()> {
    match Descriptor::parse(descriptor_path) {
        Ok(descriptor) => {
            for dependent in descriptor.dependents() {
                let path = dir.join(dependent);
                if path.is_file() {
                    fs::remove_file(&path).map_err(|e| Error::io(&path, e))?;
                }
            }
        }
        Err(err) => {
            warn!("removing {} without dependents: {err}", descriptor_path.display());
        }
    }
    fs::remove_file(descriptor_path).map_err(|e| Error::io(descriptor_path, e))
}
