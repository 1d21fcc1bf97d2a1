//! Zipped pre-converted bundle import.
//!
//! A bundle carries descriptor files plus their dependents, typically
//! exported from another deployment. Import is never all-or-nothing: each
//! candidate gets its own [`BundleFileResult`] and one bad file does not
//! abort the batch.

use std::{
    fs::{self, File},
    io::Read,
    path::Path,
};

use log::{info, warn};
use tempfile::TempDir;
use zip::ZipArchive;

use crate::{
    config::DESCRIPTOR_EXT,
    descriptor::{self, Descriptor},
    error::{Error, Result},
    events::FontEvent,
    library::FontLibrary,
    lock,
};

/// Zip local-file-header magic.
const ZIP_MAGIC: &[u8; 4] = b"PK\x03\x04";

/// Outcome for one descriptor candidate found in a bundle.
#[derive(Debug)]
pub struct BundleFileResult {
    /// Candidate path inside the archive.
    pub name: String,
    /// Identifier the font installs under (descriptor base name).
    pub identifier: String,
    /// False when the conformance sniff rejected the file.
    pub conforms: bool,
    /// Declared glyph data file.
    pub file: Option<String>,
    /// Declared metrics file.
    pub ctg: Option<String>,
    /// Per-file failures; any entry blocks installation of this candidate.
    pub errors: Vec<Error>,
    /// True once the candidate was copied into the library.
    pub installed: bool,
}

impl BundleFileResult {
    fn new(name: &str) -> Self {
        let identifier = Path::new(name)
            .file_stem()
            .map(|s| s.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        Self {
            name: name.to_string(),
            identifier,
            conforms: false,
            file: None,
            ctg: None,
            errors: Vec::new(),
            installed: false,
        }
    }
}

impl FontLibrary {
    /// Import a zipped bundle of pre-converted fonts.
    ///
    /// Returns one result per descriptor candidate, including skipped and
    /// errored ones, so the caller can render a mixed-outcome summary.
    pub fn import_bundle(&self, archive_path: &Path) -> Result<Vec<BundleFileResult>> {
        let target_dir = self.config().active_dir().to_path_buf();
        let lock = lock::for_path(&target_dir);
        let _guard = lock.lock();

        check_zip_magic(archive_path)?;

        let file = File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
        let mut archive = ZipArchive::new(file)?;

        let candidates: Vec<String> = archive
            .file_names()
            .filter(|name| !name.ends_with('/'))
            .filter(|name| Path::new(name).extension().is_some_and(|ext| ext == DESCRIPTOR_EXT))
            .map(str::to_string)
            .collect();
        if candidates.is_empty() {
            return Err(Error::EmptyBundle { path: archive_path.to_path_buf() });
        }

        let scratch = TempDir::new().map_err(|e| Error::io(archive_path, e))?;
        archive.extract(scratch.path()).map_err(|e| Error::ExtractionFailed {
            path: archive_path.to_path_buf(),
            message: e.to_string(),
        })?;

        let mut results = Vec::with_capacity(candidates.len());
        for name in candidates {
            let mut result = inspect_candidate(&name, scratch.path());
            if result.conforms && result.errors.is_empty() {
                match install_candidate(&result, scratch.path(), &target_dir) {
                    Ok(()) => {
                        result.installed = true;
                        info!("installed font '{}' from bundle", result.identifier);
                        self.emit(FontEvent::Created { identifier: result.identifier.clone() });
                    }
                    Err(err) => result.errors.push(err),
                }
            }
            results.push(result);
        }
        Ok(results)
    }
}

/// Pre-flight shape check on the uploaded archive.
fn check_zip_magic(archive_path: &Path) -> Result<()> {
    let mut magic = [0u8; 4];
    let mut file = File::open(archive_path).map_err(|e| Error::io(archive_path, e))?;
    let read = file.read(&mut magic).map_err(|e| Error::io(archive_path, e))?;
    if read < magic.len() || &magic != ZIP_MAGIC {
        return Err(Error::NotAZip { path: archive_path.to_path_buf() });
    }
    Ok(())
}

/// Conformance sniff plus dependency resolution for one extracted
/// candidate. Nothing is installed here.
fn inspect_candidate(name: &str, scratch: &Path) -> BundleFileResult {
    let mut result = BundleFileResult::new(name);
    let pathname = scratch.join(name);

    match descriptor::sniff_conforms(&pathname) {
        Ok(true) => result.conforms = true,
        Ok(false) => {
            result.errors.push(Error::MalformedDescriptor {
                path: pathname,
                missing: "'name'/'type' declarations",
            });
            return result;
        }
        Err(err) => {
            result.errors.push(err);
            return result;
        }
    }

    // The sniff passed; the strict parser reads the declared dependents.
    let parsed = match Descriptor::parse(&pathname) {
        Ok(descriptor) => descriptor,
        Err(err) => {
            result.conforms = false;
            result.errors.push(err);
            return result;
        }
    };

    let base = pathname.parent().unwrap_or(scratch);
    if let Some(file) = &parsed.file {
        if !base.join(file).is_file() {
            result.errors.push(Error::MissingBinaryFile {
                identifier: result.identifier.clone(),
                file: file.clone(),
            });
        }
    }
    if let Some(ctg) = &parsed.ctg {
        if !base.join(ctg).is_file() {
            result.errors.push(Error::MissingMetricsFile {
                identifier: result.identifier.clone(),
                file: ctg.clone(),
            });
        }
    }

    result.file = parsed.file;
    result.ctg = parsed.ctg;
    result
}

/// Copy the candidate's descriptor and dependents into the library,
/// overwriting same-named files.
fn install_candidate(result: &BundleFileResult, scratch: &Path, target_dir: &Path) -> Result<()> {
    let pathname = scratch.join(&result.name);
    let base = pathname.parent().unwrap_or(scratch);
    copy_flat(&pathname, target_dir)?;
    for dependent in [&result.file, &result.ctg].into_iter().flatten() {
        copy_flat(&base.join(dependent), target_dir)?;
    }
    Ok(())
}

/// Copy `source` into `dir` under its base name, flattening any archive
/// subdirectories.
fn copy_flat(source: &Path, dir: &Path) -> Result<()> {
    let Some(file_name) = source.file_name() else {
        warn!("ignoring unusable bundle path {}", source.display());
        return Ok(());
    };
    let target = dir.join(file_name);
    fs::copy(source, &target).map_err(|e| Error::io(&target, e))?;
    Ok(())
}
