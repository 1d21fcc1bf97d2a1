//! Font export packaging.

use std::{
    collections::HashSet,
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
};

use log::info;
use zip::{ZipWriter, write::SimpleFileOptions};

use crate::{
    catalog::FontRecord,
    error::{Error, Result},
    library::FontLibrary,
};

/// What to export: one font, or every style variant of a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportSelector<'a> {
    Identifier(&'a str),
    Family(&'a str),
}

impl ExportSelector<'_> {
    fn matches(&self, record: &FontRecord) -> bool {
        match self {
            Self::Identifier(identifier) => record.identifier == *identifier,
            Self::Family(family) => record.family == *family,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Identifier(name) | Self::Family(name) => name,
        }
    }
}

impl FontLibrary {
    /// Package the selected fonts into a zip archive.
    ///
    /// Returns the archive path; the caller streams it out and removes it
    /// afterwards. Dependents that are declared but missing on disk are
    /// simply not packaged.
    pub fn export_font(&self, selector: ExportSelector<'_>) -> Result<PathBuf> {
        let records: Vec<FontRecord> = self
            .scan()?
            .into_iter()
            .filter(|record| selector.matches(record))
            .collect();
        if records.is_empty() {
            return Err(Error::FontNotFound { identifier: selector.name().to_string() });
        }

        let archive_path = self
            .config()
            .export_dir
            .join(format!("fontexport-{}.zip", selector.name()));
        let file = File::create(&archive_path).map_err(|e| Error::ZipCreation {
            path: archive_path.clone(),
            message: e.to_string(),
        })?;
        let mut archive = ZipWriter::new(file);
        let options = SimpleFileOptions::default();

        // Dependents can be shared between styles; package each file once.
        let mut packaged = HashSet::new();
        let base = self.config().active_dir().to_path_buf();
        for record in &records {
            if packaged.insert(record.descriptor_file.clone()) {
                add_file(&mut archive, &base.join(&record.descriptor_file), &record.descriptor_file, options)?;
            }
            for dependent in [&record.file, &record.ctg].into_iter().flatten() {
                if packaged.insert(dependent.to_string()) {
                    add_file(&mut archive, &base.join(dependent), dependent, options)?;
                }
            }
        }
        archive.finish()?;

        info!("exported {} font(s) to {}", records.len(), archive_path.display());
        Ok(archive_path)
    }
}

fn add_file(
    archive: &mut ZipWriter<File>,
    source: &Path,
    entry_name: &str,
    options: SimpleFileOptions,
) -> Result<()> {
    if !source.is_file() {
        return Ok(());
    }
    let data = fs::read(source).map_err(|e| Error::io(source, e))?;
    archive.start_file(entry_name, options)?;
    archive.write_all(&data).map_err(|e| Error::io(source, e))?;
    Ok(())
}
