//! End-to-end tests for the library lifecycle, ingestion, bundle import
//! and export against temporary on-disk fixtures.

use std::{
    fs::{self, File},
    io::Write,
    path::{Path, PathBuf},
    sync::{Arc, Mutex},
};

use fontvault_core::{
    BundleFileResult, ConversionRequest, Descriptor, Error, EventSink, ExportSelector,
    FontConverter, FontEvent, FontLibrary, IngestOptions, LibraryConfig, Result,
    naming::normalize_identifier,
};
use tempfile::TempDir;
use zip::{ZipWriter, write::SimpleFileOptions};

struct Fixture {
    _root: TempDir,
    vendor: PathBuf,
    custom: PathBuf,
    export: PathBuf,
}

impl Fixture {
    fn new() -> Self {
        let root = TempDir::new().unwrap();
        let vendor = root.path().join("vendor");
        let custom = root.path().join("custom");
        let export = root.path().join("export");
        fs::create_dir(&vendor).unwrap();
        fs::create_dir(&export).unwrap();

        // Vendor set: one protected family in three styles, one protected
        // single, one ordinary vendor font.
        write_font(&vendor, "helvetica", "Helvetica", true, false);
        write_font(&vendor, "helveticab", "Helvetica Bold", true, false);
        write_font(&vendor, "helveticabi", "Helvetica Bold Italic", true, true);
        write_font(&vendor, "times", "Times", true, true);
        write_font(&vendor, "vendorsans", "Vendor Sans", true, false);

        Self { _root: root, vendor, custom, export }
    }

    fn library(&self) -> FontLibrary {
        FontLibrary::new(LibraryConfig::new(
            self.vendor.clone(),
            Some(self.custom.clone()),
            self.export.clone(),
        ))
    }

    fn scratch(&self) -> PathBuf {
        self._root.path().to_path_buf()
    }
}

/// Write a descriptor plus its dependent files into `dir`.
fn write_font(dir: &Path, identifier: &str, display: &str, with_file: bool, with_ctg: bool) {
    let descriptor = Descriptor {
        name: display.to_string(),
        font_type: "TrueTypeUnicode".to_string(),
        file: with_file.then(|| format!("{identifier}.z")),
        ctg: with_ctg.then(|| format!("{identifier}.ctg.z")),
    };
    for dependent in descriptor.dependents() {
        fs::write(dir.join(dependent), b"binary-data").unwrap();
    }
    descriptor.write(&dir.join(format!("{identifier}.def"))).unwrap();
}

fn build_bundle(path: &Path, entries: &[(&str, &[u8])]) {
    let file = File::create(path).unwrap();
    let mut archive = ZipWriter::new(file);
    let options = SimpleFileOptions::default();
    for (name, data) in entries {
        archive.start_file(*name, options).unwrap();
        archive.write_all(data).unwrap();
    }
    archive.finish().unwrap();
}

fn file_count(dir: &Path) -> usize {
    fs::read_dir(dir).unwrap().count()
}

fn result_for<'a>(results: &'a [BundleFileResult], name: &str) -> &'a BundleFileResult {
    results.iter().find(|result| result.name == name).unwrap()
}

/// Converter stub: writes a descriptor + glyph data file like the real
/// converter, without parsing the source bytes.
struct StubConverter;

impl FontConverter for StubConverter {
    fn convert(&self, request: &ConversionRequest<'_>, out_dir: &Path) -> Result<Option<String>> {
        let identifier = normalize_identifier(request.source);
        let z_name = format!("{identifier}.z");
        fs::write(out_dir.join(&z_name), b"converted").unwrap();
        Descriptor {
            name: format!("Stub {identifier}"),
            font_type: "TrueTypeUnicode".to_string(),
            file: Some(z_name),
            ctg: None,
        }
        .write(&out_dir.join(format!("{identifier}.def")))?;
        Ok(Some(identifier))
    }
}

/// Converter stub that always reports "no output".
struct FailingConverter;

impl FontConverter for FailingConverter {
    fn convert(&self, _request: &ConversionRequest<'_>, _out_dir: &Path) -> Result<Option<String>> {
        Ok(None)
    }
}

#[derive(Clone, Default)]
struct RecordingSink(Arc<Mutex<Vec<FontEvent>>>);

impl RecordingSink {
    fn events(&self) -> Vec<FontEvent> {
        self.0.lock().unwrap().clone()
    }
}

impl EventSink for RecordingSink {
    fn notify(&self, event: &FontEvent) {
        self.0.lock().unwrap().push(event.clone());
    }
}

#[test]
fn starts_in_core_mode() {
    let fx = Fixture::new();
    let library = fx.library();

    assert!(!library.is_customized());
    let records = library.scan().unwrap();
    assert_eq!(records.len(), 5);
    assert!(records.iter().all(|record| record.is_vendor));

    let actions = library.actions_allowed("vendorsans");
    assert!(!actions.allowed);
    assert!(!actions.protected);
}

#[test]
fn init_then_reset_round_trip() {
    let fx = Fixture::new();
    let library = fx.library();

    library.initialize_custom_fonts().unwrap();
    assert!(library.is_customized());
    // Descriptors and their dependents were all copied.
    assert!(fx.custom.join("helveticabi.def").is_file());
    assert!(fx.custom.join("helveticabi.z").is_file());
    assert!(fx.custom.join("helveticabi.ctg.z").is_file());
    assert_eq!(file_count(&fx.custom), file_count(&fx.vendor));

    library.reset_to_core().unwrap();
    assert!(!library.is_customized());
    assert!(!fx.custom.exists());
}

#[test]
fn init_is_idempotent() {
    let fx = Fixture::new();
    let library = fx.library();

    library.initialize_custom_fonts().unwrap();
    let before = file_count(&fx.custom);
    library.initialize_custom_fonts().unwrap();
    assert_eq!(file_count(&fx.custom), before);
}

#[test]
fn reset_in_core_mode_is_a_no_op() {
    let fx = Fixture::new();
    fx.library().reset_to_core().unwrap();
    assert!(fx.vendor.join("helvetica.def").is_file());
}

#[test]
fn init_without_custom_path_fails() {
    let fx = Fixture::new();
    let library = FontLibrary::new(LibraryConfig::new(fx.vendor.clone(), None, fx.export.clone()));
    assert!(matches!(library.initialize_custom_fonts(), Err(Error::CustomFontPathUndefined)));
}

#[test]
fn delete_requires_customized_mode() {
    let fx = Fixture::new();
    let err = fx.library().delete_font("vendorsans").unwrap_err();
    assert!(matches!(err, Error::NotCustomized));
}

#[test]
fn delete_removes_descriptor_and_dependents() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();

    library.delete_font("vendorsans").unwrap();
    assert!(!fx.custom.join("vendorsans.def").exists());
    assert!(!fx.custom.join("vendorsans.z").exists());
    assert!(library.scan().unwrap().iter().all(|record| record.identifier != "vendorsans"));
    // The vendor copy is untouched.
    assert!(fx.vendor.join("vendorsans.def").is_file());
}

#[test]
fn protected_fonts_cannot_be_deleted() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();

    for identifier in ["helvetica", "helveticab", "helveticabi", "times"] {
        let err = library.delete_font(identifier).unwrap_err();
        assert!(matches!(err, Error::ProtectedFont { .. }), "{identifier} was deletable");
    }
    let actions = library.actions_allowed("helveticabi");
    assert!(!actions.allowed);
    assert!(actions.protected);
}

#[test]
fn delete_unknown_font_fails() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();
    assert!(matches!(library.delete_font("nosuch"), Err(Error::FontNotFound { .. })));
}

#[test]
fn delete_family_removes_every_style() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();
    write_font(&fx.custom, "quicksand", "Quicksand", true, false);
    write_font(&fx.custom, "quicksandb", "Quicksand Bold", true, false);
    write_font(&fx.custom, "quicksandi", "Quicksand Italic", true, false);

    assert_eq!(library.delete_family("quicksand").unwrap(), 3);
    assert!(library.scan().unwrap().iter().all(|record| record.family != "quicksand"));
    assert!(matches!(library.delete_family("quicksand"), Err(Error::FontNotFound { .. })));
}

#[test]
fn ingest_rejects_otto_before_any_write() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();
    let before = file_count(&fx.custom);

    let source = fx.scratch().join("Fancy.otf");
    fs::write(&source, b"OTTO\x00\x01\x02\x03").unwrap();

    let err = library
        .ingest_font(&source, &IngestOptions::default(), &StubConverter)
        .unwrap_err();
    assert!(matches!(err, Error::UnsupportedFormat { .. }));
    assert_eq!(file_count(&fx.custom), before);
}

#[test]
fn ingest_installs_and_notifies() {
    let fx = Fixture::new();
    let sink = RecordingSink::default();
    let library = fx.library().with_event_sink(Box::new(sink.clone()));
    library.initialize_custom_fonts().unwrap();

    let source = fx.scratch().join("My Font-Bold.ttf");
    fs::write(&source, b"\x00\x01\x00\x00fake").unwrap();

    let identifier = library
        .ingest_font(&source, &IngestOptions::default(), &StubConverter)
        .unwrap();
    assert_eq!(identifier, "myfontb");
    assert!(!identifier.is_empty());
    assert!(identifier.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '_'));
    assert!(fx.custom.join("myfontb.def").is_file());

    let record = library.find_font("myfontb").unwrap();
    assert_eq!(record.family, "myfont");
    assert!(record.style.bold);

    assert_eq!(sink.events(), vec![FontEvent::Created { identifier: "myfontb".to_string() }]);
}

#[test]
fn ingest_collision_requires_overwrite() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();

    let source = fx.scratch().join("Quicksand.ttf");
    fs::write(&source, b"\x00\x01\x00\x00fake").unwrap();

    library.ingest_font(&source, &IngestOptions::default(), &StubConverter).unwrap();
    let err = library
        .ingest_font(&source, &IngestOptions::default(), &StubConverter)
        .unwrap_err();
    assert!(matches!(err, Error::FontExists { identifier, .. } if identifier == "quicksand"));

    let options = IngestOptions { overwrite: true, ..IngestOptions::default() };
    let identifier = library.ingest_font(&source, &options, &StubConverter).unwrap();
    assert_eq!(identifier, "quicksand");
}

#[test]
fn ingest_identifier_falls_back_for_degenerate_names() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();

    let source = fx.scratch().join("@#$%.ttf");
    fs::write(&source, b"\x00\x01\x00\x00fake").unwrap();

    let identifier = library
        .ingest_font(&source, &IngestOptions::default(), &StubConverter)
        .unwrap();
    assert_eq!(identifier, "pdffont");
}

#[test]
fn ingest_conversion_failure_is_reported() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();

    let source = fx.scratch().join("Broken.ttf");
    fs::write(&source, b"\x00\x01\x00\x00fake").unwrap();

    let err = library
        .ingest_font(&source, &IngestOptions::default(), &FailingConverter)
        .unwrap_err();
    assert!(matches!(err, Error::ConversionFailed { .. }));
}

#[test]
fn scan_sorts_naturally_and_skips_malformed() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();
    write_font(&fx.custom, "f2", "Font2", false, false);
    write_font(&fx.custom, "f10", "Font10", false, false);
    write_font(&fx.custom, "f1", "Font1", false, false);
    fs::write(fx.custom.join("broken.def"), "not a descriptor\n").unwrap();

    let records = library.scan().unwrap();
    assert!(records.iter().all(|record| record.identifier != "broken"));

    let names: Vec<&str> = records
        .iter()
        .map(|record| record.display_name.as_str())
        .filter(|name| name.starts_with("Font"))
        .collect();
    assert_eq!(names, vec!["Font1", "Font2", "Font10"]);
}

#[test]
fn families_group_style_variants() {
    let fx = Fixture::new();
    let library = fx.library();

    let families = library.list_families().unwrap();
    let helvetica = families
        .iter()
        .find(|(family, _)| family == "helvetica")
        .map(|(_, members)| members)
        .unwrap();
    assert_eq!(helvetica.len(), 3);
    assert!(helvetica.iter().all(|record| record.is_protected));
}

#[test]
fn bundle_rejects_non_zip_uploads() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();

    let upload = fx.scratch().join("fonts.zip");
    fs::write(&upload, b"plain text, not an archive").unwrap();
    assert!(matches!(library.import_bundle(&upload), Err(Error::NotAZip { .. })));
}

#[test]
fn bundle_without_descriptors_is_empty() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();

    let upload = fx.scratch().join("readme.zip");
    build_bundle(&upload, &[("README.txt", b"nothing here")]);
    assert!(matches!(library.import_bundle(&upload), Err(Error::EmptyBundle { .. })));
}

#[test]
fn bundle_import_reports_per_file_outcomes() {
    let fx = Fixture::new();
    let sink = RecordingSink::default();
    let library = fx.library().with_event_sink(Box::new(sink.clone()));
    library.initialize_custom_fonts().unwrap();

    let good = "name = 'Good Font'\ntype = 'TrueTypeUnicode'\nfile = 'good.z'\n";
    let missing = "name = 'Missing Font'\ntype = 'TrueTypeUnicode'\nfile = 'nope.z'\n";
    let upload = fx.scratch().join("bundle.zip");
    build_bundle(
        &upload,
        &[
            ("good.def", good.as_bytes()),
            ("good.z", b"glyphs"),
            ("missing.def", missing.as_bytes()),
            ("junk.def", b"just some text without declarations"),
        ],
    );

    let results = library.import_bundle(&upload).unwrap();
    assert_eq!(results.len(), 3);

    let good = result_for(&results, "good.def");
    assert!(good.conforms);
    assert!(good.installed);
    assert!(good.errors.is_empty());
    assert!(fx.custom.join("good.def").is_file());
    assert!(fx.custom.join("good.z").is_file());

    let missing = result_for(&results, "missing.def");
    assert!(missing.conforms);
    assert!(!missing.installed);
    assert!(matches!(missing.errors[..], [Error::MissingBinaryFile { .. }]));
    assert!(!fx.custom.join("missing.def").exists());

    let junk = result_for(&results, "junk.def");
    assert!(!junk.conforms);
    assert!(!junk.installed);

    assert_eq!(sink.events(), vec![FontEvent::Created { identifier: "good".to_string() }]);
}

#[test]
fn bundle_import_reports_missing_metrics() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();

    let text = "name = 'X'\ntype = 'TrueTypeUnicode'\nfile = 'x.z'\nctg = 'x.ctg.z'\n";
    let upload = fx.scratch().join("metrics.zip");
    build_bundle(&upload, &[("x.def", text.as_bytes()), ("x.z", b"glyphs")]);

    let results = library.import_bundle(&upload).unwrap();
    let result = result_for(&results, "x.def");
    assert!(!result.installed);
    assert!(matches!(result.errors[..], [Error::MissingMetricsFile { .. }]));
}

#[test]
fn bundle_import_handles_nested_archive_paths() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();

    let text = "name = 'Nested'\ntype = 'TrueTypeUnicode'\nfile = 'nested.z'\n";
    let upload = fx.scratch().join("nested.zip");
    build_bundle(
        &upload,
        &[("fonts/nested.def", text.as_bytes()), ("fonts/nested.z", b"glyphs")],
    );

    let results = library.import_bundle(&upload).unwrap();
    assert!(result_for(&results, "fonts/nested.def").installed);
    // Installed flat, regardless of archive layout.
    assert!(fx.custom.join("nested.def").is_file());
    assert!(fx.custom.join("nested.z").is_file());
}

#[test]
fn export_unknown_font_fails() {
    let fx = Fixture::new();
    let library = fx.library();
    assert!(matches!(
        library.export_font(ExportSelector::Identifier("nosuch")),
        Err(Error::FontNotFound { .. })
    ));
}

#[test]
fn export_family_packages_every_style_once() {
    let fx = Fixture::new();
    let library = fx.library();

    let archive_path = library.export_font(ExportSelector::Family("helvetica")).unwrap();
    let archive = zip::ZipArchive::new(File::open(&archive_path).unwrap()).unwrap();
    let mut names: Vec<&str> = archive.file_names().collect();
    names.sort_unstable();
    assert_eq!(
        names,
        vec![
            "helvetica.def",
            "helvetica.z",
            "helveticab.def",
            "helveticab.z",
            "helveticabi.ctg.z",
            "helveticabi.def",
            "helveticabi.z",
        ]
    );
}

#[test]
fn export_delete_import_round_trip() {
    let fx = Fixture::new();
    let library = fx.library();
    library.initialize_custom_fonts().unwrap();
    write_font(&fx.custom, "quicksandbi", "Quicksand Bold Italic", true, true);

    let original = library.find_font("quicksandbi").unwrap();
    let archive_path = library.export_font(ExportSelector::Identifier("quicksandbi")).unwrap();

    library.delete_font("quicksandbi").unwrap();
    assert!(matches!(library.find_font("quicksandbi"), Err(Error::FontNotFound { .. })));

    let results = library.import_bundle(&archive_path).unwrap();
    assert!(results.iter().all(|result| result.installed));

    let restored = library.find_font("quicksandbi").unwrap();
    assert_eq!(restored, original);
}
