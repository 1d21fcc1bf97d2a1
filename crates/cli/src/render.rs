//! Terminal rendering of library results.
//!
//! The core returns structured records and errors; everything user-facing
//! is formatted here.

use fontvault_core::{BundleFileResult, FontLibrary, FontRecord, FontStyle};

fn style_label(style: FontStyle) -> &'static str {
    match (style.bold, style.italic) {
        (false, false) => "regular",
        (true, false) => "bold",
        (false, true) => "italic",
        (true, true) => "bold italic",
    }
}

fn marker(library: &FontLibrary, record: &FontRecord) -> &'static str {
    let actions = library.actions_allowed(&record.identifier);
    if actions.protected {
        " [protected]"
    } else if record.is_vendor {
        " [vendor]"
    } else {
        ""
    }
}

pub fn font_list(library: &FontLibrary, records: &[FontRecord]) {
    if records.is_empty() {
        println!("no fonts installed");
        return;
    }
    for record in records {
        println!(
            "{:<20} {:<32} {:<16} {:<12}{}",
            record.identifier,
            record.display_name,
            record.font_type,
            style_label(record.style),
            marker(library, record),
        );
    }
}

pub fn family_list(library: &FontLibrary, families: &[(String, Vec<FontRecord>)]) {
    if families.is_empty() {
        println!("no fonts installed");
        return;
    }
    for (family, members) in families {
        println!("{family}");
        for record in members {
            println!(
                "  {:<20} {:<32} {:<12}{}",
                record.identifier,
                record.display_name,
                style_label(record.style),
                marker(library, record),
            );
        }
    }
}

pub fn bundle_summary(results: &[BundleFileResult]) {
    let installed = results.iter().filter(|result| result.installed).count();
    for result in results {
        if result.installed {
            println!("  ✓ {} -> '{}'", result.name, result.identifier);
        } else {
            println!("  ✗ {}", result.name);
            for error in &result.errors {
                println!("      {error}");
            }
        }
    }
    println!("{installed}/{} file(s) installed", results.len());
}
