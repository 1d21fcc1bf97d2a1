//! CLI definitions and command dispatch.

use std::path::PathBuf;

use anyhow::{Result, bail};
use clap::{Args, Parser, Subcommand};
use fontvault_core::{
    DescriptorFlags, ExportSelector, FontLibrary, FontType, IngestOptions, LibraryConfig,
    TtfConverter,
};

use crate::render;

#[derive(Parser)]
#[command(name = "fontvault")]
#[command(about = "Manage the custom font library of the PDF engine")]
pub struct Cli {
    #[command(flatten)]
    pub paths: PathArgs,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Debug, Clone, Args)]
pub struct PathArgs {
    /// Vendor-shipped read-only font directory.
    #[arg(long)]
    pub vendor_dir: PathBuf,
    /// Writable custom font directory.
    #[arg(long)]
    pub custom_dir: Option<PathBuf>,
    /// Directory export archives are written to.
    #[arg(long, default_value = ".")]
    pub export_dir: PathBuf,
}

impl PathArgs {
    fn into_library(self) -> FontLibrary {
        FontLibrary::new(LibraryConfig::new(self.vendor_dir, self.custom_dir, self.export_dir))
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// List installed fonts.
    List {
        /// Group the listing by font family.
        #[arg(long)]
        families: bool,
    },
    /// Convert and install a TrueType/OpenType font file.
    Add {
        file: PathBuf,
        /// Font type: autodetect, truetype, truetypeunicode, type1,
        /// cid0jp, cid0kr, cid0cs or cid0ct.
        #[arg(long, default_value = "autodetect")]
        font_type: FontType,
        /// Encoding table name; omit for the default.
        #[arg(long)]
        enc: Option<String>,
        /// Treat the font as symbolic rather than non-symbolic.
        #[arg(long)]
        symbol: bool,
        /// Platform ID of the cmap subtable to extract (3 Windows, 1 Macintosh).
        #[arg(long, default_value_t = 3)]
        platform_id: u16,
        /// Encoding ID of the cmap subtable to extract.
        #[arg(long, default_value_t = 1)]
        encoding_id: u16,
        /// Include per-character bounding boxes.
        #[arg(long)]
        cbbox: bool,
        /// Replace an existing font with the same identifier.
        #[arg(long)]
        force: bool,
    },
    /// Import a zipped bundle of pre-converted fonts.
    AddBundle { file: PathBuf },
    /// Delete one font.
    Delete { identifier: String },
    /// Delete every style variant of a family.
    DeleteFamily { family: String },
    /// Copy the vendor fonts into the custom directory and switch to it.
    Init,
    /// Drop all customizations and return to the vendor fonts.
    Reset {
        /// Confirm: this removes the custom directory and everything in it.
        #[arg(long)]
        yes: bool,
    },
    /// Export a font (or a whole family) as a zip archive.
    Export {
        identifier: String,
        /// Treat the identifier as a family name.
        #[arg(long)]
        family: bool,
    },
}

impl Cli {
    pub fn run(self) -> Result<()> {
        let library = self.paths.into_library();
        match self.command {
            Commands::List { families } => {
                if families {
                    render::family_list(&library, &library.list_families()?);
                } else {
                    render::font_list(&library, &library.scan()?);
                }
            }
            Commands::Add {
                file,
                font_type,
                enc,
                symbol,
                platform_id,
                encoding_id,
                cbbox,
                force,
            } => {
                library.assert_customized()?;
                let options = IngestOptions {
                    font_type,
                    encoding: enc,
                    flags: if symbol { DescriptorFlags::SYMBOL } else { DescriptorFlags::NONSYMBOL },
                    platform_id,
                    encoding_id,
                    include_cbbox: cbbox,
                    overwrite: force,
                };
                let identifier = library.ingest_font(&file, &options, &TtfConverter)?;
                println!("installed font '{identifier}'");
            }
            Commands::AddBundle { file } => {
                library.assert_customized()?;
                let results = library.import_bundle(&file)?;
                render::bundle_summary(&results);
                if !results.iter().any(|result| result.installed) {
                    bail!("no fonts were installed from {}", file.display());
                }
            }
            Commands::Delete { identifier } => {
                library.delete_font(&identifier)?;
                println!("deleted font '{identifier}'");
            }
            Commands::DeleteFamily { family } => {
                let deleted = library.delete_family(&family)?;
                println!("deleted {deleted} font(s) from family '{family}'");
            }
            Commands::Init => {
                library.initialize_custom_fonts()?;
                println!("custom font directory initialized");
            }
            Commands::Reset { yes } => {
                if !yes {
                    bail!("reset removes every custom font; pass --yes to confirm");
                }
                library.reset_to_core()?;
                println!("font library reset to core");
            }
            Commands::Export { identifier, family } => {
                let selector = if family {
                    ExportSelector::Family(&identifier)
                } else {
                    ExportSelector::Identifier(&identifier)
                };
                let archive = library.export_font(selector)?;
                println!("{}", archive.display());
            }
        }
        Ok(())
    }
}
