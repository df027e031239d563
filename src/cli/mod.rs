pub mod columns;
pub mod import;
pub mod init;

use clap::{Args, Parser, Subcommand};

/// Accepts a single ASCII character, or `tab` / `\t`.
pub(crate) fn parse_delimiter(raw: &str) -> std::result::Result<u8, String> {
    match raw {
        "tab" | "\\t" | "\t" => Ok(b'\t'),
        _ if raw.len() == 1 && raw.is_ascii() => Ok(raw.as_bytes()[0]),
        _ => Err(format!("delimiter must be a single ASCII character, got {raw:?}")),
    }
}

#[derive(Parser)]
#[command(name = "txport", about = "Normalize bank and e-wallet export files into one transaction model.")]
pub struct Cli {
    /// Log importer activity to stderr (RUST_LOG overrides)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Import one or more CSV/TSV/XLSX exports and print what they normalize to.
    Import(ImportArgs),
    /// List the canonical columns and the headers they are read from.
    Columns,
    /// Write default settings to ~/.config/txport/settings.json.
    Init {
        /// Overwrite existing settings
        #[arg(long)]
        force: bool,
    },
}

#[derive(Args)]
pub struct ImportArgs {
    /// Files to import, in order
    #[arg(required = true)]
    pub files: Vec<String>,
    /// Currency for accounts that don't name one (default: settings)
    #[arg(long)]
    pub currency: Option<String>,
    /// UTC offset for rows without a timezone, e.g. +08:00
    #[arg(long, allow_hyphen_values = true)]
    pub timezone: Option<String>,
    /// Importer option tokens, e.g. "payeeAsTag,memberAsTag"
    #[arg(long)]
    pub options: Option<String>,
    /// Field delimiter for text files (default: detected)
    #[arg(long, value_parser = parse_delimiter)]
    pub delimiter: Option<u8>,
    /// Worksheet to read from spreadsheets (default: first)
    #[arg(long)]
    pub sheet: Option<String>,
    /// Separator between tags in the tags column
    #[arg(long = "tag-separator")]
    pub tag_separator: Option<String>,
    /// Separator between the two coordinates of a location
    #[arg(long = "geo-separator")]
    pub geo_separator: Option<String>,
    /// JSON file with accounts, categories and tags to match against
    #[arg(long)]
    pub registry: Option<String>,
    /// Write the updated registry back to --registry
    #[arg(long = "save-registry", requires = "registry")]
    pub save_registry: bool,
    /// Print the full result as JSON instead of a table
    #[arg(long)]
    pub json: bool,
    /// Also write the normalized transactions to a CSV file
    #[arg(long)]
    pub output: Option<String>,
}
