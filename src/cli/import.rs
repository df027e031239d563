use std::collections::{BTreeSet, HashSet};
use std::fs::File;
use std::path::Path;

use comfy_table::{Cell, Table};
use sha2::{Digest, Sha256};
use tracing::debug;

use txport::datatable::{BasicDataTable, MappedDataTable};
use txport::error::{ImportError, Result};
use txport::export::write_transactions;
use txport::fmt::{amount, utc_offset};
use txport::importer::{parse_utc_offset, DataTableImporter, ImportResult};
use txport::options::ImporterOptions;
use txport::registry::{Registries, RegistrySnapshot, SubcategoryMatch};
use txport::settings::load_settings;

use super::ImportArgs;

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

fn compute_checksum(file_path: &Path) -> Result<String> {
    let data = std::fs::read(file_path)?;
    let mut hasher = Sha256::new();
    hasher.update(&data);
    Ok(hex::encode(hasher.finalize()))
}

#[cfg_attr(not(feature = "xlsx"), allow(unused_variables))]
fn read_source(path: &Path, delimiter: Option<u8>, sheet: Option<&str>) -> Result<BasicDataTable> {
    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
        .unwrap_or_default();
    match ext.as_str() {
        "csv" | "tsv" | "txt" => txport::dsv::read_file(path, delimiter),
        #[cfg(feature = "xlsx")]
        "xlsx" | "xlsm" | "xls" | "ods" => txport::xlsx::read_workbook(path, sheet),
        _ => Err(ImportError::UnsupportedFileType(path.display().to_string())),
    }
}

fn load_registry(path: &Path, policy: SubcategoryMatch) -> Result<Registries> {
    if !path.exists() {
        return Ok(Registries::new(policy));
    }
    let content = std::fs::read_to_string(path)?;
    let snapshot: RegistrySnapshot =
        serde_json::from_str(&content).map_err(|e| ImportError::Registry(e.to_string()))?;
    Ok(Registries::from_snapshot(snapshot, policy))
}

fn save_registry(path: &Path, registries: &Registries) -> Result<()> {
    let json = serde_json::to_string_pretty(&registries.snapshot())
        .map_err(|e| ImportError::Registry(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}

fn merge(into: &mut ImportResult, from: ImportResult) {
    into.transactions.extend(from.transactions);
    into.new_accounts.extend(from.new_accounts);
    into.new_expense_categories.extend(from.new_expense_categories);
    into.new_income_categories.extend(from.new_income_categories);
    into.new_transfer_categories.extend(from.new_transfer_categories);
    into.new_tags.extend(from.new_tags);
    into.new_currencies.extend(from.new_currencies);
}

fn print_summary(result: &ImportResult) {
    let mut table = Table::new();
    table.set_header(vec![
        "Time", "Type", "Category", "Account", "Amount", "Account2", "Tags", "Description",
    ]);
    for imported in &result.transactions {
        let txn = &imported.transaction;
        table.add_row(vec![
            Cell::new(format!(
                "{} {}",
                txn.time.format("%Y-%m-%d %H:%M:%S"),
                utc_offset(txn.utc_offset)
            )),
            Cell::new(txn.transaction_type.name()),
            Cell::new(imported.original_category_path()),
            Cell::new(&imported.original_source_account_name),
            Cell::new(amount(txn.amount)),
            Cell::new(&imported.original_destination_account_name),
            Cell::new(imported.original_tag_names.join(", ")),
            Cell::new(&txn.description),
        ]);
    }
    println!("Transactions\n{table}");

    let new_categories = result.new_expense_categories.len()
        + result.new_income_categories.len()
        + result.new_transfer_categories.len();
    println!(
        "{} transactions, {} new accounts, {} new categories, {} new tags",
        result.transactions.len(),
        result.new_accounts.len(),
        new_categories,
        result.new_tags.len()
    );
    if !result.new_currencies.is_empty() {
        println!("Currencies: {}", result.new_currencies.join(", "));
    }
}

// ---------------------------------------------------------------------------
// Command
// ---------------------------------------------------------------------------

pub fn run(args: &ImportArgs) -> Result<()> {
    let settings = load_settings()?;
    let user = settings.user(args.currency.as_deref());
    let default_utc_offset = match &args.timezone {
        Some(tz) => parse_utc_offset(tz)
            .ok_or_else(|| ImportError::Settings(format!("invalid --timezone: {tz}")))?,
        None => settings.default_utc_offset()?,
    };
    let options = match &args.options {
        Some(tokens) => ImporterOptions::parse(tokens),
        None => settings.options(),
    };
    let tag_separator = args.tag_separator.as_deref().unwrap_or(&settings.tag_separator);
    let geo_separator = args.geo_separator.as_deref().unwrap_or(&settings.geo_separator);

    let importer = DataTableImporter::new(settings.type_mapping())
        .with_tag_separator(tag_separator)
        .with_geo_location(geo_separator, settings.geo_order);
    let mapping = settings.column_mapping()?;

    let mut registries = match &args.registry {
        Some(path) => load_registry(Path::new(path), settings.subcategory_match)?,
        None => Registries::new(settings.subcategory_match),
    };

    let mut seen = HashSet::new();
    let mut combined = ImportResult::default();
    for file in &args.files {
        let path = Path::new(file);
        let checksum = compute_checksum(path)?;
        if !seen.insert(checksum) {
            if !args.json {
                println!("{file}: This file has already been imported (duplicate checksum).");
            }
            continue;
        }

        let table = read_source(path, args.delimiter, args.sheet.as_deref())?;
        debug!(file = %file, rows = table.rows.len(), "read source table");
        let table = MappedDataTable::new(table, &mapping);
        let result = importer.parse_imported_data(&user, &table, default_utc_offset, &options, &mut registries)?;
        if !args.json {
            println!("{file}: {} imported", result.transactions.len());
        }
        merge(&mut combined, result);
    }

    combined.transactions.sort_by_key(|t| t.transaction.time);
    combined.new_currencies = combined
        .new_currencies
        .into_iter()
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();

    if let Some(output) = &args.output {
        let file = File::create(output)?;
        write_transactions(file, &combined.transactions, b',', tag_separator)?;
    }

    if args.json {
        let json = serde_json::to_string_pretty(&combined).map_err(|e| ImportError::Other(e.to_string()))?;
        println!("{json}");
    } else if !combined.transactions.is_empty() {
        print_summary(&combined);
    }

    if args.save_registry {
        if let Some(path) = &args.registry {
            save_registry(Path::new(path), &registries)?;
        }
    }

    Ok(())
}
