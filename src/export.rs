use std::io::Write;

use crate::column::Column;
use crate::error::Result;
use crate::fmt::{plain_amount, utc_offset};
use crate::models::{ImportedTransaction, TransactionType};

const EXPORT_COLUMNS: &[Column] = &[
    Column::TransactionTime,
    Column::TransactionTimezone,
    Column::TransactionType,
    Column::Category,
    Column::SubCategory,
    Column::AccountName,
    Column::AccountCurrency,
    Column::Amount,
    Column::RelatedAccountName,
    Column::RelatedAccountCurrency,
    Column::RelatedAmount,
    Column::GeographicLocation,
    Column::Tags,
    Column::Description,
    Column::Payee,
    Column::Member,
    Column::Project,
    Column::Merchant,
];

fn field(imported: &ImportedTransaction, column: Column, tag_separator: &str) -> String {
    let txn = &imported.transaction;
    let is_transfer = txn.transaction_type == TransactionType::TransferOut;
    match column {
        Column::TransactionTime => txn.time.format("%Y-%m-%d %H:%M:%S").to_string(),
        Column::TransactionTimezone => utc_offset(txn.utc_offset),
        Column::TransactionType => txn.transaction_type.name().to_string(),
        Column::Category => imported.original_category_name.clone(),
        Column::SubCategory => imported.original_sub_category_name.clone(),
        Column::AccountName => imported.original_source_account_name.clone(),
        Column::AccountCurrency => imported.original_source_account_currency.clone(),
        Column::Amount => plain_amount(txn.amount),
        Column::RelatedAccountName => imported.original_destination_account_name.clone(),
        Column::RelatedAccountCurrency => imported.original_destination_account_currency.clone(),
        Column::RelatedAmount if is_transfer => plain_amount(txn.related_amount),
        Column::GeographicLocation if txn.longitude != 0.0 || txn.latitude != 0.0 => {
            format!("{} {}", txn.longitude, txn.latitude)
        }
        Column::Tags => imported.original_tag_names.join(tag_separator),
        Column::Description => txn.description.clone(),
        Column::Payee => txn.payee.clone(),
        Column::Member => txn.member.clone(),
        Column::Project => txn.project.clone(),
        Column::Merchant => txn.merchant.clone(),
        _ => String::new(),
    }
}

/// Writes transactions as delimiter-separated text with canonical headers.
/// Geographic locations are written longitude first, space separated.
pub fn write_transactions<W: Write>(
    writer: W,
    transactions: &[ImportedTransaction],
    delimiter: u8,
    tag_separator: &str,
) -> Result<()> {
    let mut wtr = csv::WriterBuilder::new()
        .delimiter(delimiter)
        .from_writer(writer);
    wtr.write_record(EXPORT_COLUMNS.iter().map(|c| c.default_header()))?;
    for imported in transactions {
        wtr.write_record(EXPORT_COLUMNS.iter().map(|c| field(imported, *c, tag_separator)))?;
    }
    wtr.flush()?;
    Ok(())
}
