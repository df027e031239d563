use std::collections::{BTreeSet, HashMap};
use std::sync::OnceLock;

use chrono::{DateTime, FixedOffset, NaiveDateTime, TimeZone};
use regex::Regex;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::column::Column;
use crate::currency::is_known_currency;
use crate::datatable::{TransactionDataRow, TransactionDataTable};
use crate::error::{ImportError, Result};
use crate::models::{
    Account, CategoryType, ImportedTransaction, Transaction, TransactionCategory, TransactionTag,
    TransactionType, User,
};
use crate::options::ImporterOptions;
use crate::registry::Registries;

/// Value of the timezone column meaning "use the default offset".
pub const TIMEZONE_NOT_AVAILABLE: &str = "";

const TIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"];

const REQUIRED_COLUMNS: &[Column] = &[
    Column::TransactionTime,
    Column::TransactionType,
    Column::SubCategory,
    Column::AccountName,
    Column::Amount,
    Column::RelatedAccountName,
];

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// Parses a decimal amount into minor units: `-12.5` -> `-1250`.
pub fn parse_amount(raw: &str) -> Option<i64> {
    static AMOUNT: OnceLock<Regex> = OnceLock::new();
    let re = AMOUNT.get_or_init(|| {
        Regex::new(r"^([+-])?(\d+)(?:\.(\d{1,2}))?$").expect("amount pattern is valid")
    });
    let caps = re.captures(raw.trim())?;
    let whole: i64 = caps[2].parse().ok()?;
    let fraction = match caps.get(3).map(|m| m.as_str()) {
        Some(f) if f.len() == 1 => f.parse::<i64>().ok()? * 10,
        Some(f) => f.parse::<i64>().ok()?,
        None => 0,
    };
    let value = whole.checked_mul(100)?.checked_add(fraction)?;
    match caps.get(1).map(|m| m.as_str()) {
        Some("-") => Some(-value),
        _ => Some(value),
    }
}

/// Parses `Z`, `+08:00`, `-0530` or `+8:00` into minutes east of UTC.
pub fn parse_utc_offset(raw: &str) -> Option<i32> {
    static OFFSET: OnceLock<Regex> = OnceLock::new();
    let raw = raw.trim();
    if raw == "Z" {
        return Some(0);
    }
    let re = OFFSET.get_or_init(|| {
        Regex::new(r"^([+-])(\d{1,2}):?(\d{2})$").expect("offset pattern is valid")
    });
    let caps = re.captures(raw)?;
    let hours: i32 = caps[2].parse().ok()?;
    let minutes: i32 = caps[3].parse().ok()?;
    if hours > 14 || minutes > 59 {
        return None;
    }
    let total = hours * 60 + minutes;
    Some(if &caps[1] == "-" { -total } else { total })
}

/// Parses a local wall-clock time recorded at `utc_offset` minutes.
pub fn parse_transaction_time(raw: &str, utc_offset: i32) -> Option<DateTime<FixedOffset>> {
    let offset = FixedOffset::east_opt(utc_offset * 60)?;
    let raw = raw.trim();
    TIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .and_then(|naive| offset.from_local_datetime(&naive).single())
}

/// The display names used by the plain-text export, mapped to their types.
pub fn default_type_mapping() -> HashMap<String, TransactionType> {
    [
        TransactionType::ModifyBalance,
        TransactionType::Income,
        TransactionType::Expense,
        TransactionType::TransferOut,
    ]
    .into_iter()
    .map(|t| (t.name().to_string(), t))
    .collect()
}

// ---------------------------------------------------------------------------
// Importer
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GeoLocationOrder {
    #[default]
    LongitudeLatitude,
    LatitudeLongitude,
}

/// Everything a successful import produces. Sorted by time; new entities
/// are listed in the order they were first seen.
#[derive(Debug, Clone, Default, Serialize)]
pub struct ImportResult {
    pub transactions: Vec<ImportedTransaction>,
    pub new_accounts: Vec<Account>,
    pub new_expense_categories: Vec<TransactionCategory>,
    pub new_income_categories: Vec<TransactionCategory>,
    pub new_transfer_categories: Vec<TransactionCategory>,
    pub new_tags: Vec<TransactionTag>,
    pub new_currencies: Vec<String>,
}

/// Normalizes any [`TransactionDataTable`] into imported transactions.
#[derive(Debug, Clone)]
pub struct DataTableImporter {
    type_mapping: HashMap<String, TransactionType>,
    geo_separator: String,
    geo_order: GeoLocationOrder,
    tag_separator: String,
}

impl DataTableImporter {
    pub fn new(type_mapping: HashMap<String, TransactionType>) -> Self {
        Self {
            type_mapping,
            geo_separator: String::new(),
            geo_order: GeoLocationOrder::default(),
            tag_separator: String::new(),
        }
    }

    pub fn with_geo_location(mut self, separator: &str, order: GeoLocationOrder) -> Self {
        self.geo_separator = separator.to_string();
        self.geo_order = order;
        self
    }

    pub fn with_tag_separator(mut self, separator: &str) -> Self {
        self.tag_separator = separator.to_string();
        self
    }

    /// Resolves every row of `table` against `registries`.
    ///
    /// The registries are only updated when the whole table imports; on
    /// error they are left exactly as they were passed in.
    pub fn parse_imported_data(
        &self,
        user: &User,
        table: &dyn TransactionDataTable,
        default_utc_offset: i32,
        options: &ImporterOptions,
        registries: &mut Registries,
    ) -> Result<ImportResult> {
        if table.transaction_row_count() < 1 {
            return Err(ImportError::NotFoundTransactionDataInFile);
        }

        if let Some((name, _)) = self.type_mapping.iter().find(|(_, t)| !t.is_importable()) {
            return Err(ImportError::TransactionTypeInvalid {
                row: 0,
                value: name.clone(),
            });
        }

        for column in REQUIRED_COLUMNS {
            if !table.has_column(*column) {
                return Err(ImportError::MissingRequiredFieldInHeaderRow(*column));
            }
        }

        let mut run = ImportRun {
            importer: self,
            user,
            table,
            options,
            registries: registries.clone(),
            result: ImportResult {
                transactions: Vec::with_capacity(table.transaction_row_count()),
                ..ImportResult::default()
            },
            new_currencies: BTreeSet::new(),
        };

        let mut rows = table.transaction_row_iterator();
        let mut row_number = 0usize;
        while rows.has_next() {
            row_number += 1;
            let row = rows.next(user)?;
            if !row.is_valid() {
                debug!(row = row_number, "skipping invalid row");
                continue;
            }
            let transaction = run.parse_row(row.as_ref(), row_number, default_utc_offset)?;
            run.result.transactions.push(transaction);
        }

        if run.result.transactions.is_empty() {
            return Err(ImportError::NotFoundTransactionDataInFile);
        }

        let ImportRun {
            registries: staged,
            mut result,
            new_currencies,
            ..
        } = run;
        result.transactions.sort_by_key(|t| t.transaction.time);
        result.new_currencies = new_currencies.into_iter().collect();
        *registries = staged;

        info!(
            transactions = result.transactions.len(),
            new_accounts = result.new_accounts.len(),
            new_tags = result.new_tags.len(),
            new_currencies = result.new_currencies.len(),
            "normalized imported data"
        );
        Ok(result)
    }
}

/// State of one `parse_imported_data` call.
struct ImportRun<'a> {
    importer: &'a DataTableImporter,
    user: &'a User,
    table: &'a dyn TransactionDataTable,
    options: &'a ImporterOptions,
    registries: Registries,
    result: ImportResult,
    new_currencies: BTreeSet<String>,
}

impl ImportRun<'_> {
    /// Reads `column` if the table declares it, `""` otherwise.
    fn optional<'r>(&self, row: &'r dyn TransactionDataRow, column: Column) -> &'r str {
        if self.table.has_column(column) {
            row.get_data(column)
        } else {
            ""
        }
    }

    fn parse_row(
        &mut self,
        row: &dyn TransactionDataRow,
        row_number: usize,
        default_utc_offset: i32,
    ) -> Result<ImportedTransaction> {
        let timezone = self.optional(row, Column::TransactionTimezone);
        let utc_offset = if timezone == TIMEZONE_NOT_AVAILABLE {
            default_utc_offset
        } else {
            parse_utc_offset(timezone).ok_or_else(|| ImportError::TransactionTimeZoneInvalid {
                row: row_number,
                value: timezone.to_string(),
            })?
        };

        let raw_time = row.get_data(Column::TransactionTime);
        let time = parse_transaction_time(raw_time, utc_offset).ok_or_else(|| {
            ImportError::TransactionTimeInvalid {
                row: row_number,
                value: raw_time.to_string(),
            }
        })?;

        let raw_type = row.get_data(Column::TransactionType);
        let transaction_type = *self.importer.type_mapping.get(raw_type).ok_or_else(|| {
            ImportError::TransactionTypeInvalid {
                row: row_number,
                value: raw_type.to_string(),
            }
        })?;

        let category_name = self.optional(row, Column::Category);
        let sub_category_name = row.get_data(Column::SubCategory);
        let category_id = match transaction_type.category_type() {
            Some(category_type) => {
                self.resolve_category(category_type, sub_category_name, category_name)
            }
            None => None,
        };

        let account_name = row.get_data(Column::AccountName);
        let account_currency = self.optional(row, Column::AccountCurrency);
        let account = self.resolve_account(account_name, account_currency);

        let amount = parse_amount(row.get_data(Column::Amount)).ok_or(ImportError::AmountInvalid {
            row: row_number,
            column: Column::Amount,
        })?;

        let mut related_account = None;
        let mut related_amount = 0;
        if transaction_type == TransactionType::TransferOut {
            let name = row.get_data(Column::RelatedAccountName);
            let currency = self.optional(row, Column::RelatedAccountCurrency);
            related_account = Some(self.resolve_account(name, currency));
            related_amount = if self.table.has_column(Column::RelatedAmount) {
                parse_amount(row.get_data(Column::RelatedAmount)).ok_or(
                    ImportError::AmountInvalid {
                        row: row_number,
                        column: Column::RelatedAmount,
                    },
                )?
            } else {
                amount
            };
        }

        let (longitude, latitude) = self.parse_geo_location(row, row_number)?;
        let (tag_ids, tag_names) = self.resolve_tags(row);

        let payee = self.optional(row, Column::Payee);
        let mut description = self.optional(row, Column::Description);
        if description.is_empty() && self.options.payee_as_description() {
            description = payee;
        }
        let fee = self.optional_amount(row, Column::Fee, row_number)?;
        let discount = self.optional_amount(row, Column::Discount, row_number)?;
        let raw_project_id = self.optional(row, Column::ProjectId);
        let project_id = if raw_project_id.is_empty() {
            None
        } else {
            Some(
                raw_project_id
                    .parse::<i64>()
                    .map_err(|_| ImportError::ProjectIdInvalid { row: row_number })?,
            )
        };

        let (original_category_name, original_sub_category_name) =
            if transaction_type == TransactionType::ModifyBalance {
                (String::new(), String::new())
            } else {
                (category_name.to_string(), sub_category_name.to_string())
            };
        let (related_account_id, destination_name, destination_currency) = match related_account {
            Some((acct, currency)) => (acct.id, acct.name, currency),
            None => (None, String::new(), String::new()),
        };
        let (source, source_currency) = account;

        Ok(ImportedTransaction {
            transaction: Transaction {
                user_id: self.user.id,
                transaction_type,
                category_id,
                account_id: source.id,
                related_account_id,
                amount,
                related_amount,
                time,
                utc_offset,
                longitude,
                latitude,
                fee,
                discount,
                description: description.to_string(),
                payee: payee.to_string(),
                member: self.optional(row, Column::Member).to_string(),
                project: self.optional(row, Column::Project).to_string(),
                merchant: self.optional(row, Column::Merchant).to_string(),
                name: self.optional(row, Column::Name).to_string(),
                project_id,
                tag_ids,
            },
            original_category_name,
            original_sub_category_name,
            original_source_account_name: source.name,
            original_source_account_currency: source_currency,
            original_destination_account_name: destination_name,
            original_destination_account_currency: destination_currency,
            original_tag_names: tag_names,
        })
    }

    fn resolve_category(
        &mut self,
        category_type: CategoryType,
        name: &str,
        parent_name: &str,
    ) -> Option<i64> {
        let user_id = self.user.id;
        let categories = self.registries.categories_mut(category_type);
        if let Some(existing) = categories.find(name, parent_name) {
            return existing.id;
        }
        debug!(category = name, parent = parent_name, ?category_type, "creating category");
        let category = TransactionCategory::new(user_id, name, parent_name, category_type);
        categories.insert(category.clone());
        match category_type {
            CategoryType::Expense => self.result.new_expense_categories.push(category),
            CategoryType::Income => self.result.new_income_categories.push(category),
            CategoryType::Transfer => self.result.new_transfer_categories.push(category),
        }
        None
    }

    /// Returns the account for `name` and the currency this row books in.
    /// An existing account's currency always wins over the row's.
    fn resolve_account(&mut self, name: &str, explicit_currency: &str) -> (Account, String) {
        if !explicit_currency.is_empty() {
            self.note_currency(explicit_currency);
        }
        if let Some(existing) = self.registries.accounts.get(name) {
            let currency = existing.currency.clone();
            return (existing.clone(), currency);
        }

        let user = self.user;
        let currency = if explicit_currency.is_empty() {
            self.note_currency(&user.default_currency);
            user.default_currency.as_str()
        } else {
            explicit_currency
        };
        debug!(account = name, currency, "creating account");
        let account = Account::new(user.id, name, currency);
        self.registries.accounts.insert(account.clone());
        self.result.new_accounts.push(account.clone());
        (account, currency.to_string())
    }

    fn note_currency(&mut self, currency: &str) {
        if !is_known_currency(currency) && self.new_currencies.insert(currency.to_string()) {
            debug!(currency, "recording new currency");
        }
    }

    fn parse_geo_location(&self, row: &dyn TransactionDataRow, row_number: usize) -> Result<(f64, f64)> {
        let separator = self.importer.geo_separator.as_str();
        if separator.is_empty() || !self.table.has_column(Column::GeographicLocation) {
            return Ok((0.0, 0.0));
        }
        let parts: Vec<&str> = row.get_data(Column::GeographicLocation).split(separator).collect();
        if parts.len() != 2 {
            return Ok((0.0, 0.0));
        }
        let invalid = || ImportError::GeographicLocationInvalid { row: row_number };
        let first: f64 = parts[0].trim().parse().map_err(|_| invalid())?;
        let second: f64 = parts[1].trim().parse().map_err(|_| invalid())?;
        Ok(match self.importer.geo_order {
            GeoLocationOrder::LongitudeLatitude => (first, second),
            GeoLocationOrder::LatitudeLongitude => (second, first),
        })
    }

    fn resolve_tags(&mut self, row: &dyn TransactionDataRow) -> (Vec<i64>, Vec<String>) {
        let mut candidates: Vec<String> = Vec::new();
        let raw_tags = self.optional(row, Column::Tags);
        let separator = self.importer.tag_separator.as_str();
        if separator.is_empty() {
            candidates.push(raw_tags.to_string());
        } else {
            candidates.extend(raw_tags.split(separator).map(str::to_string));
        }
        let promoted = [
            (self.options.payee_as_tag(), Column::Payee),
            (self.options.member_as_tag(), Column::Member),
            (self.options.project_as_tag(), Column::Project),
            (self.options.merchant_as_tag(), Column::Merchant),
        ];
        for (enabled, column) in promoted {
            if enabled {
                candidates.push(self.optional(row, column).to_string());
            }
        }

        let mut ids = Vec::new();
        let mut names: Vec<String> = Vec::new();
        for name in candidates {
            if name.is_empty() || names.contains(&name) {
                continue;
            }
            let tag = match self.registries.tags.get(&name) {
                Some(existing) => existing.clone(),
                None => {
                    debug!(tag = name.as_str(), "creating tag");
                    let tag = TransactionTag::new(self.user.id, &name);
                    self.registries.tags.insert(tag.clone());
                    self.result.new_tags.push(tag.clone());
                    tag
                }
            };
            if let Some(id) = tag.id {
                ids.push(id);
            }
            names.push(name);
        }
        (ids, names)
    }

    fn optional_amount(&self, row: &dyn TransactionDataRow, column: Column, row_number: usize) -> Result<i64> {
        let raw = self.optional(row, column);
        if raw.is_empty() {
            return Ok(0);
        }
        parse_amount(raw).ok_or(ImportError::AmountInvalid {
            row: row_number,
            column,
        })
    }
}
