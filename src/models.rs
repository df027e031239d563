use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

/// The user an import runs on behalf of.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    pub id: i64,
    pub default_currency: String,
    /// Locale for localized literal labels. Not read by the engine itself.
    pub language: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountCategory {
    #[default]
    Cash,
    CheckingAccount,
    CreditCard,
    VirtualAccount,
    DebtAccount,
    Receivables,
    InvestmentAccount,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Account {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub category: AccountCategory,
    pub currency: String,
}

impl Account {
    /// A not-yet-persisted account as created during an import.
    pub fn new(user_id: i64, name: &str, currency: &str) -> Self {
        Self {
            id: None,
            user_id,
            name: name.to_string(),
            category: AccountCategory::Cash,
            currency: currency.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CategoryType {
    Income,
    Expense,
    Transfer,
}

/// A subcategory, the unit attached to a transaction. `parent_name` is the
/// top-level category it was filed under (empty when unknown).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionCategory {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: i64,
    pub name: String,
    #[serde(default)]
    pub parent_name: String,
    pub category_type: CategoryType,
}

impl TransactionCategory {
    pub fn new(user_id: i64, name: &str, parent_name: &str, category_type: CategoryType) -> Self {
        Self {
            id: None,
            user_id,
            name: name.to_string(),
            parent_name: parent_name.to_string(),
            category_type,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransactionTag {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub user_id: i64,
    pub name: String,
}

impl TransactionTag {
    pub fn new(user_id: i64, name: &str) -> Self {
        Self {
            id: None,
            user_id,
            name: name.to_string(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionType {
    ModifyBalance,
    Income,
    Expense,
    TransferOut,
    TransferIn,
}

impl TransactionType {
    /// Whether a row may be imported as this type. The inbound half of a
    /// transfer is derived from its outbound half, never read from a file.
    pub fn is_importable(&self) -> bool {
        !matches!(self, Self::TransferIn)
    }

    /// The category tree a transaction of this type files into.
    pub fn category_type(&self) -> Option<CategoryType> {
        match self {
            Self::ModifyBalance => None,
            Self::Income => Some(CategoryType::Income),
            Self::Expense => Some(CategoryType::Expense),
            Self::TransferOut | Self::TransferIn => Some(CategoryType::Transfer),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::ModifyBalance => "Balance Modification",
            Self::Income => "Income",
            Self::Expense => "Expense",
            Self::TransferOut => "Transfer",
            Self::TransferIn => "Transfer In",
        }
    }
}

/// A fully resolved transaction. Ids are `None` when they point at an
/// entity created by the import that has not been persisted yet; the
/// original names on [`ImportedTransaction`] identify those.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub user_id: i64,
    pub transaction_type: TransactionType,
    pub category_id: Option<i64>,
    pub account_id: Option<i64>,
    pub related_account_id: Option<i64>,
    /// Minor units (cents).
    pub amount: i64,
    pub related_amount: i64,
    pub time: DateTime<FixedOffset>,
    /// Offset from UTC in minutes.
    pub utc_offset: i32,
    pub longitude: f64,
    pub latitude: f64,
    pub fee: i64,
    pub discount: i64,
    pub description: String,
    pub payee: String,
    pub member: String,
    pub project: String,
    pub merchant: String,
    pub name: String,
    pub project_id: Option<i64>,
    pub tag_ids: Vec<i64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportedTransaction {
    pub transaction: Transaction,
    pub original_category_name: String,
    pub original_sub_category_name: String,
    pub original_source_account_name: String,
    pub original_source_account_currency: String,
    pub original_destination_account_name: String,
    pub original_destination_account_currency: String,
    pub original_tag_names: Vec<String>,
}

pub const CATEGORY_PATH_SEPARATOR: &str = ":::";

impl ImportedTransaction {
    /// `category:::subcategory`, or whichever half is present. The
    /// separator is long so names that contain a colon stay unambiguous.
    pub fn original_category_path(&self) -> String {
        let category = self.original_category_name.as_str();
        let sub = self.original_sub_category_name.as_str();
        match (category.is_empty(), sub.is_empty()) {
            (false, false) => format!("{category}{CATEGORY_PATH_SEPARATOR}{sub}"),
            (false, true) => category.to_string(),
            _ => sub.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_category_type_mapping_is_total() {
        assert_eq!(TransactionType::ModifyBalance.category_type(), None);
        assert_eq!(TransactionType::Income.category_type(), Some(CategoryType::Income));
        assert_eq!(TransactionType::Expense.category_type(), Some(CategoryType::Expense));
        assert_eq!(TransactionType::TransferOut.category_type(), Some(CategoryType::Transfer));
    }

    #[test]
    fn test_transfer_in_not_importable() {
        assert!(TransactionType::TransferOut.is_importable());
        assert!(!TransactionType::TransferIn.is_importable());
    }

    #[test]
    fn test_new_account_defaults_to_cash() {
        let account = Account::new(7, "Wallet", "EUR");
        assert_eq!(account.category, AccountCategory::Cash);
        assert_eq!(account.id, None);
        assert_eq!(account.user_id, 7);
    }

    #[test]
    fn test_account_deserializes_with_defaults() {
        let account: Account = serde_json::from_str(r#"{"name": "Bank", "currency": "USD"}"#).unwrap();
        assert_eq!(account.category, AccountCategory::Cash);
        assert_eq!(account.id, None);
    }
}
