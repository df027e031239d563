use std::fmt;

/// Canonical transaction fields a row source can expose.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Column {
    TransactionTime,
    TransactionTimezone,
    TransactionType,
    Category,
    SubCategory,
    AccountName,
    AccountCurrency,
    Amount,
    RelatedAccountName,
    RelatedAccountCurrency,
    RelatedAmount,
    GeographicLocation,
    Tags,
    Description,
    Payee,
    Member,
    Project,
    Merchant,
    Name,
    Fee,
    Discount,
    ProjectId,
}

pub const ALL_COLUMNS: &[Column] = &[
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
    Column::Name,
    Column::Fee,
    Column::Discount,
    Column::ProjectId,
];

impl Column {
    pub fn key(&self) -> &'static str {
        match self {
            Self::TransactionTime => "time",
            Self::TransactionTimezone => "timezone",
            Self::TransactionType => "type",
            Self::Category => "category",
            Self::SubCategory => "sub_category",
            Self::AccountName => "account",
            Self::AccountCurrency => "account_currency",
            Self::Amount => "amount",
            Self::RelatedAccountName => "related_account",
            Self::RelatedAccountCurrency => "related_account_currency",
            Self::RelatedAmount => "related_amount",
            Self::GeographicLocation => "geo_location",
            Self::Tags => "tags",
            Self::Description => "description",
            Self::Payee => "payee",
            Self::Member => "member",
            Self::Project => "project",
            Self::Merchant => "merchant",
            Self::Name => "name",
            Self::Fee => "fee",
            Self::Discount => "discount",
            Self::ProjectId => "project_id",
        }
    }

    /// Header text used by the plain-text export and by the default column mapping.
    pub fn default_header(&self) -> &'static str {
        match self {
            Self::TransactionTime => "Time",
            Self::TransactionTimezone => "Timezone",
            Self::TransactionType => "Type",
            Self::Category => "Category",
            Self::SubCategory => "Sub Category",
            Self::AccountName => "Account",
            Self::AccountCurrency => "Account Currency",
            Self::Amount => "Amount",
            Self::RelatedAccountName => "Account2",
            Self::RelatedAccountCurrency => "Account2 Currency",
            Self::RelatedAmount => "Account2 Amount",
            Self::GeographicLocation => "Geographic Location",
            Self::Tags => "Tags",
            Self::Description => "Description",
            Self::Payee => "Payee",
            Self::Member => "Member",
            Self::Project => "Project",
            Self::Merchant => "Merchant",
            Self::Name => "Name",
            Self::Fee => "Fee",
            Self::Discount => "Discount",
            Self::ProjectId => "Project ID",
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.default_header())
    }
}

pub fn get_by_key(key: &str) -> Option<Column> {
    ALL_COLUMNS.iter().find(|c| c.key() == key).copied()
}
