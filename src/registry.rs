use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::models::{Account, CategoryType, TransactionCategory, TransactionTag};

// ---------------------------------------------------------------------------
// Accounts
// ---------------------------------------------------------------------------

/// Accounts keyed by display name. The first account registered under a
/// name is authoritative.
#[derive(Debug, Clone, Default)]
pub struct AccountRegistry {
    accounts: Vec<Account>,
    by_name: HashMap<String, usize>,
}

impl AccountRegistry {
    pub fn get(&self, name: &str) -> Option<&Account> {
        self.by_name.get(name).map(|&i| &self.accounts[i])
    }

    /// Registers `account` unless its name is already taken. Returns the
    /// registered entry either way.
    pub fn insert(&mut self, account: Account) -> &Account {
        let next = self.accounts.len();
        let idx = *self.by_name.entry(account.name.clone()).or_insert(next);
        if idx == next {
            self.accounts.push(account);
        }
        &self.accounts[idx]
    }

    pub fn len(&self) -> usize {
        self.accounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accounts.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Account> {
        self.accounts.iter()
    }
}

// ---------------------------------------------------------------------------
// Categories
// ---------------------------------------------------------------------------

/// How a subcategory name seen in a row is matched against registered
/// subcategories whose parent category differs.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubcategoryMatch {
    /// Exact `(subcategory, parent)` match; failing that, the earliest
    /// registered subcategory with the same name whatever its parent.
    #[default]
    FirstRegistered,
    /// Only an exact `(subcategory, parent)` match is reused.
    ExactParent,
}

/// Subcategories of a single [`CategoryType`], indexed by subcategory name
/// then parent name.
#[derive(Debug, Clone)]
pub struct CategoryRegistry {
    category_type: CategoryType,
    policy: SubcategoryMatch,
    categories: Vec<TransactionCategory>,
    // subcategory name -> (parent name, index), in registration order
    by_name: HashMap<String, Vec<(String, usize)>>,
}

impl CategoryRegistry {
    pub fn new(category_type: CategoryType, policy: SubcategoryMatch) -> Self {
        Self {
            category_type,
            policy,
            categories: Vec::new(),
            by_name: HashMap::new(),
        }
    }

    pub fn category_type(&self) -> CategoryType {
        self.category_type
    }

    pub fn policy(&self) -> SubcategoryMatch {
        self.policy
    }

    pub fn find(&self, name: &str, parent_name: &str) -> Option<&TransactionCategory> {
        let candidates = self.by_name.get(name)?;
        if let Some((_, idx)) = candidates.iter().find(|(parent, _)| parent == parent_name) {
            return Some(&self.categories[*idx]);
        }
        match self.policy {
            SubcategoryMatch::FirstRegistered => {
                candidates.first().map(|(_, idx)| &self.categories[*idx])
            }
            SubcategoryMatch::ExactParent => None,
        }
    }

    /// Registers `category` under `(name, parent_name)`. A category of another
    /// type, or one whose exact key is already taken, is not registered.
    pub fn insert(&mut self, category: TransactionCategory) -> Option<&TransactionCategory> {
        if category.category_type != self.category_type {
            return None;
        }
        let candidates = self.by_name.entry(category.name.clone()).or_default();
        if candidates.iter().any(|(parent, _)| *parent == category.parent_name) {
            return None;
        }
        let idx = self.categories.len();
        candidates.push((category.parent_name.clone(), idx));
        self.categories.push(category);
        Some(&self.categories[idx])
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransactionCategory> {
        self.categories.iter()
    }
}

// ---------------------------------------------------------------------------
// Tags
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default)]
pub struct TagRegistry {
    tags: Vec<TransactionTag>,
    by_name: HashMap<String, usize>,
}

impl TagRegistry {
    pub fn get(&self, name: &str) -> Option<&TransactionTag> {
        self.by_name.get(name).map(|&i| &self.tags[i])
    }

    pub fn insert(&mut self, tag: TransactionTag) -> &TransactionTag {
        let next = self.tags.len();
        let idx = *self.by_name.entry(tag.name.clone()).or_insert(next);
        if idx == next {
            self.tags.push(tag);
        }
        &self.tags[idx]
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &TransactionTag> {
        self.tags.iter()
    }
}

// ---------------------------------------------------------------------------
// Registries
// ---------------------------------------------------------------------------

/// Every dedup registry an import reads and extends. Owned by the caller and
/// reused across calls so several files merge into one set of entities.
#[derive(Debug, Clone)]
pub struct Registries {
    pub accounts: AccountRegistry,
    pub expense_categories: CategoryRegistry,
    pub income_categories: CategoryRegistry,
    pub transfer_categories: CategoryRegistry,
    pub tags: TagRegistry,
}

impl Default for Registries {
    fn default() -> Self {
        Self::new(SubcategoryMatch::default())
    }
}

impl Registries {
    pub fn new(policy: SubcategoryMatch) -> Self {
        Self {
            accounts: AccountRegistry::default(),
            expense_categories: CategoryRegistry::new(CategoryType::Expense, policy),
            income_categories: CategoryRegistry::new(CategoryType::Income, policy),
            transfer_categories: CategoryRegistry::new(CategoryType::Transfer, policy),
            tags: TagRegistry::default(),
        }
    }

    pub fn categories(&self, category_type: CategoryType) -> &CategoryRegistry {
        match category_type {
            CategoryType::Expense => &self.expense_categories,
            CategoryType::Income => &self.income_categories,
            CategoryType::Transfer => &self.transfer_categories,
        }
    }

    pub fn categories_mut(&mut self, category_type: CategoryType) -> &mut CategoryRegistry {
        match category_type {
            CategoryType::Expense => &mut self.expense_categories,
            CategoryType::Income => &mut self.income_categories,
            CategoryType::Transfer => &mut self.transfer_categories,
        }
    }

    pub fn from_snapshot(snapshot: RegistrySnapshot, policy: SubcategoryMatch) -> Self {
        let mut registries = Self::new(policy);
        for account in snapshot.accounts {
            registries.accounts.insert(account);
        }
        for category in snapshot.categories {
            let category_type = category.category_type;
            registries.categories_mut(category_type).insert(category);
        }
        for tag in snapshot.tags {
            registries.tags.insert(tag);
        }
        registries
    }

    pub fn snapshot(&self) -> RegistrySnapshot {
        RegistrySnapshot {
            accounts: self.accounts.iter().cloned().collect(),
            categories: self
                .expense_categories
                .iter()
                .chain(self.income_categories.iter())
                .chain(self.transfer_categories.iter())
                .cloned()
                .collect(),
            tags: self.tags.iter().cloned().collect(),
        }
    }
}

/// Serializable form of [`Registries`].
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RegistrySnapshot {
    #[serde(default)]
    pub accounts: Vec<Account>,
    #[serde(default)]
    pub categories: Vec<TransactionCategory>,
    #[serde(default)]
    pub tags: Vec<TransactionTag>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn expense(name: &str, parent: &str) -> TransactionCategory {
        TransactionCategory::new(1, name, parent, CategoryType::Expense)
    }

    #[test]
    fn test_account_first_registered_wins() {
        let mut accounts = AccountRegistry::default();
        accounts.insert(Account::new(1, "Cash", "USD"));
        let kept = accounts.insert(Account::new(1, "Cash", "EUR"));
        assert_eq!(kept.currency, "USD");
        assert_eq!(accounts.len(), 1);
    }

    #[test]
    fn test_category_exact_match_preferred() {
        let mut categories = CategoryRegistry::new(CategoryType::Expense, SubcategoryMatch::FirstRegistered);
        categories.insert(expense("Coffee", "Food"));
        categories.insert(expense("Coffee", "Treats"));
        assert_eq!(categories.find("Coffee", "Treats").unwrap().parent_name, "Treats");
        assert_eq!(categories.find("Coffee", "Food").unwrap().parent_name, "Food");
    }

    #[test]
    fn test_category_fallback_picks_earliest() {
        let mut categories = CategoryRegistry::new(CategoryType::Expense, SubcategoryMatch::FirstRegistered);
        categories.insert(expense("Coffee", "Food"));
        categories.insert(expense("Coffee", "Treats"));
        assert_eq!(categories.find("Coffee", "").unwrap().parent_name, "Food");
        assert_eq!(categories.find("Coffee", "Drinks").unwrap().parent_name, "Food");
        assert!(categories.find("Tea", "Food").is_none());
    }

    #[test]
    fn test_category_exact_parent_policy() {
        let mut categories = CategoryRegistry::new(CategoryType::Expense, SubcategoryMatch::ExactParent);
        categories.insert(expense("Coffee", "Food"));
        assert!(categories.find("Coffee", "Drinks").is_none());
        assert!(categories.find("Coffee", "").is_none());
        assert!(categories.find("Coffee", "Food").is_some());
    }

    #[test]
    fn test_category_rejects_other_type_and_duplicate_key() {
        let mut categories = CategoryRegistry::new(CategoryType::Expense, SubcategoryMatch::FirstRegistered);
        assert!(categories
            .insert(TransactionCategory::new(1, "Salary", "", CategoryType::Income))
            .is_none());
        assert!(categories.insert(expense("Coffee", "Food")).is_some());
        assert!(categories.insert(expense("Coffee", "Food")).is_none());
        assert_eq!(categories.len(), 1);
    }

    #[test]
    fn test_snapshot_roundtrip_routes_categories_by_type() {
        let snapshot = RegistrySnapshot {
            accounts: vec![Account::new(1, "Bank", "USD")],
            categories: vec![
                expense("Coffee", "Food"),
                TransactionCategory::new(1, "Salary", "Work", CategoryType::Income),
            ],
            tags: vec![TransactionTag::new(1, "trip")],
        };
        let registries = Registries::from_snapshot(snapshot.clone(), SubcategoryMatch::FirstRegistered);
        assert_eq!(registries.expense_categories.len(), 1);
        assert_eq!(registries.income_categories.len(), 1);
        assert!(registries.transfer_categories.is_empty());
        assert!(registries.tags.get("trip").is_some());
        assert_eq!(registries.snapshot(), snapshot);
    }

    #[test]
    fn test_snapshot_json() {
        let json = r#"{"accounts": [{"name": "Bank", "currency": "USD"}], "tags": [{"id": 3, "name": "x"}]}"#;
        let snapshot: RegistrySnapshot = serde_json::from_str(json).unwrap();
        assert_eq!(snapshot.accounts.len(), 1);
        assert!(snapshot.categories.is_empty());
        assert_eq!(snapshot.tags[0].id, Some(3));
    }
}
