use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::column::{get_by_key, Column};
use crate::datatable::ColumnMapping;
use crate::error::{ImportError, Result};
use crate::importer::{default_type_mapping, parse_utc_offset, GeoLocationOrder};
use crate::models::{TransactionType, User};
use crate::options::ImporterOptions;
use crate::registry::SubcategoryMatch;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub default_currency: String,
    pub default_timezone: String,
    pub language: String,
    pub importer_options: String,
    pub tag_separator: String,
    pub geo_separator: String,
    pub geo_order: GeoLocationOrder,
    pub subcategory_match: SubcategoryMatch,
    pub type_names: BTreeMap<String, TransactionType>,
    /// Column key -> header text, overriding the canonical header.
    pub column_headers: BTreeMap<String, String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_currency: "USD".to_string(),
            default_timezone: "+00:00".to_string(),
            language: "en".to_string(),
            importer_options: String::new(),
            tag_separator: ";".to_string(),
            geo_separator: " ".to_string(),
            geo_order: GeoLocationOrder::default(),
            subcategory_match: SubcategoryMatch::default(),
            type_names: default_type_mapping().into_iter().collect(),
            column_headers: BTreeMap::new(),
        }
    }
}

impl Settings {
    /// The user an import runs as. `currency` overrides `default_currency`.
    pub fn user(&self, currency: Option<&str>) -> User {
        User {
            id: 1,
            default_currency: currency.unwrap_or(&self.default_currency).to_string(),
            language: self.language.clone(),
        }
    }

    pub fn options(&self) -> ImporterOptions {
        ImporterOptions::parse(&self.importer_options)
    }

    pub fn default_utc_offset(&self) -> Result<i32> {
        parse_utc_offset(&self.default_timezone).ok_or_else(|| {
            ImportError::Settings(format!("invalid default_timezone: {}", self.default_timezone))
        })
    }

    pub fn type_mapping(&self) -> HashMap<String, TransactionType> {
        self.type_names.iter().map(|(k, v)| (k.clone(), *v)).collect()
    }

    pub fn column_mapping(&self) -> Result<ColumnMapping> {
        let mut mapping = ColumnMapping::default();
        for (key, header) in &self.column_headers {
            let column: Column =
                get_by_key(key).ok_or_else(|| ImportError::UnknownColumn(key.clone()))?;
            mapping = mapping.with_header(column, header);
        }
        Ok(mapping)
    }
}

fn config_dir() -> PathBuf {
    dirs::home_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(".config")
        .join("txport")
}

pub fn settings_path() -> PathBuf {
    config_dir().join("settings.json")
}

/// Loads settings from `path`, falling back to defaults for a missing file.
pub fn load_settings_from(path: &Path) -> Result<Settings> {
    if !path.exists() {
        return Ok(Settings::default());
    }
    let content = std::fs::read_to_string(path)?;
    serde_json::from_str(&content).map_err(|e| ImportError::Settings(e.to_string()))
}

pub fn load_settings() -> Result<Settings> {
    load_settings_from(&settings_path())
}

pub fn save_settings_to(settings: &Settings, path: &Path) -> Result<()> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir)?;
    }
    let json = serde_json::to_string_pretty(settings)
        .map_err(|e| ImportError::Settings(e.to_string()))?;
    std::fs::write(path, format!("{json}\n"))?;
    Ok(())
}
