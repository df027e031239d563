pub mod column;
pub mod currency;
pub mod datatable;
pub mod dsv;
pub mod error;
pub mod export;
pub mod fmt;
pub mod importer;
pub mod models;
pub mod options;
pub mod registry;
pub mod settings;
#[cfg(feature = "xlsx")]
pub mod xlsx;
