use std::{
    collections::HashSet,
    fs::File,
    io::BufReader,
    path::{Component, Path, PathBuf},
};

use anyhow::{Context, Result, anyhow, bail};
use serde::{Deserialize, Serialize};

/// How one table is cleaned: where it comes from, where it goes, which
/// columns must be present, and which columns hold timestamps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableConfig {
    pub name: String,
    /// Relative to the source root unless absolute.
    pub source_file: String,
    /// Relative to the destination root and confined to it. The destination
    /// is deleted and rewritten on every run.
    pub destination_path: String,
    pub key_columns: Vec<String>,
    #[serde(default)]
    pub timestamp_columns: Vec<String>,
}

impl TableConfig {
    pub fn new(
        name: impl Into<String>,
        source_file: impl Into<String>,
        destination_path: impl Into<String>,
        key_columns: &[&str],
    ) -> Self {
        Self {
            name: name.into(),
            source_file: source_file.into(),
            destination_path: destination_path.into(),
            key_columns: key_columns.iter().map(|c| c.to_string()).collect(),
            timestamp_columns: Vec::new(),
        }
    }

    pub fn with_timestamp_columns(mut self, columns: &[&str]) -> Self {
        self.timestamp_columns = columns.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn source_path(&self, source_root: &Path) -> PathBuf {
        source_root.join(&self.source_file)
    }

    pub fn destination_path(&self, destination_root: &Path) -> PathBuf {
        destination_root.join(&self.destination_path)
    }

    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            bail!("table name cannot be empty");
        }
        if self.source_file.trim().is_empty() {
            bail!("table '{}' has an empty source_file", self.name);
        }
        if self.destination_path.trim().is_empty() {
            bail!("table '{}' has an empty destination_path", self.name);
        }
        if !stays_below_root(Path::new(&self.destination_path)) {
            bail!(
                "table '{}' has destination_path '{}' that is not a path below the destination root",
                self.name,
                self.destination_path
            );
        }
        if self.key_columns.is_empty() {
            bail!("table '{}' must declare at least one key column", self.name);
        }
        if let Some(blank) = self
            .key_columns
            .iter()
            .chain(&self.timestamp_columns)
            .find(|c| c.trim().is_empty())
        {
            bail!(
                "table '{}' declares a blank column name '{}'",
                self.name,
                blank
            );
        }
        Ok(())
    }
}

// At least one named component and nothing that climbs out or restarts at the root.
fn stays_below_root(path: &Path) -> bool {
    let mut named = false;
    for component in path.components() {
        match component {
            Component::Normal(_) => named = true,
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
        }
    }
    named
}

/// The ordered set of tables one run processes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    pub tables: Vec<TableConfig>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::builtin()
    }
}

impl Catalog {
    /// The nine customer-360 tables in processing order.
    pub fn builtin() -> Self {
        Self {
            tables: vec![
                TableConfig::new("customers", "Customers.csv", "Customers", &["CustomerID"]),
                TableConfig::new("products", "Products.csv", "Products", &["ProductID"]),
                TableConfig::new(
                    "online_transactions",
                    "OnlineTransactions.csv",
                    "OnlineTransactions",
                    &["OrderID"],
                )
                .with_timestamp_columns(&["DateTime"]),
                TableConfig::new("stores", "Stores.csv", "Stores", &["StoreID"]),
                TableConfig::new(
                    "in_store_transactions",
                    "InStoreTransactions.csv",
                    "InStoreTransactions",
                    &["TransactionID"],
                )
                .with_timestamp_columns(&["DateTime"]),
                TableConfig::new("agents", "Agents.csv", "Agents", &["AgentID"]),
                TableConfig::new(
                    "customer_service_interactions",
                    "CustomerServiceInteractions.csv",
                    "CustomerServiceInteractions",
                    &["InteractionID"],
                )
                .with_timestamp_columns(&["DateTime"]),
                TableConfig::new(
                    "loyalty_accounts",
                    "LoyaltyAccounts.csv",
                    "LoyaltyAccounts",
                    &["LoyaltyID"],
                )
                .with_timestamp_columns(&["JoinDate"]),
                TableConfig::new(
                    "loyalty_transactions",
                    "LoyaltyTransactions.csv",
                    "LoyaltyTransactions",
                    &["LoyaltyID", "DateTime"],
                )
                .with_timestamp_columns(&["DateTime"]),
            ],
        }
    }

    /// Loads a JSON manifest of the form `{"tables": [...]}`.
    pub fn from_manifest(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("failed to open manifest {}", path.display()))?;
        let catalog: Catalog = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("failed to parse manifest {}", path.display()))?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn load(manifest: Option<&Path>) -> Result<Self> {
        match manifest {
            Some(path) => Self::from_manifest(path),
            None => Ok(Self::builtin()),
        }
    }

    pub fn validate(&self) -> Result<()> {
        if self.tables.is_empty() {
            bail!("catalog has no tables");
        }

        let mut names = HashSet::new();
        for table in &self.tables {
            table.validate()?;
            if !names.insert(table.name.as_str()) {
                bail!("table '{}' is declared more than once", table.name);
            }
        }
        Ok(())
    }

    pub fn get(&self, name: &str) -> Option<&TableConfig> {
        self.tables.iter().find(|t| t.name == name)
    }

    /// The named tables in catalog order, or every table when `names` is empty.
    pub fn select(&self, names: &[String]) -> Result<Vec<&TableConfig>> {
        if names.is_empty() {
            return Ok(self.tables.iter().collect());
        }

        if let Some(unknown) = names.iter().find(|n| self.get(n).is_none()) {
            return Err(anyhow!(
                "unknown table '{}'. Known tables: {}",
                unknown,
                self.table_names().join(", ")
            ));
        }

        Ok(self
            .tables
            .iter()
            .filter(|t| names.contains(&t.name))
            .collect())
    }

    pub fn table_names(&self) -> Vec<&str> {
        self.tables.iter().map(|t| t.name.as_str()).collect()
    }
}
