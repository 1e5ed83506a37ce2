//! Dashboard configuration (config.toml)

use serde::Deserialize;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};
use crate::types::Stage;

/// Parameters of a dashboard run. Every field has a default, so an empty
/// file (or no file at all) describes the standard 2025 GS/PTT dashboard.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Newest of the three yearly datasets; the only one split into months
    pub current_year: i32,
    /// Product families with their own claim and cost series
    pub product_families: Vec<String>,
    /// Entries kept before the "Others" bucket in breakdown charts
    pub top_n: usize,
    /// Stages reported under "Process" in the cost breakdowns
    pub process_stages: Vec<Stage>,
    /// Directory holding `dataYYy.csv` files
    pub data_dir: PathBuf,
    /// Directory for generated CSV/JSON reports
    pub output_dir: PathBuf,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            current_year: 2025,
            product_families: vec!["GS".to_string(), "PTT".to_string()],
            top_n: 5,
            process_stages: vec![Stage::Process, Stage::Shipment],
            data_dir: PathBuf::from("./data"),
            output_dir: PathBuf::from("./output"),
        }
    }
}

impl DashboardConfig {
    /// Load configuration from a TOML file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|source| Error::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_toml(&content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.top_n == 0 {
            return Err(Error::Config("top_n must be at least 1".into()));
        }
        if self.product_families.is_empty() {
            return Err(Error::Config("product_families must not be empty".into()));
        }
        Ok(())
    }

    /// The three dataset years, oldest first.
    pub fn years(&self) -> [i32; 3] {
        [self.current_year - 2, self.current_year - 1, self.current_year]
    }

    /// `data23y.csv`, `data24y.csv`, `data25y.csv` for 2025.
    pub fn dataset_paths(&self) -> [PathBuf; 3] {
        self.years()
            .map(|year| self.data_dir.join(format!("data{:02}y.csv", year.rem_euclid(100))))
    }
}
