use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{Context, Result};
use serde::Deserialize;

use crate::catalog::{default_records, Catalog, PftRecord};
use crate::forest::Forest;
use crate::rng::DEFAULT_SEED;

fn default_seed() -> u64 {
    DEFAULT_SEED
}

fn default_plots() -> usize {
    200
}

fn default_years() -> u64 {
    500
}

fn default_output_interval() -> u64 {
    1
}

fn default_parallel() -> bool {
    true
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Clone, Deserialize)]
pub struct Scenario {
    pub name: String,
    pub description: Option<String>,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_plots")]
    pub plots: usize,
    #[serde(default = "default_years")]
    pub years: u64,
    /// Years between plot records; 0 disables them.
    #[serde(default = "default_output_interval")]
    pub output_interval: u64,
    #[serde(default = "default_parallel")]
    pub parallel: bool,
    /// Replaces the built-in species table when present.
    #[serde(default)]
    pub species: Option<Vec<PftRecord>>,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl Default for Scenario {
    fn default() -> Self {
        Self {
            name: "hubbard_brook".to_string(),
            description: None,
            seed: default_seed(),
            plots: default_plots(),
            years: default_years(),
            output_interval: default_output_interval(),
            parallel: default_parallel(),
            species: None,
            logging: LoggingConfig::default(),
        }
    }
}

pub struct ScenarioLoader {
    base_dir: PathBuf,
}

impl ScenarioLoader {
    pub fn new(base_dir: impl AsRef<Path>) -> Self {
        Self {
            base_dir: base_dir.as_ref().to_path_buf(),
        }
    }

    pub fn load(&self, file: impl AsRef<Path>) -> Result<Scenario> {
        let path = self.base_dir.join(file);
        let data = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read scenario file {}", path.display()))?;
        let scenario: Scenario = serde_yaml::from_str(&data)
            .with_context(|| format!("Failed to parse {}", path.display()))?;
        Ok(scenario)
    }
}

impl Scenario {
    pub fn build_catalog(&self) -> Result<Catalog> {
        let records = self.species.clone().unwrap_or_else(default_records);
        Catalog::new(records)
            .with_context(|| format!("Invalid species table in scenario '{}'", self.name))
    }

    pub fn build_forest(&self) -> Result<Forest> {
        let catalog = self.build_catalog()?;
        Ok(Forest::new(catalog, self.plots, self.seed).with_parallel(self.parallel))
    }

    pub fn years(&self, override_years: Option<u64>) -> u64 {
        override_years.unwrap_or(self.years)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToleranceClass;

    #[test]
    fn defaults_fill_missing_fields() {
        let scenario: Scenario = serde_yaml::from_str("name: bare\n").unwrap();

        assert_eq!(scenario.seed, DEFAULT_SEED);
        assert_eq!(scenario.plots, 200);
        assert_eq!(scenario.years, 500);
        assert_eq!(scenario.output_interval, 1);
        assert!(scenario.parallel);
        assert_eq!(scenario.logging.level, "info");
        assert_eq!(scenario.build_catalog().unwrap().len(), 13);
    }

    #[test]
    fn species_table_can_be_replaced() {
        let yaml = r#"
name: three_species
species:
  - { name: Sugar maple, g: 170.0, c: 1.57, age_max: 200.0, tolerance: shade_tolerant,
      d_max: 152.5, h_max: 4011.0, b2: 50.9, b3: 0.167,
      degd_min: 2000.0, degd_max: 6300.0, wmin: 300.0, wmax: -1.0 }
  - { name: Pin cherry, g: 200.0, c: 2.45, age_max: 30.0, tolerance: cherry,
      d_max: 28.5, h_max: 1126.0, b2: 70.6, b3: 1.26,
      degd_min: 1100.0, degd_max: 8000.0, wmin: 190.0, wmax: -1.0 }
  - { name: White birch, g: 140.0, c: 0.486, age_max: 80.0, tolerance: birch,
      d_max: 46.0, h_max: 1830.0, b2: 73.6, b3: 0.8,
      degd_min: 1100.0, degd_max: 3700.0, wmin: 190.0, wmax: 600.0 }
"#;
        let scenario: Scenario = serde_yaml::from_str(yaml).unwrap();
        let catalog = scenario.build_catalog().unwrap();

        assert_eq!(catalog.len(), 3);
        assert_eq!(catalog.group(ToleranceClass::Birch), &[2]);
        assert_eq!(catalog.species(1).unwrap().name, "Pin cherry");
    }

    #[test]
    fn invalid_species_table_is_reported() {
        let mut scenario = Scenario::default();
        let mut records = default_records();
        records.retain(|r| r.tolerance != ToleranceClass::Cherry);
        scenario.species = Some(records);

        let err = scenario.build_catalog().unwrap_err();
        assert!(format!("{err:#}").contains("no early-successional species"));
    }

    #[test]
    fn year_override_wins() {
        let scenario = Scenario::default();
        assert_eq!(scenario.years(None), 500);
        assert_eq!(scenario.years(Some(12)), 12);
    }
}
