use std::{fs::File, io::BufReader, path::{Path, PathBuf}};

use anyhow::{Context, Result, ensure};
use serde::{Deserialize, Serialize};

use crate::{map::Relocation, profile::Covariance, table::columns};

/// Every tunable of the analysis, with the published values as defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AnalysisConfig {
    /// Policy/outcome table.
    pub data_path: PathBuf,
    /// Directory holding the state cartographic boundary shapefile.
    pub boundaries_dir: PathBuf,
    /// Directory receiving `data.csv` and the rendered figures.
    pub out_dir: PathBuf,
    pub profiles: ProfileConfig,
    pub map: MapConfig,
    pub report: ReportConfig,
}

impl Default for AnalysisConfig {
    fn default() -> Self {
        Self {
            data_path: PathBuf::from("MCH_policy_data.csv"),
            boundaries_dir: PathBuf::from("cb_2018_us_state_500k"),
            out_dir: PathBuf::from("output"),
            profiles: ProfileConfig::default(),
            map: MapConfig::default(),
            report: ReportConfig::default(),
        }
    }
}

impl AnalysisConfig {
    /// Load a config from a JSON file; absent fields keep their defaults.
    pub fn from_json_file(path: &Path) -> Result<Self> {
        let file = File::open(path)
            .with_context(|| format!("[config] Failed to open {}", path.display()))?;
        let config: Self = serde_json::from_reader(BufReader::new(file))
            .with_context(|| format!("[config] Failed to parse {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reject parameter combinations no stage can honour.
    pub fn validate(&self) -> Result<()> {
        ensure!(self.profiles.count >= 1, "[config] profile count must be at least 1");
        ensure!(!self.profiles.indicators.is_empty(), "[config] at least one indicator is required");
        ensure!(self.profiles.restarts >= 1, "[config] restarts must be at least 1");
        ensure!(self.profiles.tolerance > 0.0, "[config] tolerance must be positive");
        ensure!(
            (0.0..=1.0).contains(&self.map.shades.start) && (0.0..=1.0).contains(&self.map.shades.end),
            "[config] shade range must lie in [0, 1]"
        );
        for relocation in &self.map.relocations {
            if let Some(divisor) = relocation.scale_divisor {
                ensure!(divisor > 0.0, "[config] scale divisor for {} must be positive", relocation.state);
            }
        }
        Ok(())
    }
}

/// Latent profile estimation parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProfileConfig {
    pub count: usize,
    pub indicators: Vec<String>,
    pub covariance: Covariance,
    pub seed: u64,
    pub restarts: usize,
    pub max_iterations: usize,
    pub tolerance: f64,
    pub variance_floor: f64,
}

impl Default for ProfileConfig {
    fn default() -> Self {
        Self {
            count: 3,
            indicators: vec![
                columns::CIGARETTE_TAX.to_string(),
                columns::WAGE.to_string(),
                columns::PARENTAL_LEAVE_TYPE_CAT.to_string(),
                columns::TAX_CUMULATIVE_CAT.to_string(),
            ],
            covariance: Covariance::EEI,
            seed: 20_200_101,
            restarts: 20,
            max_iterations: 1000,
            tolerance: 1e-8,
            variance_floor: 1e-6,
        }
    }
}

/// Grey ramp endpoints, as fractions of white.
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct ShadeRange {
    pub start: f64,
    pub end: f64,
}

impl Default for ShadeRange {
    fn default() -> Self {
        Self { start: 0.4, end: 0.9 }
    }
}

/// Choropleth parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    /// PROJ.4 definition of the planar display CRS.
    pub target_proj: String,
    pub relocations: Vec<Relocation>,
    pub shades: ShadeRange,
    pub width: u32,
    /// Fail instead of warning when a polygon has no class.
    pub strict_join: bool,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            // EPSG:2163, US National Atlas Equal Area
            target_proj: "+proj=laea +lat_0=45 +lon_0=-100 +x_0=0 +y_0=0 +a=6370997 +b=6370997 +units=m +no_defs".to_string(),
            relocations: vec![
                Relocation {
                    state: "Alaska".to_string(),
                    rotate_deg: -35.0,
                    scale_divisor: Some(2.0),
                    shift: [-2_500_000.0, -2_500_000.0],
                },
                Relocation {
                    state: "Hawaii".to_string(),
                    rotate_deg: -35.0,
                    scale_divisor: None,
                    shift: [5_500_000.0, -1_600_000.0],
                },
            ],
            shades: ShadeRange::default(),
            width: 1200,
            strict_join: false,
        }
    }
}

/// A summary of one variable restricted to rows where another equals a value.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConditionedSummary {
    pub variable: String,
    pub by: String,
    pub equals: String,
}

/// Descriptive report parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Rows with this `Abbreviation` are left out of every summary.
    pub exclude_abbreviation: String,
    pub numeric: Vec<String>,
    pub categorical: Vec<String>,
    pub conditioned: Vec<ConditionedSummary>,
}

impl Default for ReportConfig {
    fn default() -> Self {
        let owned = |names: &[&str]| names.iter().map(|s| s.to_string()).collect::<Vec<_>>();
        Self {
            exclude_abbreviation: "DC".to_string(),
            numeric: owned(&[
                columns::CIGARETTE_TAX,
                columns::CIGARETTE_RANK,
                columns::WAGE,
                columns::PARENTAL_LEAVE_GRADE,
                columns::TAX_EITC_FEDPERCENT,
                columns::TAX_CTC_FEDPERCENT,
                columns::TAX_CDCTC_FEDPERCENT,
                columns::IMR_2018,
                columns::FMR_2014_18,
            ]),
            categorical: owned(&[
                columns::WAGE_FED_COMPARISON,
                columns::PARENTAL_LEAVE_TYPE,
                columns::PARENTAL_LEAVE_TYPE_CAT,
                columns::TAX_EITC,
                columns::TAX_CTC,
                columns::TAX_CDCTC,
                columns::TAX_CUMULATIVE_CAT,
                columns::CLASS,
            ]),
            conditioned: vec![ConditionedSummary {
                variable: columns::WAGE.to_string(),
                by: columns::WAGE_FED_COMPARISON.to_string(),
                equals: "Above".to_string(),
            }],
        }
    }
}
