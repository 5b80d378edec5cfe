use std::path::PathBuf;

use anyhow::{Context, Result};

use crate::{
    common,
    config::AnalysisConfig,
    map::{self, StatePolygons},
    outcome,
    profile::{GaussianMixture, ProfileFit, estimate_profiles},
    report::{self, Description},
    table::{self, PolicyTable},
};

pub const DATA_FILE: &str = "data.csv";
pub const PROFILE_FIGURE: &str = "profile_means.svg";

/// What a run produced.
#[derive(Debug)]
pub struct RunSummary {
    pub table: PolicyTable,
    pub fit: ProfileFit,
    pub description: Description,
    pub outputs: Vec<PathBuf>,
}

/// Run every stage in order: load, recode, estimate profiles, export, draw, report.
pub fn run(config: &AnalysisConfig) -> Result<RunSummary> {
    config.validate()?;
    common::ensure_dir_exists(&config.out_dir)?;

    let raw = PolicyTable::read_csv(&config.data_path)
        .with_context(|| format!("[load] Failed to load policy data from {}", config.data_path.display()))?;
    let recoded = table::recode(&raw)?;

    let model = GaussianMixture::from_config(&config.profiles);
    let (classed, fit) = estimate_profiles(&recoded, &config.profiles.indicators, config.profiles.count, &model)
        .context("[profile] Latent profile estimation failed")?;

    let mut outputs = Vec::new();

    let data_path = config.out_dir.join(DATA_FILE);
    classed.write_csv(&data_path)?;
    outputs.push(data_path);

    outputs.extend(outcome::write_outcome_boxplots(&classed, &config.out_dir)?);

    let profile_path = config.out_dir.join(PROFILE_FIGURE);
    fit.to_svg(&profile_path)?;
    outputs.push(profile_path);

    let polygons = StatePolygons::read_dir(&config.boundaries_dir)
        .with_context(|| format!("[load] Failed to load boundaries from {}", config.boundaries_dir.display()))?;
    let polygons = map::prepare_state_polygons(polygons, &config.map)?;
    let map_path = config.out_dir.join(map::MAP_FIGURE);
    map::render_class_map(&polygons, &classed, &config.map, config.profiles.count, &map_path)?;
    log::info!("[map] {} states -> {}", polygons.len(), map_path.display());
    outputs.push(map_path);

    let description = report::describe_table(&classed, &config.report)?;
    report::print_report(&description, Some(&fit));

    Ok(RunSummary { table: classed, fit, description, outputs })
}
