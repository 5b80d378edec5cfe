mod cli;

use anyhow::Result;
use clap::Parser;
use mchpolicy::AnalysisConfig;

use cli::Cli;

/// Merge the config file (or defaults) with command-line overrides.
fn load_config(cli: &Cli) -> Result<AnalysisConfig> {
    let mut config = match &cli.config {
        Some(path) => AnalysisConfig::from_json_file(path)?,
        None => AnalysisConfig::default(),
    };
    if let Some(data) = &cli.data { config.data_path = data.clone() }
    if let Some(dir) = &cli.boundaries { config.boundaries_dir = dir.clone() }
    if let Some(out) = &cli.out { config.out_dir = out.clone() }
    if let Some(seed) = cli.seed { config.profiles.seed = seed }
    Ok(config)
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    env_logger::Builder::new()
        .filter_level(cli.log_level())
        .parse_default_env()
        .init();

    let config = load_config(&cli)?;
    let summary = mchpolicy::run(&config)?;
    for path in &summary.outputs {
        log::info!("[export] {}", path.display());
    }
    Ok(())
}

fn main() -> Result<()> { run() }
