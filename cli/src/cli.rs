use std::path::PathBuf;

/// Latent profile analysis of U.S. state MCH policies
#[derive(clap::Parser, Debug)]
#[command(name = "mchpolicy", version, about)]
pub struct Cli {
    /// Increase output verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// JSON config file; absent fields keep their defaults
    #[arg(short, long, value_hint = clap::ValueHint::FilePath)]
    pub config: Option<PathBuf>,

    /// Policy CSV, overrides the config
    #[arg(long, value_hint = clap::ValueHint::FilePath)]
    pub data: Option<PathBuf>,

    /// Directory holding the state boundary shapefile
    #[arg(long, value_hint = clap::ValueHint::DirPath)]
    pub boundaries: Option<PathBuf>,

    /// Output directory for data.csv and the figures
    #[arg(short, long, value_hint = clap::ValueHint::DirPath)]
    pub out: Option<PathBuf>,

    /// Seed for the mixture model starts
    #[arg(long)]
    pub seed: Option<u64>,
}

impl Cli {
    /// Level implied by `-v`; `RUST_LOG` still takes precedence.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[test]
    fn no_arguments_means_defaults() {
        let cli = Cli::try_parse_from(["mchpolicy"]).unwrap();
        assert!(cli.config.is_none() && cli.out.is_none() && cli.seed.is_none());
        assert_eq!(cli.log_level(), log::LevelFilter::Warn);
    }

    #[test]
    fn overrides_and_verbosity_parse() {
        let cli = Cli::try_parse_from(["mchpolicy", "-vv", "--data", "in.csv", "--out", "results", "--seed", "7"]).unwrap();
        assert_eq!(cli.data.as_deref(), Some(std::path::Path::new("in.csv")));
        assert_eq!(cli.seed, Some(7));
        assert_eq!(cli.log_level(), log::LevelFilter::Debug);
    }
}
