mod boxplot;

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};

use crate::table::{PolicyTable, columns};

pub use boxplot::{BoxStats, group_by_class, quantile, write_boxplot};

pub const IMR_FIGURE: &str = "imr_by_class.svg";
pub const FMR_FIGURE: &str = "fmr_by_class.svg";

/// Boxplots of infant mortality and fetal mortality rates grouped by `Class`.
/// Visual comparison only; returns the written paths.
pub fn write_outcome_boxplots(table: &PolicyTable, out_dir: &Path) -> Result<Vec<PathBuf>> {
    let classes = table.numeric(columns::CLASS)?;

    let figures = [
        (columns::IMR_2018, IMR_FIGURE, "Infant mortality rate (2018) by class"),
        (columns::FMR_2014_18, FMR_FIGURE, "Fetal mortality rate by class"),
    ];

    let mut written = Vec::with_capacity(figures.len());
    for (column, file, title) in figures {
        let groups = group_by_class(&classes, &table.numeric(column)?);
        let path = out_dir.join(file);
        write_boxplot(&path, title, column, &groups)
            .with_context(|| format!("[outcome] Failed to draw {column} boxplot"))?;
        log::info!("[outcome] {} -> {}", column, path.display());
        written.push(path);
    }

    Ok(written)
}
