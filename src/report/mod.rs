mod describe;
mod display;

pub use describe::{
    Conditioned, Description, Frequency, MISSING_LABEL, NumericSummary, describe_table, trimmed_mean,
};
pub use display::{print_report, render_report};
