pub mod columns;
mod policy;
mod recode;

pub use policy::{PolicyTable, parse_number};
pub use recode::{fetal_mortality_rate, parental_leave_type_cat, recode, tax_cumulative_cat};
