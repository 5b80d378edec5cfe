//! Column names of the policy table.

pub const STATE: &str = "State";
pub const ABBREVIATION: &str = "Abbreviation";

pub const CIGARETTE_TAX: &str = "Cigarette_tax";
pub const CIGARETTE_RANK: &str = "Cigarette_rank";
pub const WAGE: &str = "Wage";
pub const WAGE_FED_COMPARISON: &str = "Wage_fed_comparison_7.25";
pub const PARENTAL_LEAVE_TYPE: &str = "Parental_leave_type";
pub const PARENTAL_LEAVE_GRADE: &str = "Parental_leave_grade";
pub const TAX_EITC: &str = "Tax_EITC";
pub const TAX_EITC_FEDPERCENT: &str = "Tax_EITC_fedpercent";
pub const TAX_CTC: &str = "Tax_CTC";
pub const TAX_CTC_FEDPERCENT: &str = "Tax_CTC_fedpercent";
pub const TAX_CDCTC: &str = "Tax_CDCTC";
pub const TAX_CDCTC_FEDPERCENT: &str = "Tax_CDCTC_fedpercent";

pub const IMR_2018: &str = "IMR_2018";
pub const FETAL_DEATHS_2018: &str = "Fetal_deaths_2018";
pub const BIRTHS_2018: &str = "Births_2018";

// Derived
pub const PARENTAL_LEAVE_TYPE_CAT: &str = "Parental_leave_type_cat";
pub const TAX_CUMULATIVE_CAT: &str = "Tax_cumulative_cat";
pub const FMR_2014_18: &str = "FMR_2014_18";
pub const CLASS: &str = "Class";

/// The three tax credit flags counted by `Tax_cumulative_cat`.
pub const TAX_CREDITS: [&str; 3] = [TAX_EITC, TAX_CTC, TAX_CDCTC];
