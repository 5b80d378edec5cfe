use polars::prelude::Column;

use crate::{PipelineError, table::{PolicyTable, columns}};

/// Ordinal parental leave policy: Broad=3, Narrow=2, Pending=1, anything else (or missing)=0.
pub fn parental_leave_type_cat(value: Option<&str>) -> i32 {
    match value.map(str::trim) {
        Some("Broad") => 3,
        Some("Narrow") => 2,
        Some("Pending") => 1,
        _ => 0,
    }
}

/// Number of tax credits held, counting exact `"Yes"` values.
pub fn tax_cumulative_cat(credits: [Option<&str>; 3]) -> i32 {
    credits.iter()
        .filter(|credit| credit.map(str::trim) == Some("Yes"))
        .count() as i32
}

/// Fetal deaths per 1000 births; undefined (None) without a positive birth count.
pub fn fetal_mortality_rate(deaths: Option<f64>, births: Option<f64>) -> Option<f64> {
    match (deaths, births) {
        (Some(deaths), Some(births)) if births > 0.0 => Some(deaths / births * 1000.0),
        _ => None,
    }
}

/// Append `Parental_leave_type_cat`, `Tax_cumulative_cat` and `FMR_2014_18`.
///
/// Total over records: nothing is dropped, unknown categories fall into 0.
pub fn recode(table: &PolicyTable) -> Result<PolicyTable, PipelineError> {
    table.require_columns(&[
        columns::PARENTAL_LEAVE_TYPE,
        columns::TAX_EITC,
        columns::TAX_CTC,
        columns::TAX_CDCTC,
        columns::FETAL_DEATHS_2018,
        columns::BIRTHS_2018,
    ])?;

    let leave = table.text(columns::PARENTAL_LEAVE_TYPE)?;
    let leave_cat = leave.iter()
        .map(|value| parental_leave_type_cat(value.as_deref()))
        .collect::<Vec<_>>();

    let [eitc, ctc, cdctc] = columns::TAX_CREDITS.map(|name| table.text(name));
    let (eitc, ctc, cdctc) = (eitc?, ctc?, cdctc?);
    let tax_cat = (0..table.len())
        .map(|i| tax_cumulative_cat([eitc[i].as_deref(), ctc[i].as_deref(), cdctc[i].as_deref()]))
        .collect::<Vec<_>>();

    let deaths = table.numeric(columns::FETAL_DEATHS_2018)?;
    let births = table.numeric(columns::BIRTHS_2018)?;
    let fmr = deaths.iter().zip(&births)
        .map(|(&deaths, &births)| fetal_mortality_rate(deaths, births))
        .collect::<Vec<_>>();

    let undefined = fmr.iter().filter(|rate| rate.is_none()).count();
    if undefined > 0 {
        log::warn!("[recode] {} of {} rows have no positive birth count; {} left empty", undefined, fmr.len(), columns::FMR_2014_18);
    }
    log::info!("[recode] derived {}, {}, {}", columns::PARENTAL_LEAVE_TYPE_CAT, columns::TAX_CUMULATIVE_CAT, columns::FMR_2014_18);

    table.with_columns(vec![
        Column::new(columns::PARENTAL_LEAVE_TYPE_CAT.into(), leave_cat),
        Column::new(columns::TAX_CUMULATIVE_CAT.into(), tax_cat),
        Column::new(columns::FMR_2014_18.into(), fmr),
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parental_leave_is_monotone_over_categories() {
        let order = [None, Some("Other"), Some("Pending"), Some("Narrow"), Some("Broad")];
        let codes = order.iter().map(|v| parental_leave_type_cat(*v)).collect::<Vec<_>>();
        assert_eq!(codes, vec![0, 0, 1, 2, 3]);
        assert_eq!(parental_leave_type_cat(Some(" Broad ")), 3);
        assert_eq!(parental_leave_type_cat(Some("broad")), 0);
    }

    #[test]
    fn tax_count_matches_yes_values() {
        assert_eq!(tax_cumulative_cat([Some("Yes"), Some("Yes"), Some("Yes")]), 3);
        assert_eq!(tax_cumulative_cat([Some("Yes"), Some("No"), None]), 1);
        assert_eq!(tax_cumulative_cat([Some("yes"), Some("Pending"), Some("")]), 0);
    }

    #[test]
    fn fetal_mortality_rate_is_undefined_without_births() {
        assert_eq!(fetal_mortality_rate(Some(5.0), Some(1000.0)), Some(5.0));
        assert_eq!(fetal_mortality_rate(Some(5.0), Some(0.0)), None);
        assert_eq!(fetal_mortality_rate(None, Some(1000.0)), None);
        assert_eq!(fetal_mortality_rate(Some(0.0), Some(250.0)), Some(0.0));
    }
}
