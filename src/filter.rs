use std::collections::BTreeSet;
use std::fmt;

use polars::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::CensusError;
use crate::schema::{sighting, Shift, ALL_DATES};

/// Number of rows shown by the raw data view.
pub const RAW_PREVIEW_ROWS: usize = 20;

/// Value of the date selector.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(into = "String", from = "String")]
pub enum DateSelection {
    #[default]
    AllDates,
    Date(String),
}

impl DateSelection {
    pub fn from_label(label: &str) -> Self {
        if label == ALL_DATES {
            DateSelection::AllDates
        } else {
            DateSelection::Date(label.to_string())
        }
    }

    pub fn label(&self) -> &str {
        match self {
            DateSelection::AllDates => ALL_DATES,
            DateSelection::Date(date) => date,
        }
    }
}

impl fmt::Display for DateSelection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl From<String> for DateSelection {
    fn from(label: String) -> Self {
        DateSelection::from_label(&label)
    }
}

impl From<DateSelection> for String {
    fn from(selection: DateSelection) -> Self {
        selection.label().to_string()
    }
}

/// Rows whose date equals the selected date, in their original order.
/// `AllDates` returns the table unchanged.
pub fn filter_by_date(df: &DataFrame, selection: &DateSelection) -> Result<DataFrame, CensusError> {
    let date = match selection {
        DateSelection::AllDates => return Ok(df.clone()),
        DateSelection::Date(date) => date,
    };
    let out = df
        .clone()
        .lazy()
        .filter(col(sighting::DATE).eq(lit(date.as_str())))
        .collect()?;
    debug!(date = %date, rows = out.height(), "Filtered by date");
    Ok(out)
}

/// Rows whose shift is one of `accepted`, in their original order.
///
/// An empty `accepted` set yields an empty table: deselecting every shift
/// hides every sighting.
pub fn filter_by_shift(df: &DataFrame, accepted: &BTreeSet<Shift>) -> Result<DataFrame, CensusError> {
    let predicate = accepted
        .iter()
        .map(|shift| col(sighting::SHIFT).eq(lit(shift.label())))
        .reduce(|acc, e| acc.or(e));

    let Some(predicate) = predicate else {
        debug!("No shift accepted, returning empty table");
        return Ok(df.clear());
    };

    let out = df.clone().lazy().filter(predicate).collect()?;
    debug!(shifts = ?accepted, rows = out.height(), "Filtered by shift");
    Ok(out)
}

/// Domain of the date selector: the "All dates" sentinel followed by every
/// distinct date in the table, ascending.
pub fn date_options(df: &DataFrame) -> Result<Vec<String>, CensusError> {
    let dates: BTreeSet<&str> = df.column(sighting::DATE)?.str()?.into_iter().flatten().collect();
    Ok(std::iter::once(ALL_DATES)
        .chain(dates)
        .map(str::to_string)
        .collect())
}

/// First `n` rows of the table, for the raw data view.
pub fn preview(df: &DataFrame, n: usize) -> DataFrame {
    df.head(Some(n))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_fixtures::sightings;

    fn dates(df: &DataFrame) -> Vec<String> {
        df.column(sighting::DATE)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.unwrap().to_string())
            .collect()
    }

    fn ids(df: &DataFrame) -> Vec<Option<String>> {
        df.column(sighting::UNIQUE_SQUIRREL_ID)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .map(|v| v.map(str::to_string))
            .collect()
    }

    #[test]
    fn all_dates_is_identity() {
        let df = sightings();
        let out = filter_by_date(&df, &DateSelection::AllDates).unwrap();
        assert!(out.equals_missing(&df));
    }

    #[test]
    fn selected_date_keeps_matching_rows_in_order() {
        let df = sightings();
        let selection = DateSelection::from_label("2020-01-02");
        let out = filter_by_date(&df, &selection).unwrap();
        assert_eq!(out.height(), 3);
        assert!(dates(&out).iter().all(|d| d == "2020-01-02"));
        assert_eq!(ids(&out), ids(&df)[2..].to_vec());

        let rest = df
            .clone()
            .lazy()
            .filter(col(sighting::DATE).neq(lit("2020-01-02")))
            .collect()
            .unwrap();
        assert_eq!(out.height() + rest.height(), df.height());
    }

    #[test]
    fn absent_date_yields_empty_table_with_same_columns() {
        let df = sightings();
        let out = filter_by_date(&df, &DateSelection::from_label("1999-12-31")).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(out.get_column_names(), df.get_column_names());
    }

    #[test]
    fn sentinel_label_parses_to_all_dates() {
        assert_eq!(DateSelection::from_label(ALL_DATES), DateSelection::AllDates);
        assert_eq!(DateSelection::from_label("2020-01-01").label(), "2020-01-01");
    }

    #[test]
    fn empty_shift_set_yields_empty_table() {
        let df = sightings();
        let out = filter_by_shift(&df, &BTreeSet::new()).unwrap();
        assert_eq!(out.height(), 0);
        assert_eq!(out.width(), df.width());
    }

    #[test]
    fn both_shifts_is_identity() {
        let df = sightings();
        let out = filter_by_shift(&df, &Shift::ALL.into_iter().collect()).unwrap();
        assert!(out.equals_missing(&df));
    }

    #[test]
    fn single_shift_keeps_only_that_shift() {
        let df = sightings();
        let out = filter_by_shift(&df, &BTreeSet::from([Shift::Pm])).unwrap();
        let shifts: Vec<&str> = out
            .column(sighting::SHIFT)
            .unwrap()
            .str()
            .unwrap()
            .into_no_null_iter()
            .collect();
        assert_eq!(shifts, vec!["PM", "PM"]);
    }

    #[test]
    fn date_options_start_with_sentinel_then_sorted_dates() {
        let df = sightings();
        assert_eq!(
            date_options(&df).unwrap(),
            vec![ALL_DATES, "2020-01-01", "2020-01-02"]
        );
    }

    #[test]
    fn preview_caps_row_count() {
        let df = sightings();
        assert_eq!(preview(&df, 2).height(), 2);
        assert_eq!(preview(&df, RAW_PREVIEW_ROWS).height(), 5);
    }
}
