use polars::prelude::*;
use serde::Serialize;
use tracing::debug;

use crate::error::CensusError;
use crate::schema::{activity, behaviour, labels, sighting, Shift};

/// A named, ordered set of boolean indicator columns summed into one chart.
#[derive(Debug, Clone)]
pub struct IndicatorSelection {
    /// Header of the category column in the output table.
    pub label: &'static str,
    pub columns: Vec<&'static str>,
}

impl IndicatorSelection {
    /// What the squirrels were doing.
    pub fn activities() -> Self {
        Self {
            label: labels::ACTIVITY,
            columns: activity::ALL.to_vec(),
        }
    }

    /// How the squirrels reacted to people.
    pub fn behaviours() -> Self {
        Self {
            label: labels::BEHAVIOUR,
            columns: behaviour::ALL.to_vec(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DateShiftCount {
    pub date: String,
    pub shift: String,
    pub count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryCount {
    pub label: String,
    pub count: u64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ShiftTotals {
    pub am: u64,
    pub pm: u64,
}

// ── Group counts ────────────────────────────────────────────────────────────

/// Number of sightings per (date, shift), ascending by date then shift.
///
/// Output columns: `Date`, `Shift`, `Number of squirrel meetings`.
pub fn meetings_by_date_and_shift(df: &DataFrame) -> Result<DataFrame, CensusError> {
    let out = df
        .clone()
        .lazy()
        .group_by([col(sighting::DATE), col(sighting::SHIFT)])
        .agg([len().alias(labels::MEETINGS)])
        .sort([sighting::DATE, sighting::SHIFT], SortMultipleOptions::default())
        .select([
            col(sighting::DATE).alias(labels::DATE),
            col(sighting::SHIFT).alias(labels::SHIFT),
            col(labels::MEETINGS).cast(DataType::UInt64),
        ])
        .collect()?;
    debug!(groups = out.height(), "Grouped sightings by date and shift");
    Ok(out)
}

/// Number of sightings per age label, most frequent first (ties by label).
/// Rows without an age are not counted.
///
/// Output columns: `Age`, `Count`.
pub fn age_groups(df: &DataFrame) -> Result<DataFrame, CensusError> {
    let out = df
        .clone()
        .lazy()
        .filter(col(sighting::AGE).is_not_null())
        .group_by([col(sighting::AGE)])
        .agg([len().alias(labels::COUNT)])
        .select([
            col(sighting::AGE).alias(labels::AGE),
            col(labels::COUNT).cast(DataType::UInt64),
        ])
        .sort(
            [labels::COUNT, labels::AGE],
            SortMultipleOptions::default().with_order_descending_multi([true, false]),
        )
        .collect()?;
    Ok(out)
}

// ── Indicator sums ──────────────────────────────────────────────────────────

/// Column-wise count of `true` values, one output row per selected column in
/// selection order.
///
/// Output columns: `selection.label`, `Count`.
pub fn indicator_totals(
    df: &DataFrame,
    selection: &IndicatorSelection,
) -> Result<DataFrame, CensusError> {
    let mut totals: Vec<u64> = Vec::with_capacity(selection.columns.len());
    for &name in &selection.columns {
        let flags = df
            .column(name)
            .map_err(|_| CensusError::MissingColumn(name.to_string()))?
            .bool()?;
        totals.push(flags.into_iter().filter(|v| *v == Some(true)).count() as u64);
    }

    let out = DataFrame::new(vec![
        Series::new(selection.label.into(), selection.columns.clone()).into(),
        Series::new(labels::COUNT.into(), totals).into(),
    ])?;
    Ok(out)
}

pub fn activity_totals(df: &DataFrame) -> Result<DataFrame, CensusError> {
    indicator_totals(df, &IndicatorSelection::activities())
}

pub fn behaviour_totals(df: &DataFrame) -> Result<DataFrame, CensusError> {
    indicator_totals(df, &IndicatorSelection::behaviours())
}

// ── Scalars ─────────────────────────────────────────────────────────────────

/// Distinct squirrel identifiers, used as the population estimate.
pub fn population_size(df: &DataFrame) -> Result<usize, CensusError> {
    let ids = df.column(sighting::UNIQUE_SQUIRREL_ID)?;
    Ok(ids.as_materialized_series().n_unique()?)
}

/// Sightings per shift.
pub fn shift_totals(df: &DataFrame) -> Result<ShiftTotals, CensusError> {
    let mut totals = ShiftTotals::default();
    for shift in df.column(sighting::SHIFT)?.str()?.into_iter().flatten() {
        match shift.parse::<Shift>()? {
            Shift::Am => totals.am += 1,
            Shift::Pm => totals.pm += 1,
        }
    }
    Ok(totals)
}

// ── Typed views of the chart tables ─────────────────────────────────────────

/// Rows of a [`meetings_by_date_and_shift`] table.
pub fn date_shift_counts(frame: &DataFrame) -> Result<Vec<DateShiftCount>, CensusError> {
    let dates = frame.column(labels::DATE)?.str()?;
    let shifts = frame.column(labels::SHIFT)?.str()?;
    let counts = frame.column(labels::MEETINGS)?.u64()?;

    Ok(dates
        .into_iter()
        .zip(shifts)
        .zip(counts)
        .map(|((date, shift), count)| DateShiftCount {
            date: date.unwrap_or_default().to_string(),
            shift: shift.unwrap_or_default().to_string(),
            count: count.unwrap_or(0),
        })
        .collect())
}

/// Rows of a two-column (category, `Count`) table.
pub fn category_counts(
    frame: &DataFrame,
    category_column: &str,
) -> Result<Vec<CategoryCount>, CensusError> {
    let categories = frame.column(category_column)?.str()?;
    let counts = frame.column(labels::COUNT)?.u64()?;

    Ok(categories
        .into_iter()
        .zip(counts)
        .map(|(label, count)| CategoryCount {
            label: label.unwrap_or_default().to_string(),
            count: count.unwrap_or(0),
        })
        .collect())
}
