//! One render pass of the census dashboard.
//!
//! Overview charts are computed on the full table. The maps and the raw
//! data view see the table after the shift filter and then the date
//! filter. Both maps are centred on the midpoint of the full table.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use polars::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::debug;

use crate::aggregation::{
    activity_totals, age_groups, behaviour_totals, category_counts, date_shift_counts,
    meetings_by_date_and_shift, population_size, shift_totals, CategoryCount, DateShiftCount,
    ShiftTotals,
};
use crate::error::CensusError;
use crate::filter::{date_options, filter_by_date, filter_by_shift, preview, DateSelection, RAW_PREVIEW_ROWS};
use crate::geo::{color_mapped, color_points, table_midpoint, ColorPoint, GeoPoint, MAP_ZOOM};
use crate::schema::{labels, Shift};

/// User-facing controls of the dashboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DashboardControls {
    pub date: DateSelection,
    pub shifts: BTreeSet<Shift>,
    pub show_raw: bool,
}

impl Default for DashboardControls {
    fn default() -> Self {
        Self {
            date: DateSelection::AllDates,
            shifts: Shift::ALL.into_iter().collect(),
            show_raw: false,
        }
    }
}

impl DashboardControls {
    /// Build the accepted shift set from the AM/PM toggles.
    pub fn with_shift_toggles(mut self, am: bool, pm: bool) -> Self {
        self.shifts = Shift::ALL
            .into_iter()
            .filter(|s| match s {
                Shift::Am => am,
                Shift::Pm => pm,
            })
            .collect();
        self
    }
}

/// First rows of the filtered table, every column included.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RawView {
    /// Column names in table order.
    pub columns: Vec<String>,
    pub rows: Vec<Map<String, Value>>,
}

fn json_value(value: AnyValue<'_>) -> Value {
    match value {
        AnyValue::Null => Value::Null,
        AnyValue::Boolean(b) => Value::Bool(b),
        AnyValue::String(s) => Value::String(s.to_string()),
        AnyValue::StringOwned(s) => Value::String(s.to_string()),
        AnyValue::Int32(v) => Value::from(v),
        AnyValue::Int64(v) => Value::from(v),
        AnyValue::UInt32(v) => Value::from(v),
        AnyValue::UInt64(v) => Value::from(v),
        AnyValue::Float32(v) => Number::from_f64(f64::from(v)).map_or(Value::Null, Value::Number),
        AnyValue::Float64(v) => Number::from_f64(v).map_or(Value::Null, Value::Number),
        other => Value::String(other.to_string()),
    }
}

/// Every column of `df`, row by row.
pub fn raw_view(df: &DataFrame) -> Result<RawView, CensusError> {
    let columns: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.to_string())
        .collect();
    let mut rows = Vec::with_capacity(df.height());
    for i in 0..df.height() {
        let mut row = Map::new();
        for (name, column) in columns.iter().zip(df.get_columns()) {
            row.insert(name.clone(), json_value(column.get(i)?));
        }
        rows.push(row);
    }
    Ok(RawView { columns, rows })
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MapView {
    pub center: GeoPoint,
    pub zoom: u8,
    /// Sightings placed on the density map.
    pub sightings: usize,
    /// Sightings with a known fur colour, for the colour-coded map.
    pub points: Vec<ColorPoint>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardView {
    pub generated_at: DateTime<Utc>,
    pub controls: DashboardControls,
    pub date_options: Vec<String>,
    pub population: usize,
    pub shift_totals: ShiftTotals,
    pub meetings: Vec<DateShiftCount>,
    pub age_groups: Vec<CategoryCount>,
    pub activities: Vec<CategoryCount>,
    pub behaviours: Vec<CategoryCount>,
    pub map: MapView,
    pub raw: Option<RawView>,
}

/// Filtered rows feeding the maps and the raw view: shift filter first, then
/// the date filter.
pub fn map_rows(table: &DataFrame, controls: &DashboardControls) -> Result<DataFrame, CensusError> {
    let by_shift = filter_by_shift(table, &controls.shifts)?;
    filter_by_date(&by_shift, &controls.date)
}

/// Compute every dashboard output from the loaded table.
///
/// The table must be non-empty: the map centre is its midpoint.
pub fn build(table: &DataFrame, controls: &DashboardControls) -> Result<DashboardView, CensusError> {
    let meetings = date_shift_counts(&meetings_by_date_and_shift(table)?)?;
    let ages = category_counts(&age_groups(table)?, labels::AGE)?;
    let activities = category_counts(&activity_totals(table)?, labels::ACTIVITY)?;
    let behaviours = category_counts(&behaviour_totals(table)?, labels::BEHAVIOUR)?;
    let center = table_midpoint(table)?;

    let rows = map_rows(table, controls)?;
    debug!(
        date = %controls.date,
        shifts = ?controls.shifts,
        rows = rows.height(),
        "Dashboard map rows selected"
    );
    let points = color_points(&color_mapped(&rows)?)?;
    let raw = if controls.show_raw {
        Some(raw_view(&preview(&rows, RAW_PREVIEW_ROWS))?)
    } else {
        None
    };

    Ok(DashboardView {
        generated_at: Utc::now(),
        controls: controls.clone(),
        date_options: date_options(table)?,
        population: population_size(table)?,
        shift_totals: shift_totals(table)?,
        meetings,
        age_groups: ages,
        activities,
        behaviours,
        map: MapView {
            center,
            zoom: MAP_ZOOM,
            sightings: rows.height(),
            points,
        },
        raw,
    })
}
