//! Load boundary: fetch the raw table once, normalize column names, and
//! validate every required column into its typed representation.
//!
//! After [`prepare_sightings`] the table has this shape:
//!
//! | column               | dtype   | notes                              |
//! |----------------------|---------|------------------------------------|
//! | `unique_squirrel_id` | String  | nullable                           |
//! | `date`               | String  | date label, never null             |
//! | `shift`              | String  | exactly `AM` or `PM`               |
//! | `lat`, `lon`         | Float64 | finite, in range, never null       |
//! | `primary_fur_color`  | String  | missing values become `Unknown`    |
//! | `age`                | String  | `?` becomes `Unknown`, nullable    |
//! | indicator columns    | Boolean | never null                         |
//!
//! Columns outside the schema are kept as fetched.

use std::sync::OnceLock;

use polars::prelude::*;
use tracing::{debug, info, warn};

use crate::config::Bounds;
use crate::error::CensusError;
use crate::schema::{activity, behaviour, sighting, Shift, AGE_UNKNOWN_TOKEN, REQUIRED_COLUMNS, UNKNOWN};
use crate::source::TableSource;

/// Trim and lowercase every column name.
pub fn normalize_column_names(mut df: DataFrame) -> Result<DataFrame, CensusError> {
    let normalized: Vec<String> = df
        .get_column_names_str()
        .iter()
        .map(|c| c.trim().to_lowercase())
        .collect();
    df.set_column_names(normalized.as_slice())?;
    Ok(df)
}

fn require_columns(df: &DataFrame, required: &[&str]) -> Result<(), CensusError> {
    for &col_name in required {
        if df.column(col_name).is_err() {
            return Err(CensusError::MissingColumn(col_name.to_string()));
        }
    }
    Ok(())
}

/// Values of `name` cast to strings and trimmed. Empty strings read as null.
fn trimmed_strings(df: &DataFrame, name: &str) -> Result<Vec<Option<String>>, CensusError> {
    let column = df
        .column(name)
        .map_err(|_| CensusError::MissingColumn(name.to_string()))?
        .cast(&DataType::String)?;
    Ok(column
        .str()?
        .into_iter()
        .map(|v| {
            v.map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string)
        })
        .collect())
}

fn parse_indicator(raw: Option<&str>) -> Option<bool> {
    let Some(raw) = raw else {
        return Some(false);
    };
    match raw.to_ascii_lowercase().as_str() {
        "true" | "t" | "1" | "yes" | "y" => Some(true),
        "false" | "f" | "0" | "no" | "n" => Some(false),
        // Numeric exports (e.g. Float64 0/1 columns) arrive as "1.0" / "0.0".
        other => match other.parse::<f64>() {
            Ok(v) if v == 1.0 => Some(true),
            Ok(v) if v == 0.0 => Some(false),
            _ => None,
        },
    }
}

fn parse_coordinate(
    column: &str,
    row: usize,
    raw: Option<&str>,
    limit: f64,
) -> Result<f64, CensusError> {
    let raw = raw.ok_or_else(|| CensusError::invalid(column, row, "missing coordinate"))?;
    let value: f64 = raw
        .parse()
        .map_err(|_| CensusError::invalid(column, row, format!("'{raw}' is not a number")))?;
    if !value.is_finite() || value.abs() > limit {
        return Err(CensusError::invalid(
            column,
            row,
            format!("{value} is outside [-{limit}, {limit}]"),
        ));
    }
    Ok(value)
}

/// Validate a raw table (names already normalized) into the typed schema.
///
/// This is the single point where values are coerced. Anything that cannot
/// be coerced is rejected with the offending row and column.
pub fn prepare_sightings(
    mut df: DataFrame,
    bounds: Option<&Bounds>,
) -> Result<DataFrame, CensusError> {
    require_columns(&df, &REQUIRED_COLUMNS)?;

    let ids = trimmed_strings(&df, sighting::UNIQUE_SQUIRREL_ID)?;

    let dates = trimmed_strings(&df, sighting::DATE)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| v.ok_or_else(|| CensusError::invalid(sighting::DATE, row, "missing date")))
        .collect::<Result<Vec<String>, _>>()?;

    let shifts = trimmed_strings(&df, sighting::SHIFT)?
        .into_iter()
        .enumerate()
        .map(|(row, v)| {
            let raw = v.unwrap_or_default();
            raw.parse::<Shift>()
                .map(|s| s.label())
                .map_err(|e| CensusError::invalid(sighting::SHIFT, row, e.to_string()))
        })
        .collect::<Result<Vec<&str>, _>>()?;

    let raw_lats = trimmed_strings(&df, sighting::LAT)?;
    let raw_lons = trimmed_strings(&df, sighting::LON)?;
    let mut lats = Vec::with_capacity(raw_lats.len());
    let mut lons = Vec::with_capacity(raw_lons.len());
    for (row, (lat, lon)) in raw_lats.iter().zip(raw_lons.iter()).enumerate() {
        let lat = parse_coordinate(sighting::LAT, row, lat.as_deref(), 90.0)?;
        let lon = parse_coordinate(sighting::LON, row, lon.as_deref(), 180.0)?;
        if let Some(bounds) = bounds {
            if !bounds.contains(lat, lon) {
                let column = if bounds.contains_lat(lat) {
                    sighting::LON
                } else {
                    sighting::LAT
                };
                return Err(CensusError::invalid(
                    column,
                    row,
                    format!("({lat}, {lon}) is outside the configured bounds"),
                ));
            }
        }
        lats.push(lat);
        lons.push(lon);
    }

    let fur_colors: Vec<String> = trimmed_strings(&df, sighting::PRIMARY_FUR_COLOR)?
        .into_iter()
        .map(|v| v.unwrap_or_else(|| UNKNOWN.to_string()))
        .collect();

    let ages: Vec<Option<String>> = trimmed_strings(&df, sighting::AGE)?
        .into_iter()
        .map(|v| {
            v.map(|age| {
                if age == AGE_UNKNOWN_TOKEN {
                    UNKNOWN.to_string()
                } else {
                    age
                }
            })
        })
        .collect();

    df.with_column(Series::new(sighting::UNIQUE_SQUIRREL_ID.into(), ids))?;
    df.with_column(Series::new(sighting::DATE.into(), dates))?;
    df.with_column(Series::new(sighting::SHIFT.into(), shifts))?;
    df.with_column(Series::new(sighting::LAT.into(), lats))?;
    df.with_column(Series::new(sighting::LON.into(), lons))?;
    df.with_column(Series::new(sighting::PRIMARY_FUR_COLOR.into(), fur_colors))?;
    df.with_column(Series::new(sighting::AGE.into(), ages))?;

    for name in activity::ALL.iter().chain(behaviour::ALL.iter()) {
        let flags = trimmed_strings(&df, name)?
            .iter()
            .enumerate()
            .map(|(row, v)| {
                parse_indicator(v.as_deref()).ok_or_else(|| {
                    CensusError::invalid(
                        name,
                        row,
                        format!("'{}' is not a boolean indicator", v.as_deref().unwrap_or("")),
                    )
                })
            })
            .collect::<Result<Vec<bool>, _>>()?;
        df.with_column(Series::new((*name).into(), flags))?;
    }

    Ok(df)
}

/// Fetch, normalize and validate a table from `source`.
pub fn load(source: &dyn TableSource, bounds: Option<&Bounds>) -> Result<DataFrame, CensusError> {
    info!(source = %source.describe(), "Loading sightings");
    let raw = source.fetch()?;
    let df = prepare_sightings(normalize_column_names(raw)?, bounds)?;
    info!(rows = df.height(), columns = df.width(), "Sightings loaded");
    Ok(df)
}

/// Write-once cache of the loaded sightings table.
///
/// The first call to [`SightingStore::table`] fetches and validates the
/// table; later calls return the same snapshot. Pass the store to whoever
/// needs the table instead of keeping it in a global.
pub struct SightingStore<S: TableSource> {
    source: S,
    bounds: Option<Bounds>,
    table: OnceLock<DataFrame>,
}

impl<S: TableSource> SightingStore<S> {
    pub fn new(source: S) -> Self {
        Self {
            source,
            bounds: None,
            table: OnceLock::new(),
        }
    }

    pub fn with_bounds(mut self, bounds: Option<Bounds>) -> Self {
        self.bounds = bounds;
        self
    }

    /// The cached table, loading it on first access.
    pub fn table(&self) -> Result<&DataFrame, CensusError> {
        if let Some(df) = self.table.get() {
            debug!("Serving cached sightings table");
            return Ok(df);
        }
        let df = load(&self.source, self.bounds.as_ref())?;
        Ok(self.table.get_or_init(|| df))
    }

    pub fn is_loaded(&self) -> bool {
        self.table.get().is_some()
    }

    /// Drop the cached table; the next access reloads from the source.
    pub fn invalidate(&mut self) {
        if self.table.take().is_some() {
            warn!(source = %self.source.describe(), "Sightings cache invalidated");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::FrameSource;
    use crate::test_fixtures::raw_sightings;

    #[test]
    fn column_names_are_trimmed_and_lowercased() {
        let df = df!(" Unique_Squirrel_ID " => ["a"], "LAT" => ["40.7"]).unwrap();
        let df = normalize_column_names(df).unwrap();
        assert_eq!(df.get_column_names_str(), vec!["unique_squirrel_id", "lat"]);
    }

    #[test]
    fn prepare_types_every_schema_column() {
        let df = prepare_sightings(raw_sightings(), None).unwrap();
        assert_eq!(df.column(sighting::LAT).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(sighting::LON).unwrap().dtype(), &DataType::Float64);
        assert_eq!(df.column(activity::EATING).unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.column(behaviour::RUNS_FROM).unwrap().dtype(), &DataType::Boolean);
        assert_eq!(df.height(), 5);
    }

    #[test]
    fn question_mark_age_becomes_unknown() {
        let df = prepare_sightings(raw_sightings(), None).unwrap();
        let ages: Vec<Option<&str>> = df.column(sighting::AGE).unwrap().str().unwrap().into_iter().collect();
        assert_eq!(
            ages,
            vec![Some("Adult"), Some("Unknown"), Some("Juvenile"), Some("Unknown"), None]
        );
    }

    #[test]
    fn preparing_twice_is_idempotent() {
        let once = prepare_sightings(raw_sightings(), None).unwrap();
        let twice = prepare_sightings(once.clone(), None).unwrap();
        assert!(once.equals_missing(&twice));
    }

    #[test]
    fn missing_fur_color_becomes_unknown() {
        let mut raw = raw_sightings();
        raw.with_column(Series::new(
            sighting::PRIMARY_FUR_COLOR.into(),
            [Some("Gray"), None, Some(" "), Some("Black"), Some("Cinnamon")],
        ))
        .unwrap();
        let df = prepare_sightings(raw, None).unwrap();
        let furs: Vec<Option<&str>> = df
            .column(sighting::PRIMARY_FUR_COLOR)
            .unwrap()
            .str()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(furs[1], Some(UNKNOWN));
        assert_eq!(furs[2], Some(UNKNOWN));
    }

    #[test]
    fn missing_required_column_is_reported() {
        let raw = raw_sightings().drop(sighting::SHIFT).unwrap();
        match prepare_sightings(raw, None) {
            Err(CensusError::MissingColumn(name)) => assert_eq!(name, sighting::SHIFT),
            other => panic!("expected MissingColumn, got {other:?}"),
        }
    }

    #[test]
    fn unknown_shift_is_rejected_with_its_row() {
        let mut raw = raw_sightings();
        raw.with_column(Series::new(
            sighting::SHIFT.into(),
            ["AM", "PM", "Noon", "AM", "PM"],
        ))
        .unwrap();
        match prepare_sightings(raw, None) {
            Err(CensusError::InvalidData { column, row, .. }) => {
                assert_eq!(column, sighting::SHIFT);
                assert_eq!(row, 2);
            }
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn unparsable_coordinate_is_rejected() {
        let mut raw = raw_sightings();
        raw.with_column(Series::new(
            sighting::LON.into(),
            ["-73.95", "-73.96", "west", "-73.97", "-73.98"],
        ))
        .unwrap();
        assert!(matches!(
            prepare_sightings(raw, None),
            Err(CensusError::InvalidData { row: 2, .. })
        ));
    }

    #[test]
    fn coordinates_outside_bounds_are_rejected() {
        let bounds = Bounds {
            min_lat: 40.0,
            max_lat: 40.5,
            min_lon: -74.0,
            max_lon: -73.0,
        };
        assert!(prepare_sightings(raw_sightings(), Some(&bounds)).is_err());
    }

    #[test]
    fn odd_indicator_value_is_rejected() {
        let mut raw = raw_sightings();
        raw.with_column(Series::new(
            activity::RUNNING.into(),
            ["true", "maybe", "false", "false", "true"],
        ))
        .unwrap();
        assert!(matches!(
            prepare_sightings(raw, None),
            Err(CensusError::InvalidData { row: 1, .. })
        ));
    }

    #[test]
    fn indicator_spellings_are_accepted() {
        assert_eq!(parse_indicator(Some("TRUE")), Some(true));
        assert_eq!(parse_indicator(Some("1")), Some(true));
        assert_eq!(parse_indicator(Some("No")), Some(false));
        assert_eq!(parse_indicator(None), Some(false));
        assert_eq!(parse_indicator(Some("2")), None);
        assert_eq!(parse_indicator(Some("1.0")), Some(true));
        assert_eq!(parse_indicator(Some("0.0")), Some(false));
        assert_eq!(parse_indicator(Some("0.5")), None);
    }

    #[test]
    fn float_indicator_columns_load_as_booleans() {
        let mut raw = raw_sightings();
        raw.with_column(Series::new(
            activity::RUNNING.into(),
            [1.0f64, 0.0, 1.0, 0.0, 0.0],
        ))
        .unwrap();
        let df = prepare_sightings(raw, None).unwrap();
        let running: Vec<Option<bool>> = df
            .column(activity::RUNNING)
            .unwrap()
            .bool()
            .unwrap()
            .into_iter()
            .collect();
        assert_eq!(
            running,
            vec![Some(true), Some(false), Some(true), Some(false), Some(false)]
        );
    }

    #[test]
    fn float_indicator_outside_zero_one_is_rejected() {
        let mut raw = raw_sightings();
        raw.with_column(Series::new(
            activity::EATING.into(),
            [0.0f64, 1.0, 2.0, 0.0, 1.0],
        ))
        .unwrap();
        assert!(matches!(
            prepare_sightings(raw, None),
            Err(CensusError::InvalidData { row: 2, .. })
        ));
    }

    #[test]
    fn longitude_outside_bounds_names_the_longitude_column() {
        let bounds = Bounds {
            min_lat: 39.0,
            max_lat: 42.0,
            min_lon: -74.5,
            max_lon: -72.0,
        };
        match prepare_sightings(raw_sightings(), Some(&bounds)) {
            Err(CensusError::InvalidData { column, row, .. }) => {
                assert_eq!(column, sighting::LON);
                assert_eq!(row, 1);
            }
            other => panic!("expected InvalidData, got {other:?}"),
        }
    }

    #[test]
    fn store_loads_once_and_reloads_after_invalidate() {
        let mut store = SightingStore::new(FrameSource::new(raw_sightings()));
        assert!(!store.is_loaded());

        let first = store.table().unwrap() as *const DataFrame;
        let second = store.table().unwrap() as *const DataFrame;
        assert_eq!(first, second);
        assert!(store.is_loaded());

        store.invalidate();
        assert!(!store.is_loaded());
        assert_eq!(store.table().unwrap().height(), 5);
    }

    #[test]
    fn failed_load_leaves_store_empty() {
        let raw = raw_sightings().drop(sighting::DATE).unwrap();
        let store = SightingStore::new(FrameSource::new(raw));
        assert!(store.table().is_err());
        assert!(!store.is_loaded());
    }
}
