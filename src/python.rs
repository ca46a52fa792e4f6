use std::collections::BTreeSet;
use std::path::Path;

use pyo3::prelude::*;
use pyo3::types::PyModule;
use pyo3_polars::PyDataFrame;

use crate::aggregation;
use crate::config::SourceConfig;
use crate::filter::{self, DateSelection};
use crate::geo;
use crate::loader::SightingStore;
use crate::schema::{self, Shift};
use crate::source::FileSource;

/// Census dataset handle backed by a cached [`SightingStore`].
#[pyclass]
pub struct CensusModel {
    store: SightingStore<FileSource>,
}

#[pymethods]
impl CensusModel {
    #[new]
    fn new(config_path: String) -> PyResult<Self> {
        let config = SourceConfig::from_file(Path::new(&config_path))?;
        let store =
            SightingStore::new(FileSource::from_config(&config)).with_bounds(config.bounds);
        Ok(Self { store })
    }

    // ── Data loading ────────────────────────────────────────────────────────

    /// The validated sightings table, loaded on first access.
    fn table(&self) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(self.store.table()?.clone()))
    }

    #[getter]
    fn is_loaded(&self) -> bool {
        self.store.is_loaded()
    }

    fn invalidate(&mut self) {
        self.store.invalidate();
    }

    fn date_options(&self) -> PyResult<Vec<String>> {
        Ok(filter::date_options(self.store.table()?)?)
    }

    // ── Filtering ───────────────────────────────────────────────────────────

    #[staticmethod]
    fn filter_by_date(df: PyDataFrame, date: &str) -> PyResult<PyDataFrame> {
        let out = filter::filter_by_date(&df.0, &DateSelection::from_label(date))?;
        Ok(PyDataFrame(out))
    }

    /// Keep rows whose shift is in `shifts` ("AM"/"PM"). An empty list keeps nothing.
    #[staticmethod]
    fn filter_by_shift(df: PyDataFrame, shifts: Vec<String>) -> PyResult<PyDataFrame> {
        let accepted = shifts
            .iter()
            .map(|s| s.parse::<Shift>())
            .collect::<Result<BTreeSet<_>, _>>()?;
        Ok(PyDataFrame(filter::filter_by_shift(&df.0, &accepted)?))
    }

    #[staticmethod]
    #[pyo3(signature = (df, n=filter::RAW_PREVIEW_ROWS))]
    fn preview(df: PyDataFrame, n: usize) -> PyDataFrame {
        PyDataFrame(filter::preview(&df.0, n))
    }

    // ── Aggregation ─────────────────────────────────────────────────────────

    #[staticmethod]
    fn meetings_by_date_and_shift(df: PyDataFrame) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(aggregation::meetings_by_date_and_shift(&df.0)?))
    }

    #[staticmethod]
    fn age_groups(df: PyDataFrame) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(aggregation::age_groups(&df.0)?))
    }

    #[staticmethod]
    fn activities(df: PyDataFrame) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(aggregation::activity_totals(&df.0)?))
    }

    #[staticmethod]
    fn behaviours(df: PyDataFrame) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(aggregation::behaviour_totals(&df.0)?))
    }

    #[staticmethod]
    fn population(df: PyDataFrame) -> PyResult<usize> {
        Ok(aggregation::population_size(&df.0)?)
    }

    // ── Maps ────────────────────────────────────────────────────────────────

    /// (lat, lon) mean of the table. Raises on an empty table.
    #[staticmethod]
    fn midpoint(df: PyDataFrame) -> PyResult<(f64, f64)> {
        let point = geo::table_midpoint(&df.0)?;
        Ok((point.lat, point.lon))
    }

    #[staticmethod]
    fn color_mapped(df: PyDataFrame) -> PyResult<PyDataFrame> {
        Ok(PyDataFrame(geo::color_mapped(&df.0)?))
    }

    #[staticmethod]
    fn classify_color(fur_color: &str) -> (u8, u8, u8, u8) {
        geo::classify_color(fur_color).as_tuple()
    }
}

/// Export schema constants as Python submodules
fn add_schema_exports(m: &Bound<'_, PyModule>) -> PyResult<()> {
    let sighting = PyModule::new(m.py(), "sighting")?;
    sighting.add("UNIQUE_SQUIRREL_ID", schema::sighting::UNIQUE_SQUIRREL_ID)?;
    sighting.add("DATE", schema::sighting::DATE)?;
    sighting.add("SHIFT", schema::sighting::SHIFT)?;
    sighting.add("LAT", schema::sighting::LAT)?;
    sighting.add("LON", schema::sighting::LON)?;
    sighting.add("PRIMARY_FUR_COLOR", schema::sighting::PRIMARY_FUR_COLOR)?;
    sighting.add("AGE", schema::sighting::AGE)?;
    m.add_submodule(&sighting)?;

    let activity = PyModule::new(m.py(), "activity")?;
    activity.add("ALL", schema::activity::ALL.to_vec())?;
    m.add_submodule(&activity)?;

    let behaviour = PyModule::new(m.py(), "behaviour")?;
    behaviour.add("ALL", schema::behaviour::ALL.to_vec())?;
    m.add_submodule(&behaviour)?;

    m.add("ALL_DATES", schema::ALL_DATES)?;
    m.add("UNKNOWN", schema::UNKNOWN)?;
    Ok(())
}

#[pymodule]
fn squirrel_census(m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_class::<CensusModel>()?;
    add_schema_exports(m)?;
    Ok(())
}
