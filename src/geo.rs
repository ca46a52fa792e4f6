use polars::prelude::*;
use serde::Serialize;

use crate::error::CensusError;
use crate::schema::{color, sighting, FurColor, UNKNOWN};

/// Zoom level used for both sighting maps.
pub const MAP_ZOOM: u8 = 12;

#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GeoPoint {
    pub lat: f64,
    pub lon: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: u8,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: u8) -> Self {
        Self { r, g, b, a }
    }

    pub fn as_tuple(self) -> (u8, u8, u8, u8) {
        (self.r, self.g, self.b, self.a)
    }
}

pub const GRAY: Rgba = Rgba::new(128, 128, 128, 100);
pub const BLACK: Rgba = Rgba::new(0, 0, 0, 100);
/// Colour for every fur label other than gray and black.
pub const CINNAMON: Rgba = Rgba::new(210, 105, 30, 100);

impl FurColor {
    pub fn rgba(&self) -> Rgba {
        match self {
            FurColor::Gray => GRAY,
            FurColor::Black => BLACK,
            FurColor::Cinnamon | FurColor::Unknown | FurColor::Other(_) => CINNAMON,
        }
    }
}

/// Map colour of a fur label. Unknown rows are filtered out before this runs.
pub fn classify_color(fur_color: &str) -> Rgba {
    FurColor::from_label(fur_color).rgba()
}

/// Unweighted mean of each coordinate sequence.
///
/// Both sequences must be non-empty; an empty one is reported instead of
/// producing NaN.
pub fn midpoint(latitudes: &[f64], longitudes: &[f64]) -> Result<GeoPoint, CensusError> {
    if latitudes.is_empty() {
        return Err(CensusError::EmptyCoordinates("latitude"));
    }
    if longitudes.is_empty() {
        return Err(CensusError::EmptyCoordinates("longitude"));
    }
    let mean = |values: &[f64]| values.iter().sum::<f64>() / values.len() as f64;
    Ok(GeoPoint {
        lat: mean(latitudes),
        lon: mean(longitudes),
    })
}

fn coordinates(df: &DataFrame, name: &str) -> Result<Vec<f64>, CensusError> {
    Ok(df.column(name)?.f64()?.into_iter().flatten().collect())
}

/// Midpoint of a sightings table's `lat`/`lon` columns.
pub fn table_midpoint(df: &DataFrame) -> Result<GeoPoint, CensusError> {
    midpoint(
        &coordinates(df, sighting::LAT)?,
        &coordinates(df, sighting::LON)?,
    )
}

/// Rows with a known fur colour, with `r`, `g`, `b`, `a` columns appended.
pub fn color_mapped(df: &DataFrame) -> Result<DataFrame, CensusError> {
    let mut known = df
        .clone()
        .lazy()
        .filter(col(sighting::PRIMARY_FUR_COLOR).neq(lit(UNKNOWN)))
        .collect()?;

    let colors: Vec<Rgba> = known
        .column(sighting::PRIMARY_FUR_COLOR)?
        .str()?
        .into_iter()
        .map(|fur| classify_color(fur.unwrap_or_default()))
        .collect();

    for (name, channel) in [
        (color::R, colors.iter().map(|c| c.r as u32).collect::<Vec<_>>()),
        (color::G, colors.iter().map(|c| c.g as u32).collect()),
        (color::B, colors.iter().map(|c| c.b as u32).collect()),
        (color::A, colors.iter().map(|c| c.a as u32).collect()),
    ] {
        known.with_column(Series::new(name.into(), channel))?;
    }
    Ok(known)
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColorPoint {
    pub lat: f64,
    pub lon: f64,
    pub fur_color: String,
    pub color: Rgba,
}

/// Typed rows of a [`color_mapped`] table.
pub fn color_points(frame: &DataFrame) -> Result<Vec<ColorPoint>, CensusError> {
    let lats = frame.column(sighting::LAT)?.f64()?;
    let lons = frame.column(sighting::LON)?.f64()?;
    let furs = frame.column(sighting::PRIMARY_FUR_COLOR)?.str()?;
    let channels = [color::R, color::G, color::B, color::A]
        .iter()
        .map(|name| -> Result<&UInt32Chunked, CensusError> { Ok(frame.column(name)?.u32()?) })
        .collect::<Result<Vec<_>, _>>()?;

    let mut points = Vec::with_capacity(frame.height());
    for i in 0..frame.height() {
        let channel = |c: usize| channels[c].get(i).unwrap_or(0) as u8;
        points.push(ColorPoint {
            lat: lats.get(i).unwrap_or(f64::NAN),
            lon: lons.get(i).unwrap_or(f64::NAN),
            fur_color: furs.get(i).unwrap_or_default().to_string(),
            color: Rgba::new(channel(0), channel(1), channel(2), channel(3)),
        });
    }
    Ok(points)
}
