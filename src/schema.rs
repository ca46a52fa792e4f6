//! Column-name constants and typed labels for the squirrel census table.
//! Single source of truth - also exported to Python when the `python`
//! feature is enabled.
use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CensusError;

// ── Sighting columns (after name normalization) ─────────────────────────────
pub mod sighting {
    pub const UNIQUE_SQUIRREL_ID: &str = "unique_squirrel_id";
    pub const DATE: &str = "date";
    pub const SHIFT: &str = "shift";
    pub const LAT: &str = "lat";
    pub const LON: &str = "lon";
    pub const PRIMARY_FUR_COLOR: &str = "primary_fur_color";
    pub const AGE: &str = "age";
}

// ── Indicator columns ───────────────────────────────────────────────────────
pub mod activity {
    pub const RUNNING: &str = "running";
    pub const CHASING: &str = "chasing";
    pub const CLIMBING: &str = "climbing";
    pub const EATING: &str = "eating";
    pub const FORAGING: &str = "foraging";

    pub const ALL: [&str; 5] = [RUNNING, CHASING, CLIMBING, EATING, FORAGING];
}

pub mod behaviour {
    pub const APPROACHES: &str = "approaches";
    pub const INDIFFERENT: &str = "indifferent";
    pub const RUNS_FROM: &str = "runs_from";

    pub const ALL: [&str; 3] = [APPROACHES, INDIFFERENT, RUNS_FROM];
}

// ── Chart table labels ──────────────────────────────────────────────────────
pub mod labels {
    pub const DATE: &str = "Date";
    pub const SHIFT: &str = "Shift";
    pub const MEETINGS: &str = "Number of squirrel meetings";
    pub const AGE: &str = "Age";
    pub const ACTIVITY: &str = "Activity";
    pub const BEHAVIOUR: &str = "Behaviour";
    pub const COUNT: &str = "Count";
}

// ── Colour columns added for the fur map ────────────────────────────────────
pub mod color {
    pub const R: &str = "r";
    pub const G: &str = "g";
    pub const B: &str = "b";
    pub const A: &str = "a";
}

/// Sentinel date label meaning "do not filter by date".
pub const ALL_DATES: &str = "All dates";

/// Label used for an unknown age or fur colour.
pub const UNKNOWN: &str = "Unknown";

/// Raw age token normalized to [`UNKNOWN`] at load time.
pub const AGE_UNKNOWN_TOKEN: &str = "?";

/// Every column the loader requires, in table order.
pub const REQUIRED_COLUMNS: [&str; 15] = [
    sighting::UNIQUE_SQUIRREL_ID,
    sighting::DATE,
    sighting::SHIFT,
    sighting::LAT,
    sighting::LON,
    sighting::PRIMARY_FUR_COLOR,
    sighting::AGE,
    activity::RUNNING,
    activity::CHASING,
    activity::CLIMBING,
    activity::EATING,
    activity::FORAGING,
    behaviour::APPROACHES,
    behaviour::INDIFFERENT,
    behaviour::RUNS_FROM,
];

/// Coarse time-of-day bucket of a sighting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Shift {
    #[serde(rename = "AM")]
    Am,
    #[serde(rename = "PM")]
    Pm,
}

impl Shift {
    pub const ALL: [Shift; 2] = [Shift::Am, Shift::Pm];

    pub fn label(self) -> &'static str {
        match self {
            Shift::Am => "AM",
            Shift::Pm => "PM",
        }
    }
}

impl fmt::Display for Shift {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Shift {
    type Err = CensusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "AM" => Ok(Shift::Am),
            "PM" => Ok(Shift::Pm),
            other => Err(CensusError::UnknownShift(other.to_string())),
        }
    }
}

/// Primary fur colour of a sighting.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FurColor {
    Gray,
    Black,
    Cinnamon,
    Unknown,
    Other(String),
}

impl FurColor {
    pub fn from_label(label: &str) -> Self {
        match label {
            "Gray" => FurColor::Gray,
            "Black" => FurColor::Black,
            "Cinnamon" => FurColor::Cinnamon,
            UNKNOWN => FurColor::Unknown,
            other => FurColor::Other(other.to_string()),
        }
    }

    pub fn label(&self) -> &str {
        match self {
            FurColor::Gray => "Gray",
            FurColor::Black => "Black",
            FurColor::Cinnamon => "Cinnamon",
            FurColor::Unknown => UNKNOWN,
            FurColor::Other(label) => label,
        }
    }
}
