//! Squirrel census dataset: load the engineered sightings table once, then
//! filter and aggregate it into the tables, map centre and colours a
//! dashboard renders.

pub mod aggregation;
pub mod config;
pub mod dashboard;
pub mod error;
pub mod filter;
pub mod geo;
pub mod loader;
pub mod report;
pub mod schema;
pub mod source;

#[cfg(feature = "python")]
mod python;

#[cfg(test)]
mod test_fixtures;

pub use error::CensusError;
pub use loader::SightingStore;
