use polars::prelude::*;

use crate::loader::{normalize_column_names, prepare_sightings};

/// Five raw sightings over two days, as a warehouse export would hand them
/// over: string-typed, mixed-case headers, raw `?` age token.
pub(crate) fn raw_sightings() -> DataFrame {
    let df = df!(
        "Unique_Squirrel_ID" => [Some("1A-AM-1006-01"), Some("1A-PM-1006-01"), Some("2B-AM-1007-01"), Some("2B-AM-1007-01"), None],
        "Date" => ["2020-01-01", "2020-01-01", "2020-01-02", "2020-01-02", "2020-01-02"],
        "Shift" => ["AM", "PM", "AM", "AM", "PM"],
        "Lat" => ["40.0", "41.0", "40.5", "40.5", "40.5"],
        "Lon" => ["-73.0", "-75.0", "-74.0", "-74.0", "-74.0"],
        "Primary_Fur_Color" => ["Gray", "Black", "Cinnamon", "Unknown", "Gray"],
        "Age" => [Some("Adult"), Some("?"), Some("Juvenile"), Some("Unknown"), None],
        "Running" => ["true", "false", "false", "true", "false"],
        "Chasing" => ["false", "false", "false", "false", "true"],
        "Climbing" => ["1", "0", "0", "0", "0"],
        "Eating" => ["false", "true", "true", "false", "false"],
        "Foraging" => ["true", "true", "true", "false", "true"],
        "Approaches" => ["false", "false", "true", "false", "false"],
        "Indifferent" => ["true", "false", "false", "true", "true"],
        "Runs_From" => ["false", "true", "false", "false", "false"],
    )
    .unwrap();
    normalize_column_names(df).unwrap()
}

/// [`raw_sightings`] after validation, as the store would cache it.
pub(crate) fn sightings() -> DataFrame {
    prepare_sightings(raw_sightings(), None).unwrap()
}
