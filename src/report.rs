//! Plain-text rendering of a [`DashboardView`].
use std::fmt::Write as FmtWrite;

use serde_json::Value;

use crate::aggregation::CategoryCount;
use crate::dashboard::DashboardView;

fn bar_section(out: &mut String, title: &str, rows: &[CategoryCount]) {
    writeln!(out, "\n## {title}").unwrap();
    let width = rows.iter().map(|r| r.label.len()).max().unwrap_or(0);
    for row in rows {
        writeln!(out, "  {:<width$}  {:>6}", row.label, row.count).unwrap();
    }
}

pub fn render_text(view: &DashboardView) -> String {
    let mut out = String::new();

    writeln!(out, "# Central Park Squirrel Census").unwrap();
    writeln!(out, "Squirrel population: {}", view.population).unwrap();

    writeln!(out, "\n## Squirrel meetings by date").unwrap();
    for m in &view.meetings {
        writeln!(out, "  {}  {}  {:>6}", m.date, m.shift, m.count).unwrap();
    }
    writeln!(
        out,
        "Afternoon (PM) sightings: {}. Morning (AM) sightings: {}.",
        view.shift_totals.pm, view.shift_totals.am
    )
    .unwrap();

    bar_section(&mut out, "Squirrels by age", &view.age_groups);
    bar_section(&mut out, "What are the squirrels doing?", &view.activities);
    bar_section(&mut out, "Behaviour towards humans", &view.behaviours);

    let shifts: Vec<&str> = view.controls.shifts.iter().map(|s| s.label()).collect();
    writeln!(out, "\n## Map").unwrap();
    writeln!(
        out,
        "Filter: date = {}, shifts = [{}]",
        view.controls.date,
        shifts.join(", ")
    )
    .unwrap();
    writeln!(
        out,
        "Centre: ({:.5}, {:.5}), zoom {}",
        view.map.center.lat, view.map.center.lon, view.map.zoom
    )
    .unwrap();
    writeln!(
        out,
        "Sightings on map: {} ({} with known fur colour)",
        view.map.sightings,
        view.map.points.len()
    )
    .unwrap();

    if let Some(raw) = &view.raw {
        writeln!(out, "\n## Raw data (first {} rows)", raw.rows.len()).unwrap();
        writeln!(out, "  {}", raw.columns.join(" | ")).unwrap();
        for row in &raw.rows {
            let cells: Vec<String> = raw
                .columns
                .iter()
                .map(|c| match row.get(c) {
                    None | Some(Value::Null) => "-".to_string(),
                    Some(Value::String(s)) => s.clone(),
                    Some(other) => other.to_string(),
                })
                .collect();
            writeln!(out, "  {}", cells.join(" | ")).unwrap();
        }
    }

    out
}
