//! Straight-line distance roll-up over the day-ordered point table

use std::collections::BTreeMap;

use haversine::{Location as HaversineLocation, Units, distance};
use serde::{Deserialize, Serialize};

use crate::models::DayPoint;

/// Great-circle distance in kilometres between two `(lat, lon)` pairs
#[must_use]
pub fn distance_km(from: (f64, f64), to: (f64, f64)) -> f64 {
    distance(
        HaversineLocation {
            latitude: from.0,
            longitude: from.1,
        },
        HaversineLocation {
            latitude: to.0,
            longitude: to.1,
        },
        Units::Kilometers,
    )
}

/// Whole kilometres between the first and last row of the table.
/// `None` with fewer than two points.
#[must_use]
pub fn span_km(points: &[DayPoint]) -> Option<u64> {
    if points.len() < 2 {
        return None;
    }
    let first = points.first()?;
    let last = points.last()?;
    Some(distance_km(first.coordinates(), last.coordinates()) as u64)
}

/// Sum of consecutive legs through the table, in row order
#[must_use]
pub fn path_km(points: &[DayPoint]) -> Option<f64> {
    if points.len() < 2 {
        return None;
    }
    Some(legs_km(points.iter()))
}

fn legs_km<'a>(points: impl Iterator<Item = &'a DayPoint>) -> f64 {
    let coordinates: Vec<(f64, f64)> = points.map(DayPoint::coordinates).collect();
    coordinates
        .windows(2)
        .map(|leg| distance_km(leg[0], leg[1]))
        .sum()
}

/// Stops of one day group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DaySummary {
    pub day: usize,
    pub stops: Vec<String>,
    /// Straight-line length of the day's stops in table order
    pub path_km: f64,
}

/// Per-day stop lists and lengths, ordered by day
#[must_use]
pub fn day_summaries(points: &[DayPoint]) -> Vec<DaySummary> {
    let mut by_day: BTreeMap<usize, Vec<&DayPoint>> = BTreeMap::new();
    for point in points {
        by_day.entry(point.day).or_default().push(point);
    }

    by_day
        .into_iter()
        .map(|(day, stops)| DaySummary {
            day,
            path_km: legs_km(stops.iter().copied()),
            stops: stops.iter().map(|p| p.name.clone()).collect(),
        })
        .collect()
}
