//! Points of the trip: places to geocode and their day assignment

use serde::{Deserialize, Serialize};

/// Where a waypoint sits in the trip
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PointRole {
    Origin,
    Stop,
    Destination,
}

/// A named place that still needs coordinates
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Waypoint {
    pub name: String,
    pub role: PointRole,
}

impl Waypoint {
    #[must_use]
    pub fn new(name: impl Into<String>, role: PointRole) -> Self {
        Self {
            name: name.into(),
            role,
        }
    }
}

/// One row of the point table: a geocoded place and its day group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DayPoint {
    pub name: String,
    pub latitude: f64,
    pub longitude: f64,
    pub role: PointRole,
    /// Zero-based day group, always below the number of groups
    pub day: usize,
}

impl DayPoint {
    #[must_use]
    pub fn coordinates(&self) -> (f64, f64) {
        (self.latitude, self.longitude)
    }
}
