//! Trip request: the parameters a plan is generated from

use std::fmt::Display;

use serde::{Deserialize, Serialize};

use super::itinerary::Itinerary;
use super::point::{PointRole, Waypoint};
use crate::TripPlannerError;

/// Longest trip that can be planned
pub const MAX_DAYS: u32 = 30;
/// Largest travel party that can be planned for
pub const MAX_TRAVELERS: u32 = 20;

/// Overall flavour of the trip, passed to the itinerary prompt
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize, clap::ValueEnum)]
pub enum TripStyle {
    #[default]
    #[serde(alias = "luxury")]
    Luxury,
    #[serde(alias = "adventure")]
    Adventure,
    #[serde(alias = "cultural")]
    Cultural,
    #[serde(alias = "budget")]
    Budget,
    #[serde(alias = "romantic")]
    Romantic,
}

impl Display for TripStyle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            TripStyle::Luxury => "Luxury",
            TripStyle::Adventure => "Adventure",
            TripStyle::Cultural => "Cultural",
            TripStyle::Budget => "Budget",
            TripStyle::Romantic => "Romantic",
        };
        f.write_str(name)
    }
}

/// Trip parameters collected from the user
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripRequest {
    pub origin: String,
    pub destination: String,
    pub days: u32,
    pub travelers: u32,
    #[serde(default)]
    pub style: TripStyle,
}

impl Default for TripRequest {
    fn default() -> Self {
        Self {
            origin: "Mumbai, India".to_string(),
            destination: "Zurich, Switzerland".to_string(),
            days: 4,
            travelers: 2,
            style: TripStyle::default(),
        }
    }
}

impl TripRequest {
    /// Reject requests that cannot produce a meaningful plan
    pub fn validate(&self) -> crate::Result<()> {
        if self.origin.trim().is_empty() {
            return Err(TripPlannerError::validation("Origin cannot be empty"));
        }
        if self.destination.trim().is_empty() {
            return Err(TripPlannerError::validation("Destination cannot be empty"));
        }
        if !(1..=MAX_DAYS).contains(&self.days) {
            return Err(TripPlannerError::validation(format!(
                "Days must be between 1 and {MAX_DAYS}, got: {}",
                self.days
            )));
        }
        if !(1..=MAX_TRAVELERS).contains(&self.travelers) {
            return Err(TripPlannerError::validation(format!(
                "Travelers must be between 1 and {MAX_TRAVELERS}, got: {}",
                self.travelers
            )));
        }
        Ok(())
    }

    /// Places to geocode, in visiting order: origin, the itinerary's map points, destination
    #[must_use]
    pub fn waypoints(&self, itinerary: &Itinerary) -> Vec<Waypoint> {
        let mut waypoints = Vec::with_capacity(itinerary.map_coords.len() + 2);
        waypoints.push(Waypoint::new(self.origin.trim(), PointRole::Origin));
        waypoints.extend(
            itinerary
                .map_coords
                .iter()
                .map(|name| Waypoint::new(name.trim(), PointRole::Stop)),
        );
        waypoints.push(Waypoint::new(self.destination.trim(), PointRole::Destination));
        waypoints
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn test_default_request_is_valid() {
        assert!(TripRequest::default().validate().is_ok());
    }

    #[rstest]
    #[case(0, 2, "Days must be between")]
    #[case(31, 2, "Days must be between")]
    #[case(4, 0, "Travelers must be between")]
    #[case(4, 21, "Travelers must be between")]
    fn test_out_of_range_counts(#[case] days: u32, #[case] travelers: u32, #[case] expected: &str) {
        let request = TripRequest {
            days,
            travelers,
            ..TripRequest::default()
        };
        let err = request.validate().unwrap_err();
        assert!(matches!(err, TripPlannerError::Validation { .. }));
        assert!(err.to_string().contains(expected));
    }

    #[test]
    fn test_blank_destination_rejected() {
        let request = TripRequest {
            destination: "   ".to_string(),
            ..TripRequest::default()
        };
        assert!(request.validate().is_err());
    }

    #[test]
    fn test_waypoints_wrap_map_coords() {
        let request = TripRequest::default();
        let itinerary = Itinerary {
            map_coords: vec!["Lake Zurich".to_string(), " Uetliberg ".to_string()],
            ..Itinerary::default()
        };

        let waypoints = request.waypoints(&itinerary);
        let names: Vec<&str> = waypoints.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(
            names,
            vec!["Mumbai, India", "Lake Zurich", "Uetliberg", "Zurich, Switzerland"]
        );
        assert_eq!(waypoints[0].role, PointRole::Origin);
        assert_eq!(waypoints[1].role, PointRole::Stop);
        assert_eq!(waypoints[3].role, PointRole::Destination);
    }

    #[test]
    fn test_style_accepts_lowercase() {
        let style: TripStyle = serde_json::from_str("\"romantic\"").unwrap();
        assert_eq!(style, TripStyle::Romantic);
        assert_eq!(style.to_string(), "Romantic");
    }
}
