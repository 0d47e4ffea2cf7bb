//! Data models for the TripPlanner application
//!
//! This module contains the core domain models organized by concern:
//! - Trip: the request a plan is generated from
//! - Itinerary: the structured plan returned by the language model
//! - Location: Geographic coordinates and metadata
//! - Point: waypoints to geocode and the day-assigned point table

pub mod itinerary;
pub mod location;
pub mod point;
pub mod trip;

// Re-export all public types for convenient access
pub use itinerary::{DayPlan, Hotel, Itinerary, Place, Restaurant};
pub use location::Location;
pub use point::{DayPoint, PointRole, Waypoint};
pub use trip::{TripRequest, TripStyle};
