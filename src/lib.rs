//! `TripPlanner` - AI-generated trip itineraries on a map
//!
//! This library provides itinerary generation through a chat-completion API,
//! geocoding of the itinerary's places, day grouping by k-means clustering
//! and the distance and budget roll-up shown to the traveller.

pub mod api;
pub mod cache;
pub mod clustering;
pub mod config;
pub mod error;
pub mod geocoding;
pub mod http;
pub mod llm;
pub mod logging;
pub mod models;
pub mod planner;
pub mod render;
pub mod routing;
pub mod web;

// Re-export core types for public API
pub use cache::PersistentCache;
pub use clustering::{DayOrdering, GroupingOptions, KMeans, group_points};
pub use config::TripPlannerConfig;
pub use error::TripPlannerError;
pub use geocoding::{GeocodeOutcome, Geocoder, UnresolvedReason, build_geocoder, resolve_all};
pub use llm::{ChatCompletionClient, FileItinerary, ItineraryGenerator};
pub use models::{DayPoint, Itinerary, Location, PointRole, TripRequest, TripStyle, Waypoint};
pub use planner::{TripAnalytics, TripPlan, TripPlanner, assemble_plan};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Core result type used throughout the library
pub type Result<T> = std::result::Result<T, TripPlannerError>;
