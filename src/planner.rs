//! Trip planning pipeline
//!
//! validate → generate itinerary → build waypoints → geocode → group by day → analytics.
//! Only itinerary generation can fail the run; places that cannot be geocoded
//! are reported in [`TripPlan::unresolved`] and left out of the point table.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{info, instrument, warn};

use crate::clustering::{GroupingOptions, group_points};
use crate::geocoding::{GeocodeOutcome, Geocoder, UnresolvedReason, resolve_all};
use crate::llm::ItineraryGenerator;
use crate::models::{DayPoint, Itinerary, Location, PointRole, TripRequest, Waypoint};
use crate::routing::{DaySummary, day_summaries, path_km, span_km};

/// Headline numbers of a plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripAnalytics {
    /// Whole kilometres between the first and last row of the point table
    pub distance_km: Option<u64>,
    /// Length of the straight-line path through the point table
    pub path_km: Option<f64>,
    pub total_budget: Option<f64>,
    pub per_day_budget: Option<f64>,
    pub travel_mode: String,
    pub day_count: u32,
    pub group_count: usize,
    pub resolved: usize,
    pub unresolved: usize,
}

/// A place that was dropped from the point table
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnresolvedPlace {
    pub name: String,
    pub role: PointRole,
    pub reason: UnresolvedReason,
}

/// Everything produced for one trip request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPlan {
    pub request: TripRequest,
    pub itinerary: Itinerary,
    pub points: Vec<DayPoint>,
    pub unresolved: Vec<UnresolvedPlace>,
    pub analytics: TripAnalytics,
    pub generated_at: DateTime<Utc>,
}

impl TripPlan {
    #[must_use]
    pub fn day_summaries(&self) -> Vec<DaySummary> {
        day_summaries(&self.points)
    }
}

pub struct TripPlanner<L, G> {
    generator: L,
    geocoder: G,
    grouping: GroupingOptions,
}

impl<L: ItineraryGenerator, G: Geocoder> TripPlanner<L, G> {
    pub fn new(generator: L, geocoder: G, grouping: GroupingOptions) -> Self {
        Self {
            generator,
            geocoder,
            grouping,
        }
    }

    #[must_use]
    pub fn grouping(&self) -> &GroupingOptions {
        &self.grouping
    }

    #[must_use]
    pub fn geocoder(&self) -> &G {
        &self.geocoder
    }

    #[instrument(skip(self, request), fields(origin = %request.origin, destination = %request.destination, days = request.days))]
    pub async fn plan(&self, request: TripRequest) -> crate::Result<TripPlan> {
        request.validate()?;

        let itinerary = self.generator.generate(&request).await?;
        info!(
            "Itinerary received with {} map points",
            itinerary.map_coords.len()
        );

        let waypoints = request.waypoints(&itinerary);
        let outcomes = resolve_all(&self.geocoder, waypoints).await;

        assemble_plan(request, itinerary, outcomes, &self.grouping, Utc::now())
    }
}

/// Turn geocoding outcomes into the final plan.
///
/// Pure: the same inputs always give the same plan.
pub fn assemble_plan(
    request: TripRequest,
    itinerary: Itinerary,
    outcomes: Vec<GeocodeOutcome>,
    options: &GroupingOptions,
    now: DateTime<Utc>,
) -> crate::Result<TripPlan> {
    let mut resolved: Vec<(Waypoint, Location)> = Vec::new();
    let mut unresolved = Vec::new();

    for outcome in outcomes {
        match outcome {
            GeocodeOutcome::Resolved { waypoint, location } => resolved.push((waypoint, location)),
            GeocodeOutcome::Unresolved { waypoint, reason } => unresolved.push(UnresolvedPlace {
                name: waypoint.name,
                role: waypoint.role,
                reason,
            }),
        }
    }

    if resolved.is_empty() {
        warn!("No place could be geocoded; the plan has no map points");
    }

    let points = group_points(&resolved, request.days, options)?;
    let group_count = points.iter().map(|p| p.day + 1).max().unwrap_or(0);

    let analytics = TripAnalytics {
        distance_km: span_km(&points),
        path_km: path_km(&points),
        total_budget: itinerary.total_budget,
        per_day_budget: itinerary.per_day_budget(request.days),
        travel_mode: itinerary.travel_mode.clone(),
        day_count: request.days,
        group_count,
        resolved: resolved.len(),
        unresolved: unresolved.len(),
    };

    Ok(TripPlan {
        request,
        itinerary,
        points,
        unresolved,
        analytics,
        generated_at: now,
    })
}
