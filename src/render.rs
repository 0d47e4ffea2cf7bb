//! Terminal and file output for trip plans

use std::fmt::Display;
use std::path::Path;

use tracing::info;

use crate::models::{Itinerary, PointRole};
use crate::planner::TripPlan;

/// How `plan` prints its result
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, clap::ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl Display for TripPlan {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let request = &self.request;
        let analytics = &self.analytics;

        writeln!(
            f,
            "✈️  {} → {} ({} days, {} travelers, {})",
            request.origin, request.destination, request.days, request.travelers, request.style
        )?;
        writeln!(f)?;

        writeln!(f, "📊 Trip analytics")?;
        match analytics.distance_km {
            Some(km) => writeln!(f, "   📏 Distance: {km} km")?,
            None => writeln!(f, "   📏 Distance: n/a")?,
        }
        match analytics.total_budget {
            Some(total) => writeln!(f, "   💰 Budget: ${total:.0}")?,
            None => writeln!(f, "   💰 Budget: n/a")?,
        }
        if let Some(per_day) = analytics.per_day_budget {
            writeln!(f, "   📅 Per day: ${per_day:.2}")?;
        }
        if !analytics.travel_mode.is_empty() {
            writeln!(f, "   🚆 Travel mode: {}", analytics.travel_mode)?;
        }
        writeln!(
            f,
            "   📍 Places: {} mapped, {} unresolved",
            analytics.resolved, analytics.unresolved
        )?;

        let itinerary = &self.itinerary;
        if !itinerary.weather.is_empty() {
            writeln!(f)?;
            writeln!(f, "🌤️ Weather")?;
            for line in itinerary.weather.lines() {
                writeln!(f, "   {line}")?;
            }
        }

        if !itinerary.days.is_empty() {
            writeln!(f)?;
            writeln!(f, "🗓️ Day-wise plan")?;
            for day in &itinerary.days {
                writeln!(f, "   {}", day.label)?;
                for line in day.text.lines() {
                    writeln!(f, "      {line}")?;
                }
            }
        }

        if !itinerary.places.is_empty() {
            writeln!(f)?;
            writeln!(f, "🏛️ Places")?;
            for place in &itinerary.places {
                if place.time.is_empty() {
                    writeln!(f, "   • {}", place.name)?;
                } else {
                    writeln!(f, "   • {} ({})", place.name, place.time)?;
                }
                for line in place.info.lines() {
                    writeln!(f, "      {line}")?;
                }
            }
        }

        if !itinerary.hotels.is_empty() || !itinerary.restaurants.is_empty() {
            writeln!(f)?;
            writeln!(f, "🏨 Stay & food")?;
            for hotel in &itinerary.hotels {
                writeln!(f, "   🛏️ {} [{}] {}", hotel.name, hotel.tier, hotel.price)?;
                if !hotel.link.is_empty() {
                    writeln!(f, "      {}", hotel.link)?;
                }
            }
            for restaurant in &itinerary.restaurants {
                writeln!(f, "   🍽️ {}: {}", restaurant.name, restaurant.specialty)?;
                if !restaurant.link.is_empty() {
                    writeln!(f, "      {}", restaurant.link)?;
                }
            }
        }

        if !self.points.is_empty() {
            writeln!(f)?;
            writeln!(f, "🗺️ Day groups")?;
            for summary in self.day_summaries() {
                writeln!(
                    f,
                    "   Day {} ({:.1} km): {}",
                    summary.day + 1,
                    summary.path_km,
                    summary.stops.join(" → ")
                )?;
            }
            writeln!(f)?;
            writeln!(f, "   {:<30} {:>10} {:>11}  {:<11} Day", "Place", "Lat", "Lon", "Role")?;
            for point in &self.points {
                writeln!(
                    f,
                    "   {:<30} {:>10.4} {:>11.4}  {:<11} {}",
                    point.name,
                    point.latitude,
                    point.longitude,
                    role_label(point.role),
                    point.day + 1
                )?;
            }
        }

        if !self.unresolved.is_empty() {
            writeln!(f)?;
            writeln!(f, "⚠️ Not on the map")?;
            for place in &self.unresolved {
                writeln!(f, "   {} ({})", place.name, place.reason)?;
            }
        }
        Ok(())
    }
}

fn role_label(role: PointRole) -> &'static str {
    match role {
        PointRole::Origin => "origin",
        PointRole::Stop => "stop",
        PointRole::Destination => "destination",
    }
}

/// Pretty JSON of the itinerary with its original keys
pub fn export_itinerary_json(itinerary: &Itinerary) -> crate::Result<String> {
    Ok(serde_json::to_string_pretty(itinerary)?)
}

pub fn write_export(path: &Path, itinerary: &Itinerary) -> crate::Result<()> {
    let json = export_itinerary_json(itinerary)?;
    std::fs::write(path, json)?;
    info!("Itinerary exported to {}", path.display());
    Ok(())
}
