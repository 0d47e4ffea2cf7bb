use crate::models::TripRequest;

/// Prompt asking the model for a JSON itinerary in the shape [`crate::models::Itinerary`] parses
#[must_use]
pub fn build_prompt(request: &TripRequest) -> String {
    let day_keys: Vec<String> = (1..=request.days.max(1))
        .map(|day| format!("\"Day {day}\":\"...\""))
        .collect();

    format!(
        r#"You are an elite travel AI.

Trip:
Origin: {origin}
Destination: {destination}
Days: {days}
People: {travelers}
Theme: {style}

Return ONLY valid JSON:

{{
 "totalbudget": "number (total in USD for all people)",
 "travelmode": "string",
 "weather": "2 line summary",
 "itinerary": {{{day_keys}}},
 "places":[{{"name":"", "info":"5 lines", "time":""}}],
 "restaurants":[{{"name":"","specialty":"","link":""}}],
 "hotels":[{{"name":"","tier":"","price":"","link":""}}],
 "mapcoords":["place1","place2","place3"]
}}

"mapcoords" must list real, geocodable place names at the destination."#,
        origin = request.origin.trim(),
        destination = request.destination.trim(),
        days = request.days,
        travelers = request.travelers,
        style = request.style,
        day_keys = day_keys.join(", "),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::TripStyle;

    #[test]
    fn test_prompt_names_trip_parameters() {
        let request = TripRequest {
            origin: "Mumbai, India".to_string(),
            destination: "Kyoto, Japan".to_string(),
            days: 3,
            travelers: 4,
            style: TripStyle::Cultural,
        };
        let prompt = build_prompt(&request);

        assert!(prompt.contains("Origin: Mumbai, India"));
        assert!(prompt.contains("Destination: Kyoto, Japan"));
        assert!(prompt.contains("Days: 3"));
        assert!(prompt.contains("People: 4"));
        assert!(prompt.contains("Theme: Cultural"));
        assert!(prompt.contains(r#""Day 3":"...""#));
        assert!(!prompt.contains(r#""Day 4""#));
        assert!(prompt.contains("\"mapcoords\""));
    }
}
