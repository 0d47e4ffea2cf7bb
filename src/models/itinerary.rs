//! Itinerary returned by the language model
//!
//! The wire format uses the compact keys requested in the prompt
//! (`totalbudget`, `travelmode`, `itinerary`, `mapcoords`). Deserialization is
//! lenient: lists default to empty, text fields accept numbers, and the budget
//! accepts strings such as `"$4,500"`.

use std::fmt;

use serde::de::{self, MapAccess, SeqAccess, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Structured travel plan
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Itinerary {
    #[serde(rename = "totalbudget", default, deserialize_with = "deserialize_budget")]
    pub total_budget: Option<f64>,
    #[serde(rename = "travelmode", default, deserialize_with = "lenient_text")]
    pub travel_mode: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub weather: String,
    #[serde(rename = "itinerary", default, with = "day_plans")]
    pub days: Vec<DayPlan>,
    #[serde(default)]
    pub places: Vec<Place>,
    #[serde(default)]
    pub restaurants: Vec<Restaurant>,
    #[serde(default)]
    pub hotels: Vec<Hotel>,
    #[serde(rename = "mapcoords", default)]
    pub map_coords: Vec<String>,
}

/// Free text for one day, keyed by its label ("Day 1", ...)
#[derive(Debug, Clone, PartialEq)]
pub struct DayPlan {
    pub label: String,
    pub text: String,
}

impl DayPlan {
    /// Day index embedded in the label, if any
    #[must_use]
    pub fn day_number(&self) -> Option<u32> {
        let digits: String = self
            .label
            .chars()
            .skip_while(|c| !c.is_ascii_digit())
            .take_while(char::is_ascii_digit)
            .collect();
        digits.parse().ok()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Place {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub info: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub time: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Restaurant {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub specialty: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Hotel {
    #[serde(default, deserialize_with = "lenient_text")]
    pub name: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub tier: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub price: String,
    #[serde(default, deserialize_with = "lenient_text")]
    pub link: String,
}

impl Itinerary {
    /// Total budget spread evenly over the trip, rounded to cents.
    /// `None` without a budget or for a zero-day trip.
    #[must_use]
    pub fn per_day_budget(&self, days: u32) -> Option<f64> {
        let total = self.total_budget?;
        if days == 0 {
            return None;
        }
        Some((total / f64::from(days) * 100.0).round() / 100.0)
    }
}

/// Pull the first number out of a budget string: `"$4,500"`, `"4500 USD"`, `"3000-4000"`
#[must_use]
pub fn parse_budget(raw: &str) -> Option<f64> {
    let number: String = raw
        .chars()
        .skip_while(|c| !c.is_ascii_digit())
        .take_while(|c| c.is_ascii_digit() || *c == ',' || *c == '.')
        .filter(|c| *c != ',')
        .collect();
    let number = number.trim_end_matches('.');
    number
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
}

fn deserialize_budget<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(match value {
        Value::Number(n) => n.as_f64().filter(|v| v.is_finite() && *v >= 0.0),
        Value::String(s) => parse_budget(&s),
        _ => None,
    })
}

fn lenient_text<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Value::deserialize(deserializer)?;
    Ok(value_to_text(value))
}

fn value_to_text(value: Value) -> String {
    match value {
        Value::Null => String::new(),
        Value::String(s) => s,
        Value::Array(items) => items
            .into_iter()
            .map(value_to_text)
            .filter(|s| !s.is_empty())
            .collect::<Vec<_>>()
            .join("\n"),
        other => other.to_string(),
    }
}

/// `"itinerary": {"Day 1": "...", ...}` kept as an ordered list of days
mod day_plans {
    use super::*;

    pub fn serialize<S>(days: &[DayPlan], serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.collect_map(days.iter().map(|day| (&day.label, &day.text)))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Vec<DayPlan>, D::Error>
    where
        D: Deserializer<'de>,
    {
        deserializer.deserialize_any(DayPlansVisitor)
    }

    struct DayPlansVisitor;

    impl<'de> Visitor<'de> for DayPlansVisitor {
        type Value = Vec<DayPlan>;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a map of day labels to plan text, or a list of day texts")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Self::Value, E> {
            Ok(Vec::new())
        }

        /// `["...", "..."]`: numbered in list order
        fn visit_seq<A>(self, mut seq: A) -> Result<Self::Value, A::Error>
        where
            A: SeqAccess<'de>,
        {
            let mut days = Vec::new();
            while let Some(value) = seq.next_element::<Value>()? {
                days.push(DayPlan {
                    label: format!("Day {}", days.len() + 1),
                    text: value_to_text(value),
                });
            }
            Ok(days)
        }

        fn visit_map<A>(self, mut map: A) -> Result<Self::Value, A::Error>
        where
            A: MapAccess<'de>,
        {
            let mut days = Vec::new();
            while let Some((label, value)) = map.next_entry::<String, Value>()? {
                days.push(DayPlan {
                    label,
                    text: value_to_text(value),
                });
            }
            // stable: unnumbered labels keep input order, after the numbered ones
            days.sort_by_key(|day| day.day_number().map_or((1, 0), |n| (0, n)));
            Ok(days)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;
    use serde_json::json;

    fn sample() -> Value {
        json!({
            "totalbudget": "$4,500",
            "travelmode": "Flight",
            "weather": "Cool mornings.\nMild afternoons.",
            "itinerary": {"Day 2": "Lucerne day trip", "Day 10": "Fly home", "Day 1": "Old Town walk"},
            "places": [{"name": "Lake Zurich", "info": "Boat rides", "time": "Morning"}],
            "restaurants": [{"name": "Zeughauskeller", "specialty": "Sausages", "link": "https://example.com"}],
            "hotels": [{"name": "Baur au Lac", "tier": "5 star", "price": 900, "link": "https://example.com/h"}],
            "mapcoords": ["Lake Zurich", "Uetliberg"]
        })
    }

    #[test]
    fn test_deserialize_model_output() {
        let itinerary: Itinerary = serde_json::from_value(sample()).unwrap();
        assert_eq!(itinerary.total_budget, Some(4500.0));
        assert_eq!(itinerary.travel_mode, "Flight");
        assert_eq!(itinerary.hotels[0].price, "900");
        assert_eq!(itinerary.map_coords, vec!["Lake Zurich", "Uetliberg"]);

        let labels: Vec<&str> = itinerary.days.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Day 1", "Day 2", "Day 10"]);
    }

    #[test]
    fn test_missing_lists_default_to_empty() {
        let itinerary: Itinerary = serde_json::from_value(json!({"totalbudget": 1200})).unwrap();
        assert_eq!(itinerary.total_budget, Some(1200.0));
        assert!(itinerary.days.is_empty());
        assert!(itinerary.places.is_empty());
        assert!(itinerary.map_coords.is_empty());
    }

    #[test]
    fn test_serializes_wire_keys() {
        let itinerary: Itinerary = serde_json::from_value(sample()).unwrap();
        let value = serde_json::to_value(&itinerary).unwrap();
        assert_eq!(value["totalbudget"], json!(4500.0));
        assert_eq!(value["itinerary"]["Day 10"], json!("Fly home"));
        assert_eq!(value["mapcoords"][1], json!("Uetliberg"));
    }

    #[test]
    fn test_array_day_text_is_joined() {
        let itinerary: Itinerary =
            serde_json::from_value(json!({"itinerary": {"Day 1": ["Museum", "Dinner"]}})).unwrap();
        assert_eq!(itinerary.days[0].text, "Museum\nDinner");
    }

    #[test]
    fn test_day_list_is_numbered_in_order() {
        let itinerary: Itinerary =
            serde_json::from_value(json!({"itinerary": ["Old Town walk", "Lucerne day trip"]})).unwrap();
        let labels: Vec<&str> = itinerary.days.iter().map(|d| d.label.as_str()).collect();
        assert_eq!(labels, vec!["Day 1", "Day 2"]);
        assert_eq!(itinerary.days[1].text, "Lucerne day trip");
    }

    #[test]
    fn test_nameless_entries_do_not_fail_the_parse() {
        let itinerary: Itinerary = serde_json::from_value(json!({
            "places": [{"info": "Boat rides"}, {"name": "Uetliberg"}],
            "restaurants": [{"specialty": "Fondue"}],
            "hotels": [{"tier": "3 star", "price": 150}],
            "mapcoords": ["Lake Zurich"]
        }))
        .unwrap();
        assert_eq!(itinerary.places.len(), 2);
        assert_eq!(itinerary.places[0].name, "");
        assert_eq!(itinerary.places[1].name, "Uetliberg");
        assert_eq!(itinerary.restaurants[0].specialty, "Fondue");
        assert_eq!(itinerary.hotels[0].price, "150");
        assert_eq!(itinerary.map_coords, vec!["Lake Zurich"]);
    }

    #[rstest]
    #[case("4500", Some(4500.0))]
    #[case("$4,500", Some(4500.0))]
    #[case("4500 USD", Some(4500.0))]
    #[case("approx. 3200.50", Some(3200.5))]
    #[case("3000-4000", Some(3000.0))]
    #[case("number", None)]
    #[case("", None)]
    fn test_parse_budget(#[case] raw: &str, #[case] expected: Option<f64>) {
        assert_eq!(parse_budget(raw), expected);
    }

    #[test]
    fn test_per_day_budget() {
        let itinerary = Itinerary {
            total_budget: Some(1000.0),
            ..Itinerary::default()
        };
        assert_eq!(itinerary.per_day_budget(3), Some(333.33));
        assert_eq!(itinerary.per_day_budget(1), Some(1000.0));
        assert_eq!(itinerary.per_day_budget(0), None);
        assert_eq!(Itinerary::default().per_day_budget(4), None);
    }
}
