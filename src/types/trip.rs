use schemars::JsonSchema;
use serde::{Deserialize, Deserializer, Serialize};

/// Names of the fields a request needs before it counts as complete.
pub const REQUIRED_FIELDS: [&str; 6] = [
    "city",
    "start_date",
    "end_date",
    "travel_days",
    "transportation",
    "accommodation",
];

/// Structured trip request extracted from a natural-language description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct TripRequest {
    /// Destination city (e.g. "北京")
    pub city: String,
    /// First day of the trip, usually `YYYY-MM-DD`
    pub start_date: String,
    /// Last day of the trip, usually `YYYY-MM-DD`
    pub end_date: String,
    /// Number of days the trip spans
    pub travel_days: u32,
    /// Preferred way of getting around (e.g. "公共交通")
    pub transportation: String,
    /// Preferred lodging (e.g. "经济型酒店")
    pub accommodation: String,
    /// Preference tags in the order the traveller mentioned them
    #[serde(default, deserialize_with = "null_as_empty")]
    #[schemars(with = "Vec<String>")]
    pub preferences: Vec<String>,
    /// Anything else the traveller asked for
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub free_text_input: Option<String>,
}

/// Treat an explicit `null` like a missing list.
fn null_as_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

/// Body of `POST /request/parse-request`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParseRequestInput {
    pub user_input: String,
}
