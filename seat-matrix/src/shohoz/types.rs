//! Railway API response DTOs.
//!
//! These types map directly to the JSON the booking API returns. The API is
//! loose about types: amounts and ids arrive as numbers or strings, and
//! halts as `"5"`, `5`, or `null`. The lenient deserializers below absorb
//! that so conversion code sees plain values.

use serde::{Deserialize, Deserializer};

/// Top-level `{ "data": ... }` wrapper.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope<T> {
    pub data: Option<T>,
}

/// Response data from `GET /v1.0/web/train-routes`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TrainRoutesData {
    pub train_name: Option<String>,

    /// Three-letter weekday abbreviations the train runs on.
    #[serde(default)]
    pub days: Vec<String>,

    pub total_duration: Option<String>,

    /// Stops in travel order.
    pub routes: Option<Vec<RouteStopDto>>,
}

/// One stop on the schedule.
#[derive(Debug, Clone, Deserialize)]
pub struct RouteStopDto {
    pub city: String,
    pub arrival_time: Option<String>,
    pub departure_time: Option<String>,

    /// Declared halt in minutes.
    #[serde(default, deserialize_with = "lenient_i64")]
    pub halt: Option<i64>,
}

/// Response data from `GET /v1.0/web/bookings/search-trips-v2`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchTripsData {
    #[serde(default)]
    pub trains: Vec<TripDto>,
}

/// A train running between the searched stations.
#[derive(Debug, Clone, Deserialize)]
pub struct TripDto {
    /// e.g. `"SUBORNA EXPRESS (701)"`
    pub trip_number: String,
    pub departure_date_time: Option<String>,
    pub arrival_date_time: Option<String>,
    pub travel_time: Option<String>,
    pub origin_city_name: Option<String>,
    pub destination_city_name: Option<String>,
    #[serde(default)]
    pub seat_types: Vec<SeatTypeDto>,
}

/// Fare and seat counts for one class on a trip.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatTypeDto {
    /// Seat class wire code, e.g. `"S_CHAIR"`.
    #[serde(rename = "type")]
    pub seat_type: String,

    #[serde(deserialize_with = "lenient_id")]
    pub trip_id: String,

    #[serde(deserialize_with = "lenient_id")]
    pub trip_route_id: String,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub fare: u32,

    #[serde(default, deserialize_with = "lenient_amount")]
    pub vat_amount: u32,

    #[serde(default)]
    pub seat_counts: SeatCountsDto,
}

#[derive(Debug, Clone, Copy, Default, Deserialize)]
pub struct SeatCountsDto {
    #[serde(default)]
    pub online: u32,
    #[serde(default)]
    pub offline: u32,
}

/// Response data from `GET /v1.0/web/bookings/seat-layout`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SeatLayoutData {
    #[serde(rename = "seatLayout", default)]
    pub seat_layout: Vec<FloorDto>,
}

/// One floor (deck) of a coach layout: rows of seats.
#[derive(Debug, Clone, Deserialize)]
pub struct FloorDto {
    pub floor_name: Option<String>,
    #[serde(default)]
    pub layout: Vec<Vec<SeatDto>>,
}

/// A cell in the layout grid. Aisle cells have an empty seat number.
#[derive(Debug, Clone, Deserialize)]
pub struct SeatDto {
    #[serde(default)]
    pub seat_number: Option<String>,
    #[serde(default)]
    pub seat_availability: u8,
    #[serde(default)]
    pub ticket_type: u8,
}

/// Error body: `{"error": {"messages": [...]}}` or `{"message": "..."}`.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorBody {
    pub error: Option<ErrorDetail>,
    pub message: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct ErrorDetail {
    pub messages: Option<serde_json::Value>,
}

/// Pull a readable message out of an error response body.
///
/// Falls back to the raw body, truncated, when it is not the usual shape.
pub fn extract_message(body: &str) -> String {
    let mut parts = Vec::new();
    if let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) {
        if let Some(messages) = parsed.error.and_then(|e| e.messages) {
            collect_strings(&messages, &mut parts);
        }
        if let Some(message) = parsed.message {
            parts.push(message);
        }
    }
    if parts.is_empty() {
        return body.chars().take(200).collect();
    }
    parts.join("; ")
}

fn collect_strings(value: &serde_json::Value, out: &mut Vec<String>) {
    match value {
        serde_json::Value::String(s) if !s.trim().is_empty() => out.push(s.trim().to_string()),
        serde_json::Value::Array(items) => items.iter().for_each(|v| collect_strings(v, out)),
        serde_json::Value::Object(map) => map.values().for_each(|v| collect_strings(v, out)),
        _ => {}
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum NumOrString {
    Int(i64),
    Float(f64),
    Str(String),
}

fn lenient_i64<'de, D: Deserializer<'de>>(d: D) -> Result<Option<i64>, D::Error> {
    Ok(match Option::<NumOrString>::deserialize(d)? {
        Some(NumOrString::Int(n)) => Some(n),
        Some(NumOrString::Float(f)) => Some(f.round() as i64),
        Some(NumOrString::Str(s)) => s.trim().parse().ok(),
        None => None,
    })
}

/// Money in whole taka. Fractions round to the nearest taka; junk is zero.
fn lenient_amount<'de, D: Deserializer<'de>>(d: D) -> Result<u32, D::Error> {
    let value = match Option::<NumOrString>::deserialize(d)? {
        Some(NumOrString::Int(n)) => n as f64,
        Some(NumOrString::Float(f)) => f,
        Some(NumOrString::Str(s)) => s.trim().replace(',', "").parse().unwrap_or(0.0),
        None => 0.0,
    };
    Ok(if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    })
}

fn lenient_id<'de, D: Deserializer<'de>>(d: D) -> Result<String, D::Error> {
    Ok(match NumOrString::deserialize(d)? {
        NumOrString::Int(n) => n.to_string(),
        NumOrString::Float(f) => format!("{}", f as i64),
        NumOrString::Str(s) => s,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_train_routes() {
        let json = r#"{
            "data": {
                "train_name": "SUBORNA EXPRESS (701)",
                "days": ["Sat", "Sun", "Tue", "Wed", "Thu", "Fri"],
                "total_duration": "05:05",
                "routes": [
                    {"city": "Chattogram", "arrival_time": null, "departure_time": "07:00 am BST", "halt": null},
                    {"city": "Dhaka Airport", "arrival_time": "11:40 am BST", "departure_time": "11:43 am BST", "halt": "3"},
                    {"city": "Dhaka", "arrival_time": "12:05 pm BST", "departure_time": null, "halt": 0}
                ]
            }
        }"#;

        let env: Envelope<TrainRoutesData> = serde_json::from_str(json).unwrap();
        let data = env.data.unwrap();
        assert_eq!(data.train_name.as_deref(), Some("SUBORNA EXPRESS (701)"));
        assert_eq!(data.days.len(), 6);
        let routes = data.routes.unwrap();
        assert_eq!(routes.len(), 3);
        assert_eq!(routes[0].halt, None);
        assert_eq!(routes[1].halt, Some(3));
        assert_eq!(routes[2].halt, Some(0));
    }

    #[test]
    fn parse_search_trips_with_mixed_types() {
        let json = r#"{
            "data": {
                "trains": [{
                    "trip_number": "SUBORNA EXPRESS (701)",
                    "departure_date_time": "15 Oct, 07:00 am",
                    "seat_types": [
                        {"type": "S_CHAIR", "trip_id": 123, "trip_route_id": "456",
                         "fare": "405", "vat_amount": 0,
                         "seat_counts": {"online": 12, "offline": 3}},
                        {"type": "AC_B", "trip_id": "123", "trip_route_id": 457,
                         "fare": 1398.6, "vat_amount": "209.79",
                         "seat_counts": {"online": 0, "offline": 0}}
                    ]
                }]
            }
        }"#;

        let env: Envelope<SearchTripsData> = serde_json::from_str(json).unwrap();
        let trains = env.data.unwrap().trains;
        assert_eq!(trains.len(), 1);
        let seats = &trains[0].seat_types;
        assert_eq!(seats[0].trip_id, "123");
        assert_eq!(seats[0].trip_route_id, "456");
        assert_eq!(seats[0].fare, 405);
        assert_eq!(seats[0].seat_counts.online, 12);
        assert_eq!(seats[1].fare, 1399);
        assert_eq!(seats[1].vat_amount, 210);
    }

    #[test]
    fn parse_seat_layout() {
        let json = r#"{
            "data": {
                "seatLayout": [{
                    "floor_name": "KA",
                    "layout": [[
                        {"seat_number": "KA-1", "seat_availability": 1, "ticket_type": 1},
                        {"seat_number": "", "seat_availability": 0, "ticket_type": 0},
                        {"seat_number": "KA-2", "seat_availability": 0, "ticket_type": 3}
                    ]]
                }]
            }
        }"#;
        let env: Envelope<SeatLayoutData> = serde_json::from_str(json).unwrap();
        let layout = env.data.unwrap().seat_layout;
        assert_eq!(layout[0].layout[0].len(), 3);
        assert_eq!(layout[0].layout[0][2].ticket_type, 3);
    }

    #[test]
    fn error_message_shapes() {
        let body = r#"{"error":{"code":422,"messages":["Please try again after 8:00 AM"]}}"#;
        assert_eq!(extract_message(body), "Please try again after 8:00 AM");

        let body = r#"{"error":{"messages":{"error_msg":"Ongoing purchase","x":""}}}"#;
        assert_eq!(extract_message(body), "Ongoing purchase");

        let body = r#"{"message":"Unauthenticated."}"#;
        assert_eq!(extract_message(body), "Unauthenticated.");

        assert_eq!(extract_message("Bad Gateway"), "Bad Gateway");
    }
}
