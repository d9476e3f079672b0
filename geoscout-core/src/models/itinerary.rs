use serde::{Deserialize, Serialize};

/// One scheduled stop in a generated day itinerary.
///
/// `place_name` is free text from the model, not a foreign key into the
/// current result set; itineraries are regenerated wholesale on request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ItineraryStep {
    pub time: String,
    pub place_name: String,
    pub activity: String,
}
