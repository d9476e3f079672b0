pub mod itinerary;
pub mod place;
pub mod search;

pub use itinerary::ItineraryStep;
pub use place::{CrowdLevel, Place, ReviewSnippet};
pub use search::{GroundingLink, SearchResult};
