pub mod context;
pub mod itinerary;
pub mod search;
