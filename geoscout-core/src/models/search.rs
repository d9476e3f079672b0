use serde::{Deserialize, Serialize};

use super::Place;

/// One completed search: raw model text, the places scraped from it, and
/// the grounding links in citation order. Immutably replaces the prior
/// result on each search.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult {
    pub text: String,
    pub places: Vec<Place>,
    pub grounding_links: Vec<GroundingLink>,
}

/// A grounding citation surfaced to the user alongside the results.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GroundingLink {
    pub title: String,
    pub uri: String,
}
