//! Grounded-response extractor.
//!
//! The model answers in prose; the grounding metadata cites the map
//! sources it drew on. This module slices the answer around each citation
//! title and scrapes `Label: value` fields out of the slice, falling back
//! to fixed defaults for anything the model did not spell out. Extraction
//! is best-effort: a title that never appears in the answer still yields
//! a fully-defaulted place, not an error.

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::geo;
use crate::models::{CrowdLevel, GroundingLink, Place, ReviewSnippet, SearchResult};

pub const DEFAULT_ADDRESS: &str = "Location provided by Google Maps";
pub const DEFAULT_VIBE: &str = "Authentic";
pub const DEFAULT_PRICE_RANGE: &str = "$$";
pub const DEFAULT_WEATHER_ADVISORY: &str = "Check local sky";
pub const DEFAULT_DESCRIPTION: &str = "Verified location via Google Maps.";

/// Title used when a maps chunk arrives without one.
const FALLBACK_TITLE: &str = "Location Found";

// ============================================================================
// Grounding metadata payload (Gemini wire shape)
// ============================================================================

/// One grounding citation. Only chunks carrying a maps payload become
/// places; anything else is skipped.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GroundingChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub maps: Option<MapsChunk>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MapsChunk {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub uri: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub place_answer_sources: Vec<PlaceAnswerSource>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlaceAnswerSource {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub place_name: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub review_snippets: Vec<RawReviewSnippet>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawReviewSnippet {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

// ============================================================================
// Extraction
// ============================================================================

/// Assemble a [`SearchResult`] from the answer text and its citations.
///
/// Output order matches citation order; citations sharing a title are not
/// deduplicated. Chunk indices (including skipped non-maps chunks) feed
/// the per-result place ids.
pub fn extract_search_result(text: &str, chunks: &[GroundingChunk]) -> SearchResult {
    let mut places = Vec::new();
    let mut grounding_links = Vec::new();

    for (index, chunk) in chunks.iter().enumerate() {
        let Some(maps) = &chunk.maps else {
            continue;
        };

        let title = maps.title.as_deref().unwrap_or(FALLBACK_TITLE);
        let uri = maps.uri.clone();

        grounding_links.push(GroundingLink {
            title: title.to_string(),
            uri: uri.clone().unwrap_or_default(),
        });

        let coordinates = uri.as_deref().and_then(geo::coords_from_maps_url);
        let reviews = flatten_reviews(maps, title);
        let fields = extract_fields(text, title);

        places.push(Place {
            id: Place::result_id(index),
            name: title.to_string(),
            description: fields.description,
            address: Some(fields.address),
            rating: None,
            coordinates,
            url: uri,
            review_snippets: reviews,
            vibe: fields.vibe,
            crowd_level: fields.crowd_level,
            price_range: fields.price_range,
            historical_context: None,
            weather_advisory: Some(fields.weather_advisory),
        });
    }

    SearchResult {
        text: text.to_string(),
        places,
        grounding_links,
    }
}

/// The labeled fields recovered for one place, defaults applied.
#[derive(Debug, Clone, PartialEq)]
pub struct PlaceFields {
    pub address: String,
    pub vibe: String,
    pub price_range: String,
    pub weather_advisory: String,
    pub description: String,
    pub crowd_level: CrowdLevel,
}

impl Default for PlaceFields {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            vibe: DEFAULT_VIBE.to_string(),
            price_range: DEFAULT_PRICE_RANGE.to_string(),
            weather_advisory: DEFAULT_WEATHER_ADVISORY.to_string(),
            description: DEFAULT_DESCRIPTION.to_string(),
            crowd_level: CrowdLevel::Moderate,
        }
    }
}

/// Scrape the labeled fields for `title` out of the full answer text.
///
/// The segment for a place runs from the first occurrence of its title up
/// to (but not including) the next line that starts with an uppercase
/// letter or digit. A title absent from the text yields the full default
/// set — accepted, not an error.
pub fn extract_fields(text: &str, title: &str) -> PlaceFields {
    let mut fields = PlaceFields::default();

    let Some(segment) = answer_segment(text, title) else {
        return fields;
    };

    if let Some(address) = field_value(segment, "Address") {
        fields.address = address;
    }
    if let Some(vibe) = field_value(segment, "Vibe") {
        fields.vibe = vibe;
    }
    if let Some(price) = field_value(segment, "Price Range") {
        fields.price_range = price;
    }
    if let Some(weather) = field_value(segment, "Weather Advisory") {
        fields.weather_advisory = weather;
    }
    if let Some(description) = description_value(segment) {
        fields.description = description;
    }
    if let Some(level) = crowd_level_value(segment) {
        fields.crowd_level = level;
    }

    fields
}

/// Slice of the answer belonging to one citation title.
///
/// The segment runs to the next line that starts with an uppercase letter
/// or digit — the next place heading. `Label: value` lines also start
/// uppercase but belong to the current place, so they never terminate the
/// segment.
fn answer_segment<'a>(text: &'a str, title: &str) -> Option<&'a str> {
    let start = text.find(title)? + title.len();
    let tail = &text[start..];

    let label_line = Regex::new(r"^[A-Za-z][A-Za-z ]*:").ok()?;

    let mut cut = tail.len();
    for (i, _) in tail.match_indices('\n') {
        let line = &tail[i + 1..];
        let starts_heading = line
            .chars()
            .next()
            .is_some_and(|c| c.is_ascii_uppercase() || c.is_ascii_digit());
        if starts_heading && !label_line.is_match(line) {
            cut = i;
            break;
        }
    }

    Some(&tail[..cut])
}

/// `Label: value` up to a newline, pipe, or end of segment, trimmed.
/// Empty values count as missing so the default applies.
fn field_value(segment: &str, label: &str) -> Option<String> {
    let pattern = format!(r"(?i){}:\s*([^\n|]*)", label);
    let re = Regex::new(&pattern).ok()?;
    let caps = re.captures(segment)?;
    let value = caps.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Description terminates at a newline only — pipes are part of the prose.
fn description_value(segment: &str) -> Option<String> {
    let re = Regex::new(r"(?i)Description:\s*([^\n]*)").ok()?;
    let caps = re.captures(segment)?;
    let value = caps.get(1)?.as_str().trim();
    if value.is_empty() {
        None
    } else {
        Some(value.to_string())
    }
}

/// Crowd level is constrained to the three literal values; anything else
/// leaves the default in place.
fn crowd_level_value(segment: &str) -> Option<CrowdLevel> {
    let re = Regex::new(r"(?i)Crowd Level:\s*(Quiet|Moderate|Busy)").ok()?;
    let caps = re.captures(segment)?;
    CrowdLevel::parse(caps.get(1)?.as_str())
}

/// Flatten nested answer sources into (text, source-label) pairs, the
/// source label defaulting to the citation title.
fn flatten_reviews(maps: &MapsChunk, title: &str) -> Vec<ReviewSnippet> {
    let mut reviews = Vec::new();
    for source in &maps.place_answer_sources {
        let label = source
            .place_name
            .clone()
            .unwrap_or_else(|| title.to_string());
        for snippet in &source.review_snippets {
            if let Some(text) = &snippet.text {
                reviews.push(ReviewSnippet {
                    text: text.clone(),
                    source: Some(label.clone()),
                });
            }
        }
    }
    reviews
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geo::LatLng;

    fn maps_chunk(title: &str, uri: &str) -> GroundingChunk {
        GroundingChunk {
            maps: Some(MapsChunk {
                title: Some(title.to_string()),
                uri: Some(uri.to_string()),
                place_answer_sources: Vec::new(),
            }),
        }
    }

    #[test]
    fn well_formed_segment_extracts_labeled_fields() {
        let text = "Joe's Cafe\nAddress: 12 Main St\nVibe: Cozy\n";
        let fields = extract_fields(text, "Joe's Cafe");
        assert_eq!(fields.address, "12 Main St");
        assert_eq!(fields.vibe, "Cozy");
        assert_eq!(fields.price_range, DEFAULT_PRICE_RANGE);
        assert_eq!(fields.weather_advisory, DEFAULT_WEATHER_ADVISORY);
        assert_eq!(fields.crowd_level, CrowdLevel::Moderate);
    }

    #[test]
    fn absent_title_yields_full_default_set() {
        let text = "Nothing about that place here.";
        let fields = extract_fields(text, "Hidden Gem");
        assert_eq!(fields, PlaceFields::default());
    }

    #[test]
    fn value_terminates_at_pipe() {
        let text = "The Dive\nAddress: 5 Pier Rd | open late\n";
        let fields = extract_fields(text, "The Dive");
        assert_eq!(fields.address, "5 Pier Rd");
    }

    #[test]
    fn segment_ends_before_next_capitalized_line() {
        // "Vibe" belongs to the next place, not to Joe's Cafe: the segment
        // is cut at the first line starting with an uppercase letter.
        let text = "Joe's Cafe\naddress notes follow\nBar Nine\nVibe: Loud\n";
        let fields = extract_fields(text, "Joe's Cafe");
        assert_eq!(fields.vibe, DEFAULT_VIBE);
    }

    #[test]
    fn crowd_level_never_leaves_the_closed_set() {
        let quiet = extract_fields("Spot\nCrowd Level: Quiet\n", "Spot");
        assert_eq!(quiet.crowd_level, CrowdLevel::Quiet);

        let busy = extract_fields("Spot\nCrowd Level: busy\n", "Spot");
        assert_eq!(busy.crowd_level, CrowdLevel::Busy);

        let invalid = extract_fields("Spot\nCrowd Level: overrun\n", "Spot");
        assert_eq!(invalid.crowd_level, CrowdLevel::Moderate);
    }

    #[test]
    fn extract_attaches_coordinates_from_citation_uri() {
        let text = "Joe's Cafe\nAddress: 12 Main St\n";
        let chunks = vec![maps_chunk(
            "Joe's Cafe",
            "https://maps.google.com/@40.7128,-74.0060,15z",
        )];

        let result = extract_search_result(text, &chunks);
        assert_eq!(result.places.len(), 1);
        let place = &result.places[0];
        assert_eq!(place.name, "Joe's Cafe");
        assert_eq!(place.address.as_deref(), Some("12 Main St"));
        assert_eq!(place.coordinates, Some(LatLng::new(40.7128, -74.0060)));
        assert_eq!(result.grounding_links[0].title, "Joe's Cafe");
    }

    #[test]
    fn non_maps_chunks_are_skipped_but_keep_their_index() {
        let chunks = vec![
            GroundingChunk { maps: None },
            maps_chunk("Spot", "https://maps.google.com/?q=spot"),
        ];

        let result = extract_search_result("Spot\n", &chunks);
        assert_eq!(result.places.len(), 1);
        assert!(result.places[0].id.starts_with("place-1-"));
        // No coordinates in the uri: still a valid place, just unmappable.
        assert_eq!(result.places[0].coordinates, None);
    }

    #[test]
    fn reviews_flatten_with_source_label_fallback() {
        let chunk = GroundingChunk {
            maps: Some(MapsChunk {
                title: Some("Harbor View".to_string()),
                uri: Some("https://maps.google.com/@1.0,2.0,10z".to_string()),
                place_answer_sources: vec![
                    PlaceAnswerSource {
                        place_name: Some("Harbor View Rooftop".to_string()),
                        review_snippets: vec![RawReviewSnippet {
                            text: Some("Great sunsets".to_string()),
                        }],
                    },
                    PlaceAnswerSource {
                        place_name: None,
                        review_snippets: vec![RawReviewSnippet {
                            text: Some("Pricey but worth it".to_string()),
                        }],
                    },
                ],
            }),
        };

        let result = extract_search_result("Harbor View\n", &[chunk]);
        let reviews = &result.places[0].review_snippets;
        assert_eq!(reviews.len(), 2);
        assert_eq!(reviews[0].source.as_deref(), Some("Harbor View Rooftop"));
        assert_eq!(reviews[1].source.as_deref(), Some("Harbor View"));
    }

    #[test]
    fn duplicate_titles_produce_duplicate_places() {
        let chunks = vec![
            maps_chunk("Twin", "https://maps.google.com/@1.5,2.5,10z"),
            maps_chunk("Twin", "https://maps.google.com/@1.5,2.5,10z"),
        ];
        let result = extract_search_result("Twin\nVibe: Odd\n", &chunks);
        assert_eq!(result.places.len(), 2);
        assert_eq!(result.places[0].vibe, "Odd");
        assert_eq!(result.places[1].vibe, "Odd");
    }

    #[test]
    fn untitled_maps_chunk_uses_fallback_title() {
        let chunk = GroundingChunk {
            maps: Some(MapsChunk {
                title: None,
                uri: Some("https://maps.google.com/?q=x".to_string()),
                place_answer_sources: Vec::new(),
            }),
        };
        let result = extract_search_result("irrelevant", &[chunk]);
        assert_eq!(result.places[0].name, "Location Found");
    }
}
