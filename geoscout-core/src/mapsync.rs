//! Map view-sync: keeps a marker set and viewport consistent with the
//! current place list, user location, and selection.
//!
//! Place markers carry no independent state, so every sync rebuilds them
//! wholesale — no incremental diffing, marker identity is not preserved.
//! The user-location marker is the one exception: it represents a single
//! continuously-tracked entity and is repositioned in place. Theme changes
//! swap the tile source without touching markers or the viewport.

use serde::{Deserialize, Serialize};

use crate::config::MapConfig;
use crate::geo::{LatLng, LatLngBounds};
use crate::models::Place;

/// Initial view when no user location is known.
pub const WORLD_CENTER: LatLng = LatLng {
    latitude: 20.0,
    longitude: 0.0,
};
pub const WORLD_ZOOM: u8 = 2;

/// Initial zoom when centered on the user.
pub const USER_ZOOM: u8 = 14;

/// Carto basemap tile templates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MapTheme {
    #[default]
    Voyager,
    Dark,
    Positron,
}

impl MapTheme {
    pub fn tile_url(&self) -> &'static str {
        match self {
            MapTheme::Voyager => {
                "https://{s}.basemaps.cartocdn.com/rastertiles/voyager/{z}/{x}/{y}{r}.png"
            }
            MapTheme::Dark => "https://{s}.basemaps.cartocdn.com/dark_all/{z}/{x}/{y}{r}.png",
            MapTheme::Positron => "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png",
        }
    }
}

/// One place marker. `popup_open` is true for the selected marker only.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Marker {
    pub place_id: String,
    pub title: String,
    pub position: LatLng,
    pub selected: bool,
    pub popup_open: bool,
}

/// Where the viewport should move after a sync.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum Viewport {
    /// Instant view (map creation only).
    View { center: LatLng, zoom: u8 },
    /// Smooth animation to a selected place.
    FlyTo { center: LatLng, zoom: u8 },
    /// Smooth fit around all coordinate-bearing places plus the user.
    FitBounds { bounds: LatLngBounds, padding: u32 },
    /// Nothing to move toward (no selection, no mappable places).
    Unchanged,
}

/// Outcome of one sync pass, for callers and logging.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SyncReport {
    pub markers_removed: usize,
    pub markers_created: usize,
    pub viewport: Viewport,
}

#[derive(Debug)]
pub struct MapView {
    theme: MapTheme,
    markers: Vec<Marker>,
    user_marker: Option<LatLng>,
    /// Bumped only when the user marker is created, never on reposition.
    user_marker_generation: u64,
    select_zoom: u8,
    fit_padding: u32,
    viewport: Viewport,
}

impl MapView {
    /// Create the view once; it is never recreated for data changes.
    pub fn new(config: &MapConfig, user: Option<LatLng>) -> Self {
        let viewport = match user {
            Some(center) => Viewport::View {
                center,
                zoom: USER_ZOOM,
            },
            None => Viewport::View {
                center: WORLD_CENTER,
                zoom: WORLD_ZOOM,
            },
        };

        Self {
            theme: MapTheme::default(),
            markers: Vec::new(),
            user_marker: None,
            user_marker_generation: 0,
            select_zoom: config.select_zoom,
            fit_padding: config.fit_padding,
            viewport,
        }
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn user_marker(&self) -> Option<LatLng> {
        self.user_marker
    }

    pub fn user_marker_generation(&self) -> u64 {
        self.user_marker_generation
    }

    pub fn theme(&self) -> MapTheme {
        self.theme
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    /// Swap the tile source. Markers and viewport are untouched.
    pub fn set_theme(&mut self, theme: MapTheme) -> &'static str {
        self.theme = theme;
        theme.tile_url()
    }

    /// Reconcile markers and viewport with the current place list,
    /// user location, and selection.
    pub fn sync(
        &mut self,
        places: &[Place],
        user: Option<LatLng>,
        selected_id: Option<&str>,
    ) -> SyncReport {
        let markers_removed = self.markers.len();
        self.markers.clear();

        if let Some(position) = user {
            if self.user_marker.is_none() {
                self.user_marker_generation += 1;
            }
            self.user_marker = Some(position);
        }

        let mut bounds: Option<LatLngBounds> = self.user_marker.map(LatLngBounds::of);
        let mut selected_coords: Option<LatLng> = None;

        for place in places {
            let Some(position) = place.coordinates else {
                // Still listed in the panel, just not mappable.
                continue;
            };

            let selected = selected_id == Some(place.id.as_str());
            if selected {
                selected_coords = Some(position);
            }

            self.markers.push(Marker {
                place_id: place.id.clone(),
                title: place.name.clone(),
                position,
                selected,
                popup_open: selected,
            });

            match &mut bounds {
                Some(b) => b.extend(position),
                None => bounds = Some(LatLngBounds::of(position)),
            }
        }

        self.viewport = if let Some(center) = selected_coords {
            Viewport::FlyTo {
                center,
                zoom: self.select_zoom,
            }
        } else if selected_id.is_none() && !places.is_empty() {
            match bounds {
                Some(bounds) => Viewport::FitBounds {
                    bounds,
                    padding: self.fit_padding,
                },
                None => Viewport::Unchanged,
            }
        } else {
            Viewport::Unchanged
        };

        SyncReport {
            markers_removed,
            markers_created: self.markers.len(),
            viewport: self.viewport.clone(),
        }
    }
}
