use crate::types::{Coords, Workout, WorkoutId};
use std::f64::consts::PI;
use std::fmt::Write as _;
use std::time::Duration;

pub const DEFAULT_ZOOM: u8 = 10;

const OSM_TEMPLATE: &str = "https://{s}.tile.openstreetmap.org/{z}/{x}/{y}.png";
const OSM_ATTRIBUTION: &str =
    "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors";

/// Web-Mercator cannot show the poles; tiles stop here.
const MAX_LATITUDE: f64 = 85.051_128_78;

/// Animated re-centering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pan {
    pub animate: bool,
    pub duration: Duration,
}

impl Default for Pan {
    fn default() -> Self {
        Self {
            animate: true,
            duration: Duration::from_secs(1),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TileLayer {
    pub url_template: String,
    pub attribution: String,
}

impl TileLayer {
    pub fn openstreetmap() -> Self {
        Self {
            url_template: OSM_TEMPLATE.to_string(),
            attribution: OSM_ATTRIBUTION.to_string(),
        }
    }

    /// Slippy-map tile column/row containing `at` at `zoom`.
    pub fn tile_xy(at: Coords, zoom: u8) -> (u32, u32) {
        let n = f64::from(1u32 << zoom.min(30));
        let lat = at.lat.clamp(-MAX_LATITUDE, MAX_LATITUDE).to_radians();
        let lng = (at.lng + 180.0).rem_euclid(360.0);

        let x = (lng / 360.0 * n).floor();
        let y = ((1.0 - (lat.tan() + 1.0 / lat.cos()).ln() / PI) / 2.0 * n).floor();

        let max = n - 1.0;
        // Both values are clamped into [0, 2^zoom - 1], so the casts are exact.
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let xy = (x.clamp(0.0, max) as u32, y.clamp(0.0, max) as u32);
        xy
    }

    /// The tile URL for the tile containing `at`, on subdomain `a`.
    pub fn url_for(&self, at: Coords, zoom: u8) -> String {
        let (x, y) = Self::tile_xy(at, zoom);
        self.url_template
            .replace("{s}", "a")
            .replace("{z}", &zoom.to_string())
            .replace("{x}", &x.to_string())
            .replace("{y}", &y.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Popup {
    pub max_width: u32,
    pub min_width: u32,
    pub auto_close: bool,
    pub close_on_click: bool,
    pub class_name: String,
    pub content: String,
}

impl Popup {
    pub fn for_workout(w: &Workout) -> Self {
        let kind = w.kind();
        Self {
            max_width: 250,
            min_width: 100,
            auto_close: false,
            close_on_click: false,
            class_name: format!("{kind}-popup"),
            content: format!("{} {}", kind.emoji(), w.description),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Marker {
    pub id: WorkoutId,
    pub coords: Coords,
    pub popup: Popup,
}

impl Marker {
    pub fn for_workout(w: &Workout) -> Self {
        Self {
            id: w.id.clone(),
            coords: w.coords,
            popup: Popup::for_workout(w),
        }
    }
}

/// The map surface the session draws on.
pub trait MapWidget {
    fn set_view(&mut self, center: Coords, zoom: u8, pan: Option<Pan>);
    fn add_tile_layer(&mut self, layer: TileLayer);
    fn add_marker(&mut self, marker: Marker);
}

/// A map that keeps what it was told and can describe itself as text.
#[derive(Debug, Default)]
pub struct TerminalMap {
    center: Option<Coords>,
    zoom: u8,
    last_pan: Option<Pan>,
    tiles: Option<TileLayer>,
    markers: Vec<Marker>,
}

impl TerminalMap {
    pub const fn center(&self) -> Option<Coords> {
        self.center
    }

    pub const fn zoom(&self) -> u8 {
        self.zoom
    }

    pub const fn last_pan(&self) -> Option<Pan> {
        self.last_pan
    }

    pub const fn tiles(&self) -> Option<&TileLayer> {
        self.tiles.as_ref()
    }

    pub fn markers(&self) -> &[Marker] {
        &self.markers
    }

    pub fn summary(&self) -> String {
        let mut out = String::new();
        match self.center {
            Some(c) => {
                let _ = writeln!(out, "view\t{c}\tzoom {}", self.zoom);
                if let Some(tiles) = &self.tiles {
                    let _ = writeln!(out, "tile\t{}", tiles.url_for(c, self.zoom));
                }
            }
            None => out.push_str("view\t(not set)\n"),
        }
        for m in &self.markers {
            let _ = writeln!(out, "marker\t{}\t{}\t{}", m.id, m.coords, m.popup.content);
        }
        out
    }
}

impl MapWidget for TerminalMap {
    fn set_view(&mut self, center: Coords, zoom: u8, pan: Option<Pan>) {
        tracing::debug!(%center, zoom, animate = pan.is_some_and(|p| p.animate), "set map view");
        self.center = Some(center);
        self.zoom = zoom;
        self.last_pan = pan;
    }

    fn add_tile_layer(&mut self, layer: TileLayer) {
        tracing::debug!(template = %layer.url_template, "add tile layer");
        self.tiles = Some(layer);
    }

    fn add_marker(&mut self, marker: Marker) {
        tracing::debug!(id = %marker.id, coords = %marker.coords, "add marker");
        self.markers.push(marker);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    #[test]
    fn tile_math_matches_known_tiles() {
        assert_eq!(TileLayer::tile_xy(Coords::new(0.0, 0.0), 0), (0, 0));
        assert_eq!(TileLayer::tile_xy(Coords::new(0.0, 0.0), 1), (1, 1));
        // Central London at zoom 10.
        assert_eq!(TileLayer::tile_xy(Coords::new(51.5074, -0.1278), 10), (511, 340));
        // Poles clamp to the edge rows.
        assert_eq!(TileLayer::tile_xy(Coords::new(90.0, 179.99), 2), (3, 0));
        assert_eq!(TileLayer::tile_xy(Coords::new(-90.0, -180.0), 2), (0, 3));
    }

    #[test]
    fn osm_url_expands_template() {
        let url = TileLayer::openstreetmap().url_for(Coords::new(51.5074, -0.1278), 10);
        assert_eq!(url, "https://a.tile.openstreetmap.org/10/511/340.png");
    }

    #[test]
    fn popup_carries_kind_class_and_description() {
        let at = Utc.with_ymd_and_hms(2024, 4, 14, 12, 0, 0).unwrap();
        let w = Workout::cycling_at(at, 20.0, 60.0, Coords::new(1.0, 2.0), 150.0);
        let p = Popup::for_workout(&w);
        assert_eq!(p.class_name, "cycling-popup");
        assert!(p.content.starts_with("🚴‍♀️ Cycling on"));
        assert!(!p.auto_close && !p.close_on_click);
        assert_eq!((p.min_width, p.max_width), (100, 250));
    }

    #[test]
    fn terminal_map_records_calls() {
        let mut map = TerminalMap::default();
        map.set_view(Coords::new(1.0, 2.0), 10, None);
        map.add_tile_layer(TileLayer::openstreetmap());
        map.set_view(Coords::new(3.0, 4.0), 10, Some(Pan::default()));
        assert_eq!(map.center(), Some(Coords::new(3.0, 4.0)));
        assert_eq!(map.last_pan(), Some(Pan::default()));
        assert!(map.summary().contains("tile\thttps://a.tile.openstreetmap.org/10/"));
    }
}
