//! Standalone HTML page: a Leaflet map with one marker per workout, and the
//! workout list beside it.

use crate::config::MapConfig;
use crate::render::list_row_html;
use crate::types::{Coords, Workout};
use anyhow::{Context, Result};

const PAGE_TEMPLATE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>mapty</title>
  <link rel="stylesheet" href="https://unpkg.com/leaflet@1.9.4/dist/leaflet.css" />
  <script src="https://unpkg.com/leaflet@1.9.4/dist/leaflet.js"></script>
  <style>
    body { display: flex; height: 100vh; margin: 0; font-family: sans-serif; }
    .sidebar { flex-basis: 32rem; overflow-y: auto; padding: 1rem; background: #2d3439; color: #ececec; }
    .workouts { list-style: none; padding: 0; }
    .workout { background: #42484d; border-radius: 5px; padding: 1rem; margin-bottom: 1rem; cursor: pointer; }
    .workout--running { border-left: 5px solid #00c46a; }
    .workout--cycling { border-left: 5px solid #ffb545; }
    .workout__details { display: inline-block; margin-right: 1rem; }
    .delete__icon { display: none; }
    #map { flex: 1; }
  </style>
</head>
<body>
  <div class="sidebar">
    <ul class="workouts">
__LIST__    </ul>
  </div>
  <div id="map"></div>
  <script>
    const workouts = __WORKOUTS__;
    const zoom = __ZOOM__;
    const map = L.map('map').setView(__CENTER__, zoom);
    L.tileLayer(__TILE_URL__, { attribution: __ATTRIBUTION__ }).addTo(map);
    const icons = { running: '🏃‍♂️', cycling: '🚴‍♀️' };
    for (const w of workouts) {
      L.marker(w.coords).addTo(map)
        .bindPopup(L.popup({ maxWidth: 250, minWidth: 100, autoClose: false,
                             closeOnClick: false, className: `${w.type}-popup` }))
        .setPopupContent(`${icons[w.type]} ${w.description}`)
        .openPopup();
    }
    document.querySelector('.workouts').addEventListener('click', (e) => {
      const el = e.target.closest('.workout');
      if (!el) return;
      const w = workouts.find((w) => w.id === el.dataset.id);
      if (w) map.setView(w.coords, zoom, { animate: true, pan: { duration: 1 } });
    });
  </script>
</body>
</html>
"#;

/// JSON that is safe to drop inside a `<script>` element.
fn script_json<T: serde::Serialize + ?Sized>(value: &T) -> Result<String> {
    let json = serde_json::to_string(value).context("serializing page data")?;
    Ok(json.replace("</", "<\\/"))
}

/// Render the page. The map centres on `center`, falling back to the newest
/// workout and then to `[0, 0]`.
pub fn page_html(workouts: &[Workout], center: Option<Coords>, map: &MapConfig) -> Result<String> {
    let center = center
        .or_else(|| workouts.last().map(|w| w.coords))
        .unwrap_or(Coords::new(0.0, 0.0));

    let list: String = workouts.iter().rev().map(list_row_html).collect();

    let slots = [
        ("__LIST__", list),
        ("__WORKOUTS__", script_json(workouts)?),
        ("__ZOOM__", map.zoom.to_string()),
        ("__CENTER__", script_json(&center)?),
        ("__TILE_URL__", script_json(&map.tiles.url_template)?),
        ("__ATTRIBUTION__", script_json(&map.tiles.attribution)?),
    ];
    Ok(fill_template(PAGE_TEMPLATE, &slots))
}

/// Replace placeholders in one pass over `template`; inserted text is never
/// scanned again.
fn fill_template(template: &str, slots: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut rest = template;

    loop {
        let next = slots
            .iter()
            .filter_map(|(key, value)| rest.find(key).map(|pos| (pos, *key, value)))
            .min_by_key(|(pos, ..)| *pos);

        let Some((pos, key, value)) = next else {
            out.push_str(rest);
            return out;
        };
        out.push_str(&rest[..pos]);
        out.push_str(value);
        rest = &rest[pos + key.len()..];
    }
}
