use crate::cli::Cli;
use crate::map::TileLayer;
use crate::types::Coords;
use std::path::PathBuf;
use std::time::Duration;

/// How the map is drawn and how long we wait for a position.
#[derive(Debug, Clone)]
pub struct MapConfig {
    pub zoom: u8,
    pub tiles: TileLayer,
    pub geo_timeout: Duration,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            zoom: crate::map::DEFAULT_ZOOM,
            tiles: TileLayer::openstreetmap(),
            geo_timeout: Duration::from_millis(crate::cli::DEFAULT_GEO_TIMEOUT_MS),
        }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    pub data_dir: PathBuf,
    pub home: Option<Coords>,
    pub map: MapConfig,
}

impl Config {
    pub fn from_cli(cli: &Cli) -> Self {
        Self {
            data_dir: cli.data_dir.clone().unwrap_or_else(default_data_dir),
            home: cli.home,
            map: MapConfig {
                zoom: cli.zoom,
                tiles: TileLayer::openstreetmap(),
                geo_timeout: Duration::from_millis(cli.geo_timeout_ms),
            },
        }
    }
}

/// `$XDG_DATA_HOME/mapty` (or the platform equivalent), else `./.mapty`.
pub fn default_data_dir() -> PathBuf {
    dirs::data_dir().map_or_else(|| PathBuf::from(".mapty"), |d| d.join("mapty"))
}
