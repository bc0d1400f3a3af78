use crate::types::{Coords, Kind};
use clap::{ArgAction, Parser, Subcommand};
use std::path::PathBuf;

pub const DEFAULT_GEO_TIMEOUT_MS: u64 = 5_000;

#[derive(Parser, Debug)]
#[command(
    name = "mapty",
    about = "Log running and cycling workouts on a map"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Cmd,

    /// Where workouts are stored.
    ///
    /// Default: the platform data dir + `mapty` (e.g. ~/.local/share/mapty)
    #[arg(long, env = "MAPTY_DATA_DIR", global = true)]
    pub data_dir: Option<PathBuf>,

    /// Your position as `LAT,LON`. Without it the map stays unavailable.
    #[arg(long, env = "MAPTY_HOME", allow_hyphen_values = true, global = true)]
    pub home: Option<Coords>,

    /// Map zoom level.
    #[arg(long, default_value_t = crate::map::DEFAULT_ZOOM, global = true)]
    pub zoom: u8,

    /// How long to wait for a position, in milliseconds.
    #[arg(long, default_value_t = DEFAULT_GEO_TIMEOUT_MS, global = true)]
    pub geo_timeout_ms: u64,

    /// Increase log verbosity (-v, -vv). Defaults to INFO.
    #[arg(short = 'v', long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Decrease log verbosity (-q, -qq). Defaults to INFO.
    #[arg(short = 'q', long, action = ArgAction::Count, global = true)]
    pub quiet: u8,
}

#[derive(Subcommand, Debug)]
pub enum Cmd {
    /// Log a workout at a map location (defaults to your position).
    #[command(allow_negative_numbers = true)]
    Add {
        #[arg(long, default_value = "running")]
        kind: Kind,

        /// km
        #[arg(long, default_value = "")]
        distance: String,

        /// min
        #[arg(long, default_value = "")]
        duration: String,

        /// steps/min (running)
        #[arg(long, default_value = "")]
        cadence: String,

        /// meters (cycling)
        #[arg(long, default_value = "")]
        elevation: String,

        #[arg(long, requires = "lon", value_parser = finite_f64)]
        lat: Option<f64>,

        #[arg(long, requires = "lat", value_parser = finite_f64)]
        lon: Option<f64>,
    },

    /// Show logged workouts, newest first.
    List {
        /// Print the HTML list markup instead of text rows.
        #[arg(long)]
        html: bool,
    },

    /// Centre the map on one workout.
    Show { id: String },

    /// Delete one workout.
    Delete { id: String },

    /// Print the map: view, tile and markers.
    Map,

    /// Write a standalone HTML page with the map and the list.
    Export {
        /// Output file. Default: stdout.
        #[arg(long, short = 'o')]
        out: Option<PathBuf>,
    },
}

/// Map coordinates must be real numbers: `NaN` and `inf` would be stored as
/// `null` and make the whole file unreadable.
fn finite_f64(s: &str) -> Result<f64, String> {
    match s.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        Ok(v) => Err(format!("{v} is not a finite number")),
        Err(e) => Err(e.to_string()),
    }
}
