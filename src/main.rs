#![deny(
    warnings,
    clippy::all,
    clippy::pedantic,
    clippy::nursery,
    clippy::cargo
)]
#![allow(clippy::multiple_crate_versions)]

use anyhow::{Context, Result};
use clap::Parser;
use mapty::cli::{self, Cmd};
use mapty::config::Config;
use mapty::controller::App;
use mapty::error::AppError;
use mapty::geolocation::{FixedPosition, Geolocator, Unavailable};
use mapty::map::TerminalMap;
use mapty::render::{TextList, list_row_html, list_row_text};
use mapty::storage::FileStorage;
use mapty::types::{Coords, WorkoutId};
use mapty::{export, utils};

#[macro_use]
extern crate mapty;

type Session = App<FileStorage, TerminalMap, TextList>;

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = cli::Cli::parse();
    utils::init_logging(cli.verbose, cli.quiet);

    let config = Config::from_cli(&cli);
    dlog!(
        "data_dir={} home={:?} zoom={}",
        config.data_dir.display(),
        config.home,
        config.map.zoom
    );

    let geo: Box<dyn Geolocator> = match config.home {
        Some(at) => Box::new(FixedPosition(at)),
        None => Box::new(Unavailable),
    };
    let storage = FileStorage::new(&config.data_dir);
    let mut app: Session = App::boot(
        storage,
        TextList::default(),
        config.map.clone(),
        geo.as_ref(),
    )
    .await
    .context("starting session")?;

    for alert in app.alerts() {
        eprintln!("{alert}");
    }

    match cli.cmd {
        Cmd::Add {
            kind,
            distance,
            duration,
            cadence,
            elevation,
            lat,
            lon,
        } => {
            let click = lat.zip(lon).map(|(lat, lon)| Coords::new(lat, lon));
            let at = click.or(app.home()).ok_or(AppError::MapUnavailable)?;
            app.begin_entry(at)?;

            app.select_kind(kind);
            let form = app.form_mut();
            form.distance = distance;
            form.duration = duration;
            form.cadence = cadence;
            form.elevation = elevation;

            let workout = app.submit()?;
            println!("{}", list_row_text(&workout));
        }
        Cmd::List { html } => {
            if app.workouts().is_empty() {
                eprintln!("No workouts yet.");
            }
            if html {
                for w in app.workouts().iter().rev() {
                    print!("{}", list_row_html(w));
                }
            } else {
                for row in app.list().rows() {
                    println!("{}", row.text);
                }
            }
        }
        Cmd::Show { id } => {
            let workout = app.select(&WorkoutId::from(id))?;
            println!("{}", list_row_text(workout));
            print_map(&app)?;
        }
        Cmd::Delete { id } => {
            let removed = app.delete(&WorkoutId::from(id))?;
            println!("deleted {} ({})", removed.id, removed.description);
        }
        Cmd::Map => print_map(&app)?,
        Cmd::Export { out } => {
            let html = export::page_html(app.workouts(), app.home(), app.config())?;
            match out {
                Some(path) => {
                    std::fs::write(&path, html)
                        .with_context(|| format!("writing {}", path.display()))?;
                    tracing::info!(path = %path.display(), workouts = app.workouts().len(), "page written");
                }
                None => print!("{html}"),
            }
        }
    }

    Ok(())
}

fn print_map(app: &Session) -> Result<()> {
    let map = app.map().ok_or(AppError::MapUnavailable)?;
    print!("{}", map.summary());
    Ok(())
}
