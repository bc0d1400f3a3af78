//! The session: workouts in memory, the map, the entry form, and the list,
//! kept in step with storage.

use crate::config::MapConfig;
use crate::dlog;
use crate::error::AppError;
use crate::form::EntryForm;
use crate::geolocation::{Geolocator, locate};
use crate::map::{MapWidget, Marker, Pan};
use crate::render::ListView;
use crate::storage::{Storage, load_workouts, save_workouts};
use crate::types::{Coords, Kind, Workout, WorkoutId};

pub const POSITION_ALERT: &str = "Could not access your position";

pub struct App<S, M, L> {
    storage: S,
    list: L,
    map: Option<M>,
    config: MapConfig,
    workouts: Vec<Workout>,
    form: EntryForm,
    pending: Option<Coords>,
    home: Option<Coords>,
    alerts: Vec<String>,
}

impl<S, M, L> App<S, M, L>
where
    S: Storage,
    M: MapWidget + Default,
    L: ListView,
{
    /// A session with nothing restored and no map yet.
    pub fn new(storage: S, list: L, config: MapConfig) -> Self {
        Self {
            storage,
            list,
            map: None,
            config,
            workouts: Vec::new(),
            form: EntryForm::default(),
            pending: None,
            home: None,
            alerts: Vec::new(),
        }
    }

    /// Restore stored workouts, then ask for a position and bring up the map.
    ///
    /// Without a position the session still works for the list, but the map
    /// stays down and nothing can be added.
    pub async fn boot<G>(storage: S, list: L, config: MapConfig, geo: &G) -> Result<Self, AppError>
    where
        G: Geolocator + ?Sized,
    {
        let mut app = Self::new(storage, list, config);
        app.restore()?;

        match locate(geo, app.config.geo_timeout).await {
            Ok(at) => app.load_map(at),
            Err(e) => {
                tracing::warn!(err = %e, "no position; map disabled");
                app.alerts.push(POSITION_ALERT.to_string());
            }
        }
        Ok(app)
    }

    fn load_map(&mut self, at: Coords) {
        let mut map = M::default();
        map.set_view(at, self.config.zoom, None);
        map.add_tile_layer(self.config.tiles.clone());
        for w in &self.workouts {
            map.add_marker(Marker::for_workout(w));
        }
        tracing::info!(center = %at, markers = self.workouts.len(), "map ready");
        self.home = Some(at);
        self.map = Some(map);
    }

    /// A click on the map: remember where, open the form.
    pub fn begin_entry(&mut self, at: Coords) -> Result<(), AppError> {
        if self.map.is_none() {
            return Err(AppError::MapUnavailable);
        }
        if !at.is_finite() {
            return Err(AppError::InvalidLocation(at));
        }
        dlog!("begin entry at {at}");
        self.pending = Some(at);
        self.form.show();
        Ok(())
    }

    pub fn select_kind(&mut self, kind: Kind) {
        self.form.select_kind(kind);
    }

    pub fn form_mut(&mut self) -> &mut EntryForm {
        &mut self.form
    }

    /// Validate the form and log a new workout at the pending location.
    ///
    /// Invalid input or a failed save leaves the session and storage untouched.
    pub fn submit(&mut self) -> Result<Workout, AppError> {
        let input = self.form.read_entry()?;
        let at = self.pending.ok_or(AppError::NoPendingLocation)?;
        let workout = input.into_workout(at);

        let mut next = self.workouts.clone();
        next.push(workout.clone());
        Self::persist(&mut self.storage, &next)?;

        self.workouts = next;
        if let Some(map) = self.map.as_mut() {
            map.add_marker(Marker::for_workout(&workout));
        }
        self.list.insert_row(&workout);
        self.form.hide();

        tracing::info!(id = %workout.id, kind = %workout.kind(), "workout added");
        Ok(workout)
    }

    /// Pan the map to a workout.
    pub fn select(&mut self, id: &WorkoutId) -> Result<&Workout, AppError> {
        let map = self.map.as_mut().ok_or(AppError::MapUnavailable)?;
        let workout = self
            .workouts
            .iter()
            .find(|w| &w.id == id)
            .ok_or_else(|| AppError::NotFound(id.clone()))?;

        map.set_view(workout.coords, self.config.zoom, Some(Pan::default()));
        Ok(workout)
    }

    /// Remove one workout, persist, and rebuild list and map from storage.
    /// Nothing changes when the save fails.
    pub fn delete(&mut self, id: &WorkoutId) -> Result<Workout, AppError> {
        let idx = self
            .workouts
            .iter()
            .position(|w| &w.id == id)
            .ok_or_else(|| AppError::NotFound(id.clone()))?;

        let mut next = self.workouts.clone();
        let removed = next.remove(idx);
        Self::persist(&mut self.storage, &next)?;

        self.list.hide_row(id);
        self.workouts = next;
        tracing::info!(id = %removed.id, remaining = self.workouts.len(), "workout deleted");

        self.reload()?;
        Ok(removed)
    }

    fn persist(storage: &mut S, workouts: &[Workout]) -> Result<(), AppError> {
        save_workouts(storage, workouts)?;
        dlog!("persisted {} workouts", workouts.len());
        Ok(())
    }

    /// Replace the in-memory list with what storage holds and render a row
    /// for each. Markers come with the map, not here.
    pub fn restore(&mut self) -> Result<usize, AppError> {
        self.workouts = load_workouts(&self.storage)?;
        for w in &self.workouts {
            self.list.insert_row(w);
        }
        tracing::info!(count = self.workouts.len(), "restored workouts");
        Ok(self.workouts.len())
    }

    /// Start over from storage, the way a fresh page would.
    fn reload(&mut self) -> Result<(), AppError> {
        self.list.clear();
        self.map = None;
        self.pending = None;
        self.form.hide();
        self.restore()?;
        if let Some(home) = self.home {
            self.load_map(home);
        }
        Ok(())
    }

    pub fn workouts(&self) -> &[Workout] {
        &self.workouts
    }

    pub const fn map(&self) -> Option<&M> {
        self.map.as_ref()
    }

    pub const fn list(&self) -> &L {
        &self.list
    }

    pub const fn form(&self) -> &EntryForm {
        &self.form
    }

    pub const fn home(&self) -> Option<Coords> {
        self.home
    }

    pub const fn pending(&self) -> Option<Coords> {
        self.pending
    }

    pub const fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn alerts(&self) -> &[String] {
        &self.alerts
    }

    pub const fn storage(&self) -> &S {
        &self.storage
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geolocation::{FixedPosition, Unavailable};
    use crate::map::TerminalMap;
    use crate::render::TextList;
    use crate::storage::MemoryStorage;
    use chrono::{TimeZone, Utc};

    type TestApp = App<MemoryStorage, TerminalMap, TextList>;

    const HOME: Coords = Coords::new(48.11, -1.68);

    async fn booted() -> TestApp {
        App::boot(
            MemoryStorage::default(),
            TextList::default(),
            MapConfig::default(),
            &FixedPosition(HOME),
        )
        .await
        .unwrap()
    }

    fn fill<S: Storage>(
        app: &mut App<S, TerminalMap, TextList>,
        kind: Kind,
        distance: &str,
        duration: &str,
        extra: &str,
    ) {
        app.select_kind(kind);
        let form = app.form_mut();
        form.distance = distance.into();
        form.duration = duration.into();
        match kind {
            Kind::Running => form.cadence = extra.into(),
            Kind::Cycling => form.elevation = extra.into(),
        }
    }

    #[tokio::test]
    async fn boot_centres_map_on_position() {
        let app = booted().await;
        let map = app.map().unwrap();
        assert_eq!(map.center(), Some(HOME));
        assert_eq!(map.zoom(), 10);
        assert!(map.tiles().is_some());
        assert!(app.alerts().is_empty());
    }

    #[tokio::test]
    async fn boot_without_position_alerts_and_blocks_entry() {
        let mut app: TestApp = App::boot(
            MemoryStorage::default(),
            TextList::default(),
            MapConfig::default(),
            &Unavailable,
        )
        .await
        .unwrap();
        assert!(app.map().is_none());
        assert_eq!(app.alerts(), [POSITION_ALERT.to_string()]);
        assert!(matches!(app.begin_entry(HOME), Err(AppError::MapUnavailable)));
    }

    #[tokio::test]
    async fn submit_adds_marker_row_and_persists() {
        let mut app = booted().await;
        let at = Coords::new(48.2, -1.7);
        app.begin_entry(at).unwrap();
        assert_eq!(app.pending(), Some(at));
        assert!(app.form().is_visible());
        fill(&mut app, Kind::Running, "5", "30", "178");

        let w = app.submit().unwrap();
        assert_eq!(w.coords, at);
        assert_eq!(w.pace(), Some(6.0));
        assert!(!app.form().is_visible());
        assert!(app.form().distance.is_empty());
        assert_eq!(app.map().unwrap().markers().len(), 1);
        assert_eq!(app.list().rows().count(), 1);
        assert_eq!(load_workouts(app.storage()).unwrap(), vec![w]);
    }

    #[tokio::test]
    async fn invalid_submit_changes_nothing() {
        let mut app = booted().await;
        app.begin_entry(HOME).unwrap();
        fill(&mut app, Kind::Cycling, "20", "0", "150");

        let err = app.submit().unwrap_err();
        assert_eq!(err.to_string(), "Please enter a valid inputs");
        assert!(app.workouts().is_empty());
        assert!(app.form().is_visible());
        assert_eq!(app.storage().get(crate::storage::WORKOUTS_KEY).unwrap(), None);
    }

    #[tokio::test]
    async fn submit_needs_a_clicked_location() {
        let mut app = booted().await;
        fill(&mut app, Kind::Running, "5", "30", "178");
        assert!(matches!(app.submit(), Err(AppError::NoPendingLocation)));
    }

    #[tokio::test]
    async fn select_pans_to_workout() {
        let mut app = booted().await;
        let at = Coords::new(47.0, -2.0);
        app.begin_entry(at).unwrap();
        fill(&mut app, Kind::Cycling, "20", "60", "150");
        let id = app.submit().unwrap().id;

        app.select(&id).unwrap();
        let map = app.map().unwrap();
        assert_eq!(map.center(), Some(at));
        assert_eq!(map.last_pan(), Some(Pan::default()));

        let missing = WorkoutId::from("nope");
        assert!(matches!(app.select(&missing), Err(AppError::NotFound(_))));
    }

    #[tokio::test]
    async fn delete_unknown_id_is_not_found() {
        let mut app = booted().await;
        app.begin_entry(HOME).unwrap();
        fill(&mut app, Kind::Running, "5", "30", "178");
        app.submit().unwrap();

        let missing = WorkoutId::from("nope");
        assert!(matches!(app.delete(&missing), Err(AppError::NotFound(_))));
        assert_eq!(load_workouts(app.storage()).unwrap().len(), 1);
    }

    #[tokio::test]
    async fn non_finite_click_is_rejected_and_storage_kept() {
        let mut app = booted().await;
        app.begin_entry(Coords::new(48.0, -1.0)).unwrap();
        fill(&mut app, Kind::Running, "5", "30", "178");
        app.submit().unwrap();

        for bad in [
            Coords::new(f64::NAN, 1.0),
            Coords::new(1.0, f64::INFINITY),
            Coords::new(f64::NEG_INFINITY, 0.0),
        ] {
            assert!(matches!(
                app.begin_entry(bad),
                Err(AppError::InvalidLocation(_))
            ));
        }
        assert_eq!(app.pending(), Some(Coords::new(48.0, -1.0)));
        assert_eq!(load_workouts(app.storage()).unwrap().len(), 1);
    }

    /// Reads work, every write fails.
    #[derive(Default)]
    struct ReadOnlyStorage {
        inner: MemoryStorage,
    }

    impl Storage for ReadOnlyStorage {
        fn get(&self, key: &str) -> anyhow::Result<Option<String>> {
            self.inner.get(key)
        }

        fn set(&mut self, _key: &str, _value: &str) -> anyhow::Result<()> {
            anyhow::bail!("read-only data dir")
        }
    }

    #[tokio::test]
    async fn failed_save_leaves_session_as_it_was() {
        let at = Utc.with_ymd_and_hms(2024, 4, 14, 8, 0, 0).unwrap();
        let stored = Workout::running_at(at, 5.0, 30.0, HOME, 170.0);
        let mut storage = ReadOnlyStorage::default();
        save_workouts(&mut storage.inner, std::slice::from_ref(&stored)).unwrap();

        let mut app: App<ReadOnlyStorage, TerminalMap, TextList> = App::boot(
            storage,
            TextList::default(),
            MapConfig::default(),
            &FixedPosition(HOME),
        )
        .await
        .unwrap();

        app.begin_entry(HOME).unwrap();
        fill(&mut app, Kind::Running, "5", "30", "178");
        assert!(matches!(app.submit(), Err(AppError::Storage(_))));
        assert_eq!(app.workouts(), [stored.clone()]);
        assert_eq!(app.list().rows().count(), 1);
        assert_eq!(app.map().unwrap().markers().len(), 1);
        assert!(app.form().is_visible());
        assert_eq!(app.form().distance, "5");

        assert!(matches!(app.delete(&stored.id), Err(AppError::Storage(_))));
        assert_eq!(app.workouts(), [stored.clone()]);
        assert_eq!(app.list().rows().count(), 1);
        assert_eq!(app.map().unwrap().markers().len(), 1);
    }
}
