use chrono::{DateTime, Datelike, Local, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// A `[latitude, longitude]` pair, serialized as a two-element array.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(from = "[f64; 2]", into = "[f64; 2]")]
pub struct Coords {
    pub lat: f64,
    pub lng: f64,
}

impl Coords {
    pub const fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    pub fn is_finite(self) -> bool {
        self.lat.is_finite() && self.lng.is_finite()
    }
}

impl From<[f64; 2]> for Coords {
    fn from([lat, lng]: [f64; 2]) -> Self {
        Self { lat, lng }
    }
}

impl From<Coords> for [f64; 2] {
    fn from(c: Coords) -> Self {
        [c.lat, c.lng]
    }
}

impl fmt::Display for Coords {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.5},{:.5}", self.lat, self.lng)
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("expected `LAT,LON` with two decimal numbers, got {0:?}")]
pub struct CoordsParseError(String);

/// Parses `"48.11,-1.68"`.
impl FromStr for Coords {
    type Err = CoordsParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || CoordsParseError(s.to_string());
        let (lat, lng) = s.split_once(',').ok_or_else(err)?;
        let lat = lat.trim().parse::<f64>().map_err(|_| err())?;
        let lng = lng.trim().parse::<f64>().map_err(|_| err())?;
        let at = Self { lat, lng };
        if !at.is_finite() {
            return Err(err());
        }
        Ok(at)
    }
}

/// Opaque workout id: the last 10 digits of the creation time in Unix
/// milliseconds. Two workouts created in the same millisecond collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WorkoutId(String);

impl WorkoutId {
    pub fn from_millis(ms: i64) -> Self {
        let digits = ms.to_string();
        let start = digits.len().saturating_sub(10);
        Self(digits[start..].to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for WorkoutId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl From<&str> for WorkoutId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for WorkoutId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    #[default]
    Running,
    Cycling,
}

impl Kind {
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Cycling => "cycling",
        }
    }

    pub const fn label(self) -> &'static str {
        match self {
            Self::Running => "Running",
            Self::Cycling => "Cycling",
        }
    }

    pub const fn emoji(self) -> &'static str {
        match self {
            Self::Running => "🏃‍♂️",
            Self::Cycling => "🚴‍♀️",
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
#[error("unknown workout kind {0:?} (expected `running` or `cycling`)")]
pub struct KindParseError(String);

impl FromStr for Kind {
    type Err = KindParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "running" => Ok(Self::Running),
            "cycling" => Ok(Self::Cycling),
            _ => Err(KindParseError(s.to_string())),
        }
    }
}

/// Kind-specific fields, tagged by `type` in the stored record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum Activity {
    Running {
        /// steps/min
        cadence: f64,
        /// min/km
        pace: f64,
    },
    Cycling {
        /// meters, may be zero or negative
        #[serde(rename = "elevationGain")]
        elevation_gain: f64,
        /// distance / duration, labelled km/h
        speed: f64,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workout {
    pub date: DateTime<Utc>,
    pub id: WorkoutId,
    /// km
    pub distance: f64,
    /// min
    pub duration: f64,
    pub coords: Coords,
    pub description: String,
    #[serde(flatten)]
    pub activity: Activity,
}

impl Workout {
    pub fn running(distance: f64, duration: f64, coords: Coords, cadence: f64) -> Self {
        Self::running_at(Utc::now(), distance, duration, coords, cadence)
    }

    pub fn cycling(distance: f64, duration: f64, coords: Coords, elevation_gain: f64) -> Self {
        Self::cycling_at(Utc::now(), distance, duration, coords, elevation_gain)
    }

    pub fn running_at(
        date: DateTime<Utc>,
        distance: f64,
        duration: f64,
        coords: Coords,
        cadence: f64,
    ) -> Self {
        let pace = duration / distance;
        Self::build(date, distance, duration, coords, Activity::Running { cadence, pace })
    }

    pub fn cycling_at(
        date: DateTime<Utc>,
        distance: f64,
        duration: f64,
        coords: Coords,
        elevation_gain: f64,
    ) -> Self {
        let speed = distance / duration;
        Self::build(
            date,
            distance,
            duration,
            coords,
            Activity::Cycling {
                elevation_gain,
                speed,
            },
        )
    }

    fn build(
        date: DateTime<Utc>,
        distance: f64,
        duration: f64,
        coords: Coords,
        activity: Activity,
    ) -> Self {
        let kind = activity.kind();
        Self {
            date,
            id: WorkoutId::from_millis(date.timestamp_millis()),
            distance,
            duration,
            coords,
            description: description_for(kind, date.with_timezone(&Local).date_naive()),
            activity,
        }
    }

    pub const fn kind(&self) -> Kind {
        self.activity.kind()
    }

    pub const fn pace(&self) -> Option<f64> {
        match self.activity {
            Activity::Running { pace, .. } => Some(pace),
            Activity::Cycling { .. } => None,
        }
    }

    pub const fn speed(&self) -> Option<f64> {
        match self.activity {
            Activity::Cycling { speed, .. } => Some(speed),
            Activity::Running { .. } => None,
        }
    }
}

impl Activity {
    pub const fn kind(&self) -> Kind {
        match self {
            Self::Running { .. } => Kind::Running,
            Self::Cycling { .. } => Kind::Cycling,
        }
    }
}

/// `"Running on April 14"`.
pub fn description_for(kind: Kind, day: NaiveDate) -> String {
    format!("{} on {} {}", kind.label(), day.format("%B"), day.day())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 4, 14, 12, 0, 0).unwrap()
    }

    #[test]
    fn running_pace_is_duration_over_distance() {
        let w = Workout::running_at(at(), 5.0, 30.0, Coords::new(48.1, -1.6), 178.0);
        assert_eq!(w.kind(), Kind::Running);
        assert!((w.pace().unwrap() - 6.0).abs() < 1e-12);
        assert_eq!(w.speed(), None);
    }

    #[test]
    fn cycling_speed_is_distance_over_duration() {
        let w = Workout::cycling_at(at(), 20.0, 60.0, Coords::new(48.1, -1.6), 150.0);
        assert!((w.speed().unwrap() - 20.0 / 60.0).abs() < 1e-12);
        assert_eq!(w.pace(), None);
    }

    #[test]
    fn description_uses_kind_label_and_month_day() {
        let day = NaiveDate::from_ymd_opt(2024, 4, 14).unwrap();
        assert_eq!(description_for(Kind::Running, day), "Running on April 14");
        let day = NaiveDate::from_ymd_opt(2023, 12, 1).unwrap();
        assert_eq!(description_for(Kind::Cycling, day), "Cycling on December 1");
    }

    #[test]
    fn description_of_new_workout_contains_local_month_day() {
        let w = Workout::running(5.0, 30.0, Coords::new(0.0, 0.0), 178.0);
        let local = w.date.with_timezone(&Local).date_naive();
        let expected = format!("{} {}", local.format("%B"), local.day());
        assert!(w.description.ends_with(&expected), "{}", w.description);
    }

    #[test]
    fn id_keeps_last_ten_digits_of_millis() {
        assert_eq!(WorkoutId::from_millis(1_713_088_800_123).as_str(), "3088800123");
        assert_eq!(WorkoutId::from_millis(42).as_str(), "42");
        let w = Workout::running_at(at(), 1.0, 1.0, Coords::new(0.0, 0.0), 1.0);
        assert_eq!(w.id, WorkoutId::from_millis(at().timestamp_millis()));
    }

    #[test]
    fn invalid_numbers_propagate_without_validation() {
        let w = Workout::running_at(at(), 0.0, 30.0, Coords::new(0.0, 0.0), 170.0);
        assert!(w.pace().unwrap().is_infinite());
        let w = Workout::cycling_at(at(), f64::NAN, 30.0, Coords::new(0.0, 0.0), 0.0);
        assert!(w.speed().unwrap().is_nan());
    }

    #[test]
    fn stored_record_is_flat_and_tagged() {
        let w = Workout::cycling_at(at(), 20.0, 60.0, Coords::new(48.1, -1.6), 150.0);
        let v = serde_json::to_value(&w).unwrap();
        assert_eq!(v["type"], "cycling");
        assert_eq!(v["elevationGain"], 150.0);
        assert_eq!(v["coords"], serde_json::json!([48.1, -1.6]));
        assert_eq!(v["id"], w.id.as_str());

        let back: Workout = serde_json::from_value(v).unwrap();
        assert_eq!(back, w);
    }

    #[test]
    fn reads_record_written_by_browser_app() {
        let raw = r#"{"date":"2024-04-14T10:00:00.000Z","id":"3088800000",
            "distance":5,"duration":30,"coords":[48.1,-1.6],"type":"running",
            "cadence":178,"pace":6,"description":"Running on April 14"}"#;
        let w: Workout = serde_json::from_str(raw).unwrap();
        assert_eq!(w.kind(), Kind::Running);
        assert_eq!(w.pace(), Some(6.0));
        assert_eq!(w.coords, Coords::new(48.1, -1.6));
    }

    #[test]
    fn parses_coords_and_kind() {
        assert_eq!("48.11, -1.68".parse::<Coords>(), Ok(Coords::new(48.11, -1.68)));
        assert!("48.11".parse::<Coords>().is_err());
        assert!("north,south".parse::<Coords>().is_err());
        assert!("NaN,1".parse::<Coords>().is_err());
        assert!("1,inf".parse::<Coords>().is_err());
        assert_eq!("Cycling".parse::<Kind>(), Ok(Kind::Cycling));
        assert!("swimming".parse::<Kind>().is_err());
    }
}
