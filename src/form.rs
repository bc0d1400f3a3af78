use crate::types::{Coords, Kind, Workout};
use thiserror::Error;

/// Rejected form input. The messages are what the user gets to see.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum FormError {
    #[error("Please enter valid values")]
    InvalidRunning,
    #[error("Please enter a valid inputs")]
    InvalidCycling,
}

/// The secondary numeric row shown under distance/duration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SecondaryField {
    Cadence,
    Elevation,
}

/// Entry form state: raw strings as typed, plus what is currently shown.
#[derive(Debug, Clone)]
pub struct EntryForm {
    pub kind: Kind,
    pub distance: String,
    pub duration: String,
    pub cadence: String,
    pub elevation: String,
    visible: bool,
    secondary: SecondaryField,
}

impl Default for EntryForm {
    fn default() -> Self {
        Self {
            kind: Kind::Running,
            distance: String::new(),
            duration: String::new(),
            cadence: String::new(),
            elevation: String::new(),
            visible: false,
            secondary: SecondaryField::Cadence,
        }
    }
}

/// Validated input, ready to become a workout once a location is known.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntryInput {
    Running {
        distance: f64,
        duration: f64,
        cadence: f64,
    },
    Cycling {
        distance: f64,
        duration: f64,
        elevation_gain: f64,
    },
}

impl EntryInput {
    pub fn into_workout(self, coords: Coords) -> Workout {
        match self {
            Self::Running {
                distance,
                duration,
                cadence,
            } => Workout::running(distance, duration, coords, cadence),
            Self::Cycling {
                distance,
                duration,
                elevation_gain,
            } => Workout::cycling(distance, duration, coords, elevation_gain),
        }
    }
}

impl EntryForm {
    pub const fn is_visible(&self) -> bool {
        self.visible
    }

    pub const fn secondary(&self) -> SecondaryField {
        self.secondary
    }

    pub fn show(&mut self) {
        self.visible = true;
    }

    /// Clears every field and hides the form. The kind selector keeps its value.
    pub fn hide(&mut self) {
        self.distance.clear();
        self.duration.clear();
        self.cadence.clear();
        self.elevation.clear();
        self.visible = false;
    }

    /// Switching the kind swaps the cadence and elevation rows.
    pub fn select_kind(&mut self, kind: Kind) {
        if kind == self.kind {
            return;
        }
        self.kind = kind;
        self.secondary = match self.secondary {
            SecondaryField::Cadence => SecondaryField::Elevation,
            SecondaryField::Elevation => SecondaryField::Cadence,
        };
    }

    pub fn read_entry(&self) -> Result<EntryInput, FormError> {
        let distance = coerce_number(&self.distance);
        let duration = coerce_number(&self.duration);

        match self.kind {
            Kind::Running => {
                let cadence = coerce_number(&self.cadence);
                let inputs = [distance, duration, cadence];
                if !all_finite(&inputs) || !all_positive(&inputs) {
                    return Err(FormError::InvalidRunning);
                }
                Ok(EntryInput::Running {
                    distance,
                    duration,
                    cadence,
                })
            }
            Kind::Cycling => {
                let elevation_gain = coerce_number(&self.elevation);
                if !all_finite(&[distance, duration, elevation_gain])
                    || !all_positive(&[distance, duration])
                {
                    return Err(FormError::InvalidCycling);
                }
                Ok(EntryInput::Cycling {
                    distance,
                    duration,
                    elevation_gain,
                })
            }
        }
    }
}

/// Number coercion for raw field text: blank is `0`, anything `f64::from_str`
/// rejects is `NaN`. Hex (`0x10`) and other non-decimal forms are `NaN` too.
pub fn coerce_number(raw: &str) -> f64 {
    let s = raw.trim();
    if s.is_empty() {
        return 0.0;
    }
    s.parse::<f64>().unwrap_or(f64::NAN)
}

fn all_finite(inputs: &[f64]) -> bool {
    inputs.iter().all(|v| v.is_finite())
}

fn all_positive(inputs: &[f64]) -> bool {
    inputs.iter().all(|v| *v > 0.0)
}
