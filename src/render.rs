use crate::types::{Activity, Workout, WorkoutId};
use std::fmt::Write as _;

/// The list container. Rows go in right under the entry form, so the newest
/// row ends up on top.
pub trait ListView {
    fn insert_row(&mut self, workout: &Workout);
    fn hide_row(&mut self, id: &WorkoutId);
    fn clear(&mut self);
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Row {
    pub id: WorkoutId,
    pub text: String,
    pub hidden: bool,
}

/// Plain-text rows for the terminal.
#[derive(Debug, Default)]
pub struct TextList {
    rows: Vec<Row>,
}

impl TextList {
    /// Visible rows, top to bottom.
    pub fn rows(&self) -> impl Iterator<Item = &Row> {
        self.rows.iter().filter(|r| !r.hidden)
    }
}

impl ListView for TextList {
    fn insert_row(&mut self, workout: &Workout) {
        self.rows.insert(
            0,
            Row {
                id: workout.id.clone(),
                text: list_row_text(workout),
                hidden: false,
            },
        );
    }

    fn hide_row(&mut self, id: &WorkoutId) {
        for row in self.rows.iter_mut().filter(|r| &r.id == id) {
            row.hidden = true;
        }
    }

    fn clear(&mut self) {
        self.rows.clear();
    }
}

/// `(value, unit, icon)` of the kind-specific metric and the extra field.
fn details(w: &Workout) -> [(String, &'static str, &'static str); 2] {
    match w.activity {
        Activity::Running { cadence, pace } => [
            (format!("{pace:.1}"), "min/km", "⚡️"),
            (cadence.to_string(), "spm", "🦶🏼"),
        ],
        Activity::Cycling {
            elevation_gain,
            speed,
        } => [
            (format!("{speed:.1}"), "km/h", "⚡️"),
            (elevation_gain.to_string(), "m", "⛰"),
        ],
    }
}

pub fn list_row_text(w: &Workout) -> String {
    let [metric, extra] = details(w);
    format!(
        "{id}  {emoji} {desc:<22}  {dist} km  {dur} min  {mv} {mu}  {ev} {eu}",
        id = w.id,
        emoji = w.kind().emoji(),
        desc = w.description,
        dist = w.distance,
        dur = w.duration,
        mv = metric.0,
        mu = metric.1,
        ev = extra.0,
        eu = extra.1,
    )
}

/// The `<li>` fragment for one workout.
pub fn list_row_html(w: &Workout) -> String {
    let kind = w.kind();
    let mut html = String::new();
    let _ = write!(
        html,
        r#"<li class="workout workout--{kind}" data-id="{id}">
  <div class="workout__head">
    <h2 class="workout__title">{desc}</h2>
    <svg class="delete__icon"><use xlink:href="img/sprite.svg#icon-bin"></use></svg>
  </div>
"#,
        id = escape_html(w.id.as_str()),
        desc = escape_html(&w.description),
    );

    push_detail(&mut html, kind.emoji(), &w.distance.to_string(), "km");
    push_detail(&mut html, "⏱", &w.duration.to_string(), "min");
    for (value, unit, icon) in details(w) {
        push_detail(&mut html, icon, &value, unit);
    }
    html.push_str("</li>\n");
    html
}

fn push_detail(html: &mut String, icon: &str, value: &str, unit: &str) {
    let _ = write!(
        html,
        r#"  <div class="workout__details">
    <span class="workout__icon">{icon}</span>
    <span class="workout__value">{value}</span>
    <span class="workout__unit">{unit}</span>
  </div>
"#
    );
}

pub fn escape_html(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
