pub mod bracket;
pub mod client;
pub mod color;
pub mod pocketbase;
pub mod points;
pub mod prediction;
pub mod round;
pub mod score;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

pub use bracket::{Bracket, Matchup, StructureError};
pub use color::{Color, ColorAssigner, ColorError};
pub use round::{RoundName, RoundStatus};

/// Number of set sub-records carried by every slot (best of five).
pub const SET_COUNT: usize = 5;

// ---------------------------------------------------------------------------
// Domain types: clean model, independent of the record store wire format
// ---------------------------------------------------------------------------

/// A single-elimination tournament instance with a fixed entrant count.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Draw {
    pub id: String,
    pub name: String,  // "French Open"
    pub event: String, // "Mens Singles" | "Womens Singles"
    pub year: u16,
    pub url: String,
    pub size: u32,
    pub start_date: Option<DateTime<Utc>>,
    pub end_date: Option<DateTime<Utc>>,
    pub prediction_close: Option<DateTime<Utc>>,
}

impl Draw {
    /// URL slug, e.g. `french-open-mens-singles-2024-j5mehm6fvdf9105`.
    /// The record id is always the last dash-separated segment.
    pub fn slug(&self) -> String {
        format!(
            "{}-{}-{}-{}",
            slugify(&self.name),
            slugify(&self.event),
            self.year,
            self.id
        )
    }

    pub fn title(&self) -> String {
        format!("{} {} {}", self.name, self.event, self.year)
    }

    /// Extract the record id from a slug. A bare id is returned unchanged.
    pub fn id_from_slug(slug: &str) -> &str {
        slug.rsplit('-').next().unwrap_or(slug)
    }

    /// A draw stays active through its final day.
    pub fn is_active(&self, today: NaiveDate) -> bool {
        self.end_date.is_none_or(|end| end.date_naive() >= today)
    }

    pub fn prediction_window(&self, now: DateTime<Utc>) -> PredictionWindow {
        match self.prediction_close {
            None => PredictionWindow::Open,
            Some(close) if close > now => PredictionWindow::ClosesAt(close),
            Some(close) => PredictionWindow::Closed(close),
        }
    }
}

fn slugify(s: &str) -> String {
    s.to_lowercase().replace(' ', "-")
}

/// Split draws into (active, completed), each ordered newest first and then
/// by event name.
pub fn partition_draws(draws: Vec<Draw>, today: NaiveDate) -> (Vec<Draw>, Vec<Draw>) {
    let (mut active, mut completed): (Vec<Draw>, Vec<Draw>) =
        draws.into_iter().partition(|d| d.is_active(today));
    let order = |a: &Draw, b: &Draw| {
        b.start_date
            .cmp(&a.start_date)
            .then_with(|| a.event.cmp(&b.event))
    };
    active.sort_by(order);
    completed.sort_by(order);
    (active, completed)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PredictionWindow {
    /// No close time published yet; the store closes predictions once the
    /// round of 16 is set.
    Open,
    ClosesAt(DateTime<Utc>),
    Closed(DateTime<Utc>),
}

impl PredictionWindow {
    pub fn is_open(&self) -> bool {
        !matches!(self, PredictionWindow::Closed(_))
    }

    pub fn label(&self) -> String {
        match self {
            PredictionWindow::Open => "Predictions open until: 12h after R16 is full".into(),
            PredictionWindow::ClosesAt(t) => {
                format!("Predictions open until: {}", format_timestamp(t))
            }
            PredictionWindow::Closed(t) => format!("Predictions closed: {}", format_timestamp(t)),
        }
    }
}

/// `1/28/2024 5:32am UTC`
pub fn format_timestamp(t: &DateTime<Utc>) -> String {
    t.format("%-m/%-d/%Y %-I:%M%P UTC").to_string()
}

/// Games and tie-break points won by one player in one set.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SetScore {
    pub games: Option<u8>,
    pub tiebreak: Option<u8>,
}

impl SetScore {
    pub fn new(games: u8, tiebreak: Option<u8>) -> Self {
        Self {
            games: Some(games),
            tiebreak,
        }
    }
}

/// One (round, position) cell of the bracket.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Slot {
    pub id: String,
    pub draw_id: String,
    pub round: u32,
    pub position: u32,
    pub name: String, // empty = TBD
    pub seed: String, // "(1)", "(WC)", or empty
    pub sets: [SetScore; SET_COUNT],
}

impl Slot {
    pub fn is_decided(&self) -> bool {
        !self.name.is_empty()
    }

    /// `(1) Roger Federer`, `Roger Federer`, or `TBD`.
    pub fn display_name(&self) -> String {
        match (self.is_decided(), self.seed.is_empty()) {
            (false, _) => "TBD".to_owned(),
            (true, true) => self.name.clone(),
            (true, false) => format!("{} {}", self.seed, self.name),
        }
    }
}

/// A user's pick for one slot. `points` is awarded by the store once the
/// slot is decided; it stays 0 until then.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Prediction {
    pub id: String,
    pub draw_id: String,
    pub draw_slot_id: String,
    pub round: u32,
    pub position: u32,
    pub seed: String,
    pub name: String,
    pub points: u32,
    pub user_id: String,
    pub username: String,
}

/// Per-user summary for one draw, computed by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DrawResult {
    pub draw_id: String,
    pub user_id: String,
    pub username: String,
    pub points: u32,
    pub prediction_count: u32,
}

/// Career summary for one user across every draw they predicted.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Profile {
    pub username: String,
    pub created: Option<DateTime<Utc>>,
    pub average_points: f64,
    pub correct_predictions: u32,
}

/// A predictor shown on the draw page, either the viewer themself or a user
/// the viewer is tracking.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SelectedUser {
    pub id: String,
    pub username: String,
    pub color: Color,
    #[serde(rename = "selectorId")]
    pub selector_id: String,
}

/// A user looked up by the viewer but not yet given a color.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PendingUser {
    #[serde(rename = "selectorId")]
    pub selector_id: String,
    pub id: String,
    pub username: String,
}

/// Everything the draw page needs, taken as one consistent snapshot.
#[derive(Debug, Clone, Default)]
pub struct DrawPage {
    pub draw: Draw,
    pub slots: Vec<Slot>,
    pub predictions: Vec<Prediction>,
    pub draw_results: Vec<DrawResult>,
    pub current_user: Option<SelectedUser>,
    pub selected_users: Vec<SelectedUser>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn french_open() -> Draw {
        Draw {
            id: "j5mehm6fvdf9105".into(),
            name: "French Open".into(),
            event: "Mens Singles".into(),
            year: 2024,
            size: 128,
            start_date: Some(Utc.with_ymd_and_hms(2024, 5, 26, 12, 0, 0).unwrap()),
            end_date: Some(Utc.with_ymd_and_hms(2024, 6, 9, 23, 0, 0).unwrap()),
            ..Default::default()
        }
    }

    #[test]
    fn slug_and_title() {
        let draw = french_open();
        assert_eq!(draw.slug(), "french-open-mens-singles-2024-j5mehm6fvdf9105");
        assert_eq!(draw.title(), "French Open Mens Singles 2024");
    }

    #[test]
    fn id_is_last_slug_segment() {
        assert_eq!(
            Draw::id_from_slug("french-open-mens-singles-2024-j5mehm6fvdf9105"),
            "j5mehm6fvdf9105"
        );
        assert_eq!(Draw::id_from_slug("j5mehm6fvdf9105"), "j5mehm6fvdf9105");
    }

    #[test]
    fn draw_is_active_through_its_last_day() {
        let draw = french_open();
        assert!(draw.is_active(NaiveDate::from_ymd_opt(2024, 6, 9).unwrap()));
        assert!(!draw.is_active(NaiveDate::from_ymd_opt(2024, 6, 10).unwrap()));
    }

    #[test]
    fn partition_sorts_newest_first() {
        let mut ao = french_open();
        ao.id = "757duh3a8vpgyrq".into();
        ao.name = "Australian Open".into();
        ao.start_date = Some(Utc.with_ymd_and_hms(2024, 1, 13, 13, 0, 0).unwrap());
        ao.end_date = Some(Utc.with_ymd_and_hms(2024, 1, 28, 13, 0, 0).unwrap());
        let mut womens = french_open();
        womens.id = "w".into();
        womens.event = "Womens Singles".into();

        let today = NaiveDate::from_ymd_opt(2024, 6, 1).unwrap();
        let (active, completed) = partition_draws(vec![ao, womens, french_open()], today);

        let ids: Vec<&str> = active.iter().map(|d| d.id.as_str()).collect();
        assert_eq!(ids, vec!["j5mehm6fvdf9105", "w"]);
        assert_eq!(completed.len(), 1);
        assert_eq!(completed[0].name, "Australian Open");
    }

    #[test]
    fn prediction_window_labels() {
        let now = Utc.with_ymd_and_hms(2024, 1, 20, 0, 0, 0).unwrap();
        let mut draw = french_open();
        assert_eq!(
            draw.prediction_window(now).label(),
            "Predictions open until: 12h after R16 is full"
        );

        draw.prediction_close = Some(Utc.with_ymd_and_hms(2024, 1, 28, 5, 32, 34).unwrap());
        let window = draw.prediction_window(now);
        assert!(window.is_open());
        assert_eq!(window.label(), "Predictions open until: 1/28/2024 5:32am UTC");

        let later = Utc.with_ymd_and_hms(2024, 2, 1, 0, 0, 0).unwrap();
        let window = draw.prediction_window(later);
        assert!(!window.is_open());
        assert_eq!(window.label(), "Predictions closed: 1/28/2024 5:32am UTC");
    }

    #[test]
    fn slot_display_name() {
        let mut slot = Slot::default();
        assert_eq!(slot.display_name(), "TBD");
        slot.name = "Roger Federer".into();
        assert_eq!(slot.display_name(), "Roger Federer");
        slot.seed = "(1)".into();
        assert_eq!(slot.display_name(), "(1) Roger Federer");
    }
}
