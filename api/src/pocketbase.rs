/// Record store raw wire types: serde shapes for the PocketBase REST API.
/// These map to our clean domain types via the From impls at the bottom.
use crate::{Draw, DrawPage, DrawResult, Prediction, Profile, SelectedUser, SetScore, Slot};
use chrono::{DateTime, NaiveDateTime, Utc};
use serde::Deserialize;
use std::collections::BTreeMap;
use std::fmt;

// ---------------------------------------------------------------------------
// Envelopes
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize, Clone)]
#[serde(rename_all = "camelCase")]
pub struct ListResponse<T> {
    #[serde(default)]
    pub page: u32,
    #[serde(default)]
    pub per_page: u32,
    #[serde(default)]
    pub total_items: u32,
    #[serde(default)]
    pub total_pages: u32,
    #[serde(default = "Vec::new")]
    pub items: Vec<T>,
}

impl<T> Default for ListResponse<T> {
    fn default() -> Self {
        Self {
            page: 0,
            per_page: 0,
            total_items: 0,
            total_pages: 0,
            items: Vec::new(),
        }
    }
}

/// Error body returned with any non-2xx status.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct ErrorResponse {
    #[serde(alias = "code", default)]
    pub status: u16,
    #[serde(default)]
    pub message: String,
    /// Per-field validation failures, keyed by field name.
    #[serde(default)]
    pub data: BTreeMap<String, FieldError>,
}

#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
pub struct FieldError {
    #[serde(default)]
    pub code: String,
    #[serde(default)]
    pub message: String,
}

impl fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Error: {} - {}", self.status, self.message)?;
        for (field, error) in &self.data {
            write!(f, "\n• {}: {}", capitalize(field), error.message)?;
        }
        Ok(())
    }
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        None => String::new(),
        Some(first) => first.to_uppercase().collect::<String>() + &chars.as_str().to_lowercase(),
    }
}

// ---------------------------------------------------------------------------
// Records
// ---------------------------------------------------------------------------

/// Any record, told apart by its `collectionName`.
#[derive(Debug, Deserialize, Clone)]
#[serde(tag = "collectionName")]
pub enum Record {
    #[serde(rename = "draw")]
    Draw(DrawRecord),
    #[serde(rename = "draw_results")]
    DrawResult(DrawResultRecord),
    #[serde(rename = "draw_slot")]
    Slot(SlotRecord),
    #[serde(rename = "view_predictions")]
    Prediction(PredictionRecord),
    #[serde(other)]
    Unknown,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DrawRecord {
    pub id: String,
    pub name: String,
    pub event: String,
    pub year: u16,
    pub url: String,
    pub size: u32,
    pub start_date: String, // "2024-05-26 12:00:00.000Z"
    pub end_date: String,
    pub prediction_close: String, // empty until the store closes predictions
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct SlotRecord {
    pub id: String,
    pub draw_id: String,
    pub round: u32,
    pub position: u32,
    pub name: String,
    pub seed: String,
    pub set1_games: Option<u8>,
    pub set1_tiebreak: Option<u8>,
    pub set2_games: Option<u8>,
    pub set2_tiebreak: Option<u8>,
    pub set3_games: Option<u8>,
    pub set3_tiebreak: Option<u8>,
    pub set4_games: Option<u8>,
    pub set4_tiebreak: Option<u8>,
    pub set5_games: Option<u8>,
    pub set5_tiebreak: Option<u8>,
}

/// Row of the `view_predictions` view: a prediction joined with its slot
/// coordinates and the predicting user's name.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct PredictionRecord {
    pub id: String,
    pub draw_id: String,
    pub draw_slot_id: String,
    pub round: u32,
    pub position: u32,
    pub seed: String,
    pub name: String,
    pub points: Option<u32>,
    pub user_id: String,
    pub username: String,
}

/// Row of the writable `prediction` collection.
#[derive(Debug, Deserialize, Default, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct StoredPrediction {
    pub id: String,
    pub draw_slot_id: String,
    pub name: String,
    pub points: u32,
    pub user_id: String,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct DrawResultRecord {
    pub id: String,
    pub draw_id: String,
    pub user_id: String,
    pub username: String,
    pub points: u32,
    pub prediction_count: u32,
}

#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct UserRecord {
    pub id: String,
    pub username: String,
    pub created: String,
}

/// Row of the `average_points` view, keyed `{user_id}_avg`.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct AveragePointsRecord {
    pub id: String,
    pub average_points: f64,
}

/// Row of the `correct_predictions` view, keyed `{user_id}_cp`.
#[derive(Debug, Deserialize, Default, Clone)]
#[serde(default)]
pub struct CorrectPredictionsRecord {
    pub id: String,
    pub correct_predictions: u32,
}

/// A saved draw page: what the web front end loads for one draw.
#[derive(Debug, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct DrawSnapshot {
    pub draw: DrawRecord,
    #[serde(default)]
    pub slots: ListResponse<SlotRecord>,
    #[serde(default)]
    pub predictions: Vec<PredictionRecord>,
    #[serde(default)]
    pub draw_results: ListResponse<Record>,
    #[serde(default)]
    pub current_user: Option<SelectedUser>,
    #[serde(default)]
    pub selected_users: Vec<SelectedUser>,
}

// ---------------------------------------------------------------------------
// Mapping: wire types → domain types
// ---------------------------------------------------------------------------

/// Parse a store timestamp. Empty means "not set".
pub fn parse_datetime(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }
    NaiveDateTime::parse_from_str(s, "%Y-%m-%d %H:%M:%S%.fZ")
        .map(|dt| dt.and_utc())
        .ok()
        .or_else(|| {
            DateTime::parse_from_rfc3339(s)
                .ok()
                .map(|dt| dt.with_timezone(&Utc))
        })
}

impl From<DrawRecord> for Draw {
    fn from(r: DrawRecord) -> Self {
        Draw {
            start_date: parse_datetime(&r.start_date),
            end_date: parse_datetime(&r.end_date),
            prediction_close: parse_datetime(&r.prediction_close),
            id: r.id,
            name: r.name,
            event: r.event,
            year: r.year,
            url: r.url,
            size: r.size,
        }
    }
}

impl From<SlotRecord> for Slot {
    fn from(r: SlotRecord) -> Self {
        let set = |games, tiebreak| SetScore { games, tiebreak };
        Slot {
            sets: [
                set(r.set1_games, r.set1_tiebreak),
                set(r.set2_games, r.set2_tiebreak),
                set(r.set3_games, r.set3_tiebreak),
                set(r.set4_games, r.set4_tiebreak),
                set(r.set5_games, r.set5_tiebreak),
            ],
            id: r.id,
            draw_id: r.draw_id,
            round: r.round,
            position: r.position,
            name: r.name,
            seed: r.seed,
        }
    }
}

impl From<PredictionRecord> for Prediction {
    fn from(r: PredictionRecord) -> Self {
        Prediction {
            id: r.id,
            draw_id: r.draw_id,
            draw_slot_id: r.draw_slot_id,
            round: r.round,
            position: r.position,
            seed: r.seed,
            name: r.name,
            points: r.points.unwrap_or_default(),
            user_id: r.user_id,
            username: r.username,
        }
    }
}

impl From<DrawResultRecord> for DrawResult {
    fn from(r: DrawResultRecord) -> Self {
        DrawResult {
            draw_id: r.draw_id,
            user_id: r.user_id,
            username: r.username,
            points: r.points,
            prediction_count: r.prediction_count,
        }
    }
}

impl From<(UserRecord, AveragePointsRecord, CorrectPredictionsRecord)> for Profile {
    fn from(
        (user, avg, cp): (UserRecord, AveragePointsRecord, CorrectPredictionsRecord),
    ) -> Self {
        Profile {
            created: parse_datetime(&user.created),
            username: user.username,
            average_points: avg.average_points,
            correct_predictions: cp.correct_predictions,
        }
    }
}

impl Record {
    pub fn into_draw_result(self) -> Option<DrawResult> {
        match self {
            Record::DrawResult(r) => Some(r.into()),
            _ => None,
        }
    }

    pub fn collection(&self) -> &'static str {
        match self {
            Record::Draw(_) => "draw",
            Record::DrawResult(_) => "draw_results",
            Record::Slot(_) => "draw_slot",
            Record::Prediction(_) => "view_predictions",
            Record::Unknown => "unknown",
        }
    }
}

impl From<DrawSnapshot> for DrawPage {
    fn from(s: DrawSnapshot) -> Self {
        DrawPage {
            draw: s.draw.into(),
            slots: s.slots.items.into_iter().map(Slot::from).collect(),
            predictions: s.predictions.into_iter().map(Prediction::from).collect(),
            draw_results: s
                .draw_results
                .items
                .into_iter()
                .filter_map(Record::into_draw_result)
                .collect(),
            current_user: s.current_user,
            selected_users: s.selected_users,
        }
    }
}
