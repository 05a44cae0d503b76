use crate::{PredictionWindow, format_timestamp};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PredictionError {
    #[error("Must be logged in to make a prediction")]
    NotLoggedIn,
    #[error("Invalid prediction: \"{0}\"")]
    InvalidName(String),
    #[error("Invalid slot: \"{0}\"")]
    InvalidSlot(String),
    #[error("Predictions closed: {0}")]
    Closed(String),
}

/// A pick as submitted from the draw page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PredictionRequest {
    pub slot_id: String,
    /// Set when the user is revising an earlier pick for the same slot.
    pub current_prediction_id: Option<String>,
    pub name: String,
}

/// Body of a prediction write. Points always start at zero; the store awards
/// them once the slot is decided.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PredictionBody {
    pub draw_slot_id: String,
    pub user_id: String,
    pub name: String,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PredictionWrite {
    Create(PredictionBody),
    Update { id: String, body: PredictionBody },
}

impl PredictionWrite {
    pub fn body(&self) -> &PredictionBody {
        match self {
            PredictionWrite::Create(body) | PredictionWrite::Update { body, .. } => body,
        }
    }
}

impl PredictionRequest {
    /// Check the request and turn it into a create or an update.
    pub fn validate(
        self,
        user_id: Option<&str>,
        window: &PredictionWindow,
    ) -> Result<PredictionWrite, PredictionError> {
        let user_id = user_id
            .filter(|id| !id.is_empty())
            .ok_or(PredictionError::NotLoggedIn)?;
        if let PredictionWindow::Closed(at) = window {
            return Err(PredictionError::Closed(format_timestamp(at)));
        }
        if self.name.trim().is_empty() {
            return Err(PredictionError::InvalidName(self.name));
        }
        if self.slot_id.is_empty() {
            return Err(PredictionError::InvalidSlot(self.slot_id));
        }

        let body = PredictionBody {
            draw_slot_id: self.slot_id,
            user_id: user_id.to_owned(),
            name: self.name,
            points: 0,
        };
        Ok(match self.current_prediction_id.filter(|id| !id.is_empty()) {
            Some(id) => PredictionWrite::Update { id, body },
            None => PredictionWrite::Create(body),
        })
    }
}
