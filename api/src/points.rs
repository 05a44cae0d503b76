use crate::Prediction;
use serde::Serialize;
use std::collections::BTreeMap;

/// Total awarded points per username. Users without predictions are absent.
pub fn tally<'a, I>(predictions: I) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = &'a Prediction>,
{
    tally_seeded(predictions, std::iter::empty::<&str>())
}

/// Like [`tally`], but every username in `seed` is present even with no
/// predictions recorded.
pub fn tally_seeded<'a, I, S>(predictions: I, seed: S) -> BTreeMap<String, u32>
where
    I: IntoIterator<Item = &'a Prediction>,
    S: IntoIterator,
    S::Item: AsRef<str>,
{
    let mut totals: BTreeMap<String, u32> = seed
        .into_iter()
        .map(|username| (username.as_ref().to_owned(), 0))
        .collect();
    for prediction in predictions {
        let total = totals.entry(prediction.username.clone()).or_default();
        *total = total.saturating_add(prediction.points);
    }
    totals
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Standing {
    pub username: String,
    pub points: u32,
    /// Predictions that earned points.
    pub correct: u32,
}

/// Per-user totals, best first. Ties are broken by username.
pub fn standings<'a, I>(predictions: I) -> Vec<Standing>
where
    I: IntoIterator<Item = &'a Prediction>,
{
    let mut by_user: BTreeMap<&str, Standing> = BTreeMap::new();
    for prediction in predictions {
        let standing = by_user
            .entry(prediction.username.as_str())
            .or_insert_with(|| Standing {
                username: prediction.username.clone(),
                points: 0,
                correct: 0,
            });
        standing.points = standing.points.saturating_add(prediction.points);
        if prediction.points > 0 {
            standing.correct += 1;
        }
    }

    let mut standings: Vec<Standing> = by_user.into_values().collect();
    standings.sort_by(|a, b| {
        b.points
            .cmp(&a.points)
            .then_with(|| a.username.cmp(&b.username))
    });
    standings
}

/// Predictions made for one bracket coordinate.
pub fn predictions_at(predictions: &[Prediction], round: u32, position: u32) -> Vec<&Prediction> {
    predictions
        .iter()
        .filter(|p| p.round == round && p.position == position)
        .collect()
}
