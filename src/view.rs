use bracket_api::color::{self, tracked_by};
use bracket_api::points::{predictions_at, standings, tally_seeded};
use bracket_api::round::RoundName;
use bracket_api::{Bracket, Color, DrawPage, SelectedUser, StructureError};
use chrono::{DateTime, Utc};
use log::debug;
use serde::Serialize;
use std::collections::HashMap;

/// Everything the report shows for one draw.
#[derive(Debug, Clone, Serialize)]
pub struct DrawView {
    pub title: String,
    pub slug: String,
    pub size: u32,
    pub status: String,
    pub filled_through: u32,
    pub prediction_window: String,
    pub predictions_open: bool,
    pub rounds: Vec<RoundView>,
    pub users: Vec<UserView>,
    pub leaderboard: Vec<LeaderboardRow>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RoundView {
    pub round: u32,
    pub name: String,
    pub slots: Vec<SlotView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SlotView {
    pub position: u32,
    pub player: String,
    /// Set only on the slot of the player who won the match.
    pub score: Option<String>,
    pub picks: Vec<PickView>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PickView {
    pub username: String,
    pub name: String,
    pub color: Color,
    pub points: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct UserView {
    pub username: String,
    pub color: Color,
    pub points: u32,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LeaderboardRow {
    pub rank: usize,
    pub username: String,
    pub points: u32,
}

impl DrawView {
    pub fn build(
        page: &DrawPage,
        show_tiebreaks: bool,
        now: DateTime<Utc>,
    ) -> Result<Self, StructureError> {
        let draw = &page.draw;
        let bracket = if page.slots.is_empty() {
            debug!("draw {} has no slots yet", draw.id);
            Bracket::placeholder(draw.size)?
        } else {
            Bracket::new(draw.size, page.slots.iter().cloned())?
        };
        let status = bracket.status();
        let window = draw.prediction_window(now);

        let users = shown_users(page);
        let colors: HashMap<&str, Color> =
            users.iter().map(|u| (u.id.as_str(), u.color)).collect();

        let mut rounds = Vec::with_capacity(bracket.rounds() as usize);
        for round in 1..=bracket.rounds() {
            let scores: HashMap<u32, String> = bracket
                .matchups(round)
                .iter()
                .filter_map(|m| {
                    let (winner, _) = m.result()?;
                    Some((winner.position, m.score(show_tiebreaks)?))
                })
                .collect();

            let slots = bracket
                .round(round)
                .iter()
                .map(|slot| SlotView {
                    position: slot.position,
                    player: slot.display_name(),
                    score: scores.get(&slot.position).cloned(),
                    picks: predictions_at(&page.predictions, round, slot.position)
                        .into_iter()
                        .filter_map(|p| {
                            let color = *colors.get(p.user_id.as_str())?;
                            Some(PickView {
                                username: p.username.clone(),
                                name: p.name.clone(),
                                color,
                                points: p.points,
                            })
                        })
                        .collect(),
                })
                .collect();

            rounds.push(RoundView {
                round,
                name: RoundName::of(round, bracket.rounds()).label(),
                slots,
            });
        }

        let totals = tally_seeded(&page.predictions, users.iter().map(|u| &u.username));
        let users = users
            .iter()
            .map(|u| UserView {
                username: u.username.clone(),
                color: u.color,
                points: totals.get(&u.username).copied().unwrap_or_default(),
            })
            .collect();

        Ok(Self {
            title: draw.title(),
            slug: draw.slug(),
            size: draw.size,
            status: status.label(),
            filled_through: status.filled_through,
            prediction_window: window.label(),
            predictions_open: window.is_open(),
            rounds,
            users,
            leaderboard: leaderboard(page),
        })
    }
}

/// The viewer first, then the users they track. Without a viewer every
/// selected user is shown.
fn shown_users(page: &DrawPage) -> Vec<SelectedUser> {
    match &page.current_user {
        Some(me) => std::iter::once(color::primary(&me.id, &me.username))
            .chain(tracked_by(&page.selected_users, &me.id).filter(|u| u.id != me.id).cloned())
            .collect(),
        None => page.selected_users.clone(),
    }
}

/// Store results when present, otherwise standings from the loaded
/// predictions. Equal points share a rank.
fn leaderboard(page: &DrawPage) -> Vec<LeaderboardRow> {
    let mut rows: Vec<(String, u32)> = if page.draw_results.is_empty() {
        standings(&page.predictions)
            .into_iter()
            .map(|s| (s.username, s.points))
            .collect()
    } else {
        page.draw_results
            .iter()
            .map(|r| (r.username.clone(), r.points))
            .collect()
    };
    rows.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));

    let mut ranked: Vec<LeaderboardRow> = Vec::with_capacity(rows.len());
    for (i, (username, points)) in rows.into_iter().enumerate() {
        let rank = match ranked.last() {
            Some(prev) if prev.points == points => prev.rank,
            _ => i + 1,
        };
        ranked.push(LeaderboardRow {
            rank,
            username,
            points,
        });
    }
    ranked
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_api::{Draw, DrawResult, Prediction, SetScore, Slot};
    use chrono::TimeZone;

    fn slot(round: u32, position: u32, name: &str, games: [u8; 2]) -> Slot {
        Slot {
            id: format!("r{round}p{position}"),
            round,
            position,
            name: name.into(),
            sets: [
                SetScore::new(games[0], None),
                SetScore::new(games[1], None),
                SetScore::default(),
                SetScore::default(),
                SetScore::default(),
            ],
            ..Default::default()
        }
    }

    /// A slot past the first round, which carries no set scores.
    fn later(round: u32, position: u32, name: &str) -> Slot {
        Slot {
            id: format!("r{round}p{position}"),
            round,
            position,
            name: name.into(),
            ..Default::default()
        }
    }

    fn user(id: &str, username: &str, color: Color, selector: &str) -> SelectedUser {
        SelectedUser {
            id: id.into(),
            username: username.into(),
            color,
            selector_id: selector.into(),
        }
    }

    fn pick(
        user_id: &str,
        username: &str,
        round: u32,
        position: u32,
        name: &str,
        points: u32,
    ) -> Prediction {
        Prediction {
            round,
            position,
            name: name.into(),
            points,
            user_id: user_id.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    /// A finished four player draw: Federer beats Murray, Nadal beats
    /// Djokovic, Federer wins the final.
    fn page() -> DrawPage {
        DrawPage {
            draw: Draw {
                id: "d4".into(),
                name: "Wimbledon".into(),
                event: "Mens Singles".into(),
                year: 2008,
                size: 4,
                prediction_close: Some(Utc.with_ymd_and_hms(2008, 6, 24, 12, 0, 0).unwrap()),
                ..Default::default()
            },
            slots: vec![
                slot(1, 1, "Roger Federer", [6, 6]),
                slot(1, 2, "Andy Murray", [2, 3]),
                slot(1, 3, "Novak Djokovic", [7, 4]),
                slot(1, 4, "Rafael Nadal", [5, 6]),
                later(2, 1, "Roger Federer"),
                later(2, 2, "Rafael Nadal"),
                later(3, 1, ""),
            ],
            predictions: vec![
                pick("u1", "will", 2, 1, "Roger Federer", 2),
                pick("u1", "will", 2, 2, "Novak Djokovic", 0),
                pick("u2", "john", 2, 1, "Roger Federer", 2),
                pick("u2", "john", 2, 2, "Rafael Nadal", 2),
                pick("u3", "nobody", 2, 2, "Rafael Nadal", 2),
            ],
            draw_results: Vec::new(),
            current_user: Some(user("u1", "will", Color::Blue, "u1")),
            selected_users: vec![
                user("u2", "john", Color::Red, "u1"),
                user("u9", "steve", Color::Yellow, "someoneElse"),
            ],
        }
    }

    fn now() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2008, 7, 1, 0, 0, 0).unwrap()
    }

    #[test]
    fn header_reflects_draw_state() {
        let view = DrawView::build(&page(), false, now()).unwrap();
        assert_eq!(view.title, "Wimbledon Mens Singles 2008");
        assert_eq!(view.status, "Final");
        assert_eq!(view.filled_through, 2);
        assert!(!view.predictions_open);
        assert_eq!(view.prediction_window, "Predictions closed: 6/24/2008 12:00pm UTC");
        let names: Vec<&str> = view.rounds.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, vec!["Semifinals", "Final", "Champion"]);
    }

    #[test]
    fn scores_sit_on_the_winning_slot() {
        let view = DrawView::build(&page(), false, now()).unwrap();
        let semis = &view.rounds[0].slots;
        assert_eq!(semis[0].score.as_deref(), Some("6-2, 6-3"));
        assert_eq!(semis[1].score, None);
        assert_eq!(semis[2].score, None);
        assert_eq!(semis[3].score.as_deref(), Some("5-7, 6-4"));
        assert!(view.rounds[1].slots.iter().all(|s| s.score.is_none()));
        assert_eq!(view.rounds[2].slots[0].player, "TBD");
    }

    #[test]
    fn picks_only_for_shown_users() {
        let view = DrawView::build(&page(), false, now()).unwrap();
        let picks = &view.rounds[1].slots[1].picks;
        let shown: Vec<(&str, Color)> =
            picks.iter().map(|p| (p.username.as_str(), p.color)).collect();
        assert_eq!(shown, vec![("will", Color::Blue), ("john", Color::Red)]);
    }

    #[test]
    fn users_carry_points_and_colors() {
        let view = DrawView::build(&page(), false, now()).unwrap();
        let users: Vec<(&str, Color, u32)> = view
            .users
            .iter()
            .map(|u| (u.username.as_str(), u.color, u.points))
            .collect();
        assert_eq!(users, vec![("will", Color::Blue, 2), ("john", Color::Red, 4)]);
    }

    #[test]
    fn leaderboard_prefers_store_results() {
        let mut page = page();
        let view = DrawView::build(&page, false, now()).unwrap();
        let ranks: Vec<(usize, &str, u32)> = view
            .leaderboard
            .iter()
            .map(|r| (r.rank, r.username.as_str(), r.points))
            .collect();
        assert_eq!(ranks, vec![(1, "john", 4), (2, "nobody", 2), (2, "will", 2)]);

        page.draw_results = vec![
            DrawResult {
                username: "sally".into(),
                points: 30,
                prediction_count: 7,
                ..Default::default()
            },
            DrawResult {
                username: "john".into(),
                points: 4,
                prediction_count: 2,
                ..Default::default()
            },
        ];
        let view = DrawView::build(&page, false, now()).unwrap();
        let names: Vec<&str> = view.leaderboard.iter().map(|r| r.username.as_str()).collect();
        assert_eq!(names, vec!["sally", "john"]);
    }

    #[test]
    fn draw_without_slots_is_all_tbd() {
        let mut page = page();
        page.slots.clear();
        let view = DrawView::build(&page, false, now()).unwrap();
        assert_eq!(view.status, "Qualifying Rounds");
        assert_eq!(view.rounds[0].slots.len(), 4);
        assert!(view.rounds.iter().flat_map(|r| &r.slots).all(|s| s.player == "TBD"));
    }

    #[test]
    fn broken_layout_is_an_error() {
        let mut page = page();
        page.slots.pop();
        assert_eq!(
            DrawView::build(&page, false, now()).unwrap_err(),
            StructureError::MissingSlot {
                round: 3,
                position: 1,
            }
        );
    }
}
