use crate::view::{DrawView, SlotView};
use bracket_api::{Draw, Profile};
use serde_json::{Value, json};
use std::fmt::Write;

/// Plain-text rendering of a draw, one block per round.
pub fn render(view: &DrawView) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", view.title);
    let _ = writeln!(out, "{} | {}", view.status, view.prediction_window);

    if !view.users.is_empty() {
        let users: Vec<String> = view
            .users
            .iter()
            .map(|u| format!("{} [{}] {} pts", u.username, u.color.name(), u.points))
            .collect();
        let _ = writeln!(out, "Showing: {}", users.join(", "));
    }

    for round in &view.rounds {
        let _ = writeln!(out, "\n{}", round.name);
        for slot in &round.slots {
            let _ = writeln!(out, "{}", slot_line(slot));
        }
    }

    if !view.leaderboard.is_empty() {
        let _ = writeln!(out, "\nLeaderboard");
        for row in &view.leaderboard {
            let _ = writeln!(out, "{:>3}. {:<20} {}", row.rank, row.username, row.points);
        }
    }
    out
}

fn slot_line(slot: &SlotView) -> String {
    let mut line = format!("{:>4}  {}", slot.position, slot.player);
    if let Some(score) = &slot.score {
        let _ = write!(line, "  {score}");
    }
    for pick in &slot.picks {
        let mark = if pick.points > 0 { format!(" +{}", pick.points) } else { String::new() };
        let _ = write!(line, "  [{}: {}{mark}]", pick.username, pick.name);
    }
    line
}

/// The draw catalogue: active draws first, then completed ones.
pub fn render_catalogue(active: &[Draw], completed: &[Draw]) -> String {
    let mut out = String::new();
    for (heading, draws) in [("Active", active), ("Completed", completed)] {
        let _ = writeln!(out, "{heading}");
        if draws.is_empty() {
            let _ = writeln!(out, "  (none)");
        }
        for draw in draws {
            let _ = writeln!(out, "  {:<40} {}", draw.title(), draw.slug());
        }
    }
    out
}

pub fn render_profile(profile: &Profile) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", profile.username);
    if let Some(created) = profile.created {
        let _ = writeln!(out, "Member since {}", created.format("%-m/%-d/%Y"));
    }
    let _ = writeln!(out, "Average points per draw: {:.1}", profile.average_points);
    let _ = writeln!(out, "Correct predictions: {}", profile.correct_predictions);
    out
}

pub fn catalogue_json(active: &[Draw], completed: &[Draw]) -> Value {
    let entries = |draws: &[Draw]| -> Vec<Value> {
        draws
            .iter()
            .map(|d| {
                json!({
                    "id": d.id,
                    "slug": d.slug(),
                    "title": d.title(),
                    "size": d.size,
                    "start_date": d.start_date,
                    "end_date": d.end_date,
                })
            })
            .collect()
    };
    json!({ "active": entries(active), "completed": entries(completed) })
}
