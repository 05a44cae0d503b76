use crate::{PendingUser, SelectedUser};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Display colors, serialized as the stylesheet classes the web front end
/// already stores in its `selectedUsers` cookie.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Color {
    #[serde(rename = "bg-blue-300")]
    Blue,
    #[serde(rename = "bg-red-300")]
    Red,
    #[serde(rename = "bg-yellow-300")]
    Yellow,
    #[serde(rename = "bg-green-300")]
    Green,
    #[serde(rename = "bg-purple-300")]
    Purple,
    #[serde(rename = "bg-orange-300")]
    Orange,
}

impl Color {
    pub fn class(&self) -> &'static str {
        match self {
            Color::Blue => "bg-blue-300",
            Color::Red => "bg-red-300",
            Color::Yellow => "bg-yellow-300",
            Color::Green => "bg-green-300",
            Color::Purple => "bg-purple-300",
            Color::Orange => "bg-orange-300",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Color::Blue => "blue",
            Color::Red => "red",
            Color::Yellow => "yellow",
            Color::Green => "green",
            Color::Purple => "purple",
            Color::Orange => "orange",
        }
    }
}

/// Reserved for the viewer; never handed out to tracked users.
pub const MAIN_COLOR: Color = Color::Blue;

pub const SELECT_COLORS: [Color; 5] = [
    Color::Red,
    Color::Yellow,
    Color::Green,
    Color::Purple,
    Color::Orange,
];

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ColorError {
    #[error("color: all {0} colors are taken, remove a user first")]
    PaletteExhausted(usize),
}

/// The viewer, shown in the reserved main color.
pub fn primary(id: &str, username: &str) -> SelectedUser {
    SelectedUser {
        id: id.to_owned(),
        username: username.to_owned(),
        color: MAIN_COLOR,
        selector_id: id.to_owned(),
    }
}

/// Users tracked by one viewer. The stored list may hold entries for several
/// viewers sharing a browser.
pub fn tracked_by<'a>(
    tracked: &'a [SelectedUser],
    selector_id: &'a str,
) -> impl Iterator<Item = &'a SelectedUser> {
    tracked.iter().filter(move |u| u.selector_id == selector_id)
}

/// Hands out palette colors to tracked users.
///
/// The tracked list is owned by the caller: `add_user` computes the next
/// entry and `remove_user` returns a new list, neither keeps any state.
#[derive(Debug, Clone)]
pub struct ColorAssigner {
    palette: Vec<Color>,
}

impl Default for ColorAssigner {
    fn default() -> Self {
        Self::new(SELECT_COLORS)
    }
}

impl ColorAssigner {
    /// Palette order is assignment order. The main color and repeats are
    /// dropped.
    pub fn new(palette: impl IntoIterator<Item = Color>) -> Self {
        let mut colors: Vec<Color> = Vec::new();
        for color in palette {
            if color != MAIN_COLOR && !colors.contains(&color) {
                colors.push(color);
            }
        }
        Self { palette: colors }
    }

    pub fn palette(&self) -> &[Color] {
        &self.palette
    }

    /// First palette color not held by any user this viewer tracks.
    pub fn next_color(&self, tracked: &[SelectedUser], selector_id: &str) -> Option<Color> {
        self.palette
            .iter()
            .copied()
            .find(|&color| !tracked_by(tracked, selector_id).any(|u| u.color == color))
    }

    pub fn add_user(
        &self,
        tracked: &[SelectedUser],
        user: PendingUser,
    ) -> Result<SelectedUser, ColorError> {
        if user.id == user.selector_id {
            return Ok(primary(&user.id, &user.username));
        }
        if let Some(existing) = tracked_by(tracked, &user.selector_id).find(|u| u.id == user.id) {
            return Ok(existing.clone());
        }
        let color = self
            .next_color(tracked, &user.selector_id)
            .ok_or(ColorError::PaletteExhausted(self.palette.len()))?;
        Ok(SelectedUser {
            id: user.id,
            username: user.username,
            color,
            selector_id: user.selector_id,
        })
    }

    pub fn remove_user(
        tracked: &[SelectedUser],
        selector_id: &str,
        user_id: &str,
    ) -> Vec<SelectedUser> {
        tracked
            .iter()
            .filter(|u| !(u.selector_id == selector_id && u.id == user_id))
            .cloned()
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pending(id: &str) -> PendingUser {
        PendingUser {
            selector_id: "userId".into(),
            id: id.into(),
            username: format!("user-{id}"),
        }
    }

    fn add(assigner: &ColorAssigner, tracked: &mut Vec<SelectedUser>, id: &str) -> Color {
        let user = assigner.add_user(tracked, pending(id)).unwrap();
        let color = user.color;
        tracked.push(user);
        color
    }

    #[test]
    fn colors_are_assigned_in_palette_order() {
        let assigner = ColorAssigner::default();
        let mut tracked = Vec::new();
        assert_eq!(add(&assigner, &mut tracked, "john"), Color::Red);
        assert_eq!(add(&assigner, &mut tracked, "steve"), Color::Yellow);
        assert_eq!(add(&assigner, &mut tracked, "sally"), Color::Green);
    }

    #[test]
    fn freed_color_is_reused_first() {
        let assigner = ColorAssigner::default();
        let mut tracked = Vec::new();
        add(&assigner, &mut tracked, "john");
        add(&assigner, &mut tracked, "steve");
        add(&assigner, &mut tracked, "sally");

        tracked = ColorAssigner::remove_user(&tracked, "userId", "john");
        assert_eq!(tracked.len(), 2);
        assert_eq!(add(&assigner, &mut tracked, "anna"), Color::Red);
        assert_eq!(add(&assigner, &mut tracked, "mike"), Color::Purple);
    }

    #[test]
    fn exhausted_palette_is_an_error() {
        let assigner = ColorAssigner::new([Color::Red, Color::Yellow]);
        let mut tracked = Vec::new();
        add(&assigner, &mut tracked, "a");
        add(&assigner, &mut tracked, "b");
        assert_eq!(
            assigner.add_user(&tracked, pending("c")),
            Err(ColorError::PaletteExhausted(2))
        );
    }

    #[test]
    fn main_color_is_never_in_the_palette() {
        let assigner = ColorAssigner::new([Color::Blue, Color::Red, Color::Red, Color::Green]);
        assert_eq!(assigner.palette(), &[Color::Red, Color::Green]);
    }

    #[test]
    fn adding_twice_keeps_the_first_color() {
        let assigner = ColorAssigner::default();
        let mut tracked = Vec::new();
        add(&assigner, &mut tracked, "john");
        let again = assigner.add_user(&tracked, pending("john")).unwrap();
        assert_eq!(again.color, Color::Red);
        assert_eq!(assigner.next_color(&tracked, "userId"), Some(Color::Yellow));
    }

    #[test]
    fn viewer_gets_main_color() {
        let assigner = ColorAssigner::default();
        let me = assigner.add_user(&[], pending("userId")).unwrap();
        assert_eq!(me.color, MAIN_COLOR);
        assert_eq!(me, primary("userId", "user-userId"));
    }

    #[test]
    fn other_viewers_colors_do_not_interfere() {
        let assigner = ColorAssigner::default();
        let mut tracked = vec![SelectedUser {
            id: "x".into(),
            username: "x".into(),
            color: Color::Red,
            selector_id: "someoneElse".into(),
        }];
        assert_eq!(add(&assigner, &mut tracked, "john"), Color::Red);
        assert_eq!(tracked_by(&tracked, "userId").count(), 1);

        let tracked = ColorAssigner::remove_user(&tracked, "userId", "x");
        assert_eq!(tracked.len(), 2);
    }

    #[test]
    fn colors_round_trip_as_classes() {
        let json = serde_json::to_string(&Color::Purple).unwrap();
        assert_eq!(json, "\"bg-purple-300\"");
        let user: SelectedUser = serde_json::from_str(
            r#"{"id":"userId1","username":"john","color":"bg-red-300","selectorId":"userId"}"#,
        )
        .unwrap();
        assert_eq!(user.color, Color::Red);
        assert_eq!(user.color.class(), "bg-red-300");
    }
}
