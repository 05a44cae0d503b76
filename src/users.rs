use bracket_api::color::primary;
use bracket_api::{ColorAssigner, ColorError, DrawPage, PendingUser, SelectedUser};
use log::warn;

/// Give each tracked user a palette color. Repeats keep their first color
/// and the viewer is never tracked against themself.
pub fn assign_colors(pending: Vec<PendingUser>) -> Result<Vec<SelectedUser>, ColorError> {
    let assigner = ColorAssigner::default();
    let mut tracked: Vec<SelectedUser> = Vec::with_capacity(pending.len());
    for user in pending {
        if user.id == user.selector_id {
            continue;
        }
        let selected = assigner.add_user(&tracked, user)?;
        if !tracked.contains(&selected) {
            tracked.push(selected);
        }
    }
    Ok(tracked)
}

/// Snapshots carry no user directory, so names are matched against the
/// predictions they contain.
pub fn pick_from_snapshot(
    page: &mut DrawPage,
    viewer: Option<&str>,
    track: &[String],
) -> Result<(), ColorError> {
    if viewer.is_none() && track.is_empty() {
        return Ok(());
    }
    let lookup = |name: &str| {
        let found = page
            .predictions
            .iter()
            .find(|p| p.username.eq_ignore_ascii_case(name))
            .map(|p| (p.user_id.clone(), p.username.clone()));
        if found.is_none() {
            warn!("no predictions by {name} in this snapshot, skipping");
        }
        found
    };

    let current_user = viewer
        .and_then(lookup)
        .map(|(id, username)| primary(&id, &username));
    let selector_id = current_user
        .as_ref()
        .map(|u| u.id.clone())
        .unwrap_or_default();
    let pending = track
        .iter()
        .filter_map(|name| lookup(name))
        .map(|(id, username)| PendingUser {
            selector_id: selector_id.clone(),
            id,
            username,
        })
        .collect();

    page.selected_users = assign_colors(pending)?;
    page.current_user = current_user;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use bracket_api::{Color, Prediction};

    fn pick(user_id: &str, username: &str) -> Prediction {
        Prediction {
            round: 2,
            position: 1,
            name: "Roger Federer".into(),
            user_id: user_id.into(),
            username: username.into(),
            ..Default::default()
        }
    }

    fn page(users: &[(&str, &str)]) -> DrawPage {
        DrawPage {
            predictions: users.iter().map(|(id, name)| pick(id, name)).collect(),
            ..Default::default()
        }
    }

    fn names(track: &[&str]) -> Vec<String> {
        track.iter().map(|s| s.to_string()).collect()
    }

    fn pending(selector: &str, id: &str) -> PendingUser {
        PendingUser {
            selector_id: selector.into(),
            id: id.into(),
            username: format!("user-{id}"),
        }
    }

    #[test]
    fn names_match_predictions_ignoring_case() {
        let mut page = page(&[("u1", "Will"), ("u2", "john")]);
        pick_from_snapshot(&mut page, Some("WILL"), &names(&["John"])).unwrap();

        let me = page.current_user.unwrap();
        assert_eq!((me.id.as_str(), me.username.as_str()), ("u1", "Will"));
        assert_eq!(me.color, Color::Blue);
        assert_eq!(page.selected_users.len(), 1);
        assert_eq!(page.selected_users[0].username, "john");
        assert_eq!(page.selected_users[0].color, Color::Red);
        assert_eq!(page.selected_users[0].selector_id, "u1");
    }

    #[test]
    fn unknown_names_are_skipped() {
        let mut page = page(&[("u1", "will"), ("u2", "john")]);
        pick_from_snapshot(&mut page, Some("steve"), &names(&["ghost", "john"])).unwrap();

        assert!(page.current_user.is_none());
        let tracked: Vec<(&str, Color)> = page
            .selected_users
            .iter()
            .map(|u| (u.username.as_str(), u.color))
            .collect();
        assert_eq!(tracked, vec![("john", Color::Red)]);
        assert_eq!(page.selected_users[0].selector_id, "");
    }

    #[test]
    fn no_names_leaves_the_page_alone() {
        let mut page = page(&[("u1", "will")]);
        page.selected_users = vec![primary("u9", "stored")];
        pick_from_snapshot(&mut page, None, &[]).unwrap();
        assert_eq!(page.selected_users[0].username, "stored");
    }

    #[test]
    fn viewer_is_not_tracked_twice() {
        let mut page = page(&[("u1", "will"), ("u2", "john")]);
        pick_from_snapshot(&mut page, Some("will"), &names(&["will", "john"])).unwrap();
        let ids: Vec<&str> = page.selected_users.iter().map(|u| u.id.as_str()).collect();
        assert_eq!(ids, vec!["u2"]);
    }

    #[test]
    fn repeated_users_keep_their_first_color() {
        let tracked = assign_colors(vec![
            pending("me", "a"),
            pending("me", "b"),
            pending("me", "a"),
        ])
        .unwrap();
        let colors: Vec<(&str, Color)> =
            tracked.iter().map(|u| (u.id.as_str(), u.color)).collect();
        assert_eq!(colors, vec![("a", Color::Red), ("b", Color::Yellow)]);
    }

    #[test]
    fn sixth_tracked_user_exhausts_the_palette() {
        let users = ["a", "b", "c", "d", "e"].map(|id| pending("me", id));
        assert_eq!(assign_colors(users.to_vec()).unwrap().len(), 5);

        let mut users = users.to_vec();
        users.push(pending("me", "f"));
        assert_eq!(
            assign_colors(users).unwrap_err(),
            ColorError::PaletteExhausted(5)
        );
    }
}
