mod cli;
mod logger;
mod report;
mod settings;
mod users;
mod view;

use crate::cli::Args;
use crate::settings::{Settings, Target};
use crate::view::DrawView;
use anyhow::Context;
use bracket_api::client::{RecordStore, load_snapshot};
use bracket_api::color::primary;
use bracket_api::{Draw, DrawPage, PendingUser};
use chrono::Utc;
use clap::Parser;
use log::{debug, info};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    better_panic::install();

    let settings = Settings::load().apply_args(&args);
    logger::init_logger(settings.log_level);
    debug!("settings: {settings:?}");

    let store = RecordStore::new(&settings.base_url, &settings.token);

    let page = match settings.target(&args) {
        Some(Target::Catalogue) => {
            let (active, completed) = store
                .fetch_draws(Utc::now().date_naive())
                .await
                .context("loading the draw catalogue")?;
            if args.json {
                let catalogue = report::catalogue_json(&active, &completed);
                println!("{}", serde_json::to_string_pretty(&catalogue)?);
            } else {
                print!("{}", report::render_catalogue(&active, &completed));
            }
            return Ok(());
        }
        Some(Target::Profile(name)) => {
            let profile = store
                .fetch_profile(&name)
                .await
                .with_context(|| format!("loading the profile of {name}"))?;
            if args.json {
                println!("{}", serde_json::to_string_pretty(&profile)?);
            } else {
                print!("{}", report::render_profile(&profile));
            }
            return Ok(());
        }
        Some(Target::Snapshot(path)) => {
            let mut page = load_snapshot(&path)
                .with_context(|| format!("loading snapshot {}", path.display()))?;
            users::pick_from_snapshot(&mut page, args.user.as_deref(), &args.track)
                .context("assigning colors")?;
            page
        }
        Some(Target::Draw(draw)) => {
            load_from_store(&store, Draw::id_from_slug(&draw), &args).await?
        }
        None => anyhow::bail!(
            "no draw given: pass a draw id, --snapshot, --list or set TENNIS_BRACKET_JSON"
        ),
    };
    info!(
        "{}: {} slots, {} predictions",
        page.draw.title(),
        page.slots.len(),
        page.predictions.len()
    );

    let view = DrawView::build(&page, args.tiebreaks, Utc::now())
        .with_context(|| format!("indexing draw {}", page.draw.id))?;
    if args.json {
        println!("{}", serde_json::to_string_pretty(&view)?);
    } else {
        print!("{}", report::render(&view));
    }
    Ok(())
}

async fn load_from_store(
    store: &RecordStore,
    draw_id: &str,
    args: &Args,
) -> anyhow::Result<DrawPage> {
    let current_user = match &args.user {
        Some(name) => {
            let user = store
                .find_user(name)
                .await
                .with_context(|| format!("looking up user {name}"))?;
            Some(primary(&user.id, &user.username))
        }
        None => None,
    };
    let selector_id = current_user.as_ref().map(|u| u.id.clone()).unwrap_or_default();

    let mut pending = Vec::with_capacity(args.track.len());
    for name in &args.track {
        let user = store
            .find_user(name)
            .await
            .with_context(|| format!("looking up user {name}"))?;
        pending.push(PendingUser {
            selector_id: selector_id.clone(),
            id: user.id,
            username: user.username,
        });
    }
    let selected_users = users::assign_colors(pending).context("assigning colors")?;

    let user_ids: Vec<&str> = current_user
        .iter()
        .chain(&selected_users)
        .map(|u| u.id.as_str())
        .collect();

    let (draw, slots, predictions, draw_results) = tokio::try_join!(
        store.fetch_draw(draw_id),
        store.fetch_slots(draw_id),
        store.fetch_predictions(draw_id, &user_ids),
        store.fetch_draw_results(draw_id),
    )
    .with_context(|| format!("loading draw {draw_id} from {}", store.base_url()))?;

    Ok(DrawPage {
        draw,
        slots,
        predictions,
        draw_results,
        current_user,
        selected_users,
    })
}
