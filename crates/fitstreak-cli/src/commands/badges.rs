use chrono::{DateTime, Utc};
use clap::Subcommand;
use serde::Serialize;

use fitstreak_core::gamification::{Badge, BadgeCatalog};

use super::{load_progress, print_json};
use crate::store::Store;

#[derive(Subcommand)]
pub enum BadgesAction {
    /// List the badge catalog with unlock state
    List {
        /// Only show unlocked badges
        #[arg(long)]
        unlocked: bool,
    },
}

#[derive(Serialize)]
struct BadgeView<'a> {
    #[serde(flatten)]
    badge: &'a Badge,
    unlocked: bool,
    unlocked_at: Option<DateTime<Utc>>,
}

pub fn run(action: BadgesAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;

    match action {
        BadgesAction::List { unlocked } => {
            let progress = load_progress(&store, user)?;
            let catalog = BadgeCatalog::default();
            let views: Vec<BadgeView<'_>> = catalog
                .badges()
                .iter()
                .map(|badge| BadgeView {
                    badge,
                    unlocked: progress.badges.is_unlocked(&badge.id),
                    unlocked_at: progress.badges.unlocked_at(&badge.id),
                })
                .filter(|v| !unlocked || v.unlocked)
                .collect();
            print_json(&views)?;
        }
    }
    Ok(())
}
