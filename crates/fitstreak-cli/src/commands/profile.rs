use clap::Subcommand;
use serde::Serialize;

use fitstreak_core::gamification::GamificationProfile;
use fitstreak_core::session::AbortedSession;
use fitstreak_core::EngineConfig;

use super::{aborted_key, load_progress, print_json};
use crate::store::Store;

#[derive(Subcommand)]
pub enum ProfileAction {
    /// Print streak, XP and level as JSON
    Show,
}

#[derive(Serialize)]
struct ProfileView<'a> {
    #[serde(flatten)]
    profile: &'a GamificationProfile,
    xp_to_next_level: u64,
    badges_unlocked: usize,
    feedback_days: usize,
    aborted_sessions_kept: usize,
}

pub fn run(action: ProfileAction, user: &str) -> Result<(), Box<dyn std::error::Error>> {
    let store = Store::open()?;

    match action {
        ProfileAction::Show => {
            let progress = load_progress(&store, user)?;
            let aborted: Vec<AbortedSession> = store.load(&aborted_key(user))?.unwrap_or_default();
            let per_level = u64::from(EngineConfig::load_or_default().rewards.xp_per_level.max(1));
            let next_level_at = u64::from(progress.profile.level).saturating_mul(per_level);

            print_json(&ProfileView {
                profile: &progress.profile,
                xp_to_next_level: next_level_at.saturating_sub(progress.profile.xp),
                badges_unlocked: progress.badges.len(),
                feedback_days: progress.feedback_log.len(),
                aborted_sessions_kept: aborted.len(),
            })?;
        }
    }
    Ok(())
}
