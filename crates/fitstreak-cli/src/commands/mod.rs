pub mod badges;
pub mod config;
pub mod plan;
pub mod profile;
pub mod session;

use serde::Serialize;

use fitstreak_core::gamification::UserProgress;

use crate::store::Store;

pub(crate) const REGISTRY_KEY: &str = "active_sessions";

pub(crate) fn plan_key(user: &str) -> String {
    format!("plan:{user}")
}

pub(crate) fn session_key(user: &str) -> String {
    format!("session:{user}")
}

pub(crate) fn progress_key(user: &str) -> String {
    format!("progress:{user}")
}

pub(crate) fn aborted_key(user: &str) -> String {
    format!("aborted:{user}")
}

pub(crate) fn load_progress(
    store: &Store,
    user: &str,
) -> Result<UserProgress, Box<dyn std::error::Error>> {
    Ok(store.load(&progress_key(user))?.unwrap_or_default())
}

pub(crate) fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}
