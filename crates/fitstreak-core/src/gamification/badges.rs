//! Data-driven badge catalog and evaluator.
//!
//! Badges are declared as table rows (id, requirement, threshold, rarity)
//! and evaluated generically. Unlocks are per user and one-way.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::profile::GamificationProfile;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Rarity {
    Common,
    Rare,
    Epic,
    Legendary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RequirementKind {
    Streak,
    TotalWorkouts,
    /// Back on day one of a new streak after having trained before.
    Comeback,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Requirement {
    #[serde(rename = "type")]
    pub kind: RequirementKind,
    pub threshold: u32,
}

impl Requirement {
    pub fn is_met(&self, profile: &GamificationProfile) -> bool {
        match self.kind {
            RequirementKind::Streak => profile.streak >= self.threshold,
            RequirementKind::TotalWorkouts => profile.total_workouts >= self.threshold,
            RequirementKind::Comeback => profile.streak == 1 && profile.total_workouts > 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Badge {
    pub id: String,
    pub name: String,
    pub description: String,
    pub requirement: Requirement,
    pub rarity: Rarity,
}

impl Badge {
    pub fn new(
        id: &str,
        name: &str,
        description: &str,
        kind: RequirementKind,
        threshold: u32,
        rarity: Rarity,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            description: description.into(),
            requirement: Requirement { kind, threshold },
            rarity,
        }
    }
}

/// The static list of badges every user can earn.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BadgeCatalog {
    badges: Vec<Badge>,
}

impl BadgeCatalog {
    pub fn new(badges: Vec<Badge>) -> Self {
        Self { badges }
    }

    pub fn badges(&self) -> &[Badge] {
        &self.badges
    }

    pub fn get(&self, id: &str) -> Option<&Badge> {
        self.badges.iter().find(|b| b.id == id)
    }

    /// Catalog restricted to one requirement kind.
    pub fn only(&self, kind: RequirementKind) -> Self {
        Self::new(
            self.badges
                .iter()
                .filter(|b| b.requirement.kind == kind)
                .cloned()
                .collect(),
        )
    }
}

impl Default for BadgeCatalog {
    fn default() -> Self {
        use RequirementKind::{Comeback, Streak, TotalWorkouts};
        Self::new(vec![
            Badge::new("first_workout", "First Step", "Finish your first workout", TotalWorkouts, 1, Rarity::Common),
            Badge::new("comeback", "Comeback", "Start a new streak after a break", Comeback, 1, Rarity::Common),
            Badge::new("streak_3", "Warming Up", "Train three days in a row", Streak, 3, Rarity::Common),
            Badge::new("streak_7", "Week Warrior", "Train seven days in a row", Streak, 7, Rarity::Rare),
            Badge::new("workouts_10", "Regular", "Finish ten workouts", TotalWorkouts, 10, Rarity::Common),
            Badge::new("workouts_25", "Committed", "Finish twenty-five workouts", TotalWorkouts, 25, Rarity::Rare),
            Badge::new("streak_30", "Habit Formed", "Train thirty days in a row", Streak, 30, Rarity::Epic),
            Badge::new("workouts_50", "Dedicated", "Finish fifty workouts", TotalWorkouts, 50, Rarity::Epic),
            Badge::new("streak_100", "Unbreakable", "Train one hundred days in a row", Streak, 100, Rarity::Legendary),
            Badge::new("workouts_100", "Centurion", "Finish one hundred workouts", TotalWorkouts, 100, Rarity::Legendary),
            Badge::new("streak_365", "Year of Iron", "Train every day for a year", Streak, 365, Rarity::Legendary),
        ])
    }
}

/// Per-user unlock state. There is no way to remove an unlock.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct BadgeBook {
    unlocked: BTreeMap<String, DateTime<Utc>>,
}

impl BadgeBook {
    pub fn is_unlocked(&self, id: &str) -> bool {
        self.unlocked.contains_key(id)
    }

    pub fn unlocked_at(&self, id: &str) -> Option<DateTime<Utc>> {
        self.unlocked.get(id).copied()
    }

    pub fn len(&self) -> usize {
        self.unlocked.len()
    }

    pub fn is_empty(&self) -> bool {
        self.unlocked.is_empty()
    }

    /// Record an unlock. Keeps the original timestamp if already unlocked.
    pub fn unlock(&mut self, id: &str, at: DateTime<Utc>) {
        self.unlocked.entry(id.to_string()).or_insert(at);
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockedBadge {
    pub badge: Badge,
    pub unlocked_at: DateTime<Utc>,
}

/// Badges that qualify against `profile` and are not yet in `book`,
/// ordered by ascending threshold (catalog order breaks ties).
pub fn evaluate_badges(
    catalog: &BadgeCatalog,
    book: &BadgeBook,
    profile: &GamificationProfile,
    at: DateTime<Utc>,
) -> Vec<UnlockedBadge> {
    let mut newly: Vec<UnlockedBadge> = catalog
        .badges()
        .iter()
        .filter(|b| !book.is_unlocked(&b.id) && b.requirement.is_met(profile))
        .map(|b| UnlockedBadge {
            badge: b.clone(),
            unlocked_at: at,
        })
        .collect();
    newly.sort_by_key(|u| u.badge.requirement.threshold);
    newly
}
