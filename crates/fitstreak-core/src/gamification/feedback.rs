//! Post-workout feedback and the adjustment signals derived from it.
//!
//! The signal triple is the whole contract with the workout generator:
//! the engine never calls the generator, it only hands these to the caller.

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuickReaction {
    TooEasy,
    TooHard,
    LovedIt,
    HatedIt,
}

/// Subjective ratings, each 1-5.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Feedback {
    pub difficulty: u8,
    pub enjoyment: u8,
    pub energy: u8,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub quick_reaction: Option<QuickReaction>,
}

impl Feedback {
    pub fn new(difficulty: u8, enjoyment: u8, energy: u8) -> Self {
        Self {
            difficulty,
            enjoyment,
            energy,
            notes: None,
            quick_reaction: None,
        }
    }

    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }

    pub fn with_reaction(mut self, reaction: QuickReaction) -> Self {
        self.quick_reaction = Some(reaction);
        self
    }

    /// # Errors
    /// Returns `RatingOutOfRange` for the first rating outside 1-5.
    pub fn validate(&self) -> Result<(), ValidationError> {
        for (field, value) in [
            ("difficulty", self.difficulty),
            ("enjoyment", self.enjoyment),
            ("energy", self.energy),
        ] {
            if !(1..=5).contains(&value) {
                return Err(ValidationError::RatingOutOfRange { field, value });
            }
        }
        Ok(())
    }

    /// Length of the free-text notes in characters, ignoring surrounding
    /// whitespace.
    pub fn notes_len(&self) -> usize {
        self.notes.as_deref().map_or(0, |n| n.trim().chars().count())
    }

    fn reacted(&self, reaction: QuickReaction) -> bool {
        self.quick_reaction == Some(reaction)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DifficultyAdjustment {
    Increase,
    Decrease,
    Maintain,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VarietyPreference {
    HighVariety,
    SimilarStyle,
    ModerateVariety,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntensitySignal {
    IncreaseIntensity,
    DecreaseIntensity,
    MaintainIntensity,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedbackSignals {
    pub difficulty_adjustment: DifficultyAdjustment,
    pub variety_preference: VarietyPreference,
    pub intensity_preference: IntensitySignal,
}

/// Map feedback to generator hints. Each field is decided independently.
pub fn derive_signals(feedback: &Feedback) -> FeedbackSignals {
    let difficulty_adjustment =
        if feedback.difficulty <= 2 || feedback.reacted(QuickReaction::TooEasy) {
            DifficultyAdjustment::Increase
        } else if feedback.difficulty >= 4 || feedback.reacted(QuickReaction::TooHard) {
            DifficultyAdjustment::Decrease
        } else {
            DifficultyAdjustment::Maintain
        };

    let variety_preference = if feedback.enjoyment <= 2 || feedback.reacted(QuickReaction::HatedIt) {
        VarietyPreference::HighVariety
    } else if feedback.enjoyment >= 4 || feedback.reacted(QuickReaction::LovedIt) {
        VarietyPreference::SimilarStyle
    } else {
        VarietyPreference::ModerateVariety
    };

    let intensity_preference = if feedback.energy >= 4 && feedback.difficulty <= 3 {
        IntensitySignal::IncreaseIntensity
    } else if feedback.energy <= 2 && feedback.difficulty >= 3 {
        IntensitySignal::DecreaseIntensity
    } else {
        IntensitySignal::MaintainIntensity
    };

    FeedbackSignals {
        difficulty_adjustment,
        variety_preference,
        intensity_preference,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn easy_session_increases_difficulty() {
        let s = derive_signals(&Feedback::new(2, 3, 3));
        assert_eq!(s.difficulty_adjustment, DifficultyAdjustment::Increase);
    }

    #[test]
    fn too_easy_reaction_overrides_middle_rating() {
        let s = derive_signals(&Feedback::new(3, 3, 3).with_reaction(QuickReaction::TooEasy));
        assert_eq!(s.difficulty_adjustment, DifficultyAdjustment::Increase);
    }

    #[test]
    fn hard_session_decreases_difficulty() {
        assert_eq!(
            derive_signals(&Feedback::new(4, 3, 3)).difficulty_adjustment,
            DifficultyAdjustment::Decrease
        );
        assert_eq!(
            derive_signals(&Feedback::new(3, 3, 3).with_reaction(QuickReaction::TooHard))
                .difficulty_adjustment,
            DifficultyAdjustment::Decrease
        );
    }

    #[test]
    fn middle_ratings_maintain_everything() {
        let s = derive_signals(&Feedback::new(3, 3, 3));
        assert_eq!(s.difficulty_adjustment, DifficultyAdjustment::Maintain);
        assert_eq!(s.variety_preference, VarietyPreference::ModerateVariety);
        assert_eq!(s.intensity_preference, IntensitySignal::MaintainIntensity);
    }

    #[test]
    fn variety_follows_enjoyment() {
        assert_eq!(
            derive_signals(&Feedback::new(3, 1, 3)).variety_preference,
            VarietyPreference::HighVariety
        );
        assert_eq!(
            derive_signals(&Feedback::new(3, 5, 3)).variety_preference,
            VarietyPreference::SimilarStyle
        );
        assert_eq!(
            derive_signals(&Feedback::new(3, 3, 3).with_reaction(QuickReaction::HatedIt))
                .variety_preference,
            VarietyPreference::HighVariety
        );
        assert_eq!(
            derive_signals(&Feedback::new(3, 3, 3).with_reaction(QuickReaction::LovedIt))
                .variety_preference,
            VarietyPreference::SimilarStyle
        );
    }

    #[test]
    fn intensity_combines_energy_and_difficulty() {
        assert_eq!(
            derive_signals(&Feedback::new(3, 3, 4)).intensity_preference,
            IntensitySignal::IncreaseIntensity
        );
        assert_eq!(
            derive_signals(&Feedback::new(4, 3, 5)).intensity_preference,
            IntensitySignal::MaintainIntensity
        );
        assert_eq!(
            derive_signals(&Feedback::new(3, 3, 2)).intensity_preference,
            IntensitySignal::DecreaseIntensity
        );
        assert_eq!(
            derive_signals(&Feedback::new(2, 3, 1)).intensity_preference,
            IntensitySignal::MaintainIntensity
        );
    }

    #[test]
    fn ratings_outside_range_are_rejected() {
        assert_eq!(
            Feedback::new(0, 3, 3).validate(),
            Err(ValidationError::RatingOutOfRange {
                field: "difficulty",
                value: 0
            })
        );
        assert!(Feedback::new(3, 6, 3).validate().is_err());
        assert!(Feedback::new(5, 5, 5).validate().is_ok());
    }

    #[test]
    fn signals_serialize_as_snake_case() {
        let json = serde_json::to_value(derive_signals(&Feedback::new(1, 5, 5))).unwrap();
        assert_eq!(json["difficulty_adjustment"], "increase");
        assert_eq!(json["variety_preference"], "similar_style");
        assert_eq!(json["intensity_preference"], "increase_intensity");
    }
}
