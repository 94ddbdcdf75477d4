//! Mastery tier classification.
//!
//! A coarse five-tier view of how well a card is known, derived only from
//! the card's current interval and review count. All card-state mutations
//! must recompute the tier through [`MasteryLevel::classify`].

use serde::{Deserialize, Serialize};

/// Interval below which a reviewed card is still "young", in days.
pub const YOUNG_HORIZON_DAYS: i32 = 7;

/// Interval below which a card is "mature"; at or beyond it is "mastered".
pub const MATURE_HORIZON_DAYS: i32 = 30;

/// Mastery tier of a card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MasteryLevel {
    New,
    Learning,
    Young,
    Mature,
    Mastered,
}

impl MasteryLevel {
    /// Classify a card from its interval and review count.
    pub fn classify(interval_days: i32, review_count: i32) -> Self {
        if review_count == 0 {
            Self::New
        } else if interval_days == 0 {
            Self::Learning
        } else if interval_days < YOUNG_HORIZON_DAYS {
            Self::Young
        } else if interval_days < MATURE_HORIZON_DAYS {
            Self::Mature
        } else {
            Self::Mastered
        }
    }

    /// Stable identifier used in the store.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::New => "new",
            Self::Learning => "learning",
            Self::Young => "young",
            Self::Mature => "mature",
            Self::Mastered => "mastered",
        }
    }

    /// Parse from a stored identifier.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "new" => Some(Self::New),
            "learning" => Some(Self::Learning),
            "young" => Some(Self::Young),
            "mature" => Some(Self::Mature),
            "mastered" => Some(Self::Mastered),
            _ => None,
        }
    }
}

impl Default for MasteryLevel {
    fn default() -> Self {
        Self::New
    }
}
