//! Shared types for the scheduling core.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Rating the user assigns after self-assessing recall.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Rating {
    Again,
    Hard,
    Good,
    Easy,
}

impl Rating {
    /// All ratings in ascending order.
    pub const ALL: [Rating; 4] = [Self::Again, Self::Hard, Self::Good, Self::Easy];

    /// Convert to numeric value (1-4).
    pub fn to_value(self) -> i32 {
        match self {
            Self::Again => 1,
            Self::Hard => 2,
            Self::Good => 3,
            Self::Easy => 4,
        }
    }

    /// Create from numeric value.
    pub fn from_value(value: i32) -> Option<Self> {
        match value {
            1 => Some(Self::Again),
            2 => Some(Self::Hard),
            3 => Some(Self::Good),
            4 => Some(Self::Easy),
            _ => None,
        }
    }

    /// Create from a numeric value, clamping out-of-range input to [1, 4].
    pub fn from_value_clamped(value: i32) -> Self {
        Self::from_value(value.clamp(1, 4)).unwrap_or(Self::Good)
    }

    /// True for ratings that count as a successful recall (Good/Easy).
    pub fn is_successful(self) -> bool {
        self.to_value() >= 3
    }
}

/// Result of scheduling a card after one rating.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScheduleOutcome {
    pub ease_factor: f64,
    pub interval_days: i32,
    pub due_date: NaiveDate,
}

/// Human-readable interval each rating would produce, keyed by rating value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IntervalPreview {
    #[serde(rename = "1")]
    pub again: String,
    #[serde(rename = "2")]
    pub hard: String,
    #[serde(rename = "3")]
    pub good: String,
    #[serde(rename = "4")]
    pub easy: String,
}
