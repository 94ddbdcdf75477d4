//! Spaced repetition scheduler.
//!
//! A simplified FSRS-style scheduler with three regimes. The first review of
//! a card seeds ease and interval from the rating alone; cards with a zero
//! interval are "in learning" and move through fixed graduation steps; cards
//! with a multi-day interval are "in review" and grow (or lapse) by ease
//! multipliers. All arithmetic is floating point for ease and integer for
//! intervals, truncating toward zero.

use chrono::{Days, NaiveDate};

use crate::types::{IntervalPreview, Rating, ScheduleOutcome};

/// Scheduler with configurable parameters.
#[derive(Debug, Clone)]
pub struct Scheduler {
    /// Initial stability weight per rating; w[2] and w[3] seed the first
    /// Good/Easy intervals.
    pub initial_weights: [f64; 4],
    pub minimum_ease: f64,
    pub maximum_ease: f64,
    /// Interval multiplier for Hard in the review regime.
    pub hard_multiplier: f64,
    /// Extra multiplier for Easy in the review regime.
    pub easy_bonus: f64,
    /// Interval granted when Good graduates a learning card, in days.
    pub graduating_interval: i32,
    /// Interval granted when Easy graduates a learning card, in days.
    pub easy_interval: i32,
    pub minimum_interval: i32,
    pub maximum_interval: i32,
}

impl Default for Scheduler {
    fn default() -> Self {
        Self {
            initial_weights: [0.4, 0.6, 2.4, 5.8],
            minimum_ease: 1.3,
            maximum_ease: 3.0,
            hard_multiplier: 1.2,
            easy_bonus: 1.3,
            graduating_interval: 3,
            easy_interval: 7,
            minimum_interval: 1,
            maximum_interval: 365,
        }
    }
}

impl Scheduler {
    /// Calculate the next ease, interval, and due date after a rating.
    ///
    /// `today` is the user's current calendar date, supplied by the caller.
    /// Deterministic and side-effect-free.
    pub fn next_review(
        &self,
        rating: Rating,
        current_interval: i32,
        current_ease: f64,
        review_count: i32,
        today: NaiveDate,
    ) -> ScheduleOutcome {
        let (new_ease, new_interval) = if review_count == 0 {
            self.first_review(rating)
        } else if current_interval == 0 {
            self.learning_review(rating, current_ease)
        } else {
            self.review_review(rating, current_interval, current_ease)
        };

        let new_interval = new_interval.min(self.maximum_interval);

        ScheduleOutcome {
            ease_factor: new_ease,
            interval_days: new_interval,
            due_date: due_on(today, new_interval),
        }
    }

    /// Preview the interval each rating would produce for a given state.
    pub fn next_intervals(
        &self,
        current_interval: i32,
        current_ease: f64,
        review_count: i32,
        today: NaiveDate,
    ) -> IntervalPreview {
        let label = |rating| {
            let outcome =
                self.next_review(rating, current_interval, current_ease, review_count, today);
            format_interval(outcome.interval_days)
        };

        IntervalPreview {
            again: label(Rating::Again),
            hard: label(Rating::Hard),
            good: label(Rating::Good),
            easy: label(Rating::Easy),
        }
    }

    /// First rating of a card: seed ease and interval from the rating.
    fn first_review(&self, rating: Rating) -> (f64, i32) {
        let initial_ease = if rating.is_successful() { 2.5 } else { 2.3 };

        let interval = match rating {
            Rating::Again => 0,
            Rating::Hard => 1,
            Rating::Good => {
                (self.initial_weights[2] as i32).max(self.minimum_interval)
            }
            Rating::Easy => {
                ((self.initial_weights[3] * self.easy_bonus) as i32).max(self.minimum_interval)
            }
        };

        (initial_ease, interval)
    }

    /// Card still in learning (zero interval): fixed graduation steps.
    fn learning_review(&self, rating: Rating, current_ease: f64) -> (f64, i32) {
        match rating {
            Rating::Again => ((current_ease - 0.2).max(self.minimum_ease), 0),
            Rating::Hard => ((current_ease - 0.1).max(self.minimum_ease), 1),
            Rating::Good => (current_ease, self.graduating_interval),
            Rating::Easy => (
                (current_ease + 0.15).min(self.maximum_ease),
                self.easy_interval,
            ),
        }
    }

    /// Card in review (multi-day interval): grow by ease, or lapse.
    fn review_review(&self, rating: Rating, current_interval: i32, current_ease: f64) -> (f64, i32) {
        match rating {
            Rating::Again => {
                // Lapse: back to relearning.
                ((current_ease - 0.2).max(self.minimum_ease), 0)
            }
            Rating::Hard => {
                let new_ease = (current_ease - 0.15).max(self.minimum_ease);
                let interval = (current_interval as f64 * self.hard_multiplier) as i32;
                (new_ease, interval.max(self.minimum_interval))
            }
            Rating::Good => {
                let interval = (current_interval as f64 * current_ease) as i32;
                (current_ease, interval.max(self.minimum_interval))
            }
            Rating::Easy => {
                let new_ease = (current_ease + 0.15).min(self.maximum_ease);
                let interval = (current_interval as f64 * new_ease * self.easy_bonus) as i32;
                (new_ease, interval.max(self.minimum_interval))
            }
        }
    }
}

fn due_on(today: NaiveDate, interval_days: i32) -> NaiveDate {
    today
        .checked_add_days(Days::new(interval_days as u64))
        .unwrap_or(NaiveDate::MAX)
}

/// Format an interval for display: "< 10m", "3d", "2mo", "1y".
pub fn format_interval(interval_days: i32) -> String {
    if interval_days == 0 {
        "< 10m".to_string()
    } else if interval_days < 30 {
        format!("{}d", interval_days)
    } else if interval_days < 365 {
        format!("{}mo", interval_days / 30)
    } else {
        format!("{}y", interval_days / 365)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 1, 10).unwrap()
    }

    fn days_from_today(n: u64) -> NaiveDate {
        today().checked_add_days(Days::new(n)).unwrap()
    }

    #[test]
    fn first_review_again_stays_same_day() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Again, 0, 2.5, 0, today());
        assert_eq!(outcome.interval_days, 0);
        assert_eq!(outcome.due_date, today());
        assert_eq!(outcome.ease_factor, 2.3);
    }

    #[test]
    fn first_review_hard_gives_one_day() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Hard, 0, 2.5, 0, today());
        assert_eq!(outcome.interval_days, 1);
        assert_eq!(outcome.due_date, days_from_today(1));
        assert_eq!(outcome.ease_factor, 2.3);
    }

    #[test]
    fn first_review_good_gives_two_days() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Good, 0, 2.5, 0, today());
        // w[2] = 2.4 floors to 2, never rounds up.
        assert_eq!(outcome.interval_days, 2);
        assert_eq!(outcome.due_date, days_from_today(2));
        assert_eq!(outcome.ease_factor, 2.5);
    }

    #[test]
    fn first_review_easy_gives_seven_days() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Easy, 0, 2.5, 0, today());
        // w[3] * 1.3 = 7.54 floors to 7.
        assert_eq!(outcome.interval_days, 7);
        assert_eq!(outcome.due_date, days_from_today(7));
        assert_eq!(outcome.ease_factor, 2.5);
    }

    #[test]
    fn learning_again_resets_and_drops_ease() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Again, 0, 2.5, 3, today());
        assert_eq!(outcome.interval_days, 0);
        assert_eq!(outcome.due_date, today());
        assert!((outcome.ease_factor - 2.3).abs() < 1e-9);
    }

    #[test]
    fn learning_hard_shows_tomorrow() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Hard, 0, 2.5, 2, today());
        assert_eq!(outcome.interval_days, 1);
        assert_eq!(outcome.due_date, days_from_today(1));
        assert!((outcome.ease_factor - 2.4).abs() < 1e-9);
    }

    #[test]
    fn learning_good_graduates_at_three_days() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Good, 0, 2.5, 1, today());
        assert_eq!(outcome.interval_days, 3);
        assert_eq!(outcome.ease_factor, 2.5);
    }

    #[test]
    fn learning_easy_graduates_with_ease_bonus() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Easy, 0, 2.5, 1, today());
        assert_eq!(outcome.interval_days, 7);
        assert!((outcome.ease_factor - 2.65).abs() < 1e-9);
    }

    #[test]
    fn review_good_multiplies_by_ease() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Good, 10, 2.5, 5, today());
        assert_eq!(outcome.interval_days, 25);
        assert_eq!(outcome.due_date, NaiveDate::from_ymd_opt(2025, 2, 4).unwrap());
        assert_eq!(outcome.ease_factor, 2.5);
    }

    #[test]
    fn review_hard_multiplies_by_hard_multiplier() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Hard, 10, 2.5, 5, today());
        assert_eq!(outcome.interval_days, 12);
        assert!((outcome.ease_factor - 2.35).abs() < 1e-9);
    }

    #[test]
    fn lapse_resets_interval_and_reduces_ease() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Again, 45, 2.6, 12, today());
        assert_eq!(outcome.interval_days, 0);
        assert_eq!(outcome.due_date, today());
        assert!((outcome.ease_factor - 2.4).abs() < 1e-9);
    }

    #[test]
    fn easy_caps_ease_at_maximum() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Easy, 5, 2.95, 3, today());
        assert_eq!(outcome.ease_factor, 3.0);
        // 5 * 3.0 * 1.3 = 19.5 floors to 19.
        assert_eq!(outcome.interval_days, 19);
        assert_eq!(outcome.due_date, NaiveDate::from_ymd_opt(2025, 1, 29).unwrap());
    }

    #[test]
    fn ease_never_drops_below_minimum() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Again, 10, 1.35, 5, today());
        assert_eq!(outcome.ease_factor, scheduler.minimum_ease);
    }

    #[test]
    fn interval_never_exceeds_maximum() {
        let scheduler = Scheduler::default();
        let outcome = scheduler.next_review(Rating::Easy, 300, 3.0, 20, today());
        assert_eq!(outcome.interval_days, 365);
        assert_eq!(outcome.due_date, days_from_today(365));
    }

    #[test]
    fn outputs_stay_within_bounds_for_all_inputs() {
        let scheduler = Scheduler::default();
        for rating in Rating::ALL {
            for interval in [0, 1, 2, 7, 30, 180, 365] {
                for ease in [1.3, 1.7, 2.5, 3.0] {
                    for reviews in [0, 1, 5, 100] {
                        let outcome =
                            scheduler.next_review(rating, interval, ease, reviews, today());
                        assert!(
                            outcome.ease_factor >= scheduler.minimum_ease
                                && outcome.ease_factor <= scheduler.maximum_ease,
                            "ease out of bounds for {:?}/{}/{}/{}",
                            rating,
                            interval,
                            ease,
                            reviews,
                        );
                        assert!(
                            outcome.interval_days >= 0
                                && outcome.interval_days <= scheduler.maximum_interval
                        );
                    }
                }
            }
        }
    }

    #[test]
    fn harder_ratings_never_give_longer_intervals() {
        let scheduler = Scheduler::default();
        for interval in [0, 1, 5, 10, 60] {
            for reviews in [0, 1, 4] {
                let by_rating: Vec<i32> = Rating::ALL
                    .iter()
                    .map(|&r| {
                        scheduler
                            .next_review(r, interval, 2.5, reviews, today())
                            .interval_days
                    })
                    .collect();
                assert!(by_rating[0] <= by_rating[1]);
                assert!(by_rating[1] <= by_rating[2]);
                // Easy is strictly longer than Good.
                assert!(by_rating[2] < by_rating[3]);
            }
        }
    }

    #[test]
    fn preview_runs_the_scheduler_per_rating() {
        let scheduler = Scheduler::default();
        let preview = scheduler.next_intervals(10, 2.5, 5, today());
        assert_eq!(preview.again, "< 10m");
        assert_eq!(preview.hard, "12d");
        assert_eq!(preview.good, "25d");
        // 10 * 2.65 * 1.3 = 34.45 floors to 34 -> "1mo".
        assert_eq!(preview.easy, "1mo");
    }

    #[test]
    fn preview_for_new_card_uses_first_review_regime() {
        let scheduler = Scheduler::default();
        let preview = scheduler.next_intervals(0, 2.5, 0, today());
        assert_eq!(preview.again, "< 10m");
        assert_eq!(preview.hard, "1d");
        assert_eq!(preview.good, "2d");
        assert_eq!(preview.easy, "7d");
    }

    #[test]
    fn interval_formatting() {
        assert_eq!(format_interval(0), "< 10m");
        assert_eq!(format_interval(1), "1d");
        assert_eq!(format_interval(29), "29d");
        assert_eq!(format_interval(30), "1mo");
        assert_eq!(format_interval(75), "2mo");
        assert_eq!(format_interval(364), "12mo");
        assert_eq!(format_interval(365), "1y");
        assert_eq!(format_interval(730), "2y");
    }
}
