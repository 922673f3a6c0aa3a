use chrono::NaiveDate;
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum StreakError {
    #[error("highest streak ({highest}) is below current streak ({current})")]
    HighestBelowCurrent { current: u32, highest: u32 },
}

/// Daily win/loss streak counters for one user.
///
/// The invariant `highest_streak >= current_streak` holds after every
/// transition and is re-checked when rehydrating from storage.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Streak {
    current_streak: u32,
    highest_streak: u32,
    last_activity_date: Option<NaiveDate>,
}

impl Streak {
    /// A zero-initialized streak, the state a user starts in before any
    /// quiz activity. Streak rows are created lazily the first time a user
    /// is observed without one.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Rehydrate a streak from persisted storage.
    ///
    /// # Errors
    ///
    /// Returns `StreakError::HighestBelowCurrent` if the stored counters
    /// violate the invariant.
    pub fn from_persisted(
        current_streak: u32,
        highest_streak: u32,
        last_activity_date: Option<NaiveDate>,
    ) -> Result<Self, StreakError> {
        if highest_streak < current_streak {
            return Err(StreakError::HighestBelowCurrent {
                current: current_streak,
                highest: highest_streak,
            });
        }
        Ok(Self {
            current_streak,
            highest_streak,
            last_activity_date,
        })
    }

    /// Applies one daily-quiz outcome.
    ///
    /// A correct answer extends the current streak by one; an incorrect
    /// answer resets it to zero. The highest streak only ever grows, and
    /// the activity date is stamped on both outcomes.
    ///
    /// Callers must gate to at most one submission per calendar day (the
    /// quiz session does this); applying twice on the same day would
    /// double-count.
    pub fn apply(&mut self, is_correct: bool, on: NaiveDate) {
        self.current_streak = if is_correct {
            self.current_streak + 1
        } else {
            0
        };
        self.highest_streak = self.highest_streak.max(self.current_streak);
        self.last_activity_date = Some(on);
    }

    #[must_use]
    pub fn current_streak(&self) -> u32 {
        self.current_streak
    }

    #[must_use]
    pub fn highest_streak(&self) -> u32 {
        self.highest_streak
    }

    #[must_use]
    pub fn last_activity_date(&self) -> Option<NaiveDate> {
        self.last_activity_date
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 3, d).unwrap()
    }

    #[test]
    fn correct_answer_extends_streak() {
        let mut streak = Streak::new();
        streak.apply(true, day(1));
        assert_eq!(streak.current_streak(), 1);
        assert_eq!(streak.highest_streak(), 1);
        assert_eq!(streak.last_activity_date(), Some(day(1)));
    }

    #[test]
    fn incorrect_answer_resets_current_only() {
        let mut streak = Streak::from_persisted(4, 6, Some(day(1))).unwrap();
        streak.apply(false, day(2));
        assert_eq!(streak.current_streak(), 0);
        assert_eq!(streak.highest_streak(), 6);
        assert_eq!(streak.last_activity_date(), Some(day(2)));
    }

    #[test]
    fn highest_tracks_new_peak() {
        let mut streak = Streak::from_persisted(6, 6, Some(day(1))).unwrap();
        streak.apply(true, day(2));
        assert_eq!(streak.current_streak(), 7);
        assert_eq!(streak.highest_streak(), 7);
    }

    #[test]
    fn from_persisted_rejects_inverted_counters() {
        let result = Streak::from_persisted(5, 3, None);
        assert_eq!(
            result,
            Err(StreakError::HighestBelowCurrent {
                current: 5,
                highest: 3
            })
        );
    }

    #[test]
    fn fresh_streak_is_zeroed() {
        let streak = Streak::new();
        assert_eq!(streak.current_streak(), 0);
        assert_eq!(streak.highest_streak(), 0);
        assert_eq!(streak.last_activity_date(), None);
    }
}
