use std::sync::Arc;

use chrono::{Duration, NaiveDate};
use hub_core::Clock;
use hub_core::model::{QuizAttempt, Streak, UserId};
use storage::repository::{QuizRepository, StreakRepository};

use crate::error::StreakServiceError;

/// Window the activity calendar covers, and the attempt fetch limit. With
/// gaps in activity the fetched attempts can reach further back than the
/// window, so window counts filter by date.
const CALENDAR_DAYS: i64 = 30;

/// How many attempts the recent-activity feed shows.
const RECENT_LIMIT: usize = 10;

/// What one calendar day looked like.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DayOutcome {
    NoActivity,
    Correct,
    Incorrect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CalendarDay {
    pub date: NaiveDate,
    pub outcome: DayOutcome,
}

/// Everything the streaks dashboard renders.
#[derive(Debug, Clone)]
pub struct StreakView {
    pub streak: Streak,
    /// 30 entries, oldest first, ending on today.
    pub calendar: Vec<CalendarDay>,
    /// Most recent attempts, newest first.
    pub recent: Vec<QuizAttempt>,
    /// How many of the fetched attempts fall inside the calendar window.
    pub attempts_in_window: u32,
}

/// Derives the streaks dashboard from the counters and the attempt log.
#[derive(Clone)]
pub struct StreakService {
    clock: Clock,
    streaks: Arc<dyn StreakRepository>,
    quizzes: Arc<dyn QuizRepository>,
}

impl StreakService {
    #[must_use]
    pub fn new(
        clock: Clock,
        streaks: Arc<dyn StreakRepository>,
        quizzes: Arc<dyn QuizRepository>,
    ) -> Self {
        Self {
            clock,
            streaks,
            quizzes,
        }
    }

    /// Loads the streaks dashboard for one user. A user with no streak row
    /// yet sees zeroed counters.
    ///
    /// # Errors
    ///
    /// Returns `StreakServiceError::Storage` if any read in the batch
    /// fails.
    pub async fn load(&self, user: UserId) -> Result<StreakView, StreakServiceError> {
        let (streak, attempts) = tokio::try_join!(
            self.streaks.streak(user),
            self.quizzes
                .recent_attempts(user, CALENDAR_DAYS as u32),
        )?;
        let streak = streak.unwrap_or_default();

        let today = self.clock.today();
        let calendar = (0..CALENDAR_DAYS)
            .rev()
            .map(|back| {
                let date = today - Duration::days(back);
                // Attempts arrive newest first, so the first hit for a
                // date is that day's most recent attempt.
                let outcome = attempts
                    .iter()
                    .find(|a| a.attempted_on() == date)
                    .map_or(DayOutcome::NoActivity, |a| {
                        if a.is_correct {
                            DayOutcome::Correct
                        } else {
                            DayOutcome::Incorrect
                        }
                    });
                CalendarDay { date, outcome }
            })
            .collect();

        let window_start = today - Duration::days(CALENDAR_DAYS - 1);
        let attempts_in_window = attempts
            .iter()
            .filter(|a| a.attempted_on() >= window_start)
            .count() as u32;
        let recent = attempts.into_iter().take(RECENT_LIMIT).collect();

        Ok(StreakView {
            streak,
            calendar,
            recent,
            attempts_in_window,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use hub_core::model::QuizId;
    use hub_core::time::{fixed_clock, fixed_now};
    use storage::memory::InMemoryRepository;
    use storage::repository::{NewAttemptRecord, QuizRepository};

    fn service(repo: &InMemoryRepository) -> StreakService {
        StreakService::new(fixed_clock(), Arc::new(repo.clone()), Arc::new(repo.clone()))
    }

    async fn log_attempt(repo: &InMemoryRepository, user: UserId, days_ago: i64, correct: bool) {
        repo.insert_attempt(&NewAttemptRecord {
            user_id: user,
            quiz_id: QuizId::new(1),
            user_answer: "x".into(),
            is_correct: correct,
            attempted_at: fixed_now() - Duration::days(days_ago),
        })
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn calendar_spans_thirty_days_ending_today() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        log_attempt(&repo, user, 0, true).await;
        log_attempt(&repo, user, 2, false).await;

        let view = service(&repo).load(user).await.unwrap();
        assert_eq!(view.calendar.len(), 30);

        let today = fixed_now().date_naive();
        assert_eq!(view.calendar[0].date, today - Duration::days(29));
        assert_eq!(view.calendar[29].date, today);
        assert_eq!(view.calendar[29].outcome, DayOutcome::Correct);
        assert_eq!(view.calendar[27].outcome, DayOutcome::Incorrect);
        assert_eq!(view.calendar[28].outcome, DayOutcome::NoActivity);
        assert_eq!(view.attempts_in_window, 2);
    }

    #[tokio::test]
    async fn attempts_older_than_the_window_are_not_counted() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        log_attempt(&repo, user, 0, true).await;
        log_attempt(&repo, user, 40, true).await;

        let view = service(&repo).load(user).await.unwrap();
        assert_eq!(view.attempts_in_window, 1);
        // The old attempt still shows in the recent feed.
        assert_eq!(view.recent.len(), 2);
    }

    #[tokio::test]
    async fn missing_streak_row_reads_as_zero() {
        let repo = InMemoryRepository::new();
        let view = service(&repo).load(UserId::random()).await.unwrap();
        assert_eq!(view.streak.current_streak(), 0);
        assert_eq!(view.streak.highest_streak(), 0);
        assert!(view.recent.is_empty());
    }

    #[tokio::test]
    async fn recent_feed_is_newest_first_and_capped() {
        let repo = InMemoryRepository::new();
        let user = UserId::random();
        for days_ago in 0..12 {
            log_attempt(&repo, user, days_ago, true).await;
        }

        let view = service(&repo).load(user).await.unwrap();
        assert_eq!(view.recent.len(), 10);
        assert_eq!(view.recent[0].attempted_at, fixed_now());
        assert!(view.recent[0].attempted_at > view.recent[9].attempted_at);
        assert_eq!(view.attempts_in_window, 12);
    }
}
