use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::model::ids::{AttemptId, QuizId, UserId};

/// One day's multiple-choice question.
///
/// The store guarantees at most one active quiz per `quiz_date`; inactive
/// rows are drafts and never served.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DailyQuiz {
    pub id: QuizId,
    pub quiz_date: NaiveDate,
    pub question_text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub explanation: String,
    pub is_active: bool,
}

/// Append-only record of one quiz submission.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: AttemptId,
    pub user_id: UserId,
    pub quiz_id: QuizId,
    pub user_answer: String,
    pub is_correct: bool,
    pub attempted_at: DateTime<Utc>,
}

impl QuizAttempt {
    /// UTC calendar date of the submission; the once-per-day gate keys on
    /// this, never on the full timestamp.
    #[must_use]
    pub fn attempted_on(&self) -> NaiveDate {
        self.attempted_at.date_naive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::time::fixed_now;

    #[test]
    fn attempted_on_is_utc_date_portion() {
        let attempt = QuizAttempt {
            id: AttemptId::new(1),
            user_id: UserId::random(),
            quiz_id: QuizId::new(1),
            user_answer: "a".into(),
            is_correct: true,
            attempted_at: fixed_now(),
        };
        assert_eq!(attempt.attempted_on(), fixed_now().date_naive());
    }
}
