use chrono::Duration;
use hub_core::Clock;
use hub_core::model::{DailyQuiz, QuizId, UserId};
use hub_core::session::{QuizSessionError, QuizStatus};
use hub_core::time::fixed_now;
use services::{AppServices, DailyQuizError};
use storage::repository::{QuizRepository, Storage};

fn quiz_for(clock: Clock, id: i64) -> DailyQuiz {
    DailyQuiz {
        id: QuizId::new(id),
        quiz_date: clock.today(),
        question_text: "Pick the even number".into(),
        options: vec!["3".into(), "8".into()],
        correct_answer: "8".into(),
        explanation: "8 divides by two.".into(),
        is_active: true,
    }
}

#[tokio::test]
async fn correct_then_incorrect_across_days_drives_the_streak() {
    let storage = Storage::in_memory();
    let user = UserId::random();

    // Day 1: fresh user answers correctly.
    let day1 = Clock::fixed(fixed_now());
    storage.quizzes.upsert_quiz(&quiz_for(day1, 1)).await.unwrap();

    let services = AppServices::with_storage(&storage, day1);
    let outcome = services.daily_quiz().submit(user, "8").await.unwrap();
    assert!(outcome.attempt.is_correct);
    assert_eq!(outcome.streak.current_streak(), 1);
    assert_eq!(outcome.streak.highest_streak(), 1);

    // Day 2: same user answers incorrectly.
    let mut day2 = day1;
    day2.advance(Duration::days(1));
    storage.quizzes.upsert_quiz(&quiz_for(day2, 2)).await.unwrap();

    let services = AppServices::with_storage(&storage, day2);
    let outcome = services.daily_quiz().submit(user, "3").await.unwrap();
    assert!(!outcome.attempt.is_correct);
    assert_eq!(outcome.streak.current_streak(), 0);
    assert_eq!(outcome.streak.highest_streak(), 1);
    assert_eq!(outcome.streak.last_activity_date(), Some(day2.today()));
}

#[tokio::test]
async fn second_submission_on_the_same_day_is_refused() {
    let storage = Storage::in_memory();
    let user = UserId::random();
    let clock = Clock::fixed(fixed_now());
    storage.quizzes.upsert_quiz(&quiz_for(clock, 1)).await.unwrap();

    let services = AppServices::with_storage(&storage, clock);
    services.daily_quiz().submit(user, "3").await.unwrap();

    let err = services.daily_quiz().submit(user, "8").await.unwrap_err();
    assert!(matches!(
        err,
        DailyQuizError::Session(QuizSessionError::AlreadyAnswered)
    ));
}

#[tokio::test]
async fn redisplay_after_answering_shows_the_stored_outcome() {
    let storage = Storage::in_memory();
    let user = UserId::random();
    let clock = Clock::fixed(fixed_now());
    storage.quizzes.upsert_quiz(&quiz_for(clock, 1)).await.unwrap();

    let services = AppServices::with_storage(&storage, clock);
    services.daily_quiz().submit(user, "3").await.unwrap();

    // Loading again changes nothing and shows the recorded answer.
    for _ in 0..2 {
        let view = services.daily_quiz().load(user).await.unwrap();
        assert_eq!(view.session().status(), QuizStatus::Answered);
        let attempt = view.attempt.expect("stored attempt");
        assert_eq!(attempt.user_answer, "3");
        assert!(!attempt.is_correct);
        assert_eq!(view.streak.current_streak(), 0);
    }
}

#[tokio::test]
async fn no_scheduled_quiz_blocks_submission_but_not_display() {
    let storage = Storage::in_memory();
    let user = UserId::random();
    let services = AppServices::with_storage(&storage, Clock::fixed(fixed_now()));

    let view = services.daily_quiz().load(user).await.unwrap();
    assert_eq!(view.session().status(), QuizStatus::NoQuiz);
    // First sight of the user creates the zero streak row.
    assert_eq!(view.streak.current_streak(), 0);

    let err = services.daily_quiz().submit(user, "8").await.unwrap_err();
    assert!(matches!(
        err,
        DailyQuizError::Session(QuizSessionError::NoActiveQuiz)
    ));
}
