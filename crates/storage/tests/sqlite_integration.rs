use chrono::Duration;
use hub_core::model::{
    DailyQuiz, Level, LevelId, Module, ModuleId, ProfileUpdate, ProgressRow, QuizId, Streak,
    SubModule, SubModuleId, UserId, UserProfile,
};
use hub_core::time::fixed_now;
use storage::repository::{
    AttemptPersistence, CurriculumRepository, NewAttemptRecord, ProfileRepository,
    ProgressRepository, QuizRepository, StorageError, StreakRepository,
};
use storage::sqlite::SqliteRepository;

async fn open(name: &str) -> SqliteRepository {
    let url = format!("sqlite:file:{name}?mode=memory&cache=shared");
    let repo = SqliteRepository::connect(&url).await.expect("connect");
    repo.migrate().await.expect("migrate");
    repo
}

fn sample_quiz(id: i64) -> DailyQuiz {
    DailyQuiz {
        id: QuizId::new(id),
        quiz_date: fixed_now().date_naive(),
        question_text: "2 + 2?".into(),
        options: vec!["3".into(), "4".into()],
        correct_answer: "4".into(),
        explanation: "Count it out.".into(),
        is_active: true,
    }
}

fn attempt_record(user: UserId, quiz: QuizId, correct: bool) -> NewAttemptRecord {
    NewAttemptRecord {
        user_id: user,
        quiz_id: quiz,
        user_answer: if correct { "4".into() } else { "3".into() },
        is_correct: correct,
        attempted_at: fixed_now(),
    }
}

#[tokio::test]
async fn sqlite_curriculum_roundtrip_preserves_order_and_unlock_chain() {
    let repo = open("memdb_curriculum").await;

    repo.upsert_level(&Level {
        id: LevelId::new(1),
        level_number: 1,
        title: "Foundations".into(),
        description: String::new(),
        is_active: true,
    })
    .await
    .unwrap();

    repo.upsert_module(&Module {
        id: ModuleId::new(10),
        level_id: LevelId::new(1),
        module_number: 1,
        title: "Numbers".into(),
        description: String::new(),
        is_active: true,
    })
    .await
    .unwrap();

    // Prerequisites are inserted before the rows that reference them;
    // display order comes from sub_module_number, not insertion order.
    for (id, number, unlock_after) in [(21, 2, None), (22, 3, Some(21)), (23, 1, Some(22))] {
        repo.upsert_sub_module(&SubModule {
            id: SubModuleId::new(id),
            module_id: ModuleId::new(10),
            sub_module_number: number,
            title: format!("Part {number}"),
            description: String::new(),
            unlock_after: unlock_after.map(SubModuleId::new),
        })
        .await
        .unwrap();
    }

    let module = repo.module(ModuleId::new(10)).await.unwrap().unwrap();
    assert_eq!(module.title, "Numbers");
    assert!(repo.module(ModuleId::new(99)).await.unwrap().is_none());

    let subs = repo.list_sub_modules(Some(ModuleId::new(10))).await.unwrap();
    let numbers: Vec<u32> = subs.iter().map(|s| s.sub_module_number).collect();
    assert_eq!(numbers, vec![1, 2, 3]);
    let ids: Vec<SubModuleId> = subs.iter().map(|s| s.id).collect();
    assert_eq!(
        ids,
        vec![SubModuleId::new(23), SubModuleId::new(21), SubModuleId::new(22)]
    );
    assert_eq!(subs[0].unlock_after, Some(SubModuleId::new(22)));
    assert_eq!(subs[1].unlock_after, None);
}

#[tokio::test]
async fn sqlite_progress_upsert_is_idempotent_per_sub_module() {
    let repo = open("memdb_progress").await;
    let user = UserId::random();

    // Progress rows reference the curriculum, so it has to exist first.
    repo.upsert_level(&Level {
        id: LevelId::new(1),
        level_number: 1,
        title: "Foundations".into(),
        description: String::new(),
        is_active: true,
    })
    .await
    .unwrap();
    repo.upsert_module(&Module {
        id: ModuleId::new(10),
        level_id: LevelId::new(1),
        module_number: 1,
        title: "Numbers".into(),
        description: String::new(),
        is_active: true,
    })
    .await
    .unwrap();
    repo.upsert_sub_module(&SubModule {
        id: SubModuleId::new(21),
        module_id: ModuleId::new(10),
        sub_module_number: 1,
        title: "Counting".into(),
        description: String::new(),
        unlock_after: None,
    })
    .await
    .unwrap();

    let row = ProgressRow::completed(
        user,
        ModuleId::new(10),
        SubModuleId::new(21),
        fixed_now(),
    );
    repo.upsert_progress(&row).await.unwrap();
    repo.upsert_progress(&row).await.unwrap();

    let rows = repo.list_progress(user, None).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert!(rows[0].is_completed);

    let other_module = repo
        .list_progress(user, Some(ModuleId::new(99)))
        .await
        .unwrap();
    assert!(other_module.is_empty());
}

#[tokio::test]
async fn sqlite_rejects_second_attempt_on_same_day() {
    let repo = open("memdb_attempt_gate").await;
    let user = UserId::random();
    repo.upsert_quiz(&sample_quiz(1)).await.unwrap();

    repo.insert_attempt(&attempt_record(user, QuizId::new(1), true))
        .await
        .unwrap();

    let err = repo
        .insert_attempt(&attempt_record(user, QuizId::new(1), false))
        .await
        .unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    // A different user on the same day is unaffected.
    repo.insert_attempt(&attempt_record(UserId::random(), QuizId::new(1), true))
        .await
        .unwrap();
}

#[tokio::test]
async fn sqlite_record_attempt_writes_attempt_and_streak_together() {
    let repo = open("memdb_record_attempt").await;
    let user = UserId::random();
    repo.upsert_quiz(&sample_quiz(1)).await.unwrap();

    let mut streak = Streak::new();
    streak.apply(true, fixed_now().date_naive());

    let id = repo
        .record_attempt(&attempt_record(user, QuizId::new(1), true), &streak)
        .await
        .unwrap();

    let stored = repo
        .attempt_on(user, fixed_now().date_naive())
        .await
        .unwrap()
        .expect("attempt row");
    assert_eq!(stored.id, id);
    assert!(stored.is_correct);

    let stored_streak = repo.streak(user).await.unwrap().expect("streak row");
    assert_eq!(stored_streak.current_streak(), 1);
    assert_eq!(stored_streak.highest_streak(), 1);
    assert_eq!(
        stored_streak.last_activity_date(),
        Some(fixed_now().date_naive())
    );
}

#[tokio::test]
async fn sqlite_allows_one_active_quiz_per_date() {
    let repo = open("memdb_active_quiz").await;

    repo.upsert_quiz(&sample_quiz(1)).await.unwrap();

    let mut second = sample_quiz(2);
    second.question_text = "3 + 3?".into();
    let err = repo.upsert_quiz(&second).await.unwrap_err();
    assert!(matches!(err, StorageError::Conflict));

    // An inactive quiz on the same date is fine.
    second.is_active = false;
    repo.upsert_quiz(&second).await.unwrap();

    let active = repo
        .active_quiz(fixed_now().date_naive())
        .await
        .unwrap()
        .expect("active quiz");
    assert_eq!(active.id, QuizId::new(1));

    let tomorrow = (fixed_now() + Duration::days(1)).date_naive();
    assert!(repo.active_quiz(tomorrow).await.unwrap().is_none());
}

#[tokio::test]
async fn sqlite_profile_update_touches_editable_fields_only() {
    let repo = open("memdb_profile").await;
    let user = UserId::random();

    let update = ProfileUpdate::new("Ada", "Lovelace", Some("0123456789".into())).unwrap();
    let err = repo.update_profile(user, &update).await.unwrap_err();
    assert!(matches!(err, StorageError::NotFound));

    repo.upsert_profile(&UserProfile {
        user_id: user,
        email: "ada@example.com".into(),
        first_name: "A.".into(),
        last_name: "L.".into(),
        roll_number: Some("R-7".into()),
        mobile_number: None,
        current_level: 2,
        total_xp: 140,
        created_at: fixed_now(),
    })
    .await
    .unwrap();

    repo.update_profile(user, &update).await.unwrap();

    let profile = repo.profile(user).await.unwrap().expect("profile row");
    assert_eq!(profile.first_name, "Ada");
    assert_eq!(profile.last_name, "Lovelace");
    assert_eq!(profile.mobile_number.as_deref(), Some("0123456789"));
    assert_eq!(profile.email, "ada@example.com");
    assert_eq!(profile.roll_number.as_deref(), Some("R-7"));
    assert_eq!(profile.total_xp, 140);
}
