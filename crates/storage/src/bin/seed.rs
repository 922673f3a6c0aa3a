use std::fmt;

use chrono::{DateTime, Utc};
use hub_core::model::{
    Achievement, AchievementId, ConceptId, DailyQuiz, Level, LevelId, MicroConcept, Module,
    ModuleId, QuizId, SubModule, SubModuleId, UserId, UserProfile,
};
use storage::repository::{
    AchievementRepository, CurriculumRepository, ProfileRepository, QuizRepository, Storage,
    StreakRepository,
};

#[derive(Debug, Clone)]
struct Args {
    db_url: String,
    user: Option<UserId>,
    now: Option<DateTime<Utc>>,
}

#[derive(Debug)]
enum ArgsError {
    MissingValue { flag: &'static str },
    UnknownArg(String),
    InvalidDbUrl { raw: String },
    InvalidUser { raw: String },
    InvalidNow { raw: String },
}

impl fmt::Display for ArgsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ArgsError::MissingValue { flag } => write!(f, "{flag} requires a value"),
            ArgsError::UnknownArg(arg) => write!(f, "unknown argument: {arg}"),
            ArgsError::InvalidDbUrl { raw } => write!(f, "invalid --db value: {raw}"),
            ArgsError::InvalidUser { raw } => {
                write!(f, "invalid --user value (expected uuid): {raw}")
            }
            ArgsError::InvalidNow { raw } => {
                write!(f, "invalid --now value (expected RFC3339): {raw}")
            }
        }
    }
}

impl std::error::Error for ArgsError {}

fn require_value(
    args: &mut impl Iterator<Item = String>,
    flag: &'static str,
) -> Result<String, ArgsError> {
    args.next().ok_or(ArgsError::MissingValue { flag })
}

impl Args {
    fn parse() -> Result<Self, ArgsError> {
        let mut db_url = std::env::var("HUB_DB_URL").unwrap_or_else(|_| "sqlite:dev.sqlite3".into());
        let mut user = std::env::var("HUB_SEED_USER")
            .ok()
            .and_then(|value| value.parse::<UserId>().ok());
        let mut now: Option<DateTime<Utc>> = None;

        let mut args = std::env::args().skip(1);
        while let Some(arg) = args.next() {
            match arg.as_str() {
                "--db" => {
                    let value = require_value(&mut args, "--db")?;
                    if value.trim().is_empty() {
                        return Err(ArgsError::InvalidDbUrl { raw: value });
                    }
                    db_url = value;
                }
                "--user" => {
                    let value = require_value(&mut args, "--user")?;
                    let parsed = value
                        .parse::<UserId>()
                        .map_err(|_| ArgsError::InvalidUser { raw: value.clone() })?;
                    user = Some(parsed);
                }
                "--now" => {
                    let value = require_value(&mut args, "--now")?;
                    let parsed = DateTime::parse_from_rfc3339(&value)
                        .map_err(|_| ArgsError::InvalidNow { raw: value.clone() })?
                        .with_timezone(&Utc);
                    now = Some(parsed);
                }
                "--help" | "-h" => {
                    print_usage();
                    std::process::exit(0);
                }
                _ => return Err(ArgsError::UnknownArg(arg)),
            }
        }

        Ok(Self { db_url, user, now })
    }
}

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  cargo run -p storage --bin seed -- [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --db <sqlite_url>         SQLite URL (default: sqlite:dev.sqlite3)");
    eprintln!("  --user <uuid>             Also seed a profile and streak for this user");
    eprintln!("  --now <rfc3339>           Fixed current time for deterministic seeding");
    eprintln!("  -h, --help                Show this help");
    eprintln!();
    eprintln!("Environment (same as flags):");
    eprintln!("  HUB_DB_URL, HUB_SEED_USER");
}

async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse().map_err(|e| {
        eprintln!("{e}");
        print_usage();
        e
    })?;

    let storage = Storage::sqlite(&args.db_url).await?;
    let now = args.now.unwrap_or_else(Utc::now);

    storage
        .curriculum
        .upsert_level(&Level {
            id: LevelId::new(1),
            level_number: 1,
            title: "Foundations".into(),
            description: "Core ideas every later level builds on".into(),
            is_active: true,
        })
        .await?;

    let modules = [
        (1, "Numbers and Notation", "How quantities are written and read"),
        (2, "Patterns and Sequences", "Spotting structure in ordered data"),
    ];
    for (number, title, description) in modules {
        storage
            .curriculum
            .upsert_module(&Module {
                id: ModuleId::new(number),
                level_id: LevelId::new(1),
                module_number: u32::try_from(number)?,
                title: title.into(),
                description: description.into(),
                is_active: true,
            })
            .await?;
    }

    // Sub-modules within a module unlock in a chain: each one opens once
    // the previous is completed.
    let sub_modules = [
        (1, 1, 1, "Place Value", None),
        (2, 1, 2, "Rounding", Some(1)),
        (3, 1, 3, "Estimation", Some(2)),
        (4, 2, 1, "Arithmetic Sequences", None),
        (5, 2, 2, "Geometric Sequences", Some(4)),
    ];
    for (id, module, number, title, unlock_after) in sub_modules {
        storage
            .curriculum
            .upsert_sub_module(&SubModule {
                id: SubModuleId::new(id),
                module_id: ModuleId::new(module),
                sub_module_number: number,
                title: title.into(),
                description: String::new(),
                unlock_after: unlock_after.map(SubModuleId::new),
            })
            .await?;
    }

    storage
        .curriculum
        .upsert_concept(&MicroConcept {
            id: ConceptId::new(1),
            sub_module_id: SubModuleId::new(1),
            concept_number: 1,
            title: "Digits carry positional weight".into(),
            definition_simple: "Where a digit sits decides how much it counts.".into(),
            definition_formal: "A numeral in base ten encodes a sum of digits scaled by powers of ten.".into(),
            why_exists: "Positional notation lets ten symbols name any quantity.".into(),
            cognitive_explanation: "Read a number column by column and the size falls out.".into(),
            examples: vec!["304 = 3*100 + 0*10 + 4*1".into()],
        })
        .await?;

    storage
        .quizzes
        .upsert_quiz(&DailyQuiz {
            id: QuizId::new(1),
            quiz_date: now.date_naive(),
            question_text: "What is the value of the digit 7 in 3,742?".into(),
            options: vec!["7".into(), "70".into(), "700".into(), "7,000".into()],
            correct_answer: "700".into(),
            explanation: "The 7 sits in the hundreds column.".into(),
            is_active: true,
        })
        .await?;

    let achievements = [
        (1, "First Steps", "Complete your first sub-module", "footprints"),
        (2, "Week of Fire", "Hold a seven-day quiz streak", "flame"),
        (3, "Perfect Month", "Answer every quiz in a calendar month", "trophy"),
    ];
    for (id, title, description, icon) in achievements {
        storage
            .achievements
            .upsert_achievement(&Achievement {
                id: AchievementId::new(id),
                title: title.into(),
                description: description.into(),
                badge_icon: icon.into(),
            })
            .await?;
    }

    if let Some(user) = args.user {
        storage
            .profiles
            .upsert_profile(&UserProfile {
                user_id: user,
                email: "learner@example.com".into(),
                first_name: "Sample".into(),
                last_name: "Learner".into(),
                roll_number: None,
                mobile_number: None,
                current_level: 1,
                total_xp: 0,
                created_at: now,
            })
            .await?;
        if storage.streaks.streak(user).await?.is_none() {
            storage.streaks.create_streak(user).await?;
        }
    }

    println!(
        "Seeded 1 level, 2 modules, 5 sub-modules and today's quiz into {}",
        args.db_url
    );

    Ok(())
}

#[tokio::main]
async fn main() {
    if let Err(err) = run().await {
        eprintln!("{err}");
        std::process::exit(2);
    }
}
