use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use serde_json::Value;

use crate::core::bootstrap;
use crate::core::state::AppState;
use crate::db::models::UserProfile;
use crate::db::types::CourseLevel;
use crate::schemas::analytics::StudentEnrollment;
use crate::schemas::course::{CourseCreate, CourseResponse, CourseSearch};
use crate::schemas::enrollment::EnrollmentResponse;
use crate::schemas::user::{UserCreate, UserResponse};
use crate::schemas::OperationOutcome;
use crate::repositories;
use crate::services::errors::WorkflowError;
use crate::services::{analytics, courses, demo, enrollments, export, population, reports, users};

/// EduHub: manage users, courses and enrollments stored in MongoDB
#[derive(Parser)]
#[command(name = "eduhub", version, about)]
pub(crate) struct Cli {
    /// Override the database name from EDUHUB_DB_NAME
    #[arg(long, global = true)]
    pub(crate) db_name: Option<String>,

    #[command(subcommand)]
    pub(crate) command: Command,
}

#[derive(Subcommand)]
pub(crate) enum Command {
    /// Apply collection validators and build indexes
    Setup {
        /// Drop every collection first
        #[arg(long)]
        reset: bool,
    },

    /// Insert sample users, courses, enrollments and submissions
    Populate {
        /// Highest user number to generate (U001..U<count>)
        #[arg(long, default_value_t = population::DEFAULT_USER_COUNT)]
        count: u32,
    },

    /// Run the end-to-end demonstration and clean up afterwards
    Demo,

    /// User workflows
    #[command(subcommand)]
    User(UserCommand),

    /// Course workflows
    #[command(subcommand)]
    Course(CourseCommand),

    /// Enroll a student in a published course
    Enroll { user_id: String, course_id: String },

    /// List a student's enrollments with course details
    Enrollments { user_id: String },

    /// Aggregated statistics
    Stats {
        #[arg(value_enum)]
        report: StatsReport,
        /// Window for the trends report, in 30-day months
        #[arg(long, default_value_t = 12)]
        months: u32,
    },

    /// Submission statistics of a student
    Performance { user_id: String },

    /// Text performance report of a student
    Report { user_id: String },

    /// Plain-text bar chart
    Chart {
        #[arg(value_enum)]
        chart: ChartKind,
        #[arg(long, default_value_t = 12)]
        months: u32,
    },

    /// Export a collection to a CSV file
    Export { collection: String, path: PathBuf },
}

#[derive(Subcommand)]
pub(crate) enum UserCommand {
    /// Create a user
    Create(UserCreateArgs),
    /// Look a user up by email
    Show { email: String },
    /// Replace a user's profile
    Profile {
        user_id: String,
        #[command(flatten)]
        profile: ProfileArgs,
    },
    /// Soft-delete a user
    Deactivate { user_id: String },
}

#[derive(Args)]
pub(crate) struct UserCreateArgs {
    #[arg(long)]
    user_id: Option<String>,
    #[arg(long)]
    email: Option<String>,
    #[arg(long)]
    first_name: Option<String>,
    #[arg(long)]
    last_name: Option<String>,
    /// student or instructor
    #[arg(long)]
    role: Option<String>,
    #[command(flatten)]
    profile: ProfileArgs,
}

#[derive(Args)]
pub(crate) struct ProfileArgs {
    #[arg(long)]
    bio: Option<String>,
    #[arg(long)]
    avatar: Option<String>,
    #[arg(long = "skill")]
    skills: Vec<String>,
}

impl ProfileArgs {
    fn is_empty(&self) -> bool {
        self.bio.is_none() && self.avatar.is_none() && self.skills.is_empty()
    }

    fn into_profile(self) -> UserProfile {
        UserProfile { bio: self.bio, avatar: self.avatar, skills: self.skills }
    }
}

#[derive(Subcommand)]
pub(crate) enum CourseCommand {
    /// Create a course (unpublished unless --published)
    Create(CourseCreateArgs),
    /// Show one course
    Show { course_id: String },
    /// Publish a course
    Publish { course_id: String },
    /// Search courses
    Search {
        #[arg(long)]
        keyword: Option<String>,
        #[arg(long)]
        category: Option<String>,
        #[arg(long, value_enum)]
        level: Option<LevelArg>,
        /// Include unpublished courses
        #[arg(long)]
        all: bool,
    },
}

#[derive(Args)]
pub(crate) struct CourseCreateArgs {
    #[arg(long)]
    course_id: Option<String>,
    #[arg(long)]
    title: Option<String>,
    #[arg(long)]
    description: Option<String>,
    #[arg(long)]
    instructor_id: Option<String>,
    #[arg(long)]
    category: Option<String>,
    /// beginner, intermediate or advanced
    #[arg(long)]
    level: Option<String>,
    /// Hours
    #[arg(long)]
    duration: Option<String>,
    #[arg(long)]
    price: Option<String>,
    #[arg(long = "tag")]
    tags: Vec<String>,
    #[arg(long)]
    published: bool,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum LevelArg {
    Beginner,
    Intermediate,
    Advanced,
}

impl From<LevelArg> for CourseLevel {
    fn from(level: LevelArg) -> Self {
        match level {
            LevelArg::Beginner => CourseLevel::Beginner,
            LevelArg::Intermediate => CourseLevel::Intermediate,
            LevelArg::Advanced => CourseLevel::Advanced,
        }
    }
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum StatsReport {
    Courses,
    Categories,
    Trends,
}

#[derive(Clone, Copy, ValueEnum)]
pub(crate) enum ChartKind {
    Trends,
    Categories,
}

/// Runs one command. Returns `false` when a workflow reported a failure outcome.
pub(crate) async fn dispatch(state: &AppState, command: Command) -> anyhow::Result<bool> {
    let db = state.db();

    match command {
        Command::Setup { reset } => {
            bootstrap::setup_database(db, reset).await?;
            println!("Database setup completed");
        }
        Command::Populate { count } => {
            let summary = population::populate(db, count).await;
            print_json(&summary)?;
        }
        Command::Demo => {
            let stdout = std::io::stdout();
            demo::run_demo(db, &mut stdout.lock()).await?;
        }
        Command::User(command) => return user_command(state, command).await,
        Command::Course(command) => return course_command(state, command).await,
        Command::Enroll { user_id, course_id } => {
            let outcome = match enrollments::enroll_student(db, &user_id, &course_id).await {
                Ok(enrollment) => OperationOutcome::with_data(serde_json::to_value(
                    EnrollmentResponse::from_db(enrollment),
                )?),
                Err(err) => OperationOutcome::failure(&err),
            };
            return print_outcome(&outcome);
        }
        Command::Enrollments { user_id } => {
            let rows: Vec<StudentEnrollment> =
                enrollments::get_student_enrollments(db, &user_id).await;
            print_json(&rows)?;
        }
        Command::Stats { report, months } => match report {
            StatsReport::Courses => print_json(&analytics::get_course_enrollment_stats(db).await)?,
            StatsReport::Categories => print_json(&analytics::get_category_popularity(db).await)?,
            StatsReport::Trends => print_json(&analytics::get_enrollment_trends(db, months).await)?,
        },
        Command::Performance { user_id } => {
            print_json(&analytics::get_student_performance(db, &user_id).await)?;
        }
        Command::Report { user_id } => {
            print!("{}", reports::performance_report(db, &user_id).await);
        }
        Command::Chart { chart, months } => {
            let rendered = match chart {
                ChartKind::Trends => reports::enrollment_trend_chart(db, months).await,
                ChartKind::Categories => reports::category_distribution_chart(db).await,
            };
            print!("{rendered}");
        }
        Command::Export { collection, path } => {
            let rows = export::export_collection(db, &collection, &path).await?;
            println!("Exported {rows} documents to {}", path.display());
        }
    }

    Ok(true)
}

async fn user_command(state: &AppState, command: UserCommand) -> anyhow::Result<bool> {
    let db = state.db();

    let outcome = match command {
        UserCommand::Create(args) => {
            let profile = (!args.profile.is_empty()).then(|| args.profile.into_profile());
            let data = UserCreate {
                user_id: args.user_id,
                email: args.email,
                first_name: args.first_name,
                last_name: args.last_name,
                role: args.role,
                profile,
                is_active: None,
            };
            OperationOutcome::from_id_result(users::create_user(db, data).await)
        }
        UserCommand::Show { email } => match users::get_user_by_email(db, &email).await {
            Some(user) => {
                OperationOutcome::with_data(serde_json::to_value(UserResponse::from_db(user))?)
            }
            None => OperationOutcome::with_data(Value::Null),
        },
        UserCommand::Profile { user_id, profile } => {
            let profile = profile.into_profile();
            match users::update_user_profile(db, &user_id, &profile).await {
                Ok(modified) => {
                    OperationOutcome::with_data(serde_json::json!({ "modifiedCount": modified }))
                }
                Err(err) => OperationOutcome::failure(&err),
            }
        }
        UserCommand::Deactivate { user_id } => OperationOutcome::from_id_result(
            users::deactivate_user(db, &user_id).await.map(|()| user_id),
        ),
    };

    print_outcome(&outcome)
}

async fn course_command(state: &AppState, command: CourseCommand) -> anyhow::Result<bool> {
    let db = state.db();

    let outcome = match command {
        CourseCommand::Create(args) => {
            let data = CourseCreate {
                course_id: args.course_id,
                title: args.title,
                description: args.description,
                instructor_id: args.instructor_id,
                category: args.category,
                level: args.level,
                duration: args.duration.map(Value::String),
                price: args.price.map(Value::String),
                tags: args.tags,
                is_published: Some(args.published),
            };
            OperationOutcome::from_id_result(courses::create_course(db, data).await)
        }
        CourseCommand::Show { course_id } => {
            match repositories::courses::find_by_course_id(db, &course_id).await? {
                Some(course) => {
                    let course = CourseResponse::from_db(course);
                    OperationOutcome::with_data(serde_json::to_value(course)?)
                }
                None => OperationOutcome::failure(&WorkflowError::NotFound(
                    "Course not found".to_string(),
                )),
            }
        }
        CourseCommand::Publish { course_id } => OperationOutcome::from_id_result(
            courses::publish_course(db, &course_id).await.map(|()| course_id),
        ),
        CourseCommand::Search { keyword, category, level, all } => {
            let search = CourseSearch {
                title_keyword: keyword,
                category,
                level: level.map(CourseLevel::from),
                published_only: !all,
            };
            let found: Vec<CourseResponse> = courses::search_courses(db, &search)
                .await
                .into_iter()
                .map(CourseResponse::from_db)
                .collect();
            OperationOutcome::with_data(serde_json::to_value(found)?)
        }
    };

    print_outcome(&outcome)
}

fn print_json<T: Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn print_outcome(outcome: &OperationOutcome) -> anyhow::Result<bool> {
    print_json(outcome)?;
    Ok(outcome.success)
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn command_tree_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_course_creation_flags() {
        let cli = Cli::try_parse_from([
            "eduhub",
            "course",
            "create",
            "--course-id",
            "C100",
            "--title",
            "Rust",
            "--duration",
            "12.5",
            "--tag",
            "systems",
            "--tag",
            "rust",
        ])
        .expect("parse");

        match cli.command {
            Command::Course(CourseCommand::Create(args)) => {
                assert_eq!(args.course_id.as_deref(), Some("C100"));
                assert_eq!(args.duration.as_deref(), Some("12.5"));
                assert_eq!(args.tags, vec!["systems", "rust"]);
                assert!(args.instructor_id.is_none());
                assert!(!args.published);
            }
            _ => panic!("expected course create"),
        }
    }

    #[test]
    fn parses_global_database_override() {
        let args = ["eduhub", "stats", "trends", "--months", "6", "--db-name", "x"];
        let cli = Cli::try_parse_from(args).expect("parse");
        assert_eq!(cli.db_name.as_deref(), Some("x"));
        assert!(matches!(cli.command, Command::Stats { report: StatsReport::Trends, months: 6 }));
    }
}
