use std::collections::HashMap;

use mongodb::Database;
use uuid::Uuid;

use crate::core::{bootstrap, config::Settings, state::AppState, time::now_utc};
use crate::db;
use crate::db::models::{Course, User};
use crate::db::types::{CourseLevel, UserRole};
use crate::repositories;

const TEST_MONGODB_URI_VAR: &str = "EDUHUB_TEST_MONGODB_URI";

pub(crate) struct TestContext {
    pub(crate) state: AppState,
}

impl TestContext {
    pub(crate) fn db(&self) -> &Database {
        self.state.db()
    }

    pub(crate) async fn teardown(self) {
        if let Err(err) = self.state.db().drop(None).await {
            eprintln!("failed to drop test database: {err}");
        }
        self.state.close().await;
    }
}

/// Connects to the MongoDB named by `EDUHUB_TEST_MONGODB_URI` and prepares a fresh,
/// uniquely named database. Returns `None` (and the caller skips) when the variable is unset.
pub(crate) async fn setup_test_context() -> Option<TestContext> {
    dotenvy::dotenv().ok();

    let uri = match std::env::var(TEST_MONGODB_URI_VAR) {
        Ok(uri) if !uri.trim().is_empty() => uri,
        _ => {
            eprintln!("{TEST_MONGODB_URI_VAR} not set; skipping database test");
            return None;
        }
    };

    let db_name = format!("eduhub_test_{}", Uuid::new_v4().simple());
    let vars: HashMap<&str, String> = HashMap::from([
        ("EDUHUB_ENV", "test".to_string()),
        ("MONGODB_URI", uri),
        ("EDUHUB_DB_NAME", db_name),
        ("MONGODB_MIN_POOL_SIZE", "0".to_string()),
        ("MONGODB_MAX_POOL_SIZE", "5".to_string()),
    ]);

    let settings =
        Settings::from_source(|key| vars.get(key).cloned()).expect("test settings");
    let client = db::init_client(&settings).await.expect("mongodb connect");
    let state = AppState::new(settings, client);
    bootstrap::setup_database(state.db(), true).await.expect("setup database");

    Some(TestContext { state })
}

pub(crate) async fn insert_user(db: &Database, user_id: &str, role: UserRole) -> User {
    let user = User {
        id: None,
        user_id: user_id.to_string(),
        email: format!("{}@example.com", user_id.to_lowercase()),
        first_name: format!("First{user_id}"),
        last_name: format!("Last{user_id}"),
        role,
        date_joined: now_utc(),
        profile: None,
        is_active: true,
    };
    repositories::users::insert(db, &user).await.expect("insert user");
    user
}

pub(crate) async fn insert_course(
    db: &Database,
    course_id: &str,
    instructor_id: &str,
    category: &str,
    published: bool,
) -> Course {
    let now = now_utc();
    let course = Course {
        id: None,
        course_id: course_id.to_string(),
        title: format!("Course {course_id}"),
        description: Some(format!("Description of {course_id}")),
        instructor_id: instructor_id.to_string(),
        category: Some(category.to_string()),
        level: CourseLevel::Beginner,
        duration: 10,
        price: 25.0,
        tags: vec!["test".to_string()],
        created_at: now,
        updated_at: now,
        is_published: published,
    };
    repositories::courses::insert(db, &course).await.expect("insert course");
    course
}
