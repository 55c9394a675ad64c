pub(crate) mod indexes;
pub(crate) mod models;
pub(crate) mod schema;
pub(crate) mod types;

use bson::doc;
use mongodb::options::ClientOptions;
use mongodb::Client;

use crate::core::config::Settings;

pub(crate) const USERS: &str = "users";
pub(crate) const COURSES: &str = "courses";
pub(crate) const ENROLLMENTS: &str = "enrollments";
pub(crate) const ASSIGNMENTS: &str = "assignments";
pub(crate) const SUBMISSIONS: &str = "assignment_submissions";
pub(crate) const LESSONS: &str = "lessons";
pub(crate) const COUNTERS: &str = "counters";

/// Every collection owned by the application, in reset order.
pub(crate) const ALL_COLLECTIONS: &[&str] =
    &[USERS, COURSES, ENROLLMENTS, ASSIGNMENTS, SUBMISSIONS, LESSONS, COUNTERS];

pub(crate) async fn init_client(settings: &Settings) -> Result<Client, mongodb::error::Error> {
    let database = settings.database();
    let mut options = ClientOptions::parse(database.uri()).await?;

    options.app_name = Some("eduhub".to_string());
    options.max_pool_size = Some(database.max_pool_size);
    options.min_pool_size = Some(database.min_pool_size);
    options.max_idle_time = Some(database.max_idle_time());
    options.server_selection_timeout = Some(database.server_selection_timeout());

    let client = Client::with_options(options)?;
    client.database("admin").run_command(doc! { "ping": 1 }, None).await?;
    tracing::info!(database = %database.name(), "Successfully connected to database");

    Ok(client)
}
