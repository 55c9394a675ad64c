use std::io::Write;

use mongodb::Database;
use serde_json::json;

use crate::db::models::UserProfile;
use crate::repositories;
use crate::schemas::course::{CourseCreate, CourseSearch};
use crate::schemas::user::UserCreate;
use crate::schemas::OperationOutcome;
use crate::services::{analytics, courses, enrollments, reports, users};

const DEMO_USER: &str = "U999";
const DEMO_EMAIL: &str = "demo.user@eduhub.com";
const DEMO_COURSE: &str = "C999";
const TREND_MONTHS: u32 = 6;

fn demo_user() -> UserCreate {
    UserCreate {
        user_id: Some(DEMO_USER.to_string()),
        email: Some(DEMO_EMAIL.to_string()),
        first_name: Some("Demo".to_string()),
        last_name: Some("User".to_string()),
        role: Some("student".to_string()),
        profile: Some(UserProfile {
            bio: Some("Test user for demonstration".to_string()),
            avatar: None,
            skills: vec!["Python".into(), "MongoDB".into(), "Data Analysis".into()],
        }),
        is_active: None,
    }
}

fn demo_course() -> CourseCreate {
    CourseCreate {
        course_id: Some(DEMO_COURSE.to_string()),
        title: Some("MongoDB Masterclass".to_string()),
        description: Some("Complete guide to MongoDB".to_string()),
        instructor_id: Some("U001".to_string()),
        category: Some("Database".to_string()),
        level: Some("intermediate".to_string()),
        duration: Some(json!(40)),
        price: Some(json!(89.99)),
        tags: vec!["mongodb".into(), "database".into(), "nosql".into()],
        is_published: None,
    }
}

fn outcome_line(outcome: &OperationOutcome) -> String {
    serde_json::to_string(outcome).unwrap_or_else(|err| format!("<unprintable outcome: {err}>"))
}

/// Walks through every workflow against the current database, then removes what it created.
pub(crate) async fn run_demo<W: Write>(db: &Database, out: &mut W) -> anyhow::Result<()> {
    let rule = "=".repeat(60);
    writeln!(out, "\n{rule}\nEDUHUB MONGODB PROJECT - DEMONSTRATION\n{rule}")?;

    writeln!(out, "\n### USER OPERATIONS ###\n")?;
    writeln!(out, "1. Creating a new user...")?;
    let created = OperationOutcome::from_id_result(users::create_user(db, demo_user()).await);
    writeln!(out, "   Result: {}", outcome_line(&created))?;

    writeln!(out, "\n2. Finding user by email...")?;
    if let Some(user) = users::get_user_by_email(db, DEMO_EMAIL).await {
        writeln!(out, "   Found: {} {} ({})", user.first_name, user.last_name, user.role)?;
    }

    writeln!(out, "\n### COURSE OPERATIONS ###\n")?;
    writeln!(out, "1. Creating a new course...")?;
    let created = OperationOutcome::from_id_result(courses::create_course(db, demo_course()).await);
    writeln!(out, "   Result: {}", outcome_line(&created))?;

    writeln!(out, "\n2. Searching for Python courses...")?;
    let search =
        CourseSearch { title_keyword: Some("Python".into()), ..CourseSearch::published() };
    let found = courses::search_courses(db, &search).await;
    writeln!(out, "   Found {} courses", found.len())?;
    for course in found.iter().take(3) {
        writeln!(out, "   - {} ({})", course.title, course.level)?;
    }

    writeln!(out, "\n### ENROLLMENT OPERATIONS ###\n")?;
    writeln!(out, "1. Enrolling student in course...")?;
    let enrolled = enrollments::enroll_student(db, DEMO_USER, "C001")
        .await
        .map(|enrollment| enrollment.enrollment_id);
    writeln!(out, "   Result: {}", outcome_line(&OperationOutcome::from_id_result(enrolled)))?;

    writeln!(out, "\n2. Getting student enrollments...")?;
    let listed = enrollments::get_student_enrollments(db, DEMO_USER).await;
    writeln!(out, "   Found {} enrollments", listed.len())?;
    for enrollment in &listed {
        writeln!(out, "   - {} (Status: {})", enrollment.course_title, enrollment.status)?;
    }

    writeln!(out, "\n### ANALYTICS & REPORTS ###\n")?;
    writeln!(out, "1. Course enrollment statistics...")?;
    let stats = analytics::get_course_enrollment_stats(db).await;
    writeln!(out, "   Analyzed {} courses", stats.len())?;
    for stat in stats.iter().take(5) {
        writeln!(
            out,
            "   - {}: {} enrollments ({:.1}% completion)",
            stat.title, stat.total_enrollments, stat.completion_rate
        )?;
    }

    writeln!(out, "\n2. Category popularity...")?;
    for stat in analytics::get_category_popularity(db).await {
        writeln!(
            out,
            "   - {}: {} enrollments, {} unique students",
            stat.category.as_deref().unwrap_or("Uncategorized"),
            stat.total_enrollments,
            stat.unique_students
        )?;
    }

    writeln!(out, "\n### CHARTS ###\n")?;
    writeln!(out, "{}", reports::enrollment_trend_chart(db, TREND_MONTHS).await)?;
    writeln!(out, "{}", reports::category_distribution_chart(db).await)?;

    writeln!(out, "\n### ERROR HANDLING EXAMPLES ###\n")?;
    writeln!(out, "1. Attempting to create duplicate user...")?;
    let duplicate = OperationOutcome::from_id_result(users::create_user(db, demo_user()).await);
    writeln!(out, "   Result: {}", outcome_line(&duplicate))?;

    writeln!(out, "\n2. Attempting to enroll non-existent student...")?;
    let invalid = enrollments::enroll_student(db, "INVALID", "C001")
        .await
        .map(|enrollment| enrollment.enrollment_id);
    writeln!(out, "   Result: {}", outcome_line(&OperationOutcome::from_id_result(invalid)))?;

    writeln!(out, "\n3. Attempting to create course without required fields...")?;
    let incomplete = CourseCreate {
        course_id: Some("C888".to_string()),
        title: Some("Incomplete Course".to_string()),
        ..CourseCreate::default()
    };
    let missing = OperationOutcome::from_id_result(courses::create_course(db, incomplete).await);
    writeln!(out, "   Result: {}", outcome_line(&missing))?;

    writeln!(out, "\n{rule}\nDEMONSTRATION COMPLETED\n{rule}\n")?;

    writeln!(out, "Cleaning up demo data...")?;
    cleanup(db).await?;
    writeln!(out, "Cleanup completed")?;
    Ok(())
}

async fn cleanup(db: &Database) -> Result<(), mongodb::error::Error> {
    repositories::users::delete_by_user_id(db, DEMO_USER).await?;
    repositories::courses::delete_by_course_id(db, DEMO_COURSE).await?;
    let removed = repositories::enrollments::delete_for_user(db, DEMO_USER).await?;
    repositories::submissions::delete_for_user(db, DEMO_USER).await?;
    tracing::info!(enrollments = removed, "Demo records removed");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::population;
    use crate::test_support;

    #[tokio::test]
    async fn demo_runs_and_cleans_up() {
        let Some(ctx) = test_support::setup_test_context().await else { return };
        population::populate(ctx.db(), 8).await;

        let mut out = Vec::new();
        run_demo(ctx.db(), &mut out).await.expect("demo");
        let transcript = String::from_utf8(out).unwrap();

        assert!(transcript.contains(r#"Result: {"success":true,"id":"U999"}"#), "{transcript}");
        assert!(transcript.contains("Found: Demo User (student)"));
        assert!(transcript.contains(r#"Result: {"success":true,"id":"C999"}"#));
        assert!(transcript.contains(r#""kind":"duplicate_key""#));
        assert!(transcript.contains("Active student not found"));
        assert!(transcript.contains("Missing required field: instructorId"));
        assert!(transcript.contains("Python for Beginners (Status: active)"));

        let db = ctx.db();
        assert!(repositories::users::find_by_user_id(db, DEMO_USER).await.unwrap().is_none());
        let course = repositories::courses::find_by_course_id(db, DEMO_COURSE).await.unwrap();
        assert!(course.is_none());
        assert!(enrollments::get_student_enrollments(db, DEMO_USER).await.is_empty());

        ctx.teardown().await;
    }
}
