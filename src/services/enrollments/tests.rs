use serde_json::json;

use super::*;
use crate::core::bootstrap;
use crate::db::types::UserRole;
use crate::schemas::course::CourseCreate;
use crate::schemas::user::UserCreate;
use crate::services::errors::ErrorKind;
use crate::services::{courses, users};
use crate::test_support;

fn user(user_id: &str, email: &str, role: &str) -> UserCreate {
    serde_json::from_value(json!({
        "userId": user_id,
        "email": email,
        "firstName": "Test",
        "lastName": user_id,
        "role": role,
    }))
    .expect("user payload")
}

fn course(course_id: &str, instructor_id: &str) -> CourseCreate {
    serde_json::from_value(json!({
        "courseId": course_id,
        "title": "Rust Systems",
        "instructorId": instructor_id,
        "category": "Programming",
        "level": "advanced",
        "duration": 30,
        "price": 120,
    }))
    .expect("course payload")
}

fn stored_enrollment(
    enrollment_id: &str,
    user_id: &str,
    course_id: &str,
    status: EnrollmentStatus,
) -> Enrollment {
    Enrollment {
        id: None,
        enrollment_id: enrollment_id.to_string(),
        user_id: user_id.to_string(),
        course_id: course_id.to_string(),
        enrolled_at: now_utc(),
        status,
        progress: 0.0,
    }
}

#[test]
fn enrollment_ids_are_zero_padded() {
    assert_eq!(format_enrollment_id(1), "E001");
    assert_eq!(format_enrollment_id(42), "E042");
    assert_eq!(format_enrollment_id(1234), "E1234");
}

#[test]
fn student_pipeline_joins_courses_and_sorts_newest_first() {
    let pipeline = student_enrollments_pipeline("U003");
    assert_eq!(pipeline[0], doc! { "$match": { "userId": "U003" } });
    let lookup = pipeline[1].get_document("$lookup").expect("lookup stage");
    assert_eq!(lookup.get_str("from").unwrap(), "courses");
    assert_eq!(pipeline[2], doc! { "$unwind": "$course" });
    assert_eq!(pipeline.last(), Some(&doc! { "$sort": { "enrolledAt": -1 } }));
}

#[tokio::test]
async fn publish_then_enroll_scenario() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.db();

    assert_eq!(users::create_user(db, user("U100", "a@x.com", "student")).await, Ok("U100".into()));
    let err = courses::create_course(db, course("C100", "U100")).await.unwrap_err();
    assert_eq!(err, WorkflowError::NotFound("Instructor not found".to_string()));

    users::create_user(db, user("U101", "b@x.com", "instructor")).await.expect("instructor");
    courses::create_course(db, course("C100", "U101")).await.expect("course");

    let err = enroll_student(db, "U100", "C100").await.unwrap_err();
    assert_eq!(err, WorkflowError::NotFound("Published course not found".to_string()));

    courses::publish_course(db, "C100").await.expect("publish");
    let enrollment = enroll_student(db, "U100", "C100").await.expect("enroll");
    assert_eq!(enrollment.status, EnrollmentStatus::Active);
    assert_eq!(enrollment.progress, 0.0);
    assert_eq!(enrollment.enrollment_id, "E001");

    let again = enroll_student(db, "U100", "C100").await.unwrap_err();
    assert_eq!(again.kind(), ErrorKind::Conflict);
    assert!(again.to_string().contains("already enrolled"));

    let listed = get_student_enrollments(db, "U100").await;
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].course_title, "Rust Systems");
    assert_eq!(listed[0].course_category.as_deref(), Some("Programming"));

    ctx.teardown().await;
}

#[tokio::test]
async fn deactivated_student_cannot_enroll() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.db();
    test_support::insert_user(db, "U200", UserRole::Student).await;
    test_support::insert_user(db, "U201", UserRole::Instructor).await;
    test_support::insert_course(db, "C200", "U201", "Programming", true).await;

    let missing = users::deactivate_user(db, "U404").await.unwrap_err();
    assert_eq!(missing.kind(), ErrorKind::NotFound);

    users::deactivate_user(db, "U200").await.expect("deactivate");
    let err = enroll_student(db, "U200", "C200").await.unwrap_err();
    assert_eq!(err, WorkflowError::NotFound("Active student not found".to_string()));

    let instructor = enroll_student(db, "U201", "C200").await.unwrap_err();
    assert_eq!(instructor.to_string(), "Active student not found");

    ctx.teardown().await;
}

#[tokio::test]
async fn concurrent_enrollments_yield_one_live_record() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.db();
    test_support::insert_user(db, "U300", UserRole::Student).await;
    test_support::insert_user(db, "U301", UserRole::Instructor).await;
    test_support::insert_course(db, "C300", "U301", "Programming", true).await;

    let (first, second) = tokio::join!(
        enroll_student(db, "U300", "C300"),
        enroll_student(db, "U300", "C300"),
    );
    let successes = [&first, &second].iter().filter(|result| result.is_ok()).count();
    assert_eq!(successes, 1, "first: {first:?}, second: {second:?}");
    let failure = if first.is_err() { first } else { second };
    assert_eq!(failure.unwrap_err().kind(), ErrorKind::Conflict);

    assert_eq!(repositories::enrollments::count_all(db).await.expect("count"), 1);

    ctx.teardown().await;
}

#[tokio::test]
async fn enrollment_sequence_is_monotonic() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.db();
    test_support::insert_user(db, "U401", UserRole::Instructor).await;
    test_support::insert_course(db, "C400", "U401", "Data", true).await;
    for user_id in ["U400", "U402", "U403"] {
        test_support::insert_user(db, user_id, UserRole::Student).await;
    }

    let mut ids = Vec::new();
    for user_id in ["U400", "U402", "U403"] {
        ids.push(enroll_student(db, user_id, "C400").await.expect("enroll").enrollment_id);
    }
    assert_eq!(ids, vec!["E001", "E002", "E003"]);

    ctx.teardown().await;
}

#[tokio::test]
async fn only_dropped_enrollments_allow_reenrolling() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.db();
    test_support::insert_user(db, "U500", UserRole::Student).await;
    test_support::insert_user(db, "U501", UserRole::Instructor).await;
    test_support::insert_course(db, "C500", "U501", "Programming", true).await;

    let dropped = stored_enrollment("E050", "U500", "C500", EnrollmentStatus::Dropped);
    repositories::enrollments::insert(db, &dropped).await.expect("insert dropped");

    let renewed = enroll_student(db, "U500", "C500").await.expect("re-enroll after drop");
    assert_eq!(renewed.status, EnrollmentStatus::Active);

    let completed_pair = stored_enrollment("E900", "U500", "C500", EnrollmentStatus::Completed);
    let clash = repositories::enrollments::insert(db, &completed_pair).await.unwrap_err();
    assert!(clash.to_string().contains(ENROLLMENT_PAIR_INDEX), "{clash}");

    test_support::insert_user(db, "U502", UserRole::Student).await;
    let completed = stored_enrollment("E901", "U502", "C500", EnrollmentStatus::Completed);
    repositories::enrollments::insert(db, &completed).await.expect("insert completed");
    let err = enroll_student(db, "U502", "C500").await.unwrap_err();
    assert_eq!(err, WorkflowError::Conflict("Student already enrolled".to_string()));

    ctx.teardown().await;
}

#[tokio::test]
async fn setup_seeds_sequence_past_highest_stored_id() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.db();
    test_support::insert_user(db, "U600", UserRole::Student).await;
    test_support::insert_user(db, "U601", UserRole::Instructor).await;
    test_support::insert_course(db, "C600", "U601", "Data", true).await;

    // E002..E010 with a gap, as left behind by a deleted enrollment
    for (seq, course_id) in [(2, "C601"), (5, "C602"), (10, "C603")] {
        let enrollment = stored_enrollment(
            &format_enrollment_id(seq),
            "U600",
            course_id,
            EnrollmentStatus::Completed,
        );
        repositories::enrollments::insert(db, &enrollment).await.expect("insert legacy");
    }
    bootstrap::setup_database(db, false).await.expect("re-run setup");

    let enrollment = enroll_student(db, "U600", "C600").await.expect("enroll");
    assert_eq!(enrollment.enrollment_id, "E011");

    ctx.teardown().await;
}
