use super::*;
use crate::core::time::now_utc;
use crate::db::models::{AssignmentSubmission, Enrollment};
use crate::db::types::UserRole;
use crate::test_support;

fn enrollment(id: &str, user_id: &str, course_id: &str, status: EnrollmentStatus) -> Enrollment {
    Enrollment {
        id: None,
        enrollment_id: id.to_string(),
        user_id: user_id.to_string(),
        course_id: course_id.to_string(),
        enrolled_at: now_utc(),
        status,
        progress: if status == EnrollmentStatus::Completed { 100.0 } else { 40.0 },
    }
}

fn submission(id: &str, user_id: &str, grade: Option<f64>) -> AssignmentSubmission {
    AssignmentSubmission {
        id: None,
        submission_id: id.to_string(),
        assignment_id: "A001".to_string(),
        user_id: user_id.to_string(),
        submitted_at: now_utc(),
        grade,
        feedback: None,
    }
}

#[test]
fn course_stats_guard_division_by_zero() {
    let pipeline = course_stats_pipeline();
    let project = pipeline[3].get_document("$project").expect("project stage");
    let rate = project.get_document("completionRate").expect("completion rate");
    let branches = rate.get_array("$cond").expect("cond");
    assert_eq!(branches[1], bson::Bson::Double(0.0));
    assert_eq!(pipeline[0].get_document("$group").unwrap().get_str("_id").unwrap(), "$courseId");
}

#[test]
fn category_pipeline_counts_distinct_students() {
    let pipeline = category_popularity_pipeline();
    let group = pipeline[2].get_document("$group").expect("group stage");
    assert_eq!(group.get_document("students").unwrap(), &doc! { "$addToSet": "$userId" });
    let project = pipeline[3].get_document("$project").expect("project stage");
    assert_eq!(project.get_document("uniqueStudents").unwrap(), &doc! { "$size": "$students" });
}

#[test]
fn trends_pipeline_filters_by_start_date() {
    let since = DateTime::from_millis(1_700_000_000_000);
    let pipeline = enrollment_trends_pipeline(since);
    assert_eq!(pipeline[0], doc! { "$match": { "enrolledAt": { "$gte": since } } });
    assert_eq!(pipeline[2], doc! { "$sort": { "_id.year": 1, "_id.month": 1 } });
}

#[tokio::test]
async fn course_stats_and_category_popularity_hold_their_bounds() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.db();
    test_support::insert_user(db, "U001", UserRole::Instructor).await;
    test_support::insert_course(db, "C001", "U001", "Programming", true).await;
    test_support::insert_course(db, "C002", "U001", "Programming", true).await;
    test_support::insert_course(db, "C003", "U001", "Data", true).await;

    let rows = [
        enrollment("E001", "U003", "C001", EnrollmentStatus::Completed),
        enrollment("E002", "U004", "C001", EnrollmentStatus::Active),
        enrollment("E003", "U005", "C001", EnrollmentStatus::Dropped),
        enrollment("E004", "U006", "C001", EnrollmentStatus::Completed),
        enrollment("E005", "U003", "C002", EnrollmentStatus::Active),
        enrollment("E006", "U007", "C003", EnrollmentStatus::Active),
        // course removed since: drops out of the joins
        enrollment("E007", "U008", "C999", EnrollmentStatus::Active),
    ];
    repositories::enrollments::insert_many(db, &rows).await.expect("enrollments");

    let stats = get_course_enrollment_stats(db).await;
    assert_eq!(stats.len(), 3);
    assert_eq!(stats[0].course_id, "C001");
    assert_eq!(stats[0].total_enrollments, 4);
    assert_eq!(stats[0].active_enrollments, 1);
    assert_eq!(stats[0].completed_enrollments, 2);
    assert_eq!(stats[0].completion_rate, 50.0);
    for row in &stats {
        assert!((0.0..=100.0).contains(&row.completion_rate), "{row:?}");
        assert!(row.total_enrollments > 0);
    }
    let data = stats.iter().find(|row| row.course_id == "C003").expect("C003 stats");
    assert_eq!(data.completion_rate, 0.0);

    let categories = get_category_popularity(db).await;
    assert_eq!(categories.len(), 2);
    assert_eq!(categories[0].category.as_deref(), Some("Programming"));
    assert_eq!(categories[0].total_enrollments, 5);
    assert_eq!(categories[0].unique_students, 4);
    for row in &categories {
        assert!(row.unique_students <= row.total_enrollments, "{row:?}");
    }

    let trends = get_enrollment_trends(db, 12).await;
    assert_eq!(trends.iter().map(|t| t.enrollments).sum::<i64>(), 7);

    ctx.teardown().await;
}

#[tokio::test]
async fn student_performance_aggregates_grades() {
    let Some(ctx) = test_support::setup_test_context().await else { return };
    let db = ctx.db();

    let rows = [
        submission("S001", "U003", Some(80.0)),
        submission("S002", "U003", Some(90.0)),
        submission("S003", "U003", None),
        submission("S004", "U004", Some(70.0)),
    ];
    repositories::submissions::insert_many(db, &rows).await.expect("submissions");

    let performance = get_student_performance(db, "U003").await;
    assert_eq!(performance.user_id, "U003");
    assert_eq!(performance.total_submissions, 3);
    assert_eq!(performance.average_grade, Some(85.0));
    assert_eq!(performance.highest_grade, Some(90.0));
    assert_eq!(performance.lowest_grade, Some(80.0));

    assert_eq!(get_student_performance(db, "U404").await, StudentPerformance::empty("U404"));

    ctx.teardown().await;
}
