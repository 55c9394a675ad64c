use bson::{doc, Document};
use mongodb::Database;

use crate::core::time::now_utc;
use crate::db::indexes::ENROLLMENT_PAIR_INDEX;
use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;
use crate::db::COURSES;
use crate::repositories::{self, counters};
use crate::schemas::analytics::StudentEnrollment;
use crate::services::errors::WorkflowError;
use crate::services::{observed, rows_or_empty};

const ALREADY_ENROLLED: &str = "Student already enrolled";

pub(crate) fn format_enrollment_id(sequence: i64) -> String {
    format!("E{sequence:03}")
}

/// Enrolls an active student in a published course.
///
/// Guards run in order and stop at the first failure: active student, published course,
/// no live enrollment for the pair. A concurrent enrollment that slips past the read-side
/// guard is rejected by the partial unique index and reported the same way.
pub(crate) async fn enroll_student(
    db: &Database,
    user_id: &str,
    course_id: &str,
) -> Result<Enrollment, WorkflowError> {
    observed("enroll_student", enroll_student_inner(db, user_id, course_id).await)
}

async fn enroll_student_inner(
    db: &Database,
    user_id: &str,
    course_id: &str,
) -> Result<Enrollment, WorkflowError> {
    let context = "Error enrolling student";
    let unexpected = |err: mongodb::error::Error| WorkflowError::unexpected(err, context);

    let student =
        repositories::users::find_active_student(db, user_id).await.map_err(unexpected)?;
    if student.is_none() {
        return Err(WorkflowError::NotFound("Active student not found".to_string()));
    }

    let course = repositories::courses::find_published(db, course_id).await.map_err(unexpected)?;
    if course.is_none() {
        return Err(WorkflowError::NotFound("Published course not found".to_string()));
    }

    let existing =
        repositories::enrollments::find_live(db, user_id, course_id).await.map_err(unexpected)?;
    if existing.is_some() {
        return Err(WorkflowError::Conflict(ALREADY_ENROLLED.to_string()));
    }

    let sequence = counters::next_value(db, counters::ENROLLMENT_SEQUENCE)
        .await
        .map_err(unexpected)?;

    let enrollment = Enrollment {
        id: None,
        enrollment_id: format_enrollment_id(sequence),
        user_id: user_id.to_string(),
        course_id: course_id.to_string(),
        enrolled_at: now_utc(),
        status: EnrollmentStatus::Active,
        progress: 0.0,
    };

    if let Err(err) = repositories::enrollments::insert(db, &enrollment).await {
        let pair_clash = err.to_string().contains(ENROLLMENT_PAIR_INDEX);
        return Err(WorkflowError::from_write(err, context, || {
            if pair_clash {
                WorkflowError::Conflict(ALREADY_ENROLLED.to_string())
            } else {
                WorkflowError::DuplicateKey(format!(
                    "Enrollment '{}' already exists",
                    enrollment.enrollment_id
                ))
            }
        }));
    }

    tracing::info!(
        user_id,
        course_id,
        enrollment_id = %enrollment.enrollment_id,
        "Student enrolled"
    );
    Ok(enrollment)
}

/// Enrollments of a student joined with their course, newest first. Enrollments whose
/// course no longer exists are left out. Empty on store failure.
pub(crate) async fn get_student_enrollments(
    db: &Database,
    user_id: &str,
) -> Vec<StudentEnrollment> {
    let result = repositories::enrollments::aggregate::<StudentEnrollment>(
        db,
        student_enrollments_pipeline(user_id),
    )
    .await;
    let rows = rows_or_empty("get_student_enrollments", "Error getting enrollments", result);
    tracing::info!(user_id, count = rows.len(), "Retrieved enrollments");
    rows
}

pub(crate) fn student_enrollments_pipeline(user_id: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "userId": user_id } },
        doc! {
            "$lookup": {
                "from": COURSES,
                "localField": "courseId",
                "foreignField": "courseId",
                "as": "course",
            }
        },
        doc! { "$unwind": "$course" },
        doc! {
            "$project": {
                "_id": 0,
                "enrollmentId": 1,
                "courseId": 1,
                "enrolledAt": 1,
                "status": 1,
                "progress": 1,
                "courseTitle": "$course.title",
                "courseCategory": "$course.category",
                "courseLevel": "$course.level",
            }
        },
        doc! { "$sort": { "enrolledAt": -1 } },
    ]
}

#[cfg(test)]
mod tests;
