use serde::Serialize;

use crate::core::time::format_datetime;
use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollmentResponse {
    pub(crate) enrollment_id: String,
    pub(crate) user_id: String,
    pub(crate) course_id: String,
    pub(crate) enrolled_at: String,
    pub(crate) status: EnrollmentStatus,
    pub(crate) progress: f64,
}

impl EnrollmentResponse {
    pub(crate) fn from_db(enrollment: Enrollment) -> Self {
        Self {
            enrollment_id: enrollment.enrollment_id,
            user_id: enrollment.user_id,
            course_id: enrollment.course_id,
            enrolled_at: format_datetime(enrollment.enrolled_at),
            status: enrollment.status,
            progress: enrollment.progress,
        }
    }
}
