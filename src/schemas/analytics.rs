use bson::serde_helpers::serialize_bson_datetime_as_rfc3339_string;
use bson::DateTime;
use serde::{Deserialize, Serialize};

use crate::db::types::{CourseLevel, EnrollmentStatus};

/// One enrollment of a student joined with its course.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentEnrollment {
    pub(crate) enrollment_id: String,
    pub(crate) course_id: String,
    #[serde(serialize_with = "serialize_bson_datetime_as_rfc3339_string")]
    pub(crate) enrolled_at: DateTime,
    pub(crate) status: EnrollmentStatus,
    pub(crate) progress: f64,
    pub(crate) course_title: String,
    #[serde(default)]
    pub(crate) course_category: Option<String>,
    pub(crate) course_level: CourseLevel,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseEnrollmentStats {
    pub(crate) course_id: String,
    pub(crate) title: String,
    #[serde(default)]
    pub(crate) category: Option<String>,
    pub(crate) total_enrollments: i64,
    pub(crate) active_enrollments: i64,
    pub(crate) completed_enrollments: i64,
    pub(crate) completion_rate: f64,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CategoryPopularity {
    #[serde(default)]
    pub(crate) category: Option<String>,
    pub(crate) total_enrollments: i64,
    pub(crate) unique_students: i64,
}

/// Submission aggregate for one student. Grades are `None` when nothing was graded.
#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct StudentPerformance {
    pub(crate) user_id: String,
    pub(crate) total_submissions: i64,
    #[serde(default)]
    pub(crate) average_grade: Option<f64>,
    #[serde(default)]
    pub(crate) highest_grade: Option<f64>,
    #[serde(default)]
    pub(crate) lowest_grade: Option<f64>,
}

impl StudentPerformance {
    pub(crate) fn empty(user_id: &str) -> Self {
        Self {
            user_id: user_id.to_string(),
            total_submissions: 0,
            average_grade: None,
            highest_grade: None,
            lowest_grade: None,
        }
    }
}

#[derive(Debug, Clone, Deserialize, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub(crate) struct EnrollmentTrend {
    pub(crate) year: i32,
    pub(crate) month: u32,
    pub(crate) enrollments: i64,
}

impl EnrollmentTrend {
    pub(crate) fn label(&self) -> String {
        format!("{}-{:02}", self.year, self.month)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bson::doc;

    #[test]
    fn stats_row_accepts_int32_counts() {
        let row: CourseEnrollmentStats = bson::from_document(doc! {
            "courseId": "C001",
            "title": "Python for Beginners",
            "category": "Programming",
            "totalEnrollments": 4_i32,
            "activeEnrollments": 3_i32,
            "completedEnrollments": 1_i32,
            "completionRate": 25.0,
        })
        .unwrap();
        assert_eq!(row.total_enrollments, 4);
        assert_eq!(row.completion_rate, 25.0);
    }

    #[test]
    fn performance_row_tolerates_null_grades() {
        let row: StudentPerformance = bson::from_document(doc! {
            "userId": "U003",
            "totalSubmissions": 2_i32,
            "averageGrade": bson::Bson::Null,
            "highestGrade": bson::Bson::Null,
            "lowestGrade": bson::Bson::Null,
        })
        .unwrap();
        assert_eq!(row.total_submissions, 2);
        assert!(row.average_grade.is_none());
    }

    #[test]
    fn trend_label_pads_month() {
        let trend = EnrollmentTrend { year: 2025, month: 3, enrollments: 7 };
        assert_eq!(trend.label(), "2025-03");
    }
}
