use std::fmt::Write as _;

use mongodb::Database;

use crate::db::types::EnrollmentStatus;
use crate::repositories;
use crate::schemas::analytics::{StudentEnrollment, StudentPerformance};
use crate::services::analytics;
use crate::services::enrollments::get_student_enrollments;

const RULE_WIDTH: usize = 60;
const BAR_WIDTH: usize = 40;

pub(crate) async fn performance_report(db: &Database, user_id: &str) -> String {
    let student = match repositories::users::find_by_user_id(db, user_id).await {
        Ok(user) => user.map(|user| format!("{} {}", user.first_name, user.last_name)),
        Err(err) => {
            tracing::error!(error = %err, user_id, "Error loading student for report");
            None
        }
    };
    let enrollments = get_student_enrollments(db, user_id).await;
    let performance = analytics::get_student_performance(db, user_id).await;
    render_performance_report(user_id, student.as_deref(), &enrollments, &performance)
}

pub(crate) async fn enrollment_trend_chart(db: &Database, months: u32) -> String {
    let trends = analytics::get_enrollment_trends(db, months).await;
    if trends.is_empty() {
        tracing::warn!("No enrollment data available for charting");
    }
    let bars: Vec<(String, i64)> =
        trends.iter().map(|trend| (trend.label(), trend.enrollments)).collect();
    render_bar_chart("Monthly Enrollment Trends", &bars)
}

pub(crate) async fn category_distribution_chart(db: &Database) -> String {
    let stats = analytics::get_category_popularity(db).await;
    if stats.is_empty() {
        tracing::warn!("No category data available for charting");
    }
    let bars: Vec<(String, i64)> = stats
        .iter()
        .map(|row| {
            let label = row.category.clone().unwrap_or_else(|| "Uncategorized".to_string());
            (label, row.total_enrollments)
        })
        .collect();
    render_bar_chart("Course Category Distribution", &bars)
}

pub(crate) fn render_performance_report(
    user_id: &str,
    student: Option<&str>,
    enrollments: &[StudentEnrollment],
    performance: &StudentPerformance,
) -> String {
    let rule = "=".repeat(RULE_WIDTH);
    let count = |status: EnrollmentStatus| {
        enrollments.iter().filter(|enrollment| enrollment.status == status).count()
    };

    let mut report = String::new();
    let _ = writeln!(report, "{rule}");
    let _ = writeln!(report, "STUDENT PERFORMANCE REPORT");
    let _ = writeln!(report, "{rule}");
    let _ = writeln!(report, "Student ID: {user_id}");
    if let Some(name) = student {
        let _ = writeln!(report, "Name: {name}");
    }
    let _ = writeln!(report);
    let _ = writeln!(report, "ENROLLMENTS:");
    let _ = writeln!(report, "- Total Courses: {}", enrollments.len());
    let _ = writeln!(report, "- Active: {}", count(EnrollmentStatus::Active));
    let _ = writeln!(report, "- Completed: {}", count(EnrollmentStatus::Completed));
    let _ = writeln!(report);
    let _ = writeln!(report, "ACADEMIC PERFORMANCE:");
    let _ = writeln!(report, "- Total Submissions: {}", performance.total_submissions);
    let _ = writeln!(report, "- Average Grade: {:.2}%", performance.average_grade.unwrap_or(0.0));
    let _ = writeln!(report, "- Highest Grade: {:.2}%", performance.highest_grade.unwrap_or(0.0));
    let _ = writeln!(report, "- Lowest Grade: {:.2}%", performance.lowest_grade.unwrap_or(0.0));
    let _ = writeln!(report);
    let _ = writeln!(report, "ENROLLED COURSES:");

    for enrollment in enrollments {
        let category = enrollment.course_category.as_deref().unwrap_or("Uncategorized");
        let _ = writeln!(report, "- {} ({category})", enrollment.course_title);
        let _ = writeln!(
            report,
            "  Level: {}, Progress: {:.1}%",
            enrollment.course_level, enrollment.progress
        );
    }

    report
}

/// Horizontal bars scaled so the largest value spans the full bar width.
pub(crate) fn render_bar_chart(title: &str, bars: &[(String, i64)]) -> String {
    let mut chart = String::new();
    let _ = writeln!(chart, "{title}");
    let _ = writeln!(chart, "{}", "-".repeat(title.chars().count()));

    if bars.is_empty() {
        let _ = writeln!(chart, "(no data)");
        return chart;
    }

    let label_width = bars.iter().map(|(label, _)| label.chars().count()).max().unwrap_or(0);
    let max = bars.iter().map(|(_, value)| *value).max().unwrap_or(0).max(1);

    for (label, value) in bars {
        let scaled = usize::try_from((*value).max(0)).unwrap_or(0) * BAR_WIDTH;
        let filled = scaled / usize::try_from(max).unwrap_or(1);
        let _ = writeln!(chart, "{label:<label_width$} | {} {value}", "#".repeat(filled));
    }

    chart
}

#[cfg(test)]
mod tests {
    use bson::DateTime;

    use super::*;
    use crate::db::types::CourseLevel;

    fn enrollment(title: &str, status: EnrollmentStatus, progress: f64) -> StudentEnrollment {
        StudentEnrollment {
            enrollment_id: "E001".to_string(),
            course_id: "C001".to_string(),
            enrolled_at: DateTime::from_millis(0),
            status,
            progress,
            course_title: title.to_string(),
            course_category: Some("Programming".to_string()),
            course_level: CourseLevel::Beginner,
        }
    }

    #[test]
    fn report_counts_statuses_and_formats_grades() {
        let enrollments = vec![
            enrollment("Python for Beginners", EnrollmentStatus::Active, 25.0),
            enrollment("Advanced Python", EnrollmentStatus::Completed, 100.0),
        ];
        let performance = StudentPerformance {
            user_id: "U003".to_string(),
            total_submissions: 2,
            average_grade: Some(87.5),
            highest_grade: Some(95.0),
            lowest_grade: Some(80.0),
        };

        let name = Some("Student3 LastName3");
        let report = render_performance_report("U003", name, &enrollments, &performance);
        assert!(report.contains("Student ID: U003\nName: Student3 LastName3\n"));
        assert!(report.contains("- Total Courses: 2"));
        assert!(report.contains("- Active: 1"));
        assert!(report.contains("- Completed: 1"));
        assert!(report.contains("- Average Grade: 87.50%"));
        assert!(report.contains("- Python for Beginners (Programming)"));
        assert!(report.contains("Level: beginner, Progress: 25.0%"));
    }

    #[test]
    fn report_renders_missing_grades_as_zero() {
        let report =
            render_performance_report("U404", None, &[], &StudentPerformance::empty("U404"));
        assert!(report.contains("- Total Submissions: 0"));
        assert!(report.contains("- Highest Grade: 0.00%"));
        assert!(report.contains("- Total Courses: 0"));
        assert!(!report.contains("Name:"));
    }

    #[test]
    fn bar_chart_scales_to_largest_value() {
        let bars = vec![("Programming".to_string(), 10), ("AI/ML".to_string(), 5)];
        let chart = render_bar_chart("Course Category Distribution", &bars);
        let lines: Vec<&str> = chart.lines().collect();
        assert_eq!(lines[0], "Course Category Distribution");
        assert_eq!(lines[2], format!("Programming | {} 10", "#".repeat(BAR_WIDTH)));
        assert_eq!(lines[3], format!("AI/ML       | {} 5", "#".repeat(BAR_WIDTH / 2)));
    }

    #[test]
    fn empty_chart_says_so() {
        let chart = render_bar_chart("Monthly Enrollment Trends", &[]);
        assert!(chart.ends_with("(no data)\n"));
    }
}
