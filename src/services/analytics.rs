use bson::{doc, DateTime, Document};
use mongodb::Database;

use crate::core::time::days_ago;
use crate::db::types::EnrollmentStatus;
use crate::db::COURSES;
use crate::repositories;
use crate::schemas::analytics::{
    CategoryPopularity, CourseEnrollmentStats, EnrollmentTrend, StudentPerformance,
};
use crate::services::rows_or_empty;

const DAYS_PER_MONTH: i64 = 30;

pub(crate) async fn get_course_enrollment_stats(db: &Database) -> Vec<CourseEnrollmentStats> {
    let result = repositories::enrollments::aggregate(db, course_stats_pipeline()).await;
    let stats =
        rows_or_empty("get_course_enrollment_stats", "Error getting enrollment stats", result);
    tracing::info!(courses = stats.len(), "Retrieved enrollment stats");
    stats
}

pub(crate) async fn get_category_popularity(db: &Database) -> Vec<CategoryPopularity> {
    let result = repositories::enrollments::aggregate(db, category_popularity_pipeline()).await;
    let stats = rows_or_empty("get_category_popularity", "Error getting category stats", result);
    tracing::info!(categories = stats.len(), "Retrieved category popularity stats");
    stats
}

/// A student without submissions gets a zeroed record, as does a failed query.
pub(crate) async fn get_student_performance(db: &Database, user_id: &str) -> StudentPerformance {
    let pipeline = student_performance_pipeline(user_id);
    let result = repositories::submissions::aggregate(db, pipeline).await;
    let rows =
        rows_or_empty("get_student_performance", "Error getting student performance", result);

    match rows.into_iter().next() {
        Some(performance) => {
            tracing::info!(user_id, "Retrieved student performance");
            performance
        }
        None => StudentPerformance::empty(user_id),
    }
}

/// Monthly enrollment counts over the last `months` thirty-day periods, oldest first.
pub(crate) async fn get_enrollment_trends(db: &Database, months: u32) -> Vec<EnrollmentTrend> {
    let since = days_ago(i64::from(months) * DAYS_PER_MONTH);
    let result = repositories::enrollments::aggregate(db, enrollment_trends_pipeline(since)).await;
    rows_or_empty("get_enrollment_trends", "Error getting enrollment trends", result)
}

fn course_lookup(local_field: &str) -> Document {
    doc! {
        "$lookup": {
            "from": COURSES,
            "localField": local_field,
            "foreignField": "courseId",
            "as": "course",
        }
    }
}

fn count_with_status(status: EnrollmentStatus) -> Document {
    doc! { "$sum": { "$cond": [{ "$eq": ["$status", status.as_str()] }, 1, 0] } }
}

pub(crate) fn course_stats_pipeline() -> Vec<Document> {
    vec![
        doc! {
            "$group": {
                "_id": "$courseId",
                "totalEnrollments": { "$sum": 1 },
                "activeEnrollments": count_with_status(EnrollmentStatus::Active),
                "completedEnrollments": count_with_status(EnrollmentStatus::Completed),
            }
        },
        course_lookup("_id"),
        doc! { "$unwind": "$course" },
        doc! {
            "$project": {
                "_id": 0,
                "courseId": "$_id",
                "title": "$course.title",
                "category": "$course.category",
                "totalEnrollments": 1,
                "activeEnrollments": 1,
                "completedEnrollments": 1,
                "completionRate": {
                    "$cond": [
                        { "$eq": ["$totalEnrollments", 0] },
                        0.0,
                        {
                            "$multiply": [
                                { "$divide": ["$completedEnrollments", "$totalEnrollments"] },
                                100.0,
                            ]
                        },
                    ]
                },
            }
        },
        doc! { "$sort": { "totalEnrollments": -1, "courseId": 1 } },
    ]
}

pub(crate) fn category_popularity_pipeline() -> Vec<Document> {
    vec![
        course_lookup("courseId"),
        doc! { "$unwind": "$course" },
        doc! {
            "$group": {
                "_id": "$course.category",
                "totalEnrollments": { "$sum": 1 },
                "students": { "$addToSet": "$userId" },
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "category": "$_id",
                "totalEnrollments": 1,
                "uniqueStudents": { "$size": "$students" },
            }
        },
        doc! { "$sort": { "totalEnrollments": -1, "category": 1 } },
    ]
}

pub(crate) fn student_performance_pipeline(user_id: &str) -> Vec<Document> {
    vec![
        doc! { "$match": { "userId": user_id } },
        doc! {
            "$group": {
                "_id": "$userId",
                "totalSubmissions": { "$sum": 1 },
                "averageGrade": { "$avg": "$grade" },
                "highestGrade": { "$max": "$grade" },
                "lowestGrade": { "$min": "$grade" },
            }
        },
        doc! {
            "$project": {
                "_id": 0,
                "userId": "$_id",
                "totalSubmissions": 1,
                "averageGrade": 1,
                "highestGrade": 1,
                "lowestGrade": 1,
            }
        },
    ]
}

pub(crate) fn enrollment_trends_pipeline(since: DateTime) -> Vec<Document> {
    vec![
        doc! { "$match": { "enrolledAt": { "$gte": since } } },
        doc! {
            "$group": {
                "_id": {
                    "year": { "$year": "$enrolledAt" },
                    "month": { "$month": "$enrolledAt" },
                },
                "enrollments": { "$sum": 1 },
            }
        },
        doc! { "$sort": { "_id.year": 1, "_id.month": 1 } },
        doc! {
            "$project": {
                "_id": 0,
                "year": "$_id.year",
                "month": "$_id.month",
                "enrollments": 1,
            }
        },
    ]
}

#[cfg(test)]
mod tests;
