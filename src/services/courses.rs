use bson::{doc, Document};
use mongodb::Database;
use serde_json::Value;
use validator::Validate;

use crate::core::time::now_utc;
use crate::db::models::Course;
use crate::db::types::{CourseLevel, UserRole};
use crate::repositories;
use crate::schemas::course::{CourseCreate, CourseSearch};
use crate::services::errors::WorkflowError;
use crate::services::{observed, require, rows_or_empty};

pub(crate) async fn create_course(
    db: &Database,
    data: CourseCreate,
) -> Result<String, WorkflowError> {
    observed("create_course", create_course_inner(db, data).await)
}

async fn create_course_inner(db: &Database, data: CourseCreate) -> Result<String, WorkflowError> {
    let course_id = require(data.course_id.clone(), "courseId")?;
    let title = require(data.title.clone(), "title")?;
    let instructor_id = require(data.instructor_id.clone(), "instructorId")?;
    let level = require(data.level.as_deref(), "level")?;
    let duration = require(data.duration.as_ref(), "duration")?;
    let price = require(data.price.as_ref(), "price")?;
    data.validate()?;

    let instructor = repositories::users::find_with_role(db, &instructor_id, UserRole::Instructor)
        .await
        .map_err(|err| WorkflowError::unexpected(err, "Error creating course"))?;
    if instructor.is_none() {
        return Err(WorkflowError::NotFound("Instructor not found".to_string()));
    }

    let level = level
        .parse::<CourseLevel>()
        .map_err(|err| WorkflowError::ValidationRejected(err.to_string()))?;
    let duration = coerce_duration(duration)?;
    let price = coerce_price(price)?;

    let now = now_utc();
    let course = Course {
        id: None,
        course_id,
        title,
        description: data.description,
        instructor_id,
        category: data.category,
        level,
        duration,
        price,
        tags: data.tags,
        created_at: now,
        updated_at: now,
        is_published: data.is_published.unwrap_or(false),
    };

    match repositories::courses::insert(db, &course).await {
        Ok(()) => {
            tracing::info!(course_id = %course.course_id, "Course created");
            Ok(course.course_id)
        }
        Err(err) => Err(WorkflowError::from_write(err, "Error creating course", || {
            WorkflowError::DuplicateKey(format!(
                "Course with courseId '{}' already exists",
                course.course_id
            ))
        })),
    }
}

pub(crate) async fn publish_course(db: &Database, course_id: &str) -> Result<(), WorkflowError> {
    let result = match repositories::courses::mark_published(db, course_id, now_utc()).await {
        Ok(update) if update.matched_count == 0 => {
            Err(WorkflowError::NotFound("Course not found".to_string()))
        }
        Ok(_) => {
            tracing::info!(course_id, "Course published");
            Ok(())
        }
        Err(err) => Err(WorkflowError::unexpected(err, "Error publishing course")),
    };
    observed("publish_course", result)
}

/// Empty on no match and on store failure.
pub(crate) async fn search_courses(db: &Database, search: &CourseSearch) -> Vec<Course> {
    let result = repositories::courses::find_matching(db, build_search_filter(search)).await;
    let courses = rows_or_empty("search_courses", "Error searching courses", result);
    tracing::info!(count = courses.len(), "Found courses matching criteria");
    courses
}

pub(crate) fn build_search_filter(search: &CourseSearch) -> Document {
    let mut filter = Document::new();
    if let Some(keyword) = search.title_keyword.as_deref().filter(|k| !k.trim().is_empty()) {
        filter.insert("$text", doc! { "$search": keyword });
    }
    if let Some(category) = search.category.as_deref().filter(|c| !c.is_empty()) {
        filter.insert("category", category);
    }
    if let Some(level) = search.level {
        filter.insert("level", level.as_str());
    }
    if search.published_only {
        filter.insert("isPublished", true);
    }
    filter
}

/// Hours as a whole number. Fractions are truncated and numeric strings are accepted.
fn coerce_duration(value: &Value) -> Result<i32, WorkflowError> {
    let hours = numeric(value, "duration")?.trunc();
    if hours < f64::from(i32::MIN) || hours > f64::from(i32::MAX) {
        return Err(WorkflowError::ValidationRejected(format!(
            "duration is out of range (got {value})"
        )));
    }
    Ok(hours as i32)
}

fn coerce_price(value: &Value) -> Result<f64, WorkflowError> {
    numeric(value, "price")
}

fn numeric(value: &Value, field: &str) -> Result<f64, WorkflowError> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|n| n.is_finite()).ok_or_else(|| {
        WorkflowError::ValidationRejected(format!("{field} must be a number (got {value})"))
    })
}
