use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

use crate::core::time::format_datetime;
use crate::db::models::Course;
use crate::db::types::CourseLevel;

#[derive(Debug, Clone, Default, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseCreate {
    #[validate(length(min = 1, message = "courseId must not be empty"))]
    pub(crate) course_id: Option<String>,
    #[validate(length(min = 1, message = "title must not be empty"))]
    pub(crate) title: Option<String>,
    #[serde(default)]
    pub(crate) description: Option<String>,
    pub(crate) instructor_id: Option<String>,
    #[serde(default)]
    pub(crate) category: Option<String>,
    pub(crate) level: Option<String>,
    /// Hours; any JSON number or numeric string, truncated to an integer.
    pub(crate) duration: Option<Value>,
    pub(crate) price: Option<Value>,
    #[serde(default)]
    pub(crate) tags: Vec<String>,
    #[serde(default)]
    pub(crate) is_published: Option<bool>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseSearch {
    #[serde(default)]
    pub(crate) title_keyword: Option<String>,
    #[serde(default)]
    pub(crate) category: Option<String>,
    #[serde(default)]
    pub(crate) level: Option<CourseLevel>,
    #[serde(default = "default_published_only")]
    pub(crate) published_only: bool,
}

impl Default for CourseSearch {
    fn default() -> Self {
        Self { title_keyword: None, category: None, level: None, published_only: true }
    }
}

impl CourseSearch {
    pub(crate) fn published() -> Self {
        Self::default()
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub(crate) struct CourseResponse {
    pub(crate) course_id: String,
    pub(crate) title: String,
    pub(crate) description: Option<String>,
    pub(crate) instructor_id: String,
    pub(crate) category: Option<String>,
    pub(crate) level: CourseLevel,
    pub(crate) duration: i32,
    pub(crate) price: f64,
    pub(crate) tags: Vec<String>,
    pub(crate) is_published: bool,
    pub(crate) created_at: String,
    pub(crate) updated_at: String,
}

impl CourseResponse {
    pub(crate) fn from_db(course: Course) -> Self {
        Self {
            course_id: course.course_id,
            title: course.title,
            description: course.description,
            instructor_id: course.instructor_id,
            category: course.category,
            level: course.level,
            duration: course.duration,
            price: course.price,
            tags: course.tags,
            is_published: course.is_published,
            created_at: format_datetime(course.created_at),
            updated_at: format_datetime(course.updated_at),
        }
    }
}

fn default_published_only() -> bool {
    true
}
