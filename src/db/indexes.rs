use bson::{doc, Document};
use mongodb::options::IndexOptions;
use mongodb::IndexModel;

use crate::db::types::EnrollmentStatus;
use crate::db::{ASSIGNMENTS, COURSES, ENROLLMENTS, LESSONS, SUBMISSIONS, USERS};

/// Name of the partial unique index that keeps one live enrollment per (user, course).
/// Keyed course-first so it does not collide with the plain (userId, courseId) lookup index.
/// Partial filters with `$in` need MongoDB 6.0 or newer.
pub(crate) const ENROLLMENT_PAIR_INDEX: &str = "uniq_live_enrollment_per_user_course";

#[derive(Debug, Clone)]
pub(crate) struct IndexSpec {
    pub(crate) collection: &'static str,
    pub(crate) keys: Document,
    pub(crate) unique: bool,
    pub(crate) name: Option<&'static str>,
    pub(crate) partial_filter: Option<Document>,
}

impl IndexSpec {
    fn plain(collection: &'static str, keys: Document) -> Self {
        Self { collection, keys, unique: false, name: None, partial_filter: None }
    }

    fn unique(collection: &'static str, keys: Document) -> Self {
        Self { collection, keys, unique: true, name: None, partial_filter: None }
    }

    pub(crate) fn to_model(&self) -> IndexModel {
        let options = IndexOptions::builder()
            .unique(self.unique.then_some(true))
            .name(self.name.map(str::to_string))
            .partial_filter_expression(self.partial_filter.clone())
            .build();

        IndexModel::builder().keys(self.keys.clone()).options(options).build()
    }
}

pub(crate) fn live_enrollment_filter() -> Document {
    doc! {
        "status": {
            "$in": [EnrollmentStatus::Active.as_str(), EnrollmentStatus::Completed.as_str()]
        }
    }
}

pub(crate) fn all_indexes() -> Vec<IndexSpec> {
    vec![
        IndexSpec::unique(USERS, doc! { "userId": 1 }),
        IndexSpec::unique(USERS, doc! { "email": 1 }),
        IndexSpec::plain(USERS, doc! { "role": 1 }),
        IndexSpec::unique(COURSES, doc! { "courseId": 1 }),
        IndexSpec::plain(COURSES, doc! { "category": 1 }),
        IndexSpec::plain(COURSES, doc! { "level": 1 }),
        IndexSpec::plain(COURSES, doc! { "instructorId": 1 }),
        IndexSpec::plain(COURSES, doc! { "category": 1, "level": 1 }),
        IndexSpec::plain(COURSES, doc! { "title": "text", "description": "text" }),
        IndexSpec::unique(ENROLLMENTS, doc! { "enrollmentId": 1 }),
        IndexSpec::plain(ENROLLMENTS, doc! { "userId": 1, "courseId": 1 }),
        IndexSpec {
            collection: ENROLLMENTS,
            keys: doc! { "courseId": 1, "userId": 1 },
            unique: true,
            name: Some(ENROLLMENT_PAIR_INDEX),
            partial_filter: Some(live_enrollment_filter()),
        },
        IndexSpec::plain(ENROLLMENTS, doc! { "enrolledAt": -1 }),
        IndexSpec::plain(ENROLLMENTS, doc! { "status": 1 }),
        IndexSpec::unique(ASSIGNMENTS, doc! { "assignmentId": 1 }),
        IndexSpec::plain(ASSIGNMENTS, doc! { "courseId": 1 }),
        IndexSpec::plain(ASSIGNMENTS, doc! { "dueDate": 1 }),
        IndexSpec::unique(SUBMISSIONS, doc! { "submissionId": 1 }),
        IndexSpec::plain(SUBMISSIONS, doc! { "assignmentId": 1, "userId": 1 }),
        IndexSpec::plain(SUBMISSIONS, doc! { "userId": 1 }),
        IndexSpec::unique(LESSONS, doc! { "lessonId": 1 }),
        IndexSpec::plain(LESSONS, doc! { "courseId": 1 }),
    ]
}
