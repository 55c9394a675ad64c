use bson::{doc, DateTime, Document};
use futures::TryStreamExt;
use mongodb::results::UpdateResult;
use mongodb::{Collection, Database};

use crate::db::models::Course;
use crate::db::COURSES;

fn collection(db: &Database) -> Collection<Course> {
    db.collection::<Course>(COURSES)
}

pub(crate) async fn insert(db: &Database, course: &Course) -> Result<(), mongodb::error::Error> {
    collection(db).insert_one(course, None).await?;
    Ok(())
}

pub(crate) async fn insert_many(
    db: &Database,
    courses: &[Course],
) -> Result<usize, mongodb::error::Error> {
    let result = collection(db).insert_many(courses, None).await?;
    Ok(result.inserted_ids.len())
}

pub(crate) async fn find_by_course_id(
    db: &Database,
    course_id: &str,
) -> Result<Option<Course>, mongodb::error::Error> {
    collection(db).find_one(doc! { "courseId": course_id }, None).await
}

pub(crate) async fn find_published(
    db: &Database,
    course_id: &str,
) -> Result<Option<Course>, mongodb::error::Error> {
    collection(db).find_one(doc! { "courseId": course_id, "isPublished": true }, None).await
}

pub(crate) async fn find_matching(
    db: &Database,
    filter: Document,
) -> Result<Vec<Course>, mongodb::error::Error> {
    collection(db).find(filter, None).await?.try_collect().await
}

pub(crate) async fn mark_published(
    db: &Database,
    course_id: &str,
    updated_at: DateTime,
) -> Result<UpdateResult, mongodb::error::Error> {
    collection(db)
        .update_one(
            doc! { "courseId": course_id },
            doc! { "$set": { "isPublished": true, "updatedAt": updated_at } },
            None,
        )
        .await
}

pub(crate) async fn delete_by_course_id(
    db: &Database,
    course_id: &str,
) -> Result<u64, mongodb::error::Error> {
    let result = collection(db).delete_one(doc! { "courseId": course_id }, None).await?;
    Ok(result.deleted_count)
}
