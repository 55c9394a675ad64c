use bson::{doc, Document};
use mongodb::{Collection, Database};
use serde::de::DeserializeOwned;

use crate::db::models::Enrollment;
use crate::db::types::EnrollmentStatus;
use crate::db::ENROLLMENTS;

fn collection(db: &Database) -> Collection<Enrollment> {
    db.collection::<Enrollment>(ENROLLMENTS)
}

pub(crate) async fn insert(
    db: &Database,
    enrollment: &Enrollment,
) -> Result<(), mongodb::error::Error> {
    collection(db).insert_one(enrollment, None).await?;
    Ok(())
}

pub(crate) async fn insert_many(
    db: &Database,
    enrollments: &[Enrollment],
) -> Result<usize, mongodb::error::Error> {
    let result = collection(db).insert_many(enrollments, None).await?;
    Ok(result.inserted_ids.len())
}

/// Any enrollment for the pair that has not been dropped.
pub(crate) async fn find_live(
    db: &Database,
    user_id: &str,
    course_id: &str,
) -> Result<Option<Enrollment>, mongodb::error::Error> {
    collection(db)
        .find_one(
            doc! {
                "userId": user_id,
                "courseId": course_id,
                "status": { "$ne": EnrollmentStatus::Dropped.as_str() },
            },
            None,
        )
        .await
}

#[cfg(test)]
pub(crate) async fn count_all(db: &Database) -> Result<u64, mongodb::error::Error> {
    collection(db).count_documents(doc! {}, None).await
}

/// Highest numeric suffix among `E<digits>` enrollment ids, or 0 for an empty store.
pub(crate) async fn max_sequence(db: &Database) -> Result<i64, mongodb::error::Error> {
    let rows: Vec<Document> = aggregate(db, max_sequence_pipeline()).await?;
    Ok(rows
        .first()
        .and_then(|row| row.get_i64("maxSequence").ok())
        .unwrap_or(0))
}

pub(crate) fn max_sequence_pipeline() -> Vec<Document> {
    vec![
        doc! { "$match": { "enrollmentId": { "$regex": "^E[0-9]{1,18}$" } } },
        doc! {
            "$project": {
                "sequence": {
                    "$toLong": {
                        "$substrCP": [
                            "$enrollmentId",
                            1,
                            { "$subtract": [{ "$strLenCP": "$enrollmentId" }, 1] },
                        ]
                    }
                }
            }
        },
        doc! { "$group": { "_id": null, "maxSequence": { "$max": "$sequence" } } },
    ]
}

pub(crate) async fn aggregate<T>(
    db: &Database,
    pipeline: Vec<Document>,
) -> Result<Vec<T>, mongodb::error::Error>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    super::aggregate(&db.collection::<Document>(ENROLLMENTS), pipeline).await
}

pub(crate) async fn delete_for_user(
    db: &Database,
    user_id: &str,
) -> Result<u64, mongodb::error::Error> {
    let result = collection(db).delete_many(doc! { "userId": user_id }, None).await?;
    Ok(result.deleted_count)
}
