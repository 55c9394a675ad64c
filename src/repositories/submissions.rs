use bson::{doc, Document};
use mongodb::{Collection, Database};
use serde::de::DeserializeOwned;

use crate::db::models::AssignmentSubmission;
use crate::db::SUBMISSIONS;

fn collection(db: &Database) -> Collection<AssignmentSubmission> {
    db.collection::<AssignmentSubmission>(SUBMISSIONS)
}

pub(crate) async fn insert_many(
    db: &Database,
    submissions: &[AssignmentSubmission],
) -> Result<usize, mongodb::error::Error> {
    let result = collection(db).insert_many(submissions, None).await?;
    Ok(result.inserted_ids.len())
}

pub(crate) async fn aggregate<T>(
    db: &Database,
    pipeline: Vec<Document>,
) -> Result<Vec<T>, mongodb::error::Error>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    super::aggregate(&db.collection::<Document>(SUBMISSIONS), pipeline).await
}

pub(crate) async fn delete_for_user(
    db: &Database,
    user_id: &str,
) -> Result<u64, mongodb::error::Error> {
    let result = collection(db).delete_many(doc! { "userId": user_id }, None).await?;
    Ok(result.deleted_count)
}
