pub(crate) mod assignments;
pub(crate) mod counters;
pub(crate) mod courses;
pub(crate) mod enrollments;
pub(crate) mod submissions;
pub(crate) mod users;

use bson::Document;
use futures::TryStreamExt;
use mongodb::Collection;
use serde::de::DeserializeOwned;

/// Runs an aggregation pipeline and deserializes every output document into `T`.
pub(crate) async fn aggregate<T>(
    collection: &Collection<Document>,
    pipeline: Vec<Document>,
) -> Result<Vec<T>, mongodb::error::Error>
where
    T: DeserializeOwned + Unpin + Send + Sync,
{
    collection.aggregate(pipeline, None).await?.with_type::<T>().try_collect().await
}
