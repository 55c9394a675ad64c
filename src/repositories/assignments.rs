use mongodb::{Collection, Database};

use crate::db::models::Assignment;
use crate::db::ASSIGNMENTS;

fn collection(db: &Database) -> Collection<Assignment> {
    db.collection::<Assignment>(ASSIGNMENTS)
}

pub(crate) async fn insert_many(
    db: &Database,
    assignments: &[Assignment],
) -> Result<usize, mongodb::error::Error> {
    let result = collection(db).insert_many(assignments, None).await?;
    Ok(result.inserted_ids.len())
}
