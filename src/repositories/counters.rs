use bson::{doc, Document};
use mongodb::options::{FindOneAndUpdateOptions, ReturnDocument, UpdateOptions};
use mongodb::Database;

use crate::db::COUNTERS;

pub(crate) const ENROLLMENT_SEQUENCE: &str = "enrollmentId";

/// Atomically increments the named sequence and returns the new value (first call yields 1).
pub(crate) async fn next_value(db: &Database, name: &str) -> Result<i64, mongodb::error::Error> {
    let options = FindOneAndUpdateOptions::builder()
        .upsert(true)
        .return_document(ReturnDocument::After)
        .build();

    let counter = db
        .collection::<Document>(COUNTERS)
        .find_one_and_update(doc! { "_id": name }, doc! { "$inc": { "seq": 1_i64 } }, options)
        .await?;

    Ok(counter.as_ref().and_then(sequence_of).unwrap_or(1))
}

/// Raises the sequence to at least `floor` without ever lowering it.
pub(crate) async fn ensure_at_least(
    db: &Database,
    name: &str,
    floor: i64,
) -> Result<(), mongodb::error::Error> {
    let options = UpdateOptions::builder().upsert(true).build();
    db.collection::<Document>(COUNTERS)
        .update_one(doc! { "_id": name }, doc! { "$max": { "seq": floor } }, options)
        .await?;
    Ok(())
}

fn sequence_of(counter: &Document) -> Option<i64> {
    counter
        .get_i64("seq")
        .ok()
        .or_else(|| counter.get_i32("seq").ok().map(i64::from))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sequence_reads_either_integer_width() {
        assert_eq!(sequence_of(&doc! { "_id": "x", "seq": 7_i64 }), Some(7));
        assert_eq!(sequence_of(&doc! { "_id": "x", "seq": 3_i32 }), Some(3));
        assert_eq!(sequence_of(&doc! { "_id": "x" }), None);
    }
}
