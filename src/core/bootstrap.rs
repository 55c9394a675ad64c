use std::collections::BTreeMap;

use bson::Document;
use mongodb::options::{CreateCollectionOptions, ValidationLevel};
use mongodb::{Database, IndexModel};

use crate::db::indexes::all_indexes;
use crate::db::schema::{coll_mod_command, validated_collections};
use crate::db::ALL_COLLECTIONS;
use crate::repositories::{counters, enrollments};

/// Applies validators and indexes, optionally dropping every collection first.
/// Safe to run repeatedly against an existing database.
pub(crate) async fn setup_database(db: &Database, reset: bool) -> anyhow::Result<()> {
    if reset {
        for name in ALL_COLLECTIONS {
            db.collection::<Document>(name).drop(None).await?;
        }
        tracing::info!("Dropped existing collections");
    }

    apply_validators(db).await?;
    create_indexes(db).await?;

    let floor = enrollments::max_sequence(db).await?;
    counters::ensure_at_least(db, counters::ENROLLMENT_SEQUENCE, floor).await?;

    tracing::info!(reset, "Database setup completed successfully");
    Ok(())
}

async fn apply_validators(db: &Database) -> anyhow::Result<()> {
    let existing = db.list_collection_names(None).await?;

    for (name, validator) in validated_collections() {
        if existing.iter().any(|collection| collection == name) {
            db.run_command(coll_mod_command(name, validator), None).await?;
            tracing::debug!(collection = name, "Updated collection validator");
        } else {
            let options = CreateCollectionOptions::builder()
                .validator(validator)
                .validation_level(ValidationLevel::Moderate)
                .build();
            db.create_collection(name, options).await?;
            tracing::debug!(collection = name, "Created collection with validator");
        }
    }

    Ok(())
}

async fn create_indexes(db: &Database) -> anyhow::Result<()> {
    let mut grouped: BTreeMap<&'static str, Vec<IndexModel>> = BTreeMap::new();
    for spec in all_indexes() {
        grouped.entry(spec.collection).or_default().push(spec.to_model());
    }

    for (name, models) in grouped {
        let count = models.len();
        db.collection::<Document>(name).create_indexes(models, None).await?;
        tracing::debug!(collection = name, count, "Indexes ensured");
    }

    Ok(())
}
