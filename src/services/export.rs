use std::io::Write;
use std::path::Path;

use bson::{Bson, Document};
use futures::TryStreamExt;
use mongodb::Database;

use crate::core::time::format_datetime;
use crate::db::ALL_COLLECTIONS;

/// Writes every document of `collection` to a CSV file and returns the number of rows.
pub(crate) async fn export_collection(
    db: &Database,
    collection: &str,
    path: &Path,
) -> anyhow::Result<usize> {
    if !ALL_COLLECTIONS.contains(&collection) {
        anyhow::bail!(
            "unknown collection '{collection}' (expected one of {})",
            ALL_COLLECTIONS.join(", ")
        );
    }

    let documents: Vec<Document> =
        db.collection::<Document>(collection).find(None, None).await?.try_collect().await?;

    let file = std::fs::File::create(path)?;
    let rows = write_csv(file, &documents)?;
    tracing::info!(collection, rows, path = %path.display(), "Exported documents to CSV");
    Ok(rows)
}

pub(crate) fn write_csv<W: Write>(writer: W, documents: &[Document]) -> csv::Result<usize> {
    let header = header_of(documents);
    let mut csv = csv::Writer::from_writer(writer);
    if header.is_empty() {
        csv.flush()?;
        return Ok(0);
    }

    csv.write_record(&header)?;
    for document in documents {
        let record = header.iter().map(|key| document.get(key).map(cell).unwrap_or_default());
        csv.write_record(record)?;
    }
    csv.flush()?;
    Ok(documents.len())
}

/// Union of top-level keys in first-seen order.
fn header_of(documents: &[Document]) -> Vec<String> {
    let mut header: Vec<String> = Vec::new();
    for key in documents.iter().flat_map(Document::keys) {
        if !header.iter().any(|known| known == key) {
            header.push(key.clone());
        }
    }
    header
}

fn cell(value: &Bson) -> String {
    match value {
        Bson::String(text) => text.clone(),
        Bson::Null | Bson::Undefined => String::new(),
        Bson::Boolean(flag) => flag.to_string(),
        Bson::Int32(number) => number.to_string(),
        Bson::Int64(number) => number.to_string(),
        Bson::Double(number) => number.to_string(),
        Bson::ObjectId(id) => id.to_hex(),
        Bson::DateTime(at) => format_datetime(*at),
        other => other.clone().into_relaxed_extjson().to_string(),
    }
}
