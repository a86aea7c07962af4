//! Stage handlers. Each invocation handles exactly one input key taken from
//! the first record of its trigger event.

use crate::flattener::flatten;
use crate::model::{FlattenedRecord, InvocationResponse, PipelineError, StoreError, TriggerEvent};
use crate::parser::{FeedParser, Parser};
use crate::storage::ObjectStore;
use crate::upsert::{prepare_row, Upserter};
use crate::utils::output_key;
use tracing::{error, info, warn};

/// Counts from one flatten invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlattenSummary {
    pub input_key: String,
    pub output_key: String,
    pub documents: usize,
    pub malformed_lines: usize,
    pub records: usize,
}

impl FlattenSummary {
    pub fn response(&self) -> InvocationResponse {
        InvocationResponse::new(200, format!("Flattened JSON written to {}", self.output_key))
    }
}

/// Stage one: raw NDJSON batch in, pretty-printed array of flattened records out.
///
/// A missing input object is fatal and nothing is written. Malformed lines,
/// documents without a variant list and unparseable prices only shrink or
/// thin out the output.
pub fn run_flatten(
    event: &TriggerEvent,
    store: &dyn ObjectStore,
) -> Result<FlattenSummary, PipelineError> {
    let key = event.first_key()?;
    info!("Flatten triggered for key: {}", key);

    let raw = store.read(key).inspect_err(|e| {
        if matches!(e, StoreError::NotFound(_)) {
            error!("❌ No such key in bucket: {}", key);
        }
    })?;

    let batch = FeedParser::new().parse(&raw);
    let records = flatten(&batch.documents);

    let out_key = output_key(key);
    let body = serde_json::to_vec_pretty(&records)?;
    store.write(&out_key, &body)?;
    info!("✅ Uploaded {} flattened records to: {}", records.len(), out_key);

    Ok(FlattenSummary {
        input_key: key.to_string(),
        output_key: out_key,
        documents: batch.documents.len(),
        malformed_lines: batch.malformed,
        records: records.len(),
    })
}

/// Counts from one load invocation.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LoadSummary {
    pub total: usize,
    pub inserted: usize,
    pub skipped: usize,
    pub failed: usize,
}

/// Stage two: upserts every row of a flattened artifact.
///
/// Rows are independent: a rejected row is logged and counted, never retried,
/// and never undoes rows already written. Always answers with a response;
/// errors map to 404 (missing key), 400 (artifact not a record array) or 500.
pub async fn run_load(
    event: &TriggerEvent,
    store: &dyn ObjectStore,
    upserter: &dyn Upserter,
    table: &str,
) -> (InvocationResponse, LoadSummary) {
    let key = match event.first_key() {
        Ok(key) => key,
        Err(e) => {
            error!("❌ {}", e);
            return (InvocationResponse::new(400, e.to_string()), LoadSummary::default());
        }
    };
    info!("✅ Load triggered for key: {}", key);

    let records = match read_records(store, key) {
        Ok(records) => records,
        Err(PipelineError::Store(StoreError::NotFound(_))) => {
            error!("❌ File not found in bucket: {}", key);
            return (
                InvocationResponse::new(404, format!("File not found: {}", key)),
                LoadSummary::default(),
            );
        }
        Err(PipelineError::Json(e)) => {
            error!("❌ JSON decode error: {}", e);
            return (
                InvocationResponse::new(400, format!("JSON decode error in file: {}", key)),
                LoadSummary::default(),
            );
        }
        Err(e) => {
            error!("❌ Unexpected error: {}", e);
            return (
                InvocationResponse::new(500, format!("Error processing file: {}", key)),
                LoadSummary::default(),
            );
        }
    };
    info!("📦 Retrieved {} rows from {}", records.len(), key);

    let mut summary = LoadSummary {
        total: records.len(),
        ..Default::default()
    };
    for record in &records {
        let row = match prepare_row(record) {
            Ok(row) => row,
            Err(e) => {
                warn!("Failed to prepare row: {}", e);
                summary.skipped += 1;
                continue;
            }
        };
        match upserter.upsert(table, &row).await {
            Ok(()) => summary.inserted += 1,
            Err(e) => {
                warn!("Upsert of {} failed: {}", row.id, e);
                summary.failed += 1;
            }
        }
    }

    info!(
        "✅ Upserted {} rows into {} ({} skipped, {} failed)",
        summary.inserted, table, summary.skipped, summary.failed
    );
    let body = format!(
        "Successfully processed {} rows from {} ({} skipped, {} failed)",
        summary.inserted, key, summary.skipped, summary.failed
    );
    (InvocationResponse::new(200, body), summary)
}

fn read_records(
    store: &dyn ObjectStore,
    key: &str,
) -> Result<Vec<FlattenedRecord>, PipelineError> {
    let content = store.read(key)?;
    Ok(serde_json::from_str(content.trim())?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::UpsertError;
    use crate::upsert::ProductRow;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct MemoryStore {
        objects: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryStore {
        fn with(key: &str, body: &str) -> Self {
            let store = Self::default();
            store.write(key, body.as_bytes()).unwrap();
            store
        }

        fn get(&self, key: &str) -> Option<String> {
            self.objects
                .lock()
                .unwrap()
                .get(key)
                .map(|b| String::from_utf8(b.clone()).unwrap())
        }
    }

    impl ObjectStore for MemoryStore {
        fn read(&self, key: &str) -> Result<String, StoreError> {
            self.get(key).ok_or_else(|| StoreError::NotFound(key.to_string()))
        }

        fn write(&self, key: &str, bytes: &[u8]) -> Result<(), StoreError> {
            self.objects.lock().unwrap().insert(key.to_string(), bytes.to_vec());
            Ok(())
        }
    }

    /// Records rows and rejects any variant listed in `reject`.
    #[derive(Default)]
    struct RecordingUpserter {
        rows: Mutex<Vec<ProductRow>>,
        reject: Vec<String>,
    }

    #[async_trait::async_trait]
    impl Upserter for RecordingUpserter {
        async fn upsert(&self, _table: &str, row: &ProductRow) -> Result<(), UpsertError> {
            if row.variant_id.as_ref().is_some_and(|v| self.reject.contains(v)) {
                return Err(UpsertError::Rejected {
                    status: 409,
                    body: "conflict".into(),
                });
            }
            self.rows.lock().unwrap().push(row.clone());
            Ok(())
        }
    }

    const BATCH: &str = concat!(
        r#"{"id": 1, "title": "Wool Peacoat", "vendor": "Acme", "variants": [{"id": 10, "title": "M", "option1": "M", "price": "$120"}, {"id": 11, "title": "L", "option1": "L", "price": "n/a"}]}"#,
        "\n",
        "garbage line\n",
        r#"{"id": 2, "title": "Tee", "variants": "broken"}"#,
        "\n",
    );

    #[test]
    fn flatten_writes_output_under_cleaned_prefix() {
        let store = MemoryStore::with("raw-shopify/batch.json", BATCH);
        let summary = run_flatten(&TriggerEvent::for_key("raw-shopify/batch.json"), &store).unwrap();

        assert_eq!(summary.output_key, "cleaned-shopify/batch.json");
        assert_eq!(summary.documents, 2);
        assert_eq!(summary.malformed_lines, 1);
        assert_eq!(summary.records, 2);
        assert_eq!(summary.response().status_code, 200);

        let written: Vec<FlattenedRecord> =
            serde_json::from_str(&store.get("cleaned-shopify/batch.json").unwrap()).unwrap();
        assert_eq!(written.len(), 2);
        assert_eq!(written[0].primary_category.as_deref(), Some("Outerwear"));
        assert_eq!(written[1].price, None);
    }

    #[test]
    fn flatten_of_missing_key_writes_nothing() {
        let store = MemoryStore::default();
        let result = run_flatten(&TriggerEvent::for_key("raw-shopify/none.json"), &store);
        assert!(matches!(result, Err(PipelineError::Store(StoreError::NotFound(_)))));
        assert!(store.objects.lock().unwrap().is_empty());
    }

    #[test]
    fn empty_event_is_an_error() {
        let store = MemoryStore::default();
        let event = TriggerEvent { records: vec![] };
        assert!(matches!(run_flatten(&event, &store), Err(PipelineError::EmptyEvent)));
    }

    #[tokio::test]
    async fn load_counts_inserted_skipped_and_failed_rows() {
        let store = MemoryStore::with("raw-shopify/batch.json", BATCH);
        run_flatten(&TriggerEvent::for_key("raw-shopify/batch.json"), &store).unwrap();

        let upserter = RecordingUpserter::default();
        let (response, summary) = run_load(
            &TriggerEvent::for_key("cleaned-shopify/batch.json"),
            &store,
            &upserter,
            "products",
        )
        .await;

        assert_eq!(response.status_code, 200);
        assert_eq!(summary, LoadSummary { total: 2, inserted: 1, skipped: 1, failed: 0 });
        assert_eq!(upserter.rows.lock().unwrap()[0].variant_id.as_deref(), Some("10"));
    }

    #[tokio::test]
    async fn rejected_row_does_not_stop_the_batch() {
        let artifact = r#"[
            {"product_id": 1, "variant_id": 10, "price": 5.0},
            {"product_id": 1, "variant_id": 11, "price": 6.0},
            {"product_id": 1, "variant_id": 12, "price": 7.0}
        ]"#;
        let store = MemoryStore::with("cleaned-shopify/x.json", artifact);
        let upserter = RecordingUpserter {
            reject: vec!["11".into()],
            ..Default::default()
        };
        let (response, summary) =
            run_load(&TriggerEvent::for_key("cleaned-shopify/x.json"), &store, &upserter, "products").await;

        assert!(response.is_success());
        assert_eq!(summary.inserted, 2);
        assert_eq!(summary.failed, 1);
        assert_eq!(upserter.rows.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn load_maps_errors_to_status_codes() {
        let store = MemoryStore::with("cleaned-shopify/bad.json", "{ not json");
        let upserter = RecordingUpserter::default();

        let (missing, _) =
            run_load(&TriggerEvent::for_key("cleaned-shopify/none.json"), &store, &upserter, "products").await;
        assert_eq!(missing.status_code, 404);
        assert_eq!(missing.body, "File not found: cleaned-shopify/none.json");

        let (bad, _) =
            run_load(&TriggerEvent::for_key("cleaned-shopify/bad.json"), &store, &upserter, "products").await;
        assert_eq!(bad.status_code, 400);
    }
}
