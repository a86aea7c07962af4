use shopfeed_pipeline::classifier::BIG_AND_TALL;
use shopfeed_pipeline::model::{FlattenedRecord, TriggerEvent};
use shopfeed_pipeline::pipeline::{run_flatten, run_load};
use shopfeed_pipeline::storage::{LocalObjectStore, ObjectStore};
use shopfeed_pipeline::upsert::{surrogate_id, SqliteUpserter};

const FEED: &str = r#"{"id": 7001, "title": "Relaxed Chino 32\" Inseam", "body_html": "<p>Garment <strong>dyed</strong></p>", "images": [{"src": "https://cdn.example.com/chino.jpg"}], "product_type": "Pants", "vendor": "55012", "tags": ["Spring"], "handle": "relaxed-chino", "store": "https://www.chic-thread.com", "variants": [{"id": 1, "title": "Stone / 32", "option1": "Stone", "option2": "32", "option3": null, "price": "$68.00", "available": true}, {"id": 2, "title": "Stone / 44 Big", "option1": "Stone", "option2": "44 Big", "option3": null, "price": "$72.00", "available": true}]}
{"id": 7002, "title": "Wool Peacoat", "body_html": "", "images": [], "product_type": "", "vendor": "North Row", "tags": [], "handle": "wool-peacoat", "store": "https://northrow.com", "product_url": "https://northrow.com/products/wool-peacoat-navy", "variants": [{"id": 3, "title": "Navy / M", "option1": "Navy", "option2": "M", "price": "189.00", "available": false}]}
this line is not json
{"id": 7003, "title": "Gift Card", "variants": null}
"#;

#[tokio::test]
async fn flatten_then_load_into_sqlite() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path().join("bucket"));
    store.write("raw-shopify/2025-06-01/feed.json", FEED.as_bytes()).unwrap();

    let summary = run_flatten(&TriggerEvent::for_key("raw-shopify/2025-06-01/feed.json"), &store).unwrap();
    assert_eq!(summary.output_key, "cleaned-shopify/2025-06-01/feed.json");
    assert_eq!(summary.malformed_lines, 1);
    assert_eq!(summary.records, 3);

    let records: Vec<FlattenedRecord> =
        serde_json::from_str(&store.read("cleaned-shopify/2025-06-01/feed.json").unwrap()).unwrap();

    let chino = &records[0];
    assert_eq!(chino.vendor.as_deref(), Some("Chic Thread"));
    assert_eq!(chino.description.as_deref(), Some("Garment dyed"));
    assert_eq!(chino.color.as_deref(), Some("stone"));
    assert_eq!(chino.size.as_deref(), Some("32"));
    assert_eq!(chino.inseam, Some(32));
    assert_eq!(chino.primary_category.as_deref(), Some("Bottoms"));
    assert_eq!(chino.subcategory.as_deref(), Some("Pants"));
    assert_eq!(
        chino.product_url.as_deref(),
        Some("https://www.chic-thread.com/products/relaxed-chino")
    );

    let big = &records[1];
    assert_eq!(big.size, None);
    assert_eq!(big.length.as_deref(), Some(BIG_AND_TALL));

    let coat = &records[2];
    assert_eq!(coat.vendor.as_deref(), Some("North Row"));
    assert_eq!(coat.image_url, None);
    assert_eq!(coat.product_url.as_deref(), Some("https://northrow.com/products/wool-peacoat-navy"));
    assert_eq!(coat.primary_category.as_deref(), Some("Outerwear"));
    assert_eq!(coat.subcategory.as_deref(), Some("Coats"));
    assert_eq!(coat.available, Some(false));

    let db_path = dir.path().join("rows.db");
    let db = SqliteUpserter::new(db_path.to_str().unwrap()).unwrap();
    let event = TriggerEvent::for_key(&summary.output_key);

    let (response, loaded) = run_load(&event, &store, &db, "products").await;
    assert_eq!(response.status_code, 200);
    assert_eq!(loaded.inserted, 3);
    assert_eq!(db.row_count("products").unwrap(), 3);

    // loading the same artifact again merges on the surrogate id
    let (_, reloaded) = run_load(&event, &store, &db, "products").await;
    assert_eq!(reloaded.inserted, 3);
    assert_eq!(db.row_count("products").unwrap(), 3);

    let stored = db
        .get_row("products", &surrogate_id(Some("7002"), Some("3")))
        .unwrap()
        .unwrap();
    assert_eq!(stored.price, 189.0);
    assert!(!stored.available);
    assert_eq!(stored.size.as_deref(), Some("m"));
}

#[test]
fn missing_batch_is_fatal_and_writes_nothing() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path());
    assert!(run_flatten(&TriggerEvent::for_key("raw-shopify/missing.json"), &store).is_err());
    assert!(store.read("cleaned-shopify/missing.json").is_err());
}

#[test]
fn only_the_first_event_record_is_used() {
    let dir = tempfile::tempdir().unwrap();
    let store = LocalObjectStore::new(dir.path());
    store.write("raw-shopify/a.json", b"").unwrap();

    let event: TriggerEvent = serde_json::from_str(
        r#"{"Records": [
            {"s3": {"bucket": {"name": "feeds"}, "object": {"key": "raw-shopify/a.json"}}},
            {"s3": {"bucket": {"name": "feeds"}, "object": {"key": "raw-shopify/b.json"}}}
        ]}"#,
    )
    .unwrap();
    let summary = run_flatten(&event, &store).unwrap();
    assert_eq!(summary.records, 0);
    assert_eq!(store.read("cleaned-shopify/a.json").unwrap(), "[]");
    assert!(store.read("cleaned-shopify/b.json").is_err());
}
