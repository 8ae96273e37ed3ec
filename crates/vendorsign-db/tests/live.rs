//! Live integration tests for vendorsign-db using `#[sqlx::test]`.
//!
//! Each test gets a fresh, fully-migrated Postgres database spun up by the
//! sqlx test harness. The `migrations` path is relative to the crate root
//! (`crates/vendorsign-db/`), so `"../../migrations"` resolves to the workspace
//! migration directory.

use serde_json::json;
use vendorsign_core::{
    AgreementStatus, AgreementSubmission, AgreementType, DeliveryMethod, ValidatedSubmission,
};
use vendorsign_db::{
    agreement_stats, attach_document, create_agreement, get_agreement, list_agreements,
    list_events, mark_delivered, record_event, AgreementFilter, DbError, NewAgreement,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

const PIXEL: &str = "data:image/png;base64,iVBORw0KGgoAAAANSUhEUgAAAAEAAAABCAYAAAAfFcSJAAAADUlEQVR42mNk+M9QDwADhgGAWjR9awAAAABJRU5ErkJggg==";

fn submission(agreement_type: &str, vendor_name: &str, level: &str) -> ValidatedSubmission {
    AgreementSubmission {
        agreement_type: agreement_type.to_string(),
        vendor_name: vendor_name.to_string(),
        vendor_address: "Stone Town, Zanzibar".to_string(),
        vendor_email: format!("{}@vendors.example", vendor_name.to_lowercase().replace(' ', ".")),
        vendor_phone: "+255 777 123 456".to_string(),
        contact_person_name: "Amina Said".to_string(),
        partnership_level: level.to_string(),
        vendor_signature: PIXEL.to_string(),
        agreed_to_terms: true,
        ..AgreementSubmission::default()
    }
    .validate()
    .unwrap_or_else(|errors| panic!("test submission invalid: {errors:?}"))
}

async fn insert(
    pool: &sqlx::PgPool,
    agreement_type: &str,
    vendor_name: &str,
    level: &str,
) -> vendorsign_db::AgreementRow {
    let s = submission(agreement_type, vendor_name, level);
    create_agreement(
        pool,
        &NewAgreement {
            submission: &s,
            ip_address: Some("203.0.113.7"),
            user_agent: Some("test-agent"),
        },
    )
    .await
    .unwrap_or_else(|e| panic!("create_agreement failed for '{vendor_name}': {e}"))
}

// ---------------------------------------------------------------------------
// Section 1: Create / read
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn create_agreement_stores_signed_record(pool: sqlx::PgPool) {
    let row = insert(&pool, "tours", "Spice Island Tours", "growth").await;

    assert_eq!(row.status().unwrap(), AgreementStatus::Signed);
    assert_eq!(row.agreement_type().unwrap(), AgreementType::Tours);
    assert!(row.signed_at.is_some());
    assert!(row.effective_date.is_some(), "defaults to signing date");
    assert_eq!(row.vendor_signature.as_deref(), Some(PIXEL));
    assert_eq!(row.ip_address.as_deref(), Some("203.0.113.7"));
    assert!(!row.email_sent);
    assert!(row.document_url.is_none());

    let fetched = get_agreement(&pool, row.public_id)
        .await
        .expect("get_agreement failed")
        .expect("row exists");
    assert_eq!(fetched.id, row.id);
    assert_eq!(fetched.vendor_name, "Spice Island Tours");
}

#[sqlx::test(migrations = "../../migrations")]
async fn get_agreement_unknown_id_returns_none(pool: sqlx::PgPool) {
    let row = get_agreement(&pool, uuid::Uuid::new_v4())
        .await
        .expect("get_agreement failed");
    assert!(row.is_none());
}

#[sqlx::test(migrations = "../../migrations")]
async fn attach_document_sets_url_key_and_digest(pool: sqlx::PgPool) {
    let row = insert(&pool, "restaurant", "Mama Kitchen", "essential").await;

    attach_document(
        &pool,
        row.id,
        "http://localhost:3000/documents/agreements/a.html",
        "agreements/a.html",
        "abc123",
    )
    .await
    .expect("attach_document failed");

    let fetched = get_agreement(&pool, row.public_id).await.unwrap().unwrap();
    assert_eq!(
        fetched.document_url.as_deref(),
        Some("http://localhost:3000/documents/agreements/a.html")
    );
    assert_eq!(fetched.document_key.as_deref(), Some("agreements/a.html"));
    assert_eq!(fetched.document_sha256.as_deref(), Some("abc123"));
}

#[sqlx::test(migrations = "../../migrations")]
async fn attach_document_unknown_id_is_not_found(pool: sqlx::PgPool) {
    let err = attach_document(&pool, 999_999, "u", "k", "d")
        .await
        .expect_err("must fail");
    assert!(matches!(err, DbError::NotFound));
}

// ---------------------------------------------------------------------------
// Section 2: Delivery
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn mark_delivered_email_is_idempotent(pool: sqlx::PgPool) {
    let row = insert(&pool, "tours", "Dolphin Trips", "strategic").await;

    let first = mark_delivered(&pool, row.public_id, DeliveryMethod::Email)
        .await
        .expect("mark_delivered failed")
        .expect("row exists");
    assert!(first.email_sent);
    assert!(!first.whatsapp_sent);
    assert_eq!(first.status().unwrap(), AgreementStatus::Delivered);
    let first_at = first.email_sent_at.expect("timestamp set");

    let second = mark_delivered(&pool, row.public_id, DeliveryMethod::Email)
        .await
        .expect("mark_delivered failed")
        .expect("row exists");
    assert!(second.email_sent);
    assert_eq!(second.email_sent_at, Some(first_at), "first timestamp kept");
    assert_eq!(second.status().unwrap(), AgreementStatus::Delivered);
}

#[sqlx::test(migrations = "../../migrations")]
async fn mark_delivered_whatsapp_sets_its_own_flag(pool: sqlx::PgPool) {
    let row = insert(&pool, "restaurant", "Forodhani Grill", "partner").await;

    let updated = mark_delivered(&pool, row.public_id, DeliveryMethod::Whatsapp)
        .await
        .expect("mark_delivered failed")
        .expect("row exists");
    assert!(updated.whatsapp_sent);
    assert!(updated.whatsapp_sent_at.is_some());
    assert!(!updated.email_sent);
}

#[sqlx::test(migrations = "../../migrations")]
async fn mark_delivered_unknown_id_returns_none(pool: sqlx::PgPool) {
    let result = mark_delivered(&pool, uuid::Uuid::new_v4(), DeliveryMethod::Email)
        .await
        .expect("mark_delivered failed");
    assert!(result.is_none());
}

// ---------------------------------------------------------------------------
// Section 3: Listing
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn list_agreements_filters_by_status_type_and_search(pool: sqlx::PgPool) {
    let tours = insert(&pool, "tours", "Spice Island Tours", "growth").await;
    insert(&pool, "restaurant", "Mama Kitchen", "growth").await;
    insert(&pool, "restaurant", "Lukmaan Cafe", "partner").await;
    mark_delivered(&pool, tours.public_id, DeliveryMethod::Email)
        .await
        .unwrap();

    let all = list_agreements(&pool, &AgreementFilter::default())
        .await
        .expect("list failed");
    assert_eq!(all.len(), 3);
    assert_eq!(all[0].vendor_name, "Lukmaan Cafe", "newest first");

    let delivered = list_agreements(
        &pool,
        &AgreementFilter {
            status: Some(AgreementStatus::Delivered),
            ..AgreementFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(delivered.len(), 1);
    assert_eq!(delivered[0].public_id, tours.public_id);

    let restaurants = list_agreements(
        &pool,
        &AgreementFilter {
            agreement_type: Some(AgreementType::Restaurant),
            ..AgreementFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(restaurants.len(), 2);

    let search = list_agreements(
        &pool,
        &AgreementFilter {
            search: Some("KITCHEN".to_string()),
            ..AgreementFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].vendor_name, "Mama Kitchen");
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_agreements_search_treats_wildcards_literally(pool: sqlx::PgPool) {
    insert(&pool, "tours", "Spice Island Tours", "growth").await;

    let rows = list_agreements(
        &pool,
        &AgreementFilter {
            search: Some("%".to_string()),
            ..AgreementFilter::default()
        },
    )
    .await
    .unwrap();
    assert!(rows.is_empty());
}

#[sqlx::test(migrations = "../../migrations")]
async fn list_agreements_respects_limit(pool: sqlx::PgPool) {
    for i in 0..3 {
        insert(&pool, "tours", &format!("Vendor {i}"), "growth").await;
    }
    let rows = list_agreements(
        &pool,
        &AgreementFilter {
            limit: Some(2),
            ..AgreementFilter::default()
        },
    )
    .await
    .unwrap();
    assert_eq!(rows.len(), 2);
}

// ---------------------------------------------------------------------------
// Section 4: Events and statistics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../migrations")]
async fn events_are_listed_in_insertion_order(pool: sqlx::PgPool) {
    let row = insert(&pool, "tours", "Spice Island Tours", "growth").await;

    record_event(&pool, row.id, "created", &json!({"ip": "203.0.113.7"}))
        .await
        .expect("record_event failed");
    record_event(&pool, row.id, "email_sent", &json!({"provider": "log"}))
        .await
        .expect("record_event failed");

    let events = list_events(&pool, row.id).await.expect("list_events failed");
    let actions: Vec<_> = events.iter().map(|e| e.action.as_str()).collect();
    assert_eq!(actions, vec!["created", "email_sent"]);
    assert_eq!(events[1].details["provider"], "log");
}

#[sqlx::test(migrations = "../../migrations")]
async fn record_event_for_unknown_agreement_fails(pool: sqlx::PgPool) {
    let result = record_event(&pool, 424_242, "created", &json!({})).await;
    assert!(matches!(result, Err(DbError::Sqlx(_))));
}

#[sqlx::test(migrations = "../../migrations")]
async fn stats_count_by_status_type_and_level(pool: sqlx::PgPool) {
    let first = insert(&pool, "tours", "Spice Island Tours", "growth").await;
    insert(&pool, "restaurant", "Mama Kitchen", "growth").await;
    insert(&pool, "restaurant", "Lukmaan Cafe", "partner").await;
    mark_delivered(&pool, first.public_id, DeliveryMethod::Whatsapp)
        .await
        .unwrap();

    let stats = agreement_stats(&pool).await.expect("stats failed");
    assert_eq!(stats.total, 3);

    let count = |rows: &[vendorsign_db::CountRow], key: &str| {
        rows.iter()
            .find(|r| r.key == key)
            .map_or(0, |r| r.count)
    };
    assert_eq!(count(&stats.by_status, "signed"), 2);
    assert_eq!(count(&stats.by_status, "delivered"), 1);
    assert_eq!(count(&stats.by_type, "restaurant"), 2);
    assert_eq!(count(&stats.by_partnership, "growth"), 2);
    assert_eq!(count(&stats.by_partnership, "partner"), 1);
    assert_eq!(stats.recent.len(), 3);
    assert_eq!(stats.recent[0].vendor_name, "Lukmaan Cafe");
}

#[sqlx::test(migrations = "../../migrations")]
async fn stats_on_empty_table(pool: sqlx::PgPool) {
    let stats = agreement_stats(&pool).await.expect("stats failed");
    assert_eq!(stats.total, 0);
    assert!(stats.by_status.is_empty());
    assert!(stats.recent.is_empty());
}
