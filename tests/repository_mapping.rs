use chrono::{DateTime, TimeDelta, TimeZone, Utc};
use sqlx::PgPool;
use std::sync::Arc;
use tinylink::domain::entities::NewMapping;
use tinylink::domain::repositories::{
    LONG_URL_UNIQUE, MappingRepository, SHORT_TOKEN_UNIQUE, StatsRepository,
};
use tinylink::infrastructure::persistence::{PgMappingRepository, PgStatsRepository};

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 8, 0, 0).unwrap()
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_create_inserts_mapping_and_stats(pool: PgPool) {
    let pool = Arc::new(pool);
    let mappings = PgMappingRepository::new(pool.clone());
    let stats = PgStatsRepository::new(pool);

    let mapping = mappings
        .create(NewMapping::expiring("https://example.com", "abc123", now()))
        .await
        .unwrap();

    assert_eq!(mapping.short_token, "abc123");
    assert_eq!(mapping.expiration_time, Some(now() + TimeDelta::minutes(30)));

    let row = stats.find_by_mapping_id(mapping.id).await.unwrap().unwrap();
    assert_eq!(row.access_count, 0);
    assert_eq!(row.last_accessed, Some(now()));
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_find_by_long_url_and_token(pool: PgPool) {
    let repo = PgMappingRepository::new(Arc::new(pool));

    let created = repo
        .create(NewMapping::expiring("https://example.com", "abc123", now()))
        .await
        .unwrap();

    let by_url = repo.find_by_long_url("https://example.com").await.unwrap();
    let by_token = repo.find_by_token("abc123").await.unwrap();

    assert_eq!(by_url, Some(created.clone()));
    assert_eq!(by_token, Some(created));
    assert!(repo.find_by_token("ffffff").await.unwrap().is_none());
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_duplicates_are_conflicts(pool: PgPool) {
    let repo = PgMappingRepository::new(Arc::new(pool.clone()));

    repo.create(NewMapping::expiring("https://example.com", "abc123", now()))
        .await
        .unwrap();

    let err = repo
        .create(NewMapping::expiring("https://example.com", "def456", now()))
        .await
        .unwrap_err();
    assert!(err.is_conflict_on(LONG_URL_UNIQUE));

    let err = repo
        .create(NewMapping::expiring("https://other.example.com", "abc123", now()))
        .await
        .unwrap_err();
    assert!(err.is_conflict_on(SHORT_TOKEN_UNIQUE));

    // A failed pair leaves no orphan stats row.
    let stats_rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM url_stats")
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stats_rows, 1);
}

#[sqlx::test]
#[ignore = "requires a running PostgreSQL (DATABASE_URL)"]
async fn test_renew_updates_expiration(pool: PgPool) {
    let repo = PgMappingRepository::new(Arc::new(pool));

    let created = repo
        .create(NewMapping::expiring("https://example.com", "abc123", now()))
        .await
        .unwrap();

    let later = now() + TimeDelta::hours(3);
    let renewed = repo.renew(created.id, later).await.unwrap();

    assert_eq!(renewed.id, created.id);
    assert_eq!(renewed.short_token, "abc123");
    assert_eq!(renewed.expiration_time, Some(later));

    assert!(repo.renew(created.id + 1000, later).await.is_err());
}
