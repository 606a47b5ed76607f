mod common;

use chrono::TimeDelta;
use tinylink::application::services::StatsReport;
use tinylink::error::AppError;

fn expect_page(report: StatsReport) -> tinylink::application::services::StatsPage {
    match report {
        StatsReport::Page(page) => page,
        StatsReport::Empty => panic!("expected a populated page"),
    }
}

#[tokio::test]
async fn test_empty_store_reports_no_data() {
    let state = common::create_test_state();

    let report = state.stats_service.paginate(1, 10).await.unwrap();

    assert_eq!(report, StatsReport::Empty);
}

#[tokio::test]
async fn test_empty_store_with_large_page_is_still_empty() {
    let state = common::create_test_state();

    let report = state.stats_service.paginate(7, 10).await.unwrap();

    assert_eq!(report, StatsReport::Empty);
}

#[tokio::test]
async fn test_twenty_five_records_in_pages_of_ten() {
    let state = common::create_test_state();
    common::seed_links(&state, 25).await;

    let first = expect_page(state.stats_service.paginate(1, 10).await.unwrap());
    assert_eq!(first.total_records, 25);
    assert_eq!(first.total_pages, 3);
    assert_eq!(first.current_page, 1);
    assert_eq!(first.records.len(), 10);

    let last = expect_page(state.stats_service.paginate(3, 10).await.unwrap());
    assert_eq!(last.records.len(), 5);

    let err = state.stats_service.paginate(4, 10).await.unwrap_err();
    assert!(matches!(
        err,
        AppError::PageOutOfRange {
            page: 4,
            total_pages: 3
        }
    ));
}

#[tokio::test]
async fn test_pages_cover_every_record_once() {
    let state = common::create_test_state();
    let mut tokens = common::seed_links(&state, 23).await;

    let mut seen = Vec::new();
    for page in 1..=5 {
        let page = expect_page(state.stats_service.paginate(page, 5).await.unwrap());
        seen.extend(page.records.into_iter().map(|r| r.short_token));
    }

    // Identical timestamps fall back to creation order.
    assert_eq!(seen, tokens);

    tokens.sort();
    seen.sort();
    seen.dedup();
    assert_eq!(seen, tokens);
}

#[tokio::test]
async fn test_most_recently_accessed_first() {
    let ctx = common::create_test_context();
    let tokens = common::seed_links(&ctx.state, 3).await;

    ctx.clock.advance(TimeDelta::minutes(1));
    ctx.state.link_service.resolve(&tokens[0]).await.unwrap();
    ctx.clock.advance(TimeDelta::minutes(1));
    ctx.state.link_service.resolve(&tokens[2]).await.unwrap();

    let page = expect_page(ctx.state.stats_service.paginate(1, 10).await.unwrap());
    let order: Vec<&str> = page.records.iter().map(|r| r.short_token.as_str()).collect();

    assert_eq!(
        order,
        [tokens[2].as_str(), tokens[0].as_str(), tokens[1].as_str()]
    );
    assert_eq!(page.records[0].access_count, 1);
    assert_eq!(page.records[2].access_count, 0);
}

#[tokio::test]
async fn test_last_accessed_rendered_in_clock_offset() {
    let ctx = common::create_test_context();
    let tokens = common::seed_links(&ctx.state, 1).await;

    ctx.clock.advance(TimeDelta::seconds(75));
    ctx.state.link_service.resolve(&tokens[0]).await.unwrap();

    let page = expect_page(ctx.state.stats_service.paginate(1, 10).await.unwrap());

    // 08:01:15 UTC at +05:30
    assert_eq!(
        page.records[0].last_accessed.as_deref(),
        Some("2024-06-01 13:31:15")
    );
}

#[tokio::test]
async fn test_invalid_parameters_rejected_before_counting() {
    let state = common::create_test_state();

    for (page, page_size) in [(0, 10), (1, 0), (-3, 10), (1, -1)] {
        let err = state.stats_service.paginate(page, page_size).await.unwrap_err();
        assert!(matches!(err, AppError::InvalidPagination { .. }));
    }
}
