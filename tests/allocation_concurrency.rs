mod common;

use std::collections::HashSet;
use std::sync::Arc;

use link_endings::application::services::ShortenItem;
use link_endings::domain::errors::AllocationError;
use link_endings::error::AppError;
use link_endings::infrastructure::geoip::NullGeoLocator;

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_allocations_never_share_an_ending() {
    let ctx = common::TestContext::new(Arc::new(NullGeoLocator::new()));
    ctx.ending_pool.refill(50).await.unwrap();

    let mut handles = Vec::new();
    for _ in 0..40 {
        let pool = ctx.ending_pool.clone();
        handles.push(tokio::spawn(async move { pool.allocate(1).await }));
    }

    let mut allocated = HashSet::new();
    for handle in handles {
        let endings = handle.await.unwrap().unwrap();
        assert_eq!(endings.len(), 1);
        assert!(allocated.insert(endings[0].clone()), "ending handed out twice");
    }

    let pending: HashSet<String> = ctx.store.pending_endings().into_iter().collect();
    assert!(allocated.is_disjoint(&pending));
    assert_eq!(pending.len(), 10);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_allocation_beyond_pool_generates_fresh_endings() {
    let ctx = common::TestContext::new(Arc::new(NullGeoLocator::new()));
    ctx.ending_pool.refill(5).await.unwrap();

    let endings = ctx.ending_pool.allocate(20).await.unwrap();

    assert_eq!(endings.len(), 20);
    assert_eq!(endings.iter().collect::<HashSet<_>>().len(), 20);
    for ending in &endings {
        assert!(ctx.ending_pool.generator().is_valid(ending), "{ending}");
    }
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_shortens_produce_distinct_links() {
    let ctx = common::TestContext::new(Arc::new(NullGeoLocator::new()));

    let mut handles = Vec::new();
    for i in 0..25 {
        let service = ctx.link_service.clone();
        handles.push(tokio::spawn(async move {
            service
                .shorten(ShortenItem::new(format!("https://example.com/{i}")))
                .await
        }));
    }

    let mut endings = HashSet::new();
    for handle in handles {
        let link = handle.await.unwrap().unwrap();
        assert!(endings.insert(link.ending));
    }
    assert_eq!(endings.len(), 25);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_racing_manual_endings_have_exactly_one_winner() {
    let ctx = common::TestContext::new(Arc::new(NullGeoLocator::new()));

    let first = ctx.link_service.clone();
    let second = ctx.link_service.clone();
    let (a, b) = tokio::join!(
        tokio::spawn(async move {
            first
                .shorten(ShortenItem::new("https://a.example.com").with_ending("abc"))
                .await
        }),
        tokio::spawn(async move {
            second
                .shorten(ShortenItem::new("https://b.example.com").with_ending("abc"))
                .await
        }),
    );
    let results = [a.unwrap(), b.unwrap()];

    let winners: Vec<_> = results.iter().filter_map(|r| r.as_ref().ok()).collect();
    assert_eq!(winners.len(), 1);
    assert_eq!(winners[0].ending, "ABC");

    let loser = results.iter().find_map(|r| r.as_ref().err()).unwrap();
    assert!(matches!(loser, AppError::Conflict { .. }));
    assert_eq!(loser.details()["ending"], "abc");
}

#[tokio::test]
async fn test_manual_ending_is_case_insensitive() {
    let ctx = common::create_test_context();

    ctx.link_service
        .shorten(ShortenItem::new("https://example.com").with_ending("Docs"))
        .await
        .unwrap();

    let err = ctx
        .ending_pool
        .reserve_manual("DOCS")
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        AllocationError::EndingAlreadyExists { ref ending } if ending == "DOCS"
    ));
}

#[tokio::test]
async fn test_manual_reservation_removes_ending_from_pool() {
    let ctx = common::create_test_context();
    ctx.ending_pool.refill(3).await.unwrap();
    let pooled = ctx.store.pending_endings()[0].clone();

    let reserved = ctx.ending_pool.reserve_manual(&pooled).await.unwrap();

    assert_eq!(reserved, pooled);
    assert!(!ctx.store.pending_endings().contains(&pooled));
    assert_eq!(ctx.ending_pool.pool_size().await.unwrap(), 2);
}

#[tokio::test]
async fn test_batch_with_repeated_manual_ending_is_rejected() {
    let ctx = common::create_test_context();

    let err = ctx
        .link_service
        .shorten_batch(vec![
            ShortenItem::new("https://a.example.com").with_ending("team"),
            ShortenItem::new("https://b.example.com").with_ending("TEAM"),
        ])
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation { .. }));
    assert_eq!(err.details()["ending"], "TEAM");
    assert_eq!(ctx.ending_pool.pool_size().await.unwrap(), 0);
}

#[tokio::test]
async fn test_stored_link_ending_leaves_the_pool() {
    let ctx = common::create_test_context();
    ctx.ending_pool.refill(1).await.unwrap();

    let link = ctx
        .link_service
        .shorten(ShortenItem::new("https://example.com"))
        .await
        .unwrap();

    assert!(!ctx.store.pending_endings().contains(&link.ending));
    let resolved = ctx.link_service.resolve(&link.ending).await.unwrap();
    assert_eq!(resolved.id, link.id);
}
