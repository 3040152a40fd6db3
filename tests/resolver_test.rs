use chrono::{Duration, TimeZone, Utc};
use mockito::{Matcher, Server};

use block_finder::error::FinderError;
use block_finder::explorer::ExplorerClient;
use block_finder::resolver::{estimate_from, BlockResolver};

fn exact_lookup_matcher(timestamp: u64) -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("module".into(), "block".into()),
        Matcher::UrlEncoded("action".into(), "getblocknobytime".into()),
        Matcher::UrlEncoded("timestamp".into(), timestamp.to_string()),
        Matcher::UrlEncoded("closest".into(), "before".into()),
        Matcher::UrlEncoded("apikey".into(), "testkey".into()),
    ])
}

fn tip_matcher() -> Matcher {
    Matcher::AllOf(vec![
        Matcher::UrlEncoded("module".into(), "proxy".into()),
        Matcher::UrlEncoded("action".into(), "eth_blockNumber".into()),
    ])
}

#[tokio::test]
async fn test_past_timestamp_uses_exact_lookup_only() {
    let mut server = Server::new_async().await;
    let target = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();

    let exact = server
        .mock("GET", "/api")
        .match_query(exact_lookup_matcher(target.timestamp() as u64))
        .with_body(r#"{"status":"1","message":"OK","result":"16308189"}"#)
        .expect(1)
        .create_async()
        .await;
    let tip = server
        .mock("GET", "/api")
        .match_query(tip_matcher())
        .with_body(r#"{"result":"0x112a880"}"#)
        .expect(0)
        .create_async()
        .await;

    let resolver = BlockResolver::new(ExplorerClient::new(server.url(), "testkey"), 15);
    let resolution = resolver.resolve(target).await.expect("resolve");

    exact.assert_async().await;
    tip.assert_async().await;
    assert_eq!(resolution.block_number, 16308189);
    assert!(!resolution.is_estimate);
}

#[tokio::test]
async fn test_future_timestamp_estimates_from_tip() {
    let mut server = Server::new_async().await;
    let target = Utc::now() + Duration::seconds(300);

    let exact = server
        .mock("GET", "/api")
        .match_query(Matcher::UrlEncoded(
            "action".into(),
            "getblocknobytime".into(),
        ))
        .with_body(r#"{"status":"1","message":"OK","result":"0"}"#)
        .expect(0)
        .create_async()
        .await;
    let tip = server
        .mock("GET", "/api")
        .match_query(tip_matcher())
        .with_body(r#"{"result":"0x112a880"}"#)
        .expect(1)
        .create_async()
        .await;

    let resolver = BlockResolver::new(ExplorerClient::new(server.url(), "testkey"), 15);
    let resolution = resolver.resolve(target).await.expect("resolve");

    exact.assert_async().await;
    tip.assert_async().await;
    assert!(resolution.is_estimate);
    assert_eq!(resolution.block_number, 18_000_000 + 20);
}

#[tokio::test]
async fn test_upstream_not_ok_carries_message() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api")
        .match_query(Matcher::Any)
        .with_body(r#"{"status":"0","message":"NOTOK","result":"Max rate limit reached"}"#)
        .create_async()
        .await;

    let resolver = BlockResolver::new(ExplorerClient::new(server.url(), "testkey"), 15);
    let target = Utc.with_ymd_and_hms(2023, 1, 1, 0, 0, 0).unwrap();
    let err = resolver.resolve(target).await.expect_err("should fail");

    match err {
        FinderError::Upstream(message) => assert_eq!(message, "NOTOK"),
        other => panic!("expected upstream failure, got {:?}", other),
    }
}

#[tokio::test]
async fn test_malformed_tip_hex_is_parse_failure() {
    let mut server = Server::new_async().await;
    server
        .mock("GET", "/api")
        .match_query(Matcher::Any)
        .with_body(r#"{"result":"0xzzz"}"#)
        .create_async()
        .await;

    let resolver = BlockResolver::new(ExplorerClient::new(server.url(), "testkey"), 15);
    let target = Utc::now() + Duration::seconds(60);
    let err = resolver.resolve(target).await.expect_err("should fail");

    assert!(matches!(err, FinderError::Parse(_)));
}

#[test]
fn test_estimate_matches_fixed_interval() {
    // 150 seconds ahead at one block per 15 seconds is ten blocks.
    assert_eq!(estimate_from(18_000_000, 1_000, 1_150, 15), 18_000_010);
}

#[test]
fn test_estimate_rounds_to_nearest_block() {
    assert_eq!(estimate_from(100, 0, 7, 15), 100);
    assert_eq!(estimate_from(100, 0, 8, 15), 101);
    assert_eq!(estimate_from(100, 0, 15, 15), 101);
    assert_eq!(estimate_from(100, 0, 23, 15), 102);
}

#[test]
fn test_estimate_is_monotonic_in_target() {
    let mut previous = 0;
    for delta in 0..600 {
        let estimated = estimate_from(18_000_000, 0, delta, 15);
        assert!(estimated >= previous, "estimate decreased at delta {}", delta);
        previous = estimated;
    }
}

#[test]
fn test_estimate_honors_configured_block_time() {
    assert_eq!(estimate_from(18_000_000, 0, 120, 12), 18_000_010);
}
