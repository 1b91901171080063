//! Integration tests for `YoutubeClient` and its `VideoSource` impl using
//! wiremock HTTP mocks.

use serde_json::json;
use tubelens_core::{FetchOptions, VideoTarget};
use tubelens_youtube::{VideoSource, YoutubeClient, YoutubeError};
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

const CHANNEL_ID: &str = "UC_x5XG1OV2P6uZZ5FSM9Ttw";

fn test_client(base_url: &str) -> YoutubeClient {
    YoutubeClient::with_base_url("test-key", 5, base_url)
        .expect("client construction should not fail")
}

fn options(max_results: usize, min_views: u64) -> FetchOptions {
    FetchOptions {
        max_results,
        published_after: None,
        min_views,
    }
}

fn video_json(id: &str, views: u64, published_at: &str) -> serde_json::Value {
    json!({
        "kind": "youtube#video",
        "id": id,
        "snippet": {
            "publishedAt": published_at,
            "title": format!("Video {id}"),
            "description": "desc",
            "channelTitle": "Test Channel",
            "tags": ["rust"]
        },
        "statistics": {
            "viewCount": views.to_string(),
            "likeCount": "10",
            "commentCount": "2"
        },
        "contentDetails": { "duration": "PT3M" }
    })
}

fn search_json(ids: &[&str], next: Option<&str>) -> serde_json::Value {
    let items: Vec<_> = ids
        .iter()
        .map(|id| json!({ "id": { "kind": "youtube#video", "videoId": id } }))
        .collect();
    let mut body = json!({ "items": items });
    if let Some(token) = next {
        body["nextPageToken"] = json!(token);
    }
    body
}

#[tokio::test]
async fn search_fetch_hydrates_ids_and_applies_min_views() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("q", "rust tutorial"))
        .and(query_param("type", "video"))
        .and(query_param("key", "test-key"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_json(&["aaaaaaaaaaa", "bbbbbbbbbbb"], None)),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "aaaaaaaaaaa,bbbbbbbbbbb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                video_json("aaaaaaaaaaa", 5_000, "2024-05-01T09:00:00Z"),
                video_json("bbbbbbbbbbb", 10, "2024-05-02T14:00:00Z")
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .fetch(&VideoTarget::Search("rust tutorial".to_string()), &options(50, 1_000))
        .await
        .expect("fetch should succeed");

    assert_eq!(records.len(), 1);
    assert_eq!(records[0].id, "aaaaaaaaaaa");
    assert_eq!(records[0].view_count, 5_000);
    assert_eq!(records[0].duration_secs, Some(180));
}

#[tokio::test]
async fn search_fetch_follows_page_tokens_until_max_results() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("pageToken", "PAGE2"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(search_json(&["ccccccccccc"], Some("PAGE3"))),
        )
        .mount(&server)
        .await;

    // First page has no pageToken; registered after the more specific mock.
    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_json(&["aaaaaaaaaaa", "bbbbbbbbbbb"], Some("PAGE2"))),
        )
        .up_to_n_times(1)
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "aaaaaaaaaaa,bbbbbbbbbbb"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                video_json("aaaaaaaaaaa", 5_000, "2024-05-01T09:00:00Z"),
                video_json("bbbbbbbbbbb", 6_000, "2024-05-02T14:00:00Z")
            ]
        })))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .and(query_param("id", "ccccccccccc"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_json("ccccccccccc", 7_000, "2024-05-03T20:00:00Z")]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .fetch(&VideoTarget::Search("cats".to_string()), &options(3, 0))
        .await
        .expect("fetch should succeed");

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["aaaaaaaaaaa", "bbbbbbbbbbb", "ccccccccccc"]);
}

#[tokio::test]
async fn channel_fetch_returns_not_found_for_unknown_channel() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .and(query_param("id", CHANNEL_ID))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "items": [] })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch(&VideoTarget::Channel(CHANNEL_ID.to_string()), &options(10, 0))
        .await
        .unwrap_err();

    assert!(
        matches!(err, YoutubeError::NotFound { kind: "channel", ref id } if id == CHANNEL_ID),
        "got {err:?}"
    );
}

#[tokio::test]
async fn channel_fetch_searches_by_channel_id() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/channels"))
        .respond_with(
            ResponseTemplate::new(200).set_body_json(json!({ "items": [{ "id": CHANNEL_ID }] })),
        )
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .and(query_param("channelId", CHANNEL_ID))
        .and(query_param("order", "date"))
        .respond_with(ResponseTemplate::new(200).set_body_json(search_json(&["aaaaaaaaaaa"], None)))
        .mount(&server)
        .await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_json("aaaaaaaaaaa", 1_500, "2024-05-01T09:00:00Z")]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let records = client
        .fetch(&VideoTarget::Channel(CHANNEL_ID.to_string()), &options(10, 1_000))
        .await
        .expect("fetch should succeed");
    assert_eq!(records.len(), 1);
}

#[tokio::test]
async fn id_fetch_reports_missing_video() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [video_json("aaaaaaaaaaa", 5, "2024-05-01T09:00:00Z")]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let target = VideoTarget::Videos(vec!["aaaaaaaaaaa".to_string(), "zzzzzzzzzzz".to_string()]);
    let err = client.fetch(&target, &options(10, 0)).await.unwrap_err();

    assert!(
        matches!(err, YoutubeError::NotFound { kind: "video", ref id } if id == "zzzzzzzzzzz"),
        "got {err:?}"
    );
}

#[tokio::test]
async fn id_fetch_keeps_requested_order_and_ignores_min_views() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/videos"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "items": [
                video_json("bbbbbbbbbbb", 5, "2024-05-02T09:00:00Z"),
                video_json("aaaaaaaaaaa", 7, "2024-05-01T09:00:00Z")
            ]
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let target = VideoTarget::Videos(vec!["aaaaaaaaaaa".to_string(), "bbbbbbbbbbb".to_string()]);
    let records = client.fetch(&target, &options(10, 1_000)).await.unwrap();

    let ids: Vec<&str> = records.iter().map(|r| r.id.as_str()).collect();
    assert_eq!(ids, vec!["aaaaaaaaaaa", "bbbbbbbbbbb"]);
}

#[tokio::test]
async fn malformed_video_id_fails_before_any_request() {
    let server = MockServer::start().await;
    let client = test_client(&server.uri());

    let err = client
        .fetch(&VideoTarget::Videos(vec!["nope".to_string()]), &options(10, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, YoutubeError::Validation(_)));
    assert!(server.received_requests().await.unwrap_or_default().is_empty());
}

#[tokio::test]
async fn quota_error_surfaces_as_rate_limited() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(403).set_body_json(json!({
            "error": {
                "code": 403,
                "message": "The request cannot be completed because you have exceeded your quota.",
                "errors": [{ "reason": "quotaExceeded", "domain": "youtube.quota" }]
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch(&VideoTarget::Search("rust".to_string()), &options(10, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, YoutubeError::RateLimited { .. }), "got {err:?}");
}

#[tokio::test]
async fn invalid_key_surfaces_as_auth_error() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(ResponseTemplate::new(400).set_body_json(json!({
            "error": {
                "code": 400,
                "message": "API key not valid. Please pass a valid API key.",
                "errors": [{ "reason": "badRequest" }]
            }
        })))
        .mount(&server)
        .await;

    let client = test_client(&server.uri());
    let err = client
        .fetch(&VideoTarget::Search("rust".to_string()), &options(10, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, YoutubeError::Auth(_)), "got {err:?}");
    assert!(
        !err.to_string().contains("test-key"),
        "error message must not leak the API key: {err}"
    );
}

#[tokio::test]
async fn slow_response_maps_to_timeout() {
    let server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/search"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(search_json(&[], None))
                .set_delay(std::time::Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let client = YoutubeClient::with_base_url("test-key", 1, &server.uri()).unwrap();
    let err = client
        .fetch(&VideoTarget::Search("rust".to_string()), &options(10, 0))
        .await
        .unwrap_err();

    assert!(matches!(err, YoutubeError::Timeout { secs: 1 }), "got {err:?}");
}
