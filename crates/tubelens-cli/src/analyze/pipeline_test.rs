use std::sync::atomic::{AtomicUsize, Ordering};

use chrono::TimeZone;
use tubelens_core::VideoRecord;

use super::*;

enum FakeSource {
    Records(Vec<VideoRecord>),
    ChannelMissing,
    Invalid,
}

impl VideoSource for FakeSource {
    async fn fetch(
        &self,
        _target: &VideoTarget,
        _options: &FetchOptions,
    ) -> Result<Vec<tubelens_core::VideoRecord>, YoutubeError> {
        match self {
            FakeSource::Records(records) => Ok(records.clone()),
            FakeSource::ChannelMissing => Err(YoutubeError::NotFound {
                kind: "channel",
                id: "UCxxxxxxxxxxxxxxxxxxxxxx".to_string(),
            }),
            FakeSource::Invalid => Err(YoutubeError::Validation("empty query".to_string())),
        }
    }
}

struct FakeInsight {
    calls: AtomicUsize,
    fail: bool,
}

impl FakeInsight {
    fn new(fail: bool) -> Self {
        Self {
            calls: AtomicUsize::new(0),
            fail,
        }
    }
}

impl InsightService for FakeInsight {
    async fn complete(&self, _prompt: &str) -> Result<String, InsightError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail {
            return Err(InsightError::Auth("invalid x-api-key".to_string()));
        }
        Ok(format!("• insight {n}"))
    }
}

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap()
}

fn record(id: &str, title: &str, published_at: DateTime<Utc>, views: u64) -> VideoRecord {
    VideoRecord {
        id: id.to_string(),
        title: title.to_string(),
        description: String::new(),
        channel_title: "Channel".to_string(),
        published_at,
        view_count: views,
        like_count: views / 20,
        comment_count: views / 200,
        tags: Vec::new(),
        duration_secs: Some(300),
    }
}

fn records() -> Vec<VideoRecord> {
    vec![
        record(
            "aaaaaaaaaaa",
            "Great tutorial on cats",
            Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
            1_000,
        ),
        record(
            "bbbbbbbbbbb",
            "Another cat tutorial",
            Utc.with_ymd_and_hms(2024, 5, 2, 9, 30, 0).unwrap(),
            2_000,
        ),
        record(
            "ccccccccccc",
            "Cat bread",
            Utc.with_ymd_and_hms(2024, 5, 3, 14, 0, 0).unwrap(),
            500,
        ),
    ]
}

fn request() -> AnalysisRequest {
    AnalysisRequest {
        target: VideoTarget::Search("cats".to_string()),
        fetch: FetchOptions::default(),
        now: now(),
        top: 2,
        bucketings: vec![Bucketing::HourOfDay, Bucketing::DayOfWeek, Bucketing::Month],
        keyword_source: KeywordSource::Titles,
        stopwords: ["on"].into_iter().collect(),
        token_policy: TokenPolicy::default(),
        engagement: EngagementPolicy::default(),
        utc_offset: FixedOffset::east_opt(0).unwrap(),
        prompt_keywords: 30,
        max_prompt_chars: 12_000,
    }
}

#[tokio::test]
async fn builds_report_without_insight() {
    let outcome = run_pipeline(
        &FakeSource::Records(records()),
        None::<&FakeInsight>,
        &request(),
    )
    .await
    .unwrap();

    assert_eq!(outcome.fetched, 3);
    assert_eq!(outcome.overview.video_count, 3);
    assert_eq!(outcome.overview.total_views, 3_500);
    assert!(outcome.insight.is_none());

    let hourly = &outcome.buckets[0];
    assert_eq!(hourly.bucketing, "hour of day");
    assert_eq!(hourly.rows.len(), 24);
    assert_eq!(hourly.rows[9].key, "09:00");
    assert_eq!(hourly.rows[9].stats.count, 2);
    assert!((hourly.rows[9].stats.views.mean - 1_500.0).abs() < 1e-9);
    assert_eq!(hourly.rows[14].stats.count, 1);

    assert_eq!(outcome.buckets[1].rows.len(), 7);
    let months = &outcome.buckets[2];
    assert_eq!(months.rows.len(), 1);
    assert_eq!(months.rows[0].key, "2024-05");

    assert_eq!(outcome.top_videos.len(), 2);
    let tutorial = outcome.keywords.iter().find(|k| k.token == "tutorial");
    assert_eq!(tutorial.map(|k| k.count), Some(2));
    assert!(outcome.keywords.iter().all(|k| k.token != "on"));
}

#[tokio::test]
async fn runs_both_insight_passes() {
    let insight = FakeInsight::new(false);
    let outcome = run_pipeline(&FakeSource::Records(records()), Some(&insight), &request())
        .await
        .unwrap();

    let report = outcome.insight.expect("insight should be present");
    assert_eq!(report.sections.len(), 2);
    assert_eq!(report.sections[1].body, "\n    * insight 2\n");
    assert_eq!(insight.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn empty_fetch_is_a_validation_failure() {
    let insight = FakeInsight::new(false);
    let err = run_pipeline(&FakeSource::Records(Vec::new()), Some(&insight), &request())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "validate");
    assert!(err.to_string().starts_with("validate stage failed: no videos matched"));
    assert_eq!(insight.calls.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn fetcher_validation_errors_are_reported_as_validate_stage() {
    let err = run_pipeline(&FakeSource::Invalid, None::<&FakeInsight>, &request())
        .await
        .unwrap_err();
    assert_eq!(err.stage(), "validate");
}

#[tokio::test]
async fn missing_channel_is_a_fetch_failure() {
    let err = run_pipeline(&FakeSource::ChannelMissing, None::<&FakeInsight>, &request())
        .await
        .unwrap_err();

    assert_eq!(err.stage(), "fetch");
    assert!(err.to_string().contains("channel not found"));
}

#[tokio::test]
async fn insight_failure_names_the_insight_stage() {
    let insight = FakeInsight::new(true);
    let err = run_pipeline(&FakeSource::Records(records()), Some(&insight), &request())
        .await
        .unwrap_err();

    assert!(matches!(err, AnalysisError::Insight(InsightError::Auth(_))));
    assert!(err.to_string().starts_with("insight stage failed"));
}

#[tokio::test]
async fn aggregation_runs_over_outlier_filtered_set() {
    let mut data: Vec<VideoRecord> = (0..10)
        .map(|i| {
            record(
                &format!("v{i:010}"),
                "Steady video",
                Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap(),
                10_000,
            )
        })
        .collect();
    let mut spam = record(
        "spamspamspa",
        "Giveaway",
        Utc.with_ymd_and_hms(2024, 5, 1, 20, 0, 0).unwrap(),
        10_000,
    );
    spam.comment_count = 5_000;
    data.push(spam);

    let outcome = run_pipeline(&FakeSource::Records(data), None::<&FakeInsight>, &request())
        .await
        .unwrap();

    assert_eq!(outcome.fetched, 11);
    assert_eq!(outcome.excluded_outliers, vec!["spamspamspa".to_string()]);
    assert_eq!(outcome.overview.video_count, 10);
    assert_eq!(outcome.buckets[0].rows[20].stats.count, 0);
    assert!(outcome.keywords.iter().all(|k| k.token != "giveaway"));
}
