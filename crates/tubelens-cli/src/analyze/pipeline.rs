//! Fetch → rank → aggregate/keywords → insight, generic over the two
//! external services so tests can drive it with in-memory fakes.

use chrono::{DateTime, FixedOffset, Utc};
use serde::Serialize;
use thiserror::Error;
use tubelens_analytics::{
    aggregate, dense_hours, dense_weekdays, extract_keywords, overview, rank_videos, texts_for,
    BucketKey, BucketStats, Bucketing, EngagementPolicy, KeywordCount, KeywordSource, Overview,
    RankedVideo, Stopwords, TokenPolicy,
};
use tubelens_core::{FetchOptions, VideoTarget};
use tubelens_insight::{request_insights, InsightError, InsightReport, InsightService, PromptInput};
use tubelens_youtube::{VideoSource, YoutubeError};

/// A pipeline failure, tagged with the stage that produced it.
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error("fetch stage failed: {0}")]
    Fetch(YoutubeError),

    #[error("validate stage failed: {0}")]
    Validation(String),

    #[error("insight stage failed: {0}")]
    Insight(InsightError),
}

impl AnalysisError {
    pub fn stage(&self) -> &'static str {
        match self {
            AnalysisError::Fetch(_) => "fetch",
            AnalysisError::Validation(_) => "validate",
            AnalysisError::Insight(_) => "insight",
        }
    }
}

impl From<YoutubeError> for AnalysisError {
    fn from(err: YoutubeError) -> Self {
        match err {
            YoutubeError::Validation(msg) => AnalysisError::Validation(msg),
            other => AnalysisError::Fetch(other),
        }
    }
}

/// Everything one analysis run needs besides the services.
#[derive(Debug, Clone)]
pub struct AnalysisRequest {
    pub target: VideoTarget,
    pub fetch: FetchOptions,
    pub now: DateTime<Utc>,
    pub top: usize,
    pub bucketings: Vec<Bucketing>,
    pub keyword_source: KeywordSource,
    pub stopwords: Stopwords,
    pub token_policy: TokenPolicy,
    pub engagement: EngagementPolicy,
    pub utc_offset: FixedOffset,
    pub prompt_keywords: usize,
    pub max_prompt_chars: usize,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketRow {
    pub key: String,
    #[serde(flatten)]
    pub stats: BucketStats,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BucketTable {
    pub bucketing: &'static str,
    pub rows: Vec<BucketRow>,
}

/// The assembled report data.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisOutcome {
    pub subject: String,
    pub generated_at: DateTime<Utc>,
    pub fetched: usize,
    pub excluded_outliers: Vec<String>,
    pub overview: Overview,
    pub buckets: Vec<BucketTable>,
    pub top_videos: Vec<RankedVideo>,
    pub keywords: Vec<KeywordCount>,
    /// `None` when the insight stage did not run.
    pub insight: Option<InsightReport>,
}

fn to_rows(rows: Vec<(BucketKey, BucketStats)>) -> Vec<BucketRow> {
    rows.into_iter()
        .map(|(key, stats)| BucketRow {
            key: key.to_string(),
            stats,
        })
        .collect()
}

/// Runs the whole analysis. `insight` is `None` when the insight stage is
/// skipped.
///
/// Aggregation and keyword extraction run over every record that survives
/// the outlier guard; `top` only limits the ranked table and the prompt.
///
/// # Errors
///
/// Returns an [`AnalysisError`] naming the stage that failed. An empty
/// fetch result is a validation failure.
pub async fn run_pipeline<V, S>(
    source: &V,
    insight: Option<&S>,
    request: &AnalysisRequest,
) -> Result<AnalysisOutcome, AnalysisError>
where
    V: VideoSource,
    S: InsightService,
{
    let label = request.target.label();
    let records = source.fetch(&request.target, &request.fetch).await?;
    if records.is_empty() {
        return Err(AnalysisError::Validation(format!("no videos matched {label}")));
    }

    let ranking = rank_videos(&records, request.now, &request.engagement);
    let summary = overview(ranking.records());

    let mut buckets = Vec::with_capacity(request.bucketings.len());
    for &bucketing in &request.bucketings {
        let map = aggregate(ranking.records(), bucketing, request.utc_offset);
        let rows = match bucketing {
            Bucketing::HourOfDay => dense_hours(&map),
            Bucketing::DayOfWeek => dense_weekdays(&map),
            Bucketing::Day | Bucketing::Month => map.into_iter().collect(),
        };
        buckets.push(BucketTable {
            bucketing: bucketing.label(),
            rows: to_rows(rows),
        });
    }

    let texts = texts_for(ranking.records(), request.keyword_source);
    let frequency = extract_keywords(texts, &request.stopwords, &request.token_policy);
    let keywords = frequency.top(request.prompt_keywords);
    let top_videos = ranking.top(request.top).to_vec();

    tracing::info!(
        fetched = records.len(),
        kept = ranking.kept.len(),
        outliers = ranking.excluded_outliers.len(),
        distinct_keywords = frequency.len(),
        "analysis computed"
    );

    let insight = match insight {
        Some(service) => {
            let hourly = aggregate(ranking.records(), Bucketing::HourOfDay, request.utc_offset);
            let weekday = aggregate(ranking.records(), Bucketing::DayOfWeek, request.utc_offset);
            let input = PromptInput {
                label: label.clone(),
                overview: summary,
                hourly: dense_hours(&hourly),
                weekday: dense_weekdays(&weekday),
                top_videos: top_videos.clone(),
                keywords: keywords.clone(),
                keyword_source: request.keyword_source,
            };
            let report = request_insights(service, &input, request.max_prompt_chars)
                .await
                .map_err(AnalysisError::Insight)?;
            Some(report)
        }
        None => None,
    };

    Ok(AnalysisOutcome {
        subject: label,
        generated_at: request.now,
        fetched: records.len(),
        excluded_outliers: ranking.excluded_outliers.clone(),
        overview: summary,
        buckets,
        top_videos,
        keywords,
        insight,
    })
}

#[cfg(test)]
#[path = "pipeline_test.rs"]
mod tests;
