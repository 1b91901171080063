//! The `analyze` command: argument handling and wiring of the real clients
//! into the pipeline.

mod pipeline;
mod report;

use chrono::{FixedOffset, Utc};
use clap::{ArgGroup, Args, ValueEnum};
use tubelens_analytics::{Bucketing, EngagementPolicy, KeywordSource, Stopwords, TokenPolicy};
use tubelens_core::{AppConfig, FetchOptions, VideoTarget};
use tubelens_insight::AnthropicClient;
use tubelens_youtube::{parse_video_ref, YoutubeClient};

pub(crate) use pipeline::{run_pipeline, AnalysisError, AnalysisRequest};

/// Keywords handed to the insight prompt before any budget trimming.
const PROMPT_KEYWORDS: usize = 30;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum BucketArg {
    Hour,
    Weekday,
    Day,
    Month,
}

impl From<BucketArg> for Bucketing {
    fn from(arg: BucketArg) -> Self {
        match arg {
            BucketArg::Hour => Bucketing::HourOfDay,
            BucketArg::Weekday => Bucketing::DayOfWeek,
            BucketArg::Day => Bucketing::Day,
            BucketArg::Month => Bucketing::Month,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum KeywordsFrom {
    Titles,
    Descriptions,
    Tags,
    All,
}

impl From<KeywordsFrom> for KeywordSource {
    fn from(arg: KeywordsFrom) -> Self {
        match arg {
            KeywordsFrom::Titles => KeywordSource::Titles,
            KeywordsFrom::Descriptions => KeywordSource::Descriptions,
            KeywordsFrom::Tags => KeywordSource::Tags,
            KeywordsFrom::All => KeywordSource::All,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

/// Arguments for `tubelens analyze`.
#[derive(Debug, Args)]
#[command(group(
    ArgGroup::new("target")
        .required(true)
        .args(["query", "channel", "video"])
))]
pub struct AnalyzeArgs {
    /// Keyword search across YouTube
    #[arg(long)]
    pub query: Option<String>,

    /// Channel id (starts with UC)
    #[arg(long)]
    pub channel: Option<String>,

    /// Video id or URL; repeat or pass several
    #[arg(long, num_args = 1..)]
    pub video: Vec<String>,

    /// Maximum number of videos to collect for search/channel targets
    #[arg(long, default_value_t = 50, value_parser = clap::value_parser!(u32).range(1..=500))]
    pub max_results: u32,

    /// Only consider videos published in the last N months
    #[arg(long, default_value_t = 12, value_parser = clap::value_parser!(u32).range(1..=24))]
    pub months: u32,

    /// Drop search/channel results with fewer views
    #[arg(long, default_value_t = 1000)]
    pub min_views: u64,

    /// Number of top videos to list and send to the insight model
    #[arg(long, default_value_t = 20)]
    pub top: usize,

    /// Time bucketing to report; repeatable
    #[arg(long = "bucket", value_enum, default_values_t = [BucketArg::Hour, BucketArg::Weekday])]
    pub buckets: Vec<BucketArg>,

    /// Which text fields feed keyword extraction
    #[arg(long, value_enum, default_value_t = KeywordsFrom::Titles)]
    pub keywords_from: KeywordsFrom,

    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    pub format: OutputFormat,

    /// Skip the AI insight stage
    #[arg(long)]
    pub no_insight: bool,
}

impl AnalyzeArgs {
    /// Resolves the target, accepting video URLs as well as bare ids.
    ///
    /// # Errors
    ///
    /// Returns [`AnalysisError::Validation`] for an unparseable video
    /// reference or when no target was given.
    pub fn target(&self) -> Result<VideoTarget, AnalysisError> {
        if let Some(query) = &self.query {
            return Ok(VideoTarget::Search(query.clone()));
        }
        if let Some(channel) = &self.channel {
            return Ok(VideoTarget::Channel(channel.trim().to_string()));
        }
        if self.video.is_empty() {
            return Err(AnalysisError::Validation(
                "one of --query, --channel or --video is required".to_string(),
            ));
        }
        let ids = self
            .video
            .iter()
            .map(|v| parse_video_ref(v).map_err(|e| AnalysisError::Validation(e.to_string())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(VideoTarget::Videos(ids))
    }

    /// Builds the pipeline request from the arguments and configuration.
    ///
    /// # Errors
    ///
    /// Same as [`AnalyzeArgs::target`], plus [`AnalysisError::Validation`]
    /// for an out-of-range UTC offset.
    pub fn to_request(
        &self,
        config: &AppConfig,
        now: chrono::DateTime<Utc>,
    ) -> Result<AnalysisRequest, AnalysisError> {
        let utc_offset = FixedOffset::east_opt(config.utc_offset_minutes * 60).ok_or_else(|| {
            AnalysisError::Validation(format!(
                "UTC offset of {} minutes is out of range",
                config.utc_offset_minutes
            ))
        })?;

        let mut bucketings: Vec<Bucketing> = Vec::new();
        for bucket in &self.buckets {
            let bucketing = Bucketing::from(*bucket);
            if !bucketings.contains(&bucketing) {
                bucketings.push(bucketing);
            }
        }

        Ok(AnalysisRequest {
            target: self.target()?,
            fetch: FetchOptions::recent_months(
                now,
                self.months,
                self.max_results as usize,
                self.min_views,
            ),
            now,
            top: self.top,
            bucketings,
            keyword_source: self.keywords_from.into(),
            stopwords: Stopwords::english(),
            token_policy: TokenPolicy::default(),
            engagement: EngagementPolicy::default(),
            utc_offset,
            prompt_keywords: PROMPT_KEYWORDS,
            max_prompt_chars: config.insight_max_prompt_chars,
        })
    }
}

/// Picks the insight client for a run. Returns `None` when the stage is
/// disabled by flag or no Claude key is configured; the latter logs a warning.
///
/// # Errors
///
/// Returns [`AnalysisError::Insight`] if the client cannot be built.
pub(crate) fn insight_client(
    config: &AppConfig,
    no_insight: bool,
) -> Result<Option<AnthropicClient>, AnalysisError> {
    if no_insight {
        return Ok(None);
    }
    if config.claude_api_key.is_none() {
        tracing::warn!("CLAUDE_API_KEY is not set; skipping AI insight");
        return Ok(None);
    }
    AnthropicClient::from_config(config)
        .map(Some)
        .map_err(AnalysisError::Insight)
}

/// Runs `tubelens analyze` against the live APIs and prints the report.
///
/// # Errors
///
/// Returns an [`AnalysisError`] naming the failed stage.
pub(crate) async fn run_analyze(config: &AppConfig, args: AnalyzeArgs) -> anyhow::Result<()> {
    let request = args.to_request(config, Utc::now())?;
    let source = YoutubeClient::from_config(config).map_err(AnalysisError::Fetch)?;

    let insight = insight_client(config, args.no_insight)?;

    tracing::info!(subject = %request.target.label(), "starting analysis");
    let outcome = match run_pipeline(&source, insight.as_ref(), &request).await {
        Ok(outcome) => outcome,
        Err(err) => {
            tracing::error!(stage = err.stage(), error = %err, "analysis failed");
            return Err(err.into());
        }
    };

    match args.format {
        OutputFormat::Text => print!("{}", report::render_text(&outcome)),
        OutputFormat::Json => println!("{}", report::render_json(&outcome)?),
    }
    Ok(())
}
