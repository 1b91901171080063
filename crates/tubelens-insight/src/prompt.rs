//! Deterministic, size-bounded prompt rendering.
//!
//! A prompt has a fixed part (instructions, overview, hourly and weekday
//! tables) and two trimmable lists (top videos, keywords). When the rendered
//! prompt is over budget, keywords are dropped lowest-frequency first, then
//! video rows lowest-ranked first.

use std::fmt::{self, Write as _};

use serde::Serialize;
use tubelens_analytics::{
    BucketKey, BucketStats, KeywordCount, KeywordSource, Overview, RankedVideo,
};

use crate::error::InsightError;

/// Which analysis pass a prompt asks for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PromptKind {
    /// Performance patterns and title optimization.
    Performance,
    /// Upload timing and content production guidance.
    Strategy,
}

impl PromptKind {
    pub const ALL: [PromptKind; 2] = [PromptKind::Performance, PromptKind::Strategy];

    #[must_use]
    pub fn title(self) -> &'static str {
        match self {
            PromptKind::Performance => "Performance patterns and optimization",
            PromptKind::Strategy => "Timing and content strategy",
        }
    }

    fn instructions(self) -> &'static str {
        match self {
            PromptKind::Performance => PERFORMANCE_INSTRUCTIONS,
            PromptKind::Strategy => STRATEGY_INSTRUCTIONS,
        }
    }
}

impl fmt::Display for PromptKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            PromptKind::Performance => "performance",
            PromptKind::Strategy => "strategy",
        })
    }
}

const PREAMBLE: &str = "You are a YouTube data analyst. Analyze the data set below and \
                        derive concrete, data-backed insights.";

const PERFORMANCE_INSTRUCTIONS: &str = "\
1️⃣ Performance patterns
▶️ What the top 25% of videos by views have in common
#### Title patterns
• Frequent keywords, keyword combinations, keywords by performance
• Title structure: effective length, sentence patterns
• Representative successful titles and why they work
#### Views versus engagement
• Notable patterns and outliers
#### Shared traits of successful videos
• Content structure, viewer response, differentiators

2️⃣ Optimization
▶️ Title optimization
#### Effective title components
• Must-have keywords and their order
• Recommended length and format
#### Keywords that draw viewers
• Keywords tied to views and to engagement
#### Improvements
• Changes to apply immediately, A/B test ideas, pitfalls to avoid";

const STRATEGY_INSTRUCTIONS: &str = "\
3️⃣ Timing
▶️ Upload strategy
#### Best upload hours
• Hours with the highest views and the highest engagement
#### Best periods
• Weekday performance, monthly or seasonal trends
#### Long-term trend
• Growth patterns across the period

4️⃣ Content production guide
▶️ Format optimization
#### Formats that perform
• Success factors of the top videos, common structure, differentiators
#### What drives engagement
• Prompting comments and likes, community interaction
▶️ Execution
#### Action plan
• Short-term fixes with priorities
• Long-term direction and competitive strengths";

const GUIDELINES: &str = "\
Guidelines:
1. Write time ranges with '~' (for example 09:00~15:00).
2. Quote concrete figures from the data, such as '47%' or '2.3x'.
3. Answer hierarchically: use the numbered section markers above, ▶️ for \
subsections, • for items and - for details.";

/// Everything a prompt is rendered from.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PromptInput {
    /// What was analyzed, e.g. `search "rust tutorial"`.
    pub label: String,
    pub overview: Overview,
    /// Hourly buckets; empty hours are skipped when rendering.
    pub hourly: Vec<(BucketKey, BucketStats)>,
    /// Weekday buckets; empty days are skipped when rendering.
    pub weekday: Vec<(BucketKey, BucketStats)>,
    /// Best-ranked first.
    pub top_videos: Vec<RankedVideo>,
    pub keywords: Vec<KeywordCount>,
    /// Fields the keywords were counted from.
    pub keyword_source: KeywordSource,
}

/// Renders the prompt for `kind`, trimming it to at most `max_chars` chars.
///
/// # Errors
///
/// Returns [`InsightError::PromptTooLarge`] when the prompt is still over
/// budget after every keyword and video row has been dropped.
pub fn build_prompt(
    input: &PromptInput,
    kind: PromptKind,
    max_chars: usize,
) -> Result<String, InsightError> {
    let mut keywords = input.keywords.clone();
    keywords.sort_by(|a, b| b.count.cmp(&a.count).then_with(|| a.token.cmp(&b.token)));
    let mut video_rows = input.top_videos.len();
    let original_keywords = keywords.len();

    loop {
        let prompt = render(input, kind, &input.top_videos[..video_rows], &keywords);
        let chars = prompt.chars().count();
        if chars <= max_chars {
            if keywords.len() < original_keywords || video_rows < input.top_videos.len() {
                tracing::debug!(
                    %kind,
                    chars,
                    max_chars,
                    dropped_keywords = original_keywords - keywords.len(),
                    dropped_videos = input.top_videos.len() - video_rows,
                    "prompt trimmed to fit budget"
                );
            }
            return Ok(prompt);
        }

        if keywords.pop().is_some() {
            continue;
        }
        if video_rows > 0 {
            video_rows -= 1;
            continue;
        }
        return Err(InsightError::PromptTooLarge { chars, max_chars });
    }
}

fn render(
    input: &PromptInput,
    kind: PromptKind,
    videos: &[RankedVideo],
    keywords: &[KeywordCount],
) -> String {
    let mut out = String::new();
    // `fmt::Write` for `String` never fails.
    let _ = write_prompt(&mut out, input, kind, videos, keywords);
    out
}

fn write_prompt(
    out: &mut String,
    input: &PromptInput,
    kind: PromptKind,
    videos: &[RankedVideo],
    keywords: &[KeywordCount],
) -> fmt::Result {
    let o = &input.overview;
    writeln!(out, "{PREAMBLE}")?;
    writeln!(out)?;
    writeln!(out, "Data set: {}", input.label)?;
    writeln!(
        out,
        "Overview: {} videos, {} total views, mean {:.1} views, {:.1} likes, {:.1} comments per video",
        o.video_count, o.total_views, o.mean_views, o.mean_likes, o.mean_comments
    )?;

    write_buckets(out, "Performance by upload hour", &input.hourly)?;
    write_buckets(out, "Performance by weekday", &input.weekday)?;

    if !videos.is_empty() {
        writeln!(out)?;
        writeln!(
            out,
            "Top videos by engagement (rank | title | views | likes | comments | score | published):"
        )?;
        for (rank, v) in videos.iter().enumerate() {
            writeln!(
                out,
                "{} | {} | {} | {} | {} | {:.2} | {}",
                rank + 1,
                v.video.title,
                v.video.view_count,
                v.video.like_count,
                v.video.comment_count,
                v.engagement_score,
                v.video.published_at.format("%Y-%m-%d %H:%M"),
            )?;
        }
    }

    if !keywords.is_empty() {
        writeln!(out)?;
        let source = input.keyword_source.label();
        let mut heading = source.chars();
        if let Some(first) = heading.next() {
            write!(out, "{}{}", first.to_uppercase(), heading.as_str())?;
        }
        writeln!(out, " keywords (count):")?;
        let joined: Vec<String> = keywords
            .iter()
            .map(|k| format!("{} ({})", k.token, k.count))
            .collect();
        writeln!(out, "{}", joined.join(", "))?;
    }

    writeln!(out)?;
    writeln!(out, "{}", kind.instructions())?;
    writeln!(out)?;
    write!(out, "{GUIDELINES}")
}

fn write_buckets(
    out: &mut String,
    heading: &str,
    buckets: &[(BucketKey, BucketStats)],
) -> fmt::Result {
    let filled: Vec<_> = buckets.iter().filter(|(_, s)| s.count > 0).collect();
    if filled.is_empty() {
        return Ok(());
    }
    writeln!(out)?;
    writeln!(out, "{heading} (videos | mean views | mean likes | mean comments):")?;
    for (key, stats) in filled {
        writeln!(
            out,
            "{key} | {} | {:.1} | {:.1} | {:.1}",
            stats.count, stats.views.mean, stats.likes.mean, stats.comments.mean
        )?;
    }
    Ok(())
}
