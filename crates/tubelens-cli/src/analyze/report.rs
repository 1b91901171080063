//! Plain-text and JSON rendering of an [`AnalysisOutcome`].

use std::fmt::Write as _;

use super::pipeline::{AnalysisOutcome, BucketTable};

/// Renders the report as aligned plain-text tables followed by the insight
/// sections.
pub fn render_text(outcome: &AnalysisOutcome) -> String {
    let mut out = String::new();
    let o = &outcome.overview;

    let _ = writeln!(out, "TubeLens report: {}", outcome.subject);
    let _ = writeln!(
        out,
        "generated {}",
        outcome.generated_at.format("%Y-%m-%d %H:%M UTC")
    );
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "videos analyzed: {} (fetched {}, outliers excluded {})",
        o.video_count,
        outcome.fetched,
        outcome.excluded_outliers.len()
    );
    let _ = writeln!(out, "total views:     {}", o.total_views);
    let _ = writeln!(
        out,
        "mean per video:  {:.1} views, {:.1} likes, {:.1} comments",
        o.mean_views, o.mean_likes, o.mean_comments
    );

    for table in &outcome.buckets {
        render_bucket_table(&mut out, table);
    }

    if !outcome.top_videos.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "TOP VIDEOS BY ENGAGEMENT");
        let _ = writeln!(
            out,
            "{:<4}{:<12}{:>10}{:>8}{:>9}{:>8}  TITLE",
            "#", "PUBLISHED", "VIEWS", "LIKE%", "COMMENT%", "SCORE"
        );
        for (rank, v) in outcome.top_videos.iter().enumerate() {
            let _ = writeln!(
                out,
                "{:<4}{:<12}{:>10}{:>8.2}{:>9.2}{:>8.2}  {}{}",
                rank + 1,
                v.video.published_at.format("%Y-%m-%d"),
                v.video.view_count,
                v.like_ratio,
                v.comment_ratio,
                v.engagement_score,
                v.video.title,
                if v.is_recent { " (new)" } else { "" },
            );
        }
    }

    if !outcome.keywords.is_empty() {
        let _ = writeln!(out);
        let _ = writeln!(out, "TOP KEYWORDS");
        for k in &outcome.keywords {
            let _ = writeln!(out, "{:<24}{}", k.token, k.count);
        }
    }

    let _ = writeln!(out);
    match &outcome.insight {
        Some(report) => {
            let _ = writeln!(out, "AI INSIGHT");
            for (i, section) in report.sections.iter().enumerate() {
                if i > 0 {
                    let _ = writeln!(out, "\n---");
                }
                let _ = writeln!(out, "\n## {}", section.title);
                let _ = write!(out, "{}", section.body);
            }
        }
        None => {
            let _ = writeln!(out, "AI insight: skipped");
        }
    }

    out
}

fn render_bucket_table(out: &mut String, table: &BucketTable) {
    let _ = writeln!(out);
    let _ = writeln!(out, "BY {}", table.bucketing.to_uppercase());
    let _ = writeln!(
        out,
        "{:<12}{:>8}{:>14}{:>12}{:>12}",
        "BUCKET", "VIDEOS", "MEAN VIEWS", "MEAN LIKES", "MEAN CMTS"
    );
    for row in &table.rows {
        let _ = writeln!(
            out,
            "{:<12}{:>8}{:>14.1}{:>12.1}{:>12.1}",
            row.key,
            row.stats.count,
            row.stats.views.mean,
            row.stats.likes.mean,
            row.stats.comments.mean
        );
    }
}

/// Renders the report as pretty-printed JSON.
///
/// # Errors
///
/// Returns a `serde_json` error if serialization fails.
pub fn render_json(outcome: &AnalysisOutcome) -> serde_json::Result<String> {
    serde_json::to_string_pretty(outcome)
}
