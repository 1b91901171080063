//! The video fetcher: turns a [`VideoTarget`] into normalized records.
//!
//! Search and channel targets page through `search.list`, hydrate each page
//! with `videos.list`, and keep going until enough records pass the view
//! filter or the results run out. Explicit id lists are fetched as-is and
//! every id must resolve.

use std::collections::{HashMap, HashSet};
use std::future::Future;

use tubelens_core::{FetchOptions, VideoRecord, VideoTarget};

use crate::client::{SearchRequest, YoutubeClient, MAX_PAGE_SIZE};
use crate::error::YoutubeError;
use crate::ids::{validate_channel_id, validate_query, validate_video_id};
use crate::normalize::normalize_video;

/// Upper bound on `search.list` pages per fetch. Each page costs 100 quota
/// units, so this also caps the quota a single run can burn.
pub(crate) const MAX_PAGES: usize = 20;

/// Source of video records.
///
/// [`YoutubeClient`] is the production implementation; tests substitute
/// in-memory fakes.
pub trait VideoSource {
    /// Fetches the records for `target`, in the order the source returns them.
    fn fetch(
        &self,
        target: &VideoTarget,
        options: &FetchOptions,
    ) -> impl Future<Output = Result<Vec<VideoRecord>, YoutubeError>> + Send;
}

enum Scope<'a> {
    Keyword(&'a str),
    Channel(&'a str),
}

impl VideoSource for YoutubeClient {
    async fn fetch(
        &self,
        target: &VideoTarget,
        options: &FetchOptions,
    ) -> Result<Vec<VideoRecord>, YoutubeError> {
        match target {
            VideoTarget::Search(query) => {
                validate_query(query)?;
                self.collect_search(Scope::Keyword(query.trim()), options)
                    .await
            }
            VideoTarget::Channel(channel_id) => {
                validate_channel_id(channel_id)?;
                if !self.channel_exists(channel_id).await? {
                    return Err(YoutubeError::NotFound {
                        kind: "channel",
                        id: channel_id.clone(),
                    });
                }
                self.collect_search(Scope::Channel(channel_id), options)
                    .await
            }
            VideoTarget::Videos(ids) => self.fetch_by_ids(ids).await,
        }
    }
}

impl YoutubeClient {
    async fn collect_search(
        &self,
        scope: Scope<'_>,
        options: &FetchOptions,
    ) -> Result<Vec<VideoRecord>, YoutubeError> {
        if options.max_results == 0 {
            return Err(YoutubeError::Validation(
                "max_results must be at least 1".to_string(),
            ));
        }

        let (query, channel_id) = match scope {
            Scope::Keyword(q) => (Some(q), None),
            Scope::Channel(id) => (None, Some(id)),
        };

        let mut records: Vec<VideoRecord> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut page_token: Option<String> = None;
        let mut below_threshold = 0usize;

        for page in 0..MAX_PAGES {
            let remaining = options.max_results - records.len();
            let request = SearchRequest {
                query,
                channel_id,
                published_after: options.published_after,
                page_size: remaining.min(MAX_PAGE_SIZE),
                page_token: page_token.as_deref(),
            };
            let search = self.search_page(&request).await?;

            let fresh: Vec<String> = search
                .video_ids
                .into_iter()
                .filter(|id| seen.insert(id.clone()))
                .collect();

            tracing::debug!(page, ids = fresh.len(), "search page received");

            if !fresh.is_empty() {
                for item in self.list_videos(&fresh).await? {
                    let record = match normalize_video(&item) {
                        Ok(record) => record,
                        Err(e) => {
                            tracing::warn!(video_id = %item.id, error = %e, "skipping video");
                            continue;
                        }
                    };
                    if record.view_count < options.min_views {
                        below_threshold += 1;
                        continue;
                    }
                    records.push(record);
                    if records.len() >= options.max_results {
                        break;
                    }
                }
            }

            if records.len() >= options.max_results {
                break;
            }
            match search.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
            if page + 1 == MAX_PAGES {
                tracing::warn!(
                    max_pages = MAX_PAGES,
                    collected = records.len(),
                    "search page limit reached before max_results"
                );
            }
        }

        tracing::info!(
            collected = records.len(),
            below_min_views = below_threshold,
            min_views = options.min_views,
            "search fetch complete"
        );
        Ok(records)
    }

    async fn fetch_by_ids(&self, ids: &[String]) -> Result<Vec<VideoRecord>, YoutubeError> {
        if ids.is_empty() {
            return Err(YoutubeError::Validation(
                "at least one video id is required".to_string(),
            ));
        }
        for id in ids {
            validate_video_id(id)?;
        }

        let mut unique: Vec<String> = Vec::with_capacity(ids.len());
        let mut seen: HashSet<&str> = HashSet::new();
        for id in ids {
            if seen.insert(id.as_str()) {
                unique.push(id.clone());
            }
        }

        let mut by_id: HashMap<String, VideoRecord> = HashMap::new();
        for item in self.list_videos(&unique).await? {
            let record = normalize_video(&item)?;
            by_id.insert(record.id.clone(), record);
        }

        unique
            .into_iter()
            .map(|id| {
                by_id
                    .remove(&id)
                    .ok_or(YoutubeError::NotFound { kind: "video", id })
            })
            .collect()
    }
}
