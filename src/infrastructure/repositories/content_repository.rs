use crate::domain::content::{ContentError, ContentPayload, Post, SortType};
use async_trait::async_trait;
use moka::future::Cache;
use serde::Deserialize;
use std::time::Duration;

/// Upper bound on posts fetched from a single listing
pub const MAX_LISTING_LIMIT: usize = 50;

/// Source of post content.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Resolve a single post by id
    async fn fetch_post(&self, source_id: &str) -> Result<ContentPayload, ContentError>;

    /// Fetch a subreddit listing. Pinned posts are left out, and so are NSFW
    /// posts when the source is configured to skip them.
    async fn fetch_subreddit(
        &self,
        subreddit: &str,
        sort: SortType,
        limit: usize,
    ) -> Result<Vec<Post>, ContentError>;
}

#[derive(Debug, Deserialize)]
struct Listing {
    data: ListingData,
}

#[derive(Debug, Deserialize)]
struct ListingData {
    children: Vec<ListingChild>,
}

#[derive(Debug, Deserialize)]
struct ListingChild {
    data: ListedPost,
}

#[derive(Debug, Deserialize)]
struct ListedPost {
    #[serde(flatten)]
    post: Post,
    #[serde(default)]
    stickied: bool,
}

impl ListedPost {
    fn is_listable(&self, skip_nsfw: bool) -> bool {
        !self.stickied && !(skip_nsfw && self.post.over_18)
    }
}

/// Reads posts from Reddit's public JSON endpoints.
pub struct RedditContentRepository {
    base_url: String,
    user_agent: String,
    http_client: reqwest::Client,
    cache: Option<Cache<String, ContentPayload>>,
    skip_nsfw: bool,
}

impl RedditContentRepository {
    pub fn new(
        base_url: String,
        user_agent: String,
        cache_enabled: bool,
        skip_nsfw: bool,
    ) -> Self {
        let http_client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());

        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(500)
                    .time_to_live(Duration::from_secs(15 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            user_agent,
            http_client,
            cache,
            skip_nsfw,
        }
    }

    async fn get_listing(&self, url: &str, what: &str) -> Result<Vec<ListedPost>, ContentError> {
        tracing::debug!(url = %url, "Fetching content listing");

        let response = self
            .http_client
            .get(url)
            .header("User-Agent", &self.user_agent)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| {
                tracing::warn!(error = %e, url = %url, "Content source request failed");
                ContentError::Unavailable(format!("{}: {}", what, e))
            })?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(ContentError::NotFound(what.to_string()));
        }
        if !status.is_success() {
            return Err(ContentError::Unavailable(format!(
                "{}: content source returned {}",
                what, status
            )));
        }

        let listing = response.json::<Listing>().await.map_err(|e| {
            ContentError::Unavailable(format!("{}: unreadable response: {}", what, e))
        })?;

        Ok(listing
            .data
            .children
            .into_iter()
            .map(|child| child.data)
            .collect())
    }
}

#[async_trait]
impl ContentRepository for RedditContentRepository {
    async fn fetch_post(&self, source_id: &str) -> Result<ContentPayload, ContentError> {
        let post_id = source_id.trim().trim_start_matches("t3_");
        if post_id.is_empty() {
            return Err(ContentError::NotFound(source_id.to_string()));
        }

        if let Some(cache) = &self.cache {
            if let Some(cached) = cache.get(post_id).await {
                tracing::debug!(post_id = post_id, "Content cache hit");
                return Ok(cached);
            }
        }

        let url = format!(
            "{}/by_id/t3_{}.json",
            self.base_url,
            urlencoding::encode(post_id)
        );
        let post = self
            .get_listing(&url, &format!("post {}", post_id))
            .await?
            .into_iter()
            .next()
            .map(|listed| listed.post)
            .ok_or_else(|| ContentError::NotFound(format!("post {}", post_id)))?;

        if self.skip_nsfw && post.over_18 {
            tracing::info!(post_id = post_id, "Skipping NSFW post");
            return Err(ContentError::Restricted(format!(
                "post {} is marked NSFW",
                post_id
            )));
        }
        let payload = post.content;

        if let Some(cache) = &self.cache {
            cache.insert(post_id.to_string(), payload.clone()).await;
        }

        Ok(payload)
    }

    async fn fetch_subreddit(
        &self,
        subreddit: &str,
        sort: SortType,
        limit: usize,
    ) -> Result<Vec<Post>, ContentError> {
        let subreddit = subreddit.trim().trim_start_matches("r/");
        let limit = limit.clamp(1, MAX_LISTING_LIMIT);
        let url = format!(
            "{}/r/{}/{}.json?limit={}",
            self.base_url,
            urlencoding::encode(subreddit),
            sort,
            limit
        );

        let posts: Vec<Post> = self
            .get_listing(&url, &format!("r/{}", subreddit))
            .await?
            .into_iter()
            .filter(|listed| listed.is_listable(self.skip_nsfw))
            .map(|listed| listed.post)
            .take(limit)
            .collect();

        tracing::info!(
            subreddit = subreddit,
            sort = %sort,
            count = posts.len(),
            "Fetched subreddit listing"
        );

        Ok(posts)
    }
}
