use std::future::Future;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::{Client, StatusCode, Url};
use serde::Deserialize;
use tracing::{debug, warn};

use crate::constants::constants;
use crate::error::SearchError;
use crate::model::{ResultSet, VideoId, VideoSummary};

/// Issues one search request per query. No retries and no caching; the
/// caller decides what to do with a failure.
pub trait SearchService: Send + Sync + 'static {
  fn search(&self, query: &str) -> impl Future<Output = Result<ResultSet, SearchError>> + Send;
}

/// YouTube Data API v3 `search.list` client.
pub struct YouTubeSearch {
  client: Client,
  endpoint: Url,
  api_key: String,
}

impl YouTubeSearch {
  pub fn new(api_key: String, timeout: Duration) -> Result<Self> {
    let client = Client::builder()
      .timeout(timeout)
      .user_agent(concat!(env!("CARGO_PKG_NAME"), "/", env!("CARGO_PKG_VERSION")))
      .build()
      .context("Failed to build HTTP client")?;
    let endpoint = Url::parse(&constants().search_endpoint).context("Invalid search endpoint")?;
    Ok(Self { client, endpoint, api_key })
  }

  fn request_url(&self, query: &str) -> Url {
    search_url(&self.endpoint, &self.api_key, query)
  }
}

impl SearchService for YouTubeSearch {
  async fn search(&self, query: &str) -> Result<ResultSet, SearchError> {
    debug!(query = %query, "search: sending request");
    let response = self.client.get(self.request_url(query)).send().await.map_err(|e| {
      warn!(err = %e, "search: transport error");
      generic_failure()
    })?;

    let status = response.status();
    let body = response.text().await.map_err(|e| {
      warn!(err = %e, %status, "search: failed to read response body");
      generic_failure()
    })?;

    if !status.is_success() {
      let reason = error_reason(status, &body);
      warn!(%status, reason = %reason, "search: API returned an error");
      return Err(SearchError::Failed(reason));
    }

    let results = parse_search_body(&body)?;
    debug!(count = results.len(), "search: response parsed");
    Ok(results)
  }
}

// --- Wire format ---

#[derive(Debug, Deserialize)]
struct SearchResponse {
  #[serde(default)]
  items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
  id: ItemId,
  snippet: Option<Snippet>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ItemId {
  video_id: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct Snippet {
  #[serde(default)]
  title: String,
  #[serde(default)]
  channel_title: String,
}

#[derive(Debug, Deserialize)]
struct ErrorEnvelope {
  error: ApiError,
}

#[derive(Debug, Deserialize)]
struct ApiError {
  message: Option<String>,
}

fn generic_failure() -> SearchError {
  SearchError::Failed(constants().generic_search_error.clone())
}

/// Build the `search.list` URL: snippet metadata, videos only, one page.
pub fn search_url(endpoint: &Url, api_key: &str, query: &str) -> Url {
  let mut url = endpoint.clone();
  url
    .query_pairs_mut()
    .append_pair("part", "snippet")
    .append_pair("type", "video")
    .append_pair("maxResults", &constants().page_size.to_string())
    .append_pair("q", query)
    .append_pair("key", api_key);
  url
}

/// Turn a 2xx body into a result set. Items without a video id (channels or
/// playlists that slip through) are skipped; order is preserved.
pub fn parse_search_body(body: &str) -> Result<ResultSet, SearchError> {
  let response: SearchResponse = serde_json::from_str(body).map_err(|e| {
    warn!(err = %e, "search: malformed response body");
    generic_failure()
  })?;

  Ok(
    response
      .items
      .into_iter()
      .filter_map(|item| {
        let id = item.id.video_id.as_deref().and_then(VideoId::parse)?;
        let snippet = item.snippet.unwrap_or(Snippet { title: String::new(), channel_title: String::new() });
        let title = if snippet.title.is_empty() { id.to_string() } else { decode_entities(&snippet.title) };
        Some(VideoSummary { id, title, channel_name: decode_entities(&snippet.channel_title) })
      })
      .take(constants().page_size)
      .collect(),
  )
}

/// Human-readable reason for a non-2xx response: the API's own message when
/// the body carries one, otherwise the generic message.
pub fn error_reason(status: StatusCode, body: &str) -> String {
  match serde_json::from_str::<ErrorEnvelope>(body) {
    Ok(ErrorEnvelope { error: ApiError { message: Some(msg) } }) if !msg.trim().is_empty() => {
      format!("{} ({})", msg.trim(), status.as_u16())
    }
    _ => constants().generic_search_error.clone(),
  }
}

/// The API HTML-escapes snippet text. Decode the entities it actually emits.
fn decode_entities(s: &str) -> String {
  if !s.contains('&') {
    return s.to_string();
  }
  s.replace("&quot;", "\"").replace("&#39;", "'").replace("&lt;", "<").replace("&gt;", ">").replace("&amp;", "&")
}
