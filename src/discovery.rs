//! Keyword discovery over the Google News RSS search feed.
//!
//! One query per date window, shaped as `{keyword} after:YYYY-MM-DD
//! before:YYYY-MM-DD`. The feed's `pubDate` is carried along as the raw
//! reference string; it is never parsed or trusted here. Results are
//! deduplicated by URL and filtered against the excluded-domain list.

use crate::config::SourceRules;
use crate::models::NewsHit;
use chrono::NaiveDate;
use itertools::Itertools;
use quick_xml::de::from_str;
use serde::Deserialize;
use std::error::Error;
use tracing::{debug, info};

const SEARCH_BASE: &str = "https://news.google.com/rss/search";

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    items: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

/// Build the search feed URL for one keyword and date window.
pub fn search_url(keyword: &str, after: NaiveDate, before: NaiveDate) -> String {
    let query = format!(
        "{keyword} after:{} before:{}",
        after.format("%Y-%m-%d"),
        before.format("%Y-%m-%d")
    );
    format!(
        "{SEARCH_BASE}?q={}&hl=ru&gl=RU&ceid=RU:ru",
        urlencoding::encode(&query)
    )
}

/// Search the news feed for `keyword` within `[after, before)`.
///
/// # Errors
///
/// Returns an error when the feed request fails or the response is not
/// parseable RSS.
pub async fn search_news(
    client: &reqwest::Client,
    keyword: &str,
    after: NaiveDate,
    before: NaiveDate,
    max_results: usize,
    rules: &SourceRules,
) -> Result<Vec<NewsHit>, Box<dyn Error>> {
    let url = search_url(keyword, after, before);
    debug!(%url, "Requesting news feed");
    let body = client.get(&url).send().await?.error_for_status()?.text().await?;
    let hits = parse_feed(&body, max_results, rules)?;
    info!(
        keyword,
        window = %format!("{after}..{before}"),
        count = hits.len(),
        "Discovered articles"
    );
    Ok(hits)
}

/// Parse an RSS payload into deduplicated, filtered hits.
pub fn parse_feed(
    xml: &str,
    max_results: usize,
    rules: &SourceRules,
) -> Result<Vec<NewsHit>, Box<dyn Error>> {
    let rss: Rss = from_str(xml)?;
    let hits = rss
        .channel
        .items
        .into_iter()
        .filter_map(|item| {
            let url = item.link?.trim().to_string();
            if url.is_empty() {
                return None;
            }
            Some(NewsHit {
                title: strip_source_suffix(item.title.as_deref().unwrap_or_default()),
                url,
                published_raw: item.pub_date.unwrap_or_default(),
            })
        })
        .filter(|hit| !is_excluded(&hit.url, rules))
        .unique_by(|hit| hit.url.clone())
        .take(max_results)
        .collect();
    Ok(hits)
}

/// Whether a URL belongs to a domain on the exclusion list.
pub fn is_excluded(url: &str, rules: &SourceRules) -> bool {
    rules.excluded_domains.iter().any(|d| url.contains(d.as_str()))
}

/// Feed titles carry a trailing `" - Publisher"` suffix; drop it.
fn strip_source_suffix(title: &str) -> String {
    match title.rfind(" - ") {
        Some(pos) if pos > 0 => title[..pos].trim().to_string(),
        _ => title.trim().to_string(),
    }
}
