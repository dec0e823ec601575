//! Site scanning rules: selector lists, excluded domains, block-page markers.
//!
//! Every list that used to require a code change when a new site layout was
//! observed lives here as plain data. The defaults carry the lists observed
//! in production; a YAML file can override any of them at runtime, so
//! extending coverage to a new site is a data change.
//!
//! ```yaml
//! # rules.yaml — partial overrides are fine, omitted lists keep defaults
//! time_classes:
//!   - date
//!   - article-date
//! excluded_domains:
//!   - example.com/ads
//! ```

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::path::Path;
use tracing::info;

/// Scanning rules for the signal collector and the pipeline.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SourceRules {
    /// Domains (substring match against the URL) never worth fetching.
    pub excluded_domains: Vec<String>,
    /// Body substrings that identify interstitial/block pages.
    pub block_markers: Vec<String>,
    /// Selectors for embedded structured-data script blocks.
    pub script_selectors: Vec<String>,
    /// Metadata-tag selectors, probed for their `content` attribute.
    pub meta_selectors: Vec<String>,
    /// Bare CSS class names known to hold publication dates.
    pub time_classes: Vec<String>,
    /// Compound CSS selectors known from observed site layouts.
    pub compound_selectors: Vec<String>,
}

impl Default for SourceRules {
    fn default() -> Self {
        Self {
            excluded_domains: strings(&[
                "banki.ru/services/responses",
                "smart-lab.ru",
                "www1.ru",
                "neperm.ru",
                "cheboksary.ru",
                "yamal1.ru",
            ]),
            block_markers: strings(&["Национального УЦ Минцифры", "403 Error"]),
            script_selectors: strings(&["script[type='application/ld+json']"]),
            meta_selectors: strings(&[
                "meta[property='article:published_time']",
                "meta[itemprop='datePublished']",
                "meta[itemprop='dateModified']",
                "meta[name='publish-date']",
                "meta[property='og:published_time']",
                "meta[name='pubdate']",
                "meta[name='originalPublicationDate']",
                "link[rel='canonical']",
            ]),
            time_classes: strings(&[
                "js-ago",
                "date",
                "news-item-header--date",
                "b-post-time",
                "article__info-date",
                "timestamp",
                "entry-date",
                "pWvg",
                "c-post__date",
                "page-styles__date",
                "news-detail-date",
                "tag-date",
                "SHTMLCode",
                "article-details__date",
                "b-article__date",
                "time",
                "full_news_date",
                "article-header__author-writing-date",
                "article-date",
                "el-time",
                "date3",
                "date_item",
            ]),
            compound_selectors: strings(&[
                "span[title='Дата публикации']",
                "div[title='Дата публикации']",
                "span[data-id='date']",
                "div[data-test='text']",
                "div[id='info-text-photo-date']",
                "div.fn-rubric-link > div",
                ".text-grey.text-sm.span1",
                ".date.material__date",
                "time",
                "div.text-nowrap.d-flex.flex-wrap.gap-3 > div",
                "div[data-test='article-created-at']",
                "[data-qa='Datetime']",
                "[itemprop='datePublished']",
                "div[data-e2e-id='data-dynamic']",
            ]),
        }
    }
}

impl SourceRules {
    /// Load rules from a YAML file, falling back to defaults for omitted lists.
    pub fn from_yaml_file(path: &Path) -> Result<Self, Box<dyn Error>> {
        let raw = std::fs::read_to_string(path)?;
        let rules: SourceRules = serde_yaml::from_str(&raw)?;
        info!(path = %path.display(), "Loaded source rules");
        Ok(rules)
    }
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}
